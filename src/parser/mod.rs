//! Markdown parsing module.
//!
//! Turns a Markdown document into the ordered block sequence a page is built
//! from: line-level tokenizing, nested list folding, pipe tables and inline
//! rich-text formatting.

mod inline;
mod list;
mod markdown;
mod numbering;
mod options;
mod table;

pub use inline::{format, format_verbatim, normalize_link, unescape};
pub use list::{build_list, indent_width, parse_list_line, ListBuild, ListBuilder, ListItem, ListKind};
pub use markdown::{parse_markdown, parse_markdown_with_options, MarkdownParser};
pub use numbering::strip_numbering_artifacts;
pub use options::{ParseOptions, DEFAULT_MAX_TABLE_ROWS, EMPTY_PLACEHOLDER};
pub use table::{is_separator, resolve_table, split_row, ResolvedTable};

