//! Rendering module for converting blocks to output formats.

mod escape;
mod json;
mod markdown;
mod options;
mod result;

pub use escape::{
    code_fence, escape_heading, escape_line_start, escape_text, inline_code, longest_backtick_run,
};
pub use json::{to_json, to_value, JsonFormat};
pub use markdown::{to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::RenderOptions;
pub use result::{ConversionStats, RenderResult};
