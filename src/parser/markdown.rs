//! Line-oriented Markdown tokenizer producing page blocks.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::inline::{format, format_verbatim, normalize_link, unescape};
use super::list::{parse_list_line, ListBuilder};
use super::options::{ParseOptions, DEFAULT_MAX_TABLE_ROWS};
use super::table::{resolve_table, ResolvedTable};
use crate::model::{split_long_runs, Block, CalloutKind, Table, TextRun};

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").expect("valid heading pattern")
});
static IMAGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^!\[((?:\\.|[^\]\\])*)\]\(([^)\s]+)(?:\s+"[^"]*")?\)$"#)
        .expect("valid image pattern")
});
static ARROW_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][\w-]*\s*(?:-->|->|→|=>|⇒|⟶|<-|←)\s*[A-Z]").expect("valid arrow pattern")
});

const VARIATION_SELECTOR: char = '\u{FE0F}';
const ZERO_WIDTH_JOINER: char = '\u{200D}';
const KEYCAP: char = '\u{20E3}';

/// An opening code fence.
struct Fence<'a> {
    ticks: usize,
    info: &'a str,
    indent: &'a str,
}

/// Markdown to block parser.
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser {
    options: ParseOptions,
}

impl MarkdownParser {
    /// Create a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Get the parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a Markdown document into an ordered block sequence.
    ///
    /// The result is never empty: input with no content yields a single
    /// placeholder paragraph.
    pub fn parse(&self, markdown: &str) -> Vec<Block> {
        let text: String = if self.options.normalize_unicode {
            markdown.nfc().collect()
        } else {
            markdown.to_string()
        };
        let lines: Vec<&str> = text.lines().collect();

        let mut blocks = Vec::new();
        let mut index = 0;
        while index < lines.len() {
            index = self.parse_block(&lines, index, &mut blocks);
        }

        if blocks.is_empty() {
            log::debug!("No content found, emitting placeholder paragraph");
            blocks.push(Block::paragraph(vec![TextRun::plain(
                self.options.placeholder.clone(),
            )]));
        }

        log::debug!("Parsed {} lines into {} blocks", lines.len(), blocks.len());
        blocks
    }

    /// Consume the block starting at `index`, returning the next line index.
    fn parse_block(&self, lines: &[&str], index: usize, blocks: &mut Vec<Block>) -> usize {
        let line = lines[index];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return index + 1;
        }

        if let Some(fence) = open_fence(line) {
            return self.parse_code(lines, index, fence, blocks);
        }

        if let Some(caps) = HEADING.captures(line.trim_start()) {
            let level = caps[1].len().min(3) as u8;
            blocks.push(Block::heading(level, format(caps[2].trim())));
            return index + 1;
        }

        if is_horizontal_rule(trimmed) {
            blocks.push(Block::Divider);
            return index + 1;
        }

        if line.contains('|') {
            if let Some(table) = resolve_table(lines, index) {
                let next = table.next_index;
                blocks.extend(self.table_blocks(table));
                return next;
            }
        }

        if trimmed.starts_with('>') {
            return self.parse_quote(lines, index, blocks);
        }

        if let Some(item) = parse_list_line(line) {
            let build = ListBuilder::new(&self.options).build(lines, index, item.kind);
            if build.next_index > index {
                blocks.extend(build.blocks);
                return build.next_index;
            }
        }

        if let Some(caps) = IMAGE_LINE.captures(trimmed) {
            if let Some(url) = normalize_link(&caps[2]) {
                let alt = unescape(&caps[1]);
                let caption = if alt.trim().is_empty() {
                    Vec::new()
                } else {
                    split_long_runs(vec![TextRun::plain(alt.trim())])
                };
                blocks.push(Block::image(url, caption));
                return index + 1;
            }
            log::debug!("Image with non-web URL kept as text: {}", &caps[2]);
        }

        let runs = if self.options.preserve_arrow_lines && ARROW_LINE.is_match(trimmed) {
            format_verbatim(&unescape(trimmed))
        } else {
            format(trimmed)
        };
        self.push_paragraphs(runs, blocks);
        index + 1
    }

    fn parse_code(
        &self,
        lines: &[&str],
        index: usize,
        fence: Fence<'_>,
        blocks: &mut Vec<Block>,
    ) -> usize {
        let closing = "`".repeat(fence.ticks);
        let body_start = index + 1;
        let mut end = body_start;
        while end < lines.len() && lines[end].trim() != closing {
            end += 1;
        }

        let body = &lines[body_start..end];
        let strip = !fence.indent.is_empty()
            && body
                .iter()
                .all(|l| l.trim().is_empty() || l.starts_with(fence.indent));
        let code = body
            .iter()
            .map(|l| {
                if strip {
                    l.strip_prefix(fence.indent).unwrap_or("")
                } else {
                    l
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        if end >= lines.len() {
            log::debug!("Unterminated code fence at line {}", index + 1);
        }

        blocks.push(Block::code(fence.info, code));
        // Skip the closing fence when present
        (end + 1).min(lines.len())
    }

    fn parse_quote(&self, lines: &[&str], index: usize, blocks: &mut Vec<Block>) -> usize {
        let mut content = Vec::new();
        let mut end = index;
        while end < lines.len() {
            let Some(rest) = lines[end].trim_start().strip_prefix('>') else {
                break;
            };
            content.push(strip_quote_markers(rest));
            end += 1;
        }

        let text = content.join("\n");
        let text = text.trim();
        match split_leading_emoji(text) {
            Some((emoji, rest)) => {
                let kind = CalloutKind::from_emoji(emoji);
                blocks.push(Block::callout(kind, emoji, format(rest.trim())));
            }
            None => blocks.push(Block::quote(format(text))),
        }
        end
    }

    fn table_blocks(&self, table: ResolvedTable) -> Vec<Block> {
        let header = table.headers.iter().map(|cell| format(cell)).collect();
        let rows = table
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| format(cell)).collect())
            .collect();

        Table::new(header, rows)
            .split_rows(self.options.max_table_rows.clamp(1, DEFAULT_MAX_TABLE_ROWS))
            .into_iter()
            .map(Block::Table)
            .collect()
    }

    fn push_paragraphs(&self, runs: Vec<TextRun>, blocks: &mut Vec<Block>) {
        let limit = self.options.max_paragraph_runs.max(1);
        if runs.len() <= limit {
            blocks.push(Block::paragraph(runs));
            return;
        }
        for chunk in runs.chunks(limit) {
            blocks.push(Block::paragraph(chunk.to_vec()));
        }
    }
}

/// Parse Markdown into blocks with default options.
pub fn parse_markdown(markdown: &str) -> Vec<Block> {
    MarkdownParser::new().parse(markdown)
}

/// Parse Markdown into blocks with custom options.
pub fn parse_markdown_with_options(markdown: &str, options: ParseOptions) -> Vec<Block> {
    MarkdownParser::with_options(options).parse(markdown)
}

fn open_fence(line: &str) -> Option<Fence<'_>> {
    let stripped = line.trim_start();
    let ticks = stripped.chars().take_while(|&c| c == '`').count();
    if ticks < 3 {
        return None;
    }
    let info = stripped[ticks..].trim();
    if info.contains('`') {
        return None;
    }
    Some(Fence {
        ticks,
        info,
        indent: &line[..line.len() - stripped.len()],
    })
}

/// Three or more of the same `-`, `_` or `*`, optionally space separated.
fn is_horizontal_rule(trimmed: &str) -> bool {
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let Some(first) = compact.chars().next() else {
        return false;
    };
    matches!(first, '-' | '_' | '*') && compact.len() >= 3 && compact.chars().all(|c| c == first)
}

/// Drop nested `>` markers and one separating space.
fn strip_quote_markers(rest: &str) -> &str {
    let mut rest = rest;
    loop {
        let trimmed = rest.strip_prefix(' ').unwrap_or(rest);
        match trimmed.strip_prefix('>') {
            Some(inner) => rest = inner,
            None => return trimmed,
        }
    }
}

/// Split a leading emoji (with its modifiers) off the text.
pub(crate) fn split_leading_emoji(text: &str) -> Option<(&str, &str)> {
    let mut chars = text.char_indices().peekable();
    let (_, first) = chars.next()?;
    if !is_emoji_start(first) {
        return None;
    }

    let mut end = first.len_utf8();
    while let Some(&(offset, c)) = chars.peek() {
        if c == VARIATION_SELECTOR || c == KEYCAP || ('\u{1F3FB}'..='\u{1F3FF}').contains(&c) {
            end = offset + c.len_utf8();
            chars.next();
        } else if c == ZERO_WIDTH_JOINER {
            chars.next();
            match chars.next() {
                Some((joined, next)) => end = joined + next.len_utf8(),
                None => end = offset + c.len_utf8(),
            }
        } else {
            break;
        }
    }

    Some((&text[..end], &text[end..]))
}

fn is_emoji_start(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2B00..=0x2BFF
            | 0x2300..=0x23FF
            | 0x2139
            | 0x203C
            | 0x2049
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{plain_text, Color};

    fn text_of(block: &Block) -> String {
        block.plain_text()
    }

    #[test]
    fn test_headings_clamp_and_strip() {
        let blocks = parse_markdown("# One\n## Two ##\n#### Four");
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
        assert_eq!(text_of(&blocks[1]), "Two");
        assert!(matches!(blocks[2], Block::Heading { level: 3, .. }));
    }

    #[test]
    fn test_hashtag_is_not_heading() {
        let blocks = parse_markdown("#hashtag");
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
    }

    #[test]
    fn test_fenced_code() {
        let blocks = parse_markdown("```python\nprint('hi')\n\nx = 1\n```\nafter");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Code { language, text } => {
                assert_eq!(language, "python");
                assert_eq!(text, "print('hi')\n\nx = 1");
            }
            other => panic!("expected code, got {:?}", other),
        }
    }

    #[test]
    fn test_longer_fence_contains_shorter() {
        let blocks = parse_markdown("````md\n```\ninner\n```\n````");
        assert_eq!(blocks.len(), 1);
        assert_eq!(text_of(&blocks[0]), "```\ninner\n```");
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let blocks = parse_markdown("```\nline one\nline two");
        assert_eq!(blocks.len(), 1);
        assert_eq!(text_of(&blocks[0]), "line one\nline two");
    }

    #[test]
    fn test_indented_fence_strips_indent() {
        let blocks = parse_markdown("  ```rust\n  fn main() {}\n    body\n  ```");
        assert_eq!(text_of(&blocks[0]), "fn main() {}\n  body");
    }

    #[test]
    fn test_unknown_language_is_plain_text() {
        let blocks = parse_markdown("```brainfudge\n+\n```");
        assert!(matches!(&blocks[0], Block::Code { language, .. } if language == "plain text"));
    }

    #[test]
    fn test_horizontal_rules() {
        for rule in ["---", "***", "___", "- - -", "* * * *"] {
            let blocks = parse_markdown(rule);
            assert_eq!(blocks, vec![Block::Divider], "rule {:?}", rule);
        }
        assert!(!is_horizontal_rule("-*-"));
        assert!(!is_horizontal_rule("--"));
    }

    #[test]
    fn test_quote_and_callout() {
        let blocks = parse_markdown("> plain quote\n> second line\n\n> ⚠️ Careful here");
        assert_eq!(blocks.len(), 2);
        assert_eq!(text_of(&blocks[0]), "plain quote\nsecond line");
        match &blocks[1] {
            Block::Callout { text, icon, color } => {
                assert_eq!(icon, "⚠️");
                assert_eq!(*color, Color::YellowBackground);
                assert_eq!(plain_text(text), "Careful here");
            }
            other => panic!("expected callout, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_emoji_callout_keeps_icon() {
        let blocks = parse_markdown("> 🚀 Launch");
        match &blocks[0] {
            Block::Callout { icon, color, .. } => {
                assert_eq!(icon, "🚀");
                assert_eq!(*color, Color::BlueBackground);
            }
            other => panic!("expected callout, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_quote_markers_flattened() {
        let blocks = parse_markdown("> > inner");
        assert_eq!(text_of(&blocks[0]), "inner");
    }

    #[test]
    fn test_image_line() {
        let blocks = parse_markdown("![A cat](https://example.com/cat.png)");
        assert_eq!(
            blocks[0],
            Block::image(
                "https://example.com/cat.png",
                vec![TextRun::plain("A cat")]
            )
        );
    }

    #[test]
    fn test_relative_image_degrades_to_text() {
        let blocks = parse_markdown("![logo](images/logo.png)");
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
        assert_eq!(text_of(&blocks[0]), "logo");
    }

    #[test]
    fn test_table_block() {
        let blocks = parse_markdown("| A | B |\n|---|---|\n| **1** | 2 |");
        match &blocks[0] {
            Block::Table(table) => {
                assert_eq!(table.width, 2);
                assert_eq!(table.data_rows.len(), 1);
                assert!(table.data_rows[0][0][0].annotations.bold);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_large_table_split() {
        let mut markdown = String::from("| n |\n|---|\n");
        for i in 0..150 {
            markdown.push_str(&format!("| {} |\n", i));
        }
        let blocks = parse_markdown(&markdown);
        assert_eq!(blocks.len(), 2);
        let rows: Vec<usize> = blocks
            .iter()
            .map(|b| match b {
                Block::Table(t) => t.data_rows.len(),
                _ => 0,
            })
            .collect();
        assert_eq!(rows, vec![99, 51]);

        let json = blocks[0].to_notion();
        assert_eq!(json["table"]["children"].as_array().map(Vec::len), Some(100));
    }

    #[test]
    fn test_table_rows_field_capped() {
        let mut markdown = String::from("| n |\n|---|\n");
        for i in 0..120 {
            markdown.push_str(&format!("| {} |\n", i));
        }
        let mut options = ParseOptions::new();
        options.max_table_rows = 500;
        let blocks = parse_markdown_with_options(&markdown, options);
        assert_eq!(blocks.len(), 2);
        for block in &blocks {
            let json = block.to_notion();
            let children = json["table"]["children"].as_array().map(Vec::len);
            assert!(children.unwrap_or(0) <= 100);
        }
    }

    #[test]
    fn test_pipe_prose_is_paragraph() {
        let blocks = parse_markdown("choose this | that");
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
    }

    #[test]
    fn test_arrow_line_is_verbatim() {
        let blocks = parse_markdown("Client -> Server_*main*");
        let text = blocks[0].text().unwrap();
        assert_eq!(text.len(), 1);
        assert_eq!(text[0].content, "Client -> Server_*main*");
        assert!(!text[0].annotations.has_styling());
    }

    #[test]
    fn test_arrow_line_drops_escapes() {
        let blocks = parse_markdown(r"Parser -> Block\_list");
        assert_eq!(text_of(&blocks[0]), "Parser -> Block_list");
    }

    #[test]
    fn test_empty_input_placeholder() {
        for input in ["", "   \n\n\t\n"] {
            let blocks = parse_markdown(input);
            assert_eq!(blocks.len(), 1);
            assert_eq!(text_of(&blocks[0]), "(Empty page)");
        }
    }

    #[test]
    fn test_long_paragraph_split_by_runs() {
        let markdown = (0..120).map(|i| format!("w{} **b{}** ", i, i)).collect::<String>();
        let blocks = parse_markdown(markdown.trim());
        assert!(blocks.len() >= 3);
        for block in &blocks {
            assert!(block.text().unwrap().len() <= 100);
        }
    }

    #[test]
    fn test_mixed_document() {
        let markdown = "# Title\n\nIntro with `code`.\n\n- a\n- b\n\n1. one\n2. two\n\n---\n\nEnd";
        let kinds: Vec<&str> = parse_markdown(markdown)
            .iter()
            .map(|b| b.type_name())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "heading_1",
                "paragraph",
                "bulleted_list_item",
                "bulleted_list_item",
                "numbered_list_item",
                "numbered_list_item",
                "divider",
                "paragraph"
            ]
        );
    }

    #[test]
    fn test_split_leading_emoji() {
        assert_eq!(split_leading_emoji("ℹ️ info"), Some(("ℹ️", " info")));
        assert_eq!(split_leading_emoji("👩‍💻 dev"), Some(("👩‍💻", " dev")));
        assert_eq!(split_leading_emoji("plain"), None);
        assert_eq!(split_leading_emoji("→ arrow"), None);
    }
}
