//! Markdown rendering for block sequences.
//!
//! The output is the same Markdown subset the block tokenizer reads, so
//! parsing the rendered text yields the blocks again.

use crate::model::{Annotations, Block, Table, TextRun, PLAIN_TEXT};

use super::escape::{code_fence, escape_heading, escape_line_start, escape_text, inline_code};
use super::{ConversionStats, RenderOptions, RenderResult};

/// Convert blocks to Markdown.
pub fn to_markdown(blocks: &[Block], options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(blocks)
}

/// Convert blocks to Markdown with statistics.
pub fn to_markdown_with_stats(blocks: &[Block], options: &RenderOptions) -> RenderResult {
    let mut options = options.clone();
    options.collect_stats = true;
    MarkdownRenderer::new(options).render_with_stats(blocks)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render blocks to Markdown.
    pub fn render(&self, blocks: &[Block]) -> String {
        let mut sections: Vec<String> = Vec::new();
        if let Some(title) = &self.options.title {
            sections.push(format!("# {}", escape_text(title.trim())));
        }

        let mut index = 0;
        while index < blocks.len() {
            let block = &blocks[index];
            if block.is_list_item() {
                // Same-kind siblings form one list
                let end = blocks[index..]
                    .iter()
                    .position(|b| std::mem::discriminant(b) != std::mem::discriminant(block))
                    .map_or(blocks.len(), |offset| index + offset);
                let mut lines = Vec::new();
                self.render_list(&blocks[index..end], 0, &mut lines);
                sections.push(lines.join("\n"));
                index = end;
                continue;
            }
            sections.push(self.render_block(block));
            index += 1;
        }

        sections.join("\n\n")
    }

    /// Render blocks to Markdown with conversion statistics.
    pub fn render_with_stats(&self, blocks: &[Block]) -> RenderResult {
        let content = self.render(blocks);
        let stats = if self.options.collect_stats {
            ConversionStats::from_blocks(blocks)
        } else {
            ConversionStats::default()
        };
        RenderResult::new(content, stats)
    }

    fn render_block(&self, block: &Block) -> String {
        match block {
            Block::Paragraph { text } => text_lines(text)
                .iter()
                .map(|line| escape_line_start(line))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Heading { level, text } => {
                let text = escape_heading(&text_lines(text).join(" "));
                format!("{} {}", "#".repeat(*level as usize), text)
            }
            Block::Quote { text } => quote_lines(None, text),
            Block::Callout { text, icon, .. } => quote_lines(Some(icon), text),
            Block::Code { language, text } => {
                let fence = code_fence(text);
                let language = if language == PLAIN_TEXT { "" } else { language };
                format!("{fence}{language}\n{text}\n{fence}")
            }
            Block::Image { url, caption } => {
                let caption: String = caption.iter().map(|run| escape_text(&run.content)).collect();
                format!("![{}]({})", caption.replace('\n', " "), url)
            }
            Block::Divider => "---".to_string(),
            Block::Table(table) => render_table(table),
            Block::BulletedListItem { .. } | Block::NumberedListItem { .. } | Block::ToDo { .. } => {
                let mut lines = Vec::new();
                self.render_list(std::slice::from_ref(block), 0, &mut lines);
                lines.join("\n")
            }
        }
    }

    fn render_list(&self, items: &[Block], depth: usize, lines: &mut Vec<String>) {
        let indent = " ".repeat(depth * self.options.indent_width);
        let mut number = 0;

        for item in items {
            let marker = match item {
                Block::NumberedListItem { .. } => {
                    number += 1;
                    format!("{}. ", number)
                }
                Block::ToDo { checked: true, .. } => format!("{} [x] ", self.options.list_marker),
                Block::ToDo { .. } => format!("{} [ ] ", self.options.list_marker),
                Block::BulletedListItem { .. } => format!("{} ", self.options.list_marker),
                other => {
                    // Non-list children render as indented text lines
                    for line in self.render_block(other).lines() {
                        lines.push(format!("{}{}", indent, line));
                    }
                    number = 0;
                    continue;
                }
            };

            let text = item.text().map(text_lines).unwrap_or_default();
            let mut text_iter = text.iter();
            let first = text_iter.next().map(String::as_str).unwrap_or("");
            lines.push(format!("{}{}{}", indent, marker, escape_line_start(first)));

            let continuation = " ".repeat((depth + 1) * self.options.indent_width);
            for line in text_iter {
                lines.push(format!("{}{}", continuation, escape_line_start(line)));
            }

            self.render_list(item.children(), depth + 1, lines);
        }
    }
}

/// Render runs to Markdown, one entry per text line.
fn text_lines(runs: &[TextRun]) -> Vec<String> {
    let mut lines: Vec<Vec<Piece>> = vec![Vec::new()];
    for run in runs {
        for (i, segment) in run.content.split('\n').enumerate() {
            if i > 0 {
                lines.push(Vec::new());
            }
            if let Some(line) = lines.last_mut() {
                push_pieces(segment, run, line);
            }
        }
    }
    lines.iter().map(|pieces| render_line(pieces)).collect()
}

/// Emphasis markers that can span several runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Strikethrough,
    Bold,
    Italic,
}

impl Mark {
    const ALL: [Mark; 3] = [Mark::Strikethrough, Mark::Bold, Mark::Italic];

    fn applies(self, style: &Annotations) -> bool {
        match self {
            Mark::Strikethrough => style.strikethrough,
            Mark::Bold => style.bold,
            Mark::Italic => style.italic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open(Mark),
    Close(Mark),
    Text(String),
}

/// A rendered piece of one line. Blank pieces hold only whitespace and never
/// open a marker.
#[derive(Debug)]
struct Piece {
    body: String,
    style: Annotations,
    blank: bool,
}

fn push_pieces(segment: &str, run: &TextRun, line: &mut Vec<Piece>) {
    let core = segment.trim();
    let blank = |text: &str| Piece {
        body: text.to_string(),
        style: run.annotations,
        blank: true,
    };
    if core.is_empty() {
        if !segment.is_empty() {
            line.push(blank(segment));
        }
        return;
    }

    let lead = &segment[..segment.len() - segment.trim_start().len()];
    let trail = &segment[segment.trim_end().len()..];
    if !lead.is_empty() {
        line.push(blank(lead));
    }

    let mut body = if run.annotations.code {
        inline_code(core)
    } else {
        escape_text(core)
    };
    if let Some(url) = &run.link {
        body = format!("[{}]({})", body, url);
    }
    line.push(Piece {
        body,
        style: run.annotations,
        blank: false,
    });

    if !trail.is_empty() {
        line.push(blank(trail));
    }
}

/// Emit one line, opening and closing markers only where the style changes.
fn render_line(pieces: &[Piece]) -> String {
    let mut tokens = Vec::new();
    let mut open: Vec<Mark> = Vec::new();

    for (index, piece) in pieces.iter().enumerate() {
        let wanted: Vec<Mark> = if piece.blank {
            // Whitespace stays inside a marker only when the text after it
            // carries the same marker
            let next = pieces[index + 1..].iter().find(|p| !p.blank);
            open.iter()
                .copied()
                .filter(|mark| {
                    mark.applies(&piece.style) && next.is_some_and(|p| mark.applies(&p.style))
                })
                .collect()
        } else {
            Mark::ALL
                .into_iter()
                .filter(|mark| mark.applies(&piece.style))
                .collect()
        };

        if let Some(first_stale) = open.iter().position(|mark| !wanted.contains(mark)) {
            for mark in open.drain(first_stale..).rev() {
                tokens.push(Token::Close(mark));
            }
        }

        let mut opening: Vec<Mark> = wanted
            .into_iter()
            .filter(|mark| !open.contains(mark))
            .collect();
        // Longer spans open first so they enclose the shorter ones
        opening.sort_by_key(|mark| std::cmp::Reverse(span_reach(&pieces[index..], *mark)));
        for mark in opening {
            tokens.push(Token::Open(mark));
            open.push(mark);
        }

        tokens.push(Token::Text(piece.body.clone()));
    }
    for mark in open.drain(..).rev() {
        tokens.push(Token::Close(mark));
    }

    write_tokens(&tokens)
}

/// Number of leading pieces that carry `mark`.
fn span_reach(pieces: &[Piece], mark: Mark) -> usize {
    pieces
        .iter()
        .take_while(|piece| mark.applies(&piece.style))
        .count()
}

fn write_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut italic = "*";
    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Open(Mark::Italic) => {
                italic = italic_marker(tokens, index);
                out.push_str(italic);
            }
            Token::Close(Mark::Italic) => out.push_str(italic),
            Token::Open(Mark::Bold) | Token::Close(Mark::Bold) => out.push_str("**"),
            Token::Open(Mark::Strikethrough) | Token::Close(Mark::Strikethrough) => {
                out.push_str("~~")
            }
        }
    }
    out
}

/// Pick `_` for an italic span touching or enclosing bold markers, so the
/// asterisks never merge, unless underscores would sit against a word.
fn italic_marker(tokens: &[Token], open: usize) -> &'static str {
    let close = tokens[open..]
        .iter()
        .position(|token| *token == Token::Close(Mark::Italic))
        .map_or(tokens.len(), |offset| open + offset);

    let is_bold = |index: Option<usize>| {
        index
            .and_then(|i| tokens.get(i))
            .is_some_and(|token| matches!(token, Token::Open(Mark::Bold) | Token::Close(Mark::Bold)))
    };
    let near_bold = is_bold(open.checked_sub(1))
        || is_bold(close.checked_add(1))
        || (open + 1..close).any(|i| is_bold(Some(i)));

    let word_before = open
        .checked_sub(1)
        .and_then(|i| tokens.get(i))
        .is_some_and(|token| {
            matches!(token, Token::Text(text) if text.chars().next_back().is_some_and(char::is_alphanumeric))
        });
    let word_after = tokens.get(close + 1).is_some_and(|token| {
        matches!(token, Token::Text(text) if text.chars().next().is_some_and(char::is_alphanumeric))
    });

    if near_bold && !word_before && !word_after {
        "_"
    } else {
        "*"
    }
}

fn quote_lines(icon: Option<&String>, text: &[TextRun]) -> String {
    let mut lines: Vec<String> = text_lines(text)
        .iter()
        .map(|line| escape_line_start(line))
        .collect();
    if let Some(icon) = icon {
        match lines.first_mut() {
            Some(first) if !first.is_empty() => *first = format!("{} {}", icon, first),
            Some(first) => *first = icon.clone(),
            None => lines.push(icon.clone()),
        }
    }
    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_table(table: &Table) -> String {
    let row = |cells: &[Vec<TextRun>]| {
        let cells: Vec<String> = cells
            .iter()
            .map(|cell| text_lines(cell).join(" "))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = Vec::with_capacity(table.data_rows.len() + 2);
    lines.push(row(&table.header_row));
    lines.push(format!("|{}", " --- |".repeat(table.width)));
    lines.extend(table.data_rows.iter().map(|cells| row(cells)));
    lines.join("\n")
}
