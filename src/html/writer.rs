//! Markdown generation from the element tree.

use super::table::{resolve_span_grid, SpanCell};
use super::tree::{Element, HtmlNode};
use super::HtmlOptions;
use crate::model::CalloutKind;
use crate::parser::normalize_link;
use crate::render::{code_fence, escape_heading, escape_line_start, escape_text, inline_code};

/// Elements rendered inside the surrounding paragraph.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em", "font",
    "i", "img", "input", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span",
    "strike", "strong", "sub", "sup", "time", "tt", "u", "var", "wbr",
];

/// Elements with no text worth keeping.
const SKIPPED_TAGS: &[&str] = &[
    "head", "title", "meta", "link", "base", "button", "select", "textarea", "object", "embed",
    "canvas", "audio", "video", "map", "colgroup",
];

const PANEL_ATTR: &str = "data-panel-type";

/// Emphasis state of the inline content being written.
#[derive(Debug, Clone, Copy, Default)]
struct Inline {
    strong: bool,
    em: bool,
    link: bool,
}

/// Writes the Markdown subset the block tokenizer reads.
pub(crate) struct MarkdownWriter<'a> {
    options: &'a HtmlOptions,
}

impl<'a> MarkdownWriter<'a> {
    pub(crate) fn new(options: &'a HtmlOptions) -> Self {
        Self { options }
    }

    /// Render the document body (or the whole tree without one).
    pub(crate) fn write(&self, root: &Element) -> String {
        let body = root.find("body").unwrap_or(root);
        let mut out = Vec::new();
        self.blocks(&body.children, false, &mut out);
        out.join("\n\n")
    }

    fn blocks(&self, nodes: &[HtmlNode], in_quote: bool, out: &mut Vec<String>) {
        let mut paragraph = String::new();
        for node in nodes {
            match node {
                HtmlNode::Text(text) => self.text(text, &mut paragraph),
                HtmlNode::Element(el) if is_inline(el) => {
                    self.inline(el, Inline::default(), &mut paragraph)
                }
                HtmlNode::Element(el) => {
                    flush_paragraph(&mut paragraph, out);
                    self.block(el, in_quote, out);
                }
            }
        }
        flush_paragraph(&mut paragraph, out);
    }

    fn block(&self, el: &Element, in_quote: bool, out: &mut Vec<String>) {
        if el.attr(PANEL_ATTR).is_some() {
            self.quote(el, in_quote, out);
            return;
        }

        match el.tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = el.tag[1..].parse::<usize>().unwrap_or(1);
                let text = single_line(&self.inline_text(el));
                if !text.is_empty() {
                    out.push(format!("{} {}", "#".repeat(level), escape_heading(&text)));
                }
            }
            "hr" => out.push("---".to_string()),
            "pre" => out.push(self.code_block(el)),
            "blockquote" => self.quote(el, in_quote, out),
            "ul" | "ol" => {
                let mut lines = Vec::new();
                self.list(el, 0, &mut lines);
                if !lines.is_empty() {
                    out.push(lines.join("\n"));
                }
            }
            "table" => self.table(el, out),
            tag if SKIPPED_TAGS.contains(&tag) => {}
            _ => self.blocks(&el.children, in_quote, out),
        }
    }

    fn text(&self, raw: &str, out: &mut String) {
        let collapsed = collapse_whitespace(raw);
        let collapsed = if ends_with_space(out) {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        out.push_str(&escape_text(collapsed));
    }

    fn inline(&self, el: &Element, ctx: Inline, out: &mut String) {
        match el.tag.as_str() {
            "br" => out.push('\n'),
            "input" => {}
            "strong" | "b" => {
                let marker = if ctx.em && !ends_with_word(out) { "__" } else { "**" };
                self.emphasis(el, marker, Inline { strong: true, ..ctx }, out);
            }
            "em" | "i" => {
                let marker = if ctx.strong && !ends_with_word(out) { "_" } else { "*" };
                self.emphasis(el, marker, Inline { em: true, ..ctx }, out);
            }
            "s" | "del" | "strike" => self.emphasis(el, "~~", ctx, out),
            "code" | "kbd" | "samp" | "tt" => {
                let code = collapse_whitespace(&el.text_content());
                if ctx.link {
                    out.push_str(&escape_text(&code));
                } else {
                    out.push_str(&inline_code(&code));
                }
            }
            "a" => self.link(el, ctx, out),
            "img" => self.image(el, ctx, out),
            tag if SKIPPED_TAGS.contains(&tag) => {}
            tag if !INLINE_TAGS.contains(&tag) => {
                out.push('\n');
                self.inline_children(el, ctx, out);
                out.push('\n');
            }
            _ => self.inline_children(el, ctx, out),
        }
    }

    fn inline_children(&self, el: &Element, ctx: Inline, out: &mut String) {
        for child in &el.children {
            match child {
                HtmlNode::Text(text) => self.text(text, out),
                HtmlNode::Element(child) => self.inline(child, ctx, out),
            }
        }
    }

    fn inline_text(&self, el: &Element) -> String {
        let mut text = String::new();
        self.inline_children(el, Inline::default(), &mut text);
        text
    }

    fn emphasis(&self, el: &Element, marker: &str, ctx: Inline, out: &mut String) {
        let mut inner = String::new();
        self.inline_children(el, ctx, &mut inner);

        // Markers cannot span lines or wrap link text
        let trimmed = inner.trim();
        if trimmed.is_empty() || ctx.link || inner.contains('\n') {
            out.push_str(&inner);
            return;
        }

        let lead = &inner[..inner.len() - inner.trim_start().len()];
        let trail = &inner[inner.trim_end().len()..];
        if !ends_with_space(out) {
            out.push_str(lead);
        }
        out.push_str(marker);
        out.push_str(trimmed);
        out.push_str(marker);
        out.push_str(trail);
    }

    fn link(&self, el: &Element, ctx: Inline, out: &mut String) {
        let mut text = String::new();
        self.inline_children(el, Inline { link: true, ..ctx }, &mut text);
        let text = single_line(&text);

        match el.attr("href").and_then(|href| self.resolve_url(href)) {
            Some(url) if !text.is_empty() => {
                out.push_str(&format!("[{}]({})", text, url));
            }
            _ => out.push_str(&text),
        }
    }

    fn image(&self, el: &Element, ctx: Inline, out: &mut String) {
        let alt = collapse_whitespace(el.attr("alt").unwrap_or(""));
        let alt = escape_text(alt.trim());
        if ctx.link {
            out.push_str(&alt);
            return;
        }
        match el.attr("src").and_then(|src| self.resolve_url(src)) {
            Some(url) => out.push_str(&format!("\n![{}]({})\n", alt, url)),
            None => out.push_str(&alt),
        }
    }

    /// Absolute web URL for a link target, resolving against the base URL.
    fn resolve_url(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        let url = normalize_link(href).or_else(|| {
            let base = self.options.base_url.as_ref()?;
            let joined = base.join(href).ok()?;
            normalize_link(joined.as_str())
        })?;
        Some(url.replace('(', "%28").replace(')', "%29"))
    }

    fn code_block(&self, el: &Element) -> String {
        let text = el.text_content();
        let text = text.strip_prefix('\n').unwrap_or(&text).trim_end();
        let fence = code_fence(text);
        let language = code_language(el).unwrap_or_default();
        format!("{fence}{language}\n{text}\n{fence}")
    }

    fn quote(&self, el: &Element, in_quote: bool, out: &mut Vec<String>) {
        // Nested quotes and panels flatten into the outermost one
        if in_quote {
            self.blocks(&el.children, true, out);
            return;
        }

        let mut inner = Vec::new();
        self.blocks(&el.children, true, &mut inner);
        let joined = inner.join("\n");
        let lines: Vec<&str> = joined
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();

        let quoted: Vec<String> = match innermost_panel(el) {
            Some(kind) => {
                let first = lines.first().copied().unwrap_or("");
                let head = format!("> {} {}", kind.emoji(), first);
                std::iter::once(head.trim_end().to_string())
                    .chain(lines.iter().skip(1).map(|line| format!("> {}", line)))
                    .collect()
            }
            None if lines.is_empty() => return,
            None => lines.iter().map(|line| format!("> {}", line)).collect(),
        };
        out.push(quoted.join("\n"));
    }

    fn list(&self, el: &Element, depth: usize, lines: &mut Vec<String>) {
        let ordered = el.is("ol");
        let mut number = el
            .attr("start")
            .and_then(|start| start.trim().parse::<u64>().ok())
            .unwrap_or(1);
        let indent = "  ".repeat(depth);

        for item in el.child_elements() {
            if is_list(item) {
                self.list(item, depth + 1, lines);
                continue;
            }
            if !item.is("li") {
                continue;
            }

            let mut text = String::new();
            let mut nested = Vec::new();
            self.collect_item(&item.children, &mut text, &mut nested);
            let text = single_line(&text);

            let marker = match item_checkbox(item) {
                Some(true) => "- [x] ".to_string(),
                Some(false) => "- [ ] ".to_string(),
                None if ordered => format!("{}. ", number),
                None => "- ".to_string(),
            };
            number += 1;

            lines.push(format!("{}{}{}", indent, marker, escape_line_start(&text)));
            for list in nested {
                self.list(list, depth + 1, lines);
            }
        }
    }

    /// Gather an item's own text and the lists nested inside it.
    fn collect_item<'e>(
        &self,
        nodes: &'e [HtmlNode],
        text: &mut String,
        nested: &mut Vec<&'e Element>,
    ) {
        for node in nodes {
            match node {
                HtmlNode::Text(raw) => self.text(raw, text),
                HtmlNode::Element(el) if is_list(el) => nested.push(el),
                HtmlNode::Element(el) if el.is("pre") => {
                    text.push(' ');
                    text.push_str(&inline_code(&collapse_whitespace(&el.text_content())));
                }
                HtmlNode::Element(el) if is_inline(el) => {
                    self.inline(el, Inline::default(), text)
                }
                HtmlNode::Element(el) => {
                    text.push(' ');
                    self.collect_item(&el.children, text, nested);
                    text.push(' ');
                }
            }
        }
    }

    fn table(&self, el: &Element, out: &mut Vec<String>) {
        if let Some(caption) = el.child_elements().find(|c| c.is("caption")) {
            let text = single_line(&self.inline_text(caption));
            if !text.is_empty() {
                out.push(escape_line_start(&text));
            }
        }

        let mut rows = Vec::new();
        self.collect_rows(el, &mut rows);
        let grid = resolve_span_grid(&rows, self.options.span_fill);
        let Some(header) = grid.first() else {
            return;
        };

        let mut lines = Vec::with_capacity(grid.len() + 1);
        lines.push(table_row(header));
        lines.push(table_row(&vec!["---".to_string(); header.len()]));
        lines.extend(grid.iter().skip(1).map(|row| table_row(row)));
        out.push(lines.join("\n"));
    }

    fn collect_rows(&self, el: &Element, rows: &mut Vec<Vec<SpanCell>>) {
        for child in el.child_elements() {
            match child.tag.as_str() {
                "thead" | "tbody" | "tfoot" => self.collect_rows(child, rows),
                "tr" => {
                    let cells = child
                        .child_elements()
                        .filter(|cell| cell.is("td") || cell.is("th"))
                        .map(|cell| {
                            SpanCell::spanning(
                                single_line(&self.inline_text(cell)),
                                span_attr(cell, "colspan"),
                                span_attr(cell, "rowspan"),
                            )
                        })
                        .collect();
                    rows.push(cells);
                }
                _ => {}
            }
        }
    }
}

fn is_inline(el: &Element) -> bool {
    INLINE_TAGS.contains(&el.tag.as_str()) && el.attr(PANEL_ATTR).is_none()
}

fn is_list(el: &Element) -> bool {
    el.is("ul") || el.is("ol")
}

fn is_checkbox(el: &Element) -> bool {
    el.is("input")
        && el
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
}

/// Task state of a list item, ignoring checkboxes of nested lists.
fn item_checkbox(item: &Element) -> Option<bool> {
    item.child_elements()
        .filter(|child| !is_list(child))
        .find_map(|child| {
            if is_checkbox(child) {
                Some(child)
            } else {
                child.find_by(&is_checkbox)
            }
        })
        .map(|checkbox| checkbox.attr("checked").is_some())
}

/// Panel kind of the innermost panel in the chain starting at `el`.
fn innermost_panel(el: &Element) -> Option<CalloutKind> {
    let has_panel = |e: &Element| e.attr(PANEL_ATTR).is_some();
    let mut panel = if has_panel(el) { Some(el) } else { None };
    let mut cursor = el;
    while let Some(inner) = cursor.find_by(&has_panel) {
        panel = Some(inner);
        cursor = inner;
    }
    panel
        .and_then(|p| p.attr(PANEL_ATTR))
        .map(|kind| CalloutKind::from_panel_type(kind).unwrap_or_default())
}

fn code_language(pre: &Element) -> Option<String> {
    let code = pre.find("code");
    [Some(pre), code].into_iter().flatten().find_map(|el| {
        el.attr("data-language")
            .or_else(|| el.attr("data-lang"))
            .map(str::to_string)
            .or_else(|| {
                el.classes().find_map(|class| {
                    class
                        .strip_prefix("language-")
                        .or_else(|| class.strip_prefix("lang-"))
                        .map(str::to_string)
                })
            })
            .filter(|lang| !lang.trim().is_empty() && !lang.contains('`'))
    })
}

fn span_attr(cell: &Element, name: &str) -> usize {
    cell.attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(1)
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn flush_paragraph(paragraph: &mut String, out: &mut Vec<String>) {
    let text = std::mem::take(paragraph);
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(escape_line_start)
        .collect();
    if !lines.is_empty() {
        out.push(lines.join("\n"));
    }
}

/// Collapse every whitespace run into a single space.
fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
            }
            in_space = true;
        } else {
            collapsed.push(c);
            in_space = false;
        }
    }
    collapsed
}

/// Join the non-empty lines of `text` with spaces.
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn ends_with_space(text: &str) -> bool {
    text.ends_with([' ', '\n'])
}

fn ends_with_word(text: &str) -> bool {
    text.chars().next_back().is_some_and(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::tree::parse_html;

    fn write(html: &str) -> String {
        let options = HtmlOptions::default();
        MarkdownWriter::new(&options).write(&parse_html(html))
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
    }

    #[test]
    fn test_emphasis_spacing() {
        assert_eq!(write("<p>a<strong> bold </strong>b</p>"), "a **bold** b");
    }

    #[test]
    fn test_nested_emphasis_markers() {
        assert_eq!(write("<p><strong><em>both</em></strong></p>"), "**_both_**");
        assert_eq!(write("<p><em><b>both</b></em></p>"), "*__both__*");
    }

    #[test]
    fn test_paragraph_line_start_escaped() {
        assert_eq!(write("<p># not heading</p>"), r"\# not heading");
        assert_eq!(write("<p>1. not a list</p>"), r"1\. not a list");
    }

    #[test]
    fn test_link_drops_inner_formatting() {
        assert_eq!(
            write("<p><a href='https://x.io'><b>bold</b> link</a></p>"),
            "[bold link](https://x.io)"
        );
    }

    #[test]
    fn test_checkbox_items() {
        let html = "<ul><li><input type='checkbox' checked> done</li><li><input type='checkbox'> open</li></ul>";
        assert_eq!(write(html), "- [x] done\n- [ ] open");
    }

    #[test]
    fn test_list_item_paragraphs() {
        let html = "<ol start='3'><li><p>three</p><ul><li>inner</li></ul></li><li>four</li></ol>";
        assert_eq!(write(html), "3. three\n  - inner\n4. four");
    }

    #[test]
    fn test_innermost_panel_wins() {
        let html = "<blockquote data-panel-type='info'><blockquote data-panel-type='warning'>Careful</blockquote></blockquote>";
        assert_eq!(write(html), "> ⚠️ Careful");
    }

    #[test]
    fn test_code_language_sources() {
        assert_eq!(
            write("<pre><code class='language-rust'>fn x() {}</code></pre>"),
            "```rust\nfn x() {}\n```"
        );
        assert_eq!(
            write("<pre data-language='go'>x := 1</pre>"),
            "```go\nx := 1\n```"
        );
    }
}
