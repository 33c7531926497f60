//! Inline formatting: Markdown emphasis, code and links into rich text runs.
//!
//! Every pattern is matched independently over the immutable input. Candidate
//! spans are sorted by start offset (ties go to the higher-priority pattern)
//! and a span that intersects an already accepted one is dropped. Code, link
//! and escape spans are terminal; emphasis spans are formatted recursively so
//! annotations nest.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

use crate::model::{merge_adjacent, split_long_runs, Annotations, TextRun};

/// Pattern kinds in priority order, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SpanKind {
    Escape,
    Code,
    Bold,
    Strikethrough,
    Italic,
    Link,
}

static ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([\\`*_\[\]{}()#+\-.!|~>])").expect("valid escape pattern"));
static CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"``(.+?)``|`([^`]+)`").expect("valid code pattern"));
// Emphasis bodies step over backslash escapes so an escaped delimiter
// never closes a span
static BOLD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*((?:\\.|[^\\\n])+?)\*\*|__((?:\\.|[^\\\n])+?)__")
        .expect("valid bold pattern")
});
static STRIKETHROUGH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"~~((?:\\.|[^\\\n])+?)~~").expect("valid strikethrough pattern")
});
static ITALIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*((?:\\.|[^*\\])+)\*|_((?:\\.|[^_\\])+)_").expect("valid italic pattern")
});
static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"!?\[((?:\\.|[^\[\]\\])*)\]\(((?:[^()\s]|\([^()\s]*\))+)(?:\s+"[^"]*")?\)"#)
        .expect("valid link pattern")
});

fn matchers() -> [(SpanKind, &'static Regex); 6] {
    [
        (SpanKind::Escape, &*ESCAPE),
        (SpanKind::Code, &*CODE),
        (SpanKind::Bold, &*BOLD),
        (SpanKind::Strikethrough, &*STRIKETHROUGH),
        (SpanKind::Italic, &*ITALIC),
        (SpanKind::Link, &*LINK),
    ]
}

#[derive(Debug, Clone)]
struct Span {
    kind: SpanKind,
    start: usize,
    end: usize,
    inner: String,
    url: Option<String>,
}

/// Format one run of Markdown text into styled runs.
///
/// The result is never empty; blank input yields a single empty run.
pub fn format(text: &str) -> Vec<TextRun> {
    if text.trim().is_empty() {
        return vec![TextRun::plain("")];
    }

    let runs: Vec<TextRun> = format_with(text, Annotations::default())
        .into_iter()
        .filter(|run| !run.is_empty())
        .collect();
    let runs = split_long_runs(merge_adjacent(runs));

    if runs.is_empty() {
        vec![TextRun::plain("")]
    } else {
        runs
    }
}

/// Keep text as-is in unstyled runs, only splitting at the length ceiling.
pub fn format_verbatim(text: &str) -> Vec<TextRun> {
    split_long_runs(vec![TextRun::plain(text)])
}

fn format_with(text: &str, annotations: Annotations) -> Vec<TextRun> {
    let spans = resolve_overlaps(collect_spans(text));
    let mut runs = Vec::new();
    let mut cursor = 0;

    for span in spans {
        if span.start > cursor {
            runs.push(TextRun::styled(&text[cursor..span.start], annotations));
        }
        match span.kind {
            SpanKind::Escape => runs.push(TextRun::styled(span.inner, annotations)),
            SpanKind::Code => runs.push(TextRun::styled(
                span.inner,
                annotations.merge(Annotations::code()),
            )),
            SpanKind::Bold => {
                runs.extend(format_with(&span.inner, annotations.merge(Annotations::bold())))
            }
            SpanKind::Strikethrough => runs.extend(format_with(
                &span.inner,
                annotations.merge(Annotations::strikethrough()),
            )),
            SpanKind::Italic => runs.extend(format_with(
                &span.inner,
                annotations.merge(Annotations::italic()),
            )),
            SpanKind::Link => {
                let url = span.url.as_deref().and_then(normalize_link);
                let content = if span.inner.is_empty() {
                    span.url.clone().unwrap_or_default()
                } else {
                    span.inner
                };
                runs.push(TextRun {
                    content,
                    annotations,
                    link: url,
                });
            }
        }
        cursor = span.end;
    }

    if cursor < text.len() {
        runs.push(TextRun::styled(&text[cursor..], annotations));
    }
    runs
}

/// Collect candidate spans of every pattern, overlapping candidates included.
fn collect_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();

    for (kind, regex) in matchers() {
        let mut pos = 0;
        while pos < text.len() {
            let Some(caps) = regex.captures_at(text, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            if let Some(span) = build_span(kind, text, &caps) {
                spans.push(span);
            }
            pos = next_char_boundary(text, whole.start());
        }
    }

    spans.sort_by_key(|span| (span.start, span.kind));
    spans
}

/// Keep the earliest-starting span of every overlapping group.
fn resolve_overlaps(spans: Vec<Span>) -> Vec<Span> {
    let mut accepted: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        let free = accepted.last().map_or(true, |last| span.start >= last.end);
        if free {
            accepted.push(span);
        }
    }
    accepted
}

fn build_span(kind: SpanKind, text: &str, caps: &Captures<'_>) -> Option<Span> {
    let whole = caps.get(0)?;
    let (start, end) = (whole.start(), whole.end());
    let group = |i: usize| caps.get(i).map(|m| m.as_str());

    let (inner, url) = match kind {
        SpanKind::Escape => (group(1)?.to_string(), None),
        SpanKind::Code => match group(1) {
            Some(padded) => (strip_code_padding(padded).to_string(), None),
            None => (group(2)?.to_string(), None),
        },
        SpanKind::Bold | SpanKind::Italic => match group(1) {
            Some(inner) => (inner.to_string(), None),
            None => {
                // Underscore delimiters only count outside of words
                if touches_word(text, start, end) {
                    return None;
                }
                (group(2)?.to_string(), None)
            }
        },
        SpanKind::Strikethrough => (group(1)?.to_string(), None),
        SpanKind::Link => (unescape(group(1)?), Some(group(2)?.to_string())),
    };

    Some(Span {
        kind,
        start,
        end,
        inner,
        url,
    })
}

fn strip_code_padding(code: &str) -> &str {
    if code.len() > 2 && code.starts_with(' ') && code.ends_with(' ') {
        &code[1..code.len() - 1]
    } else {
        code
    }
}

fn touches_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric)
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len(), |c| from + c.len_utf8())
}

/// Remove Markdown backslash escapes.
pub fn unescape(text: &str) -> String {
    ESCAPE.replace_all(text, "$1").into_owned()
}

/// Validate a link target.
///
/// Absolute http(s) URLs pass unchanged, protocol-relative URLs are upgraded
/// to https, anything else is rejected.
pub fn normalize_link(url: &str) -> Option<String> {
    let url = url.trim();
    let candidate = if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    };

    let parsed = Url::parse(&candidate).ok()?;
    let web = matches!(parsed.scheme(), "http" | "https");
    if web && parsed.host_str().is_some() {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(runs: &[TextRun]) -> Vec<&str> {
        runs.iter().map(|r| r.content.as_str()).collect()
    }

    #[test]
    fn test_plain_text_single_run() {
        for text in ["Hello world", "Numbers 123 and punctuation, ok?", "日本語のテキスト"] {
            let runs = format(text);
            assert_eq!(runs.len(), 1);
            assert_eq!(runs[0].content, text);
            assert!(!runs[0].annotations.has_styling());
            assert!(runs[0].link.is_none());
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format(""), vec![TextRun::plain("")]);
        assert_eq!(format("   "), vec![TextRun::plain("")]);
    }

    #[test]
    fn test_bold_and_italic() {
        let runs = format("a **bold** and *italic* end");
        assert_eq!(contents(&runs), vec!["a ", "bold", " and ", "italic", " end"]);
        assert!(runs[1].annotations.bold);
        assert!(runs[3].annotations.italic);
        assert!(!runs[3].annotations.bold);
    }

    #[test]
    fn test_nested_emphasis_merges() {
        let runs = format("**bold _both_ bold**");
        assert_eq!(contents(&runs), vec!["bold ", "both", " bold"]);
        assert!(runs[1].annotations.bold);
        assert!(runs[1].annotations.italic);
    }

    #[test]
    fn test_italic_after_bold() {
        let runs = format("**a** *b*");
        assert_eq!(contents(&runs), vec!["a", " ", "b"]);
        assert!(runs[0].annotations.bold);
        assert!(runs[2].annotations.italic);
    }

    #[test]
    fn test_code_is_terminal() {
        let runs = format("use `**not bold**` here");
        assert_eq!(runs[1].content, "**not bold**");
        assert!(runs[1].annotations.code);
        assert!(!runs[1].annotations.bold);
    }

    #[test]
    fn test_double_backtick_code() {
        let runs = format("``a `tick` b``");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].content, "a `tick` b");
        assert!(runs[0].annotations.code);
    }

    #[test]
    fn test_strikethrough() {
        let runs = format("~~gone~~");
        assert_eq!(runs.len(), 1);
        assert!(runs[0].annotations.strikethrough);
    }

    #[test]
    fn test_link() {
        let runs = format("see [the docs](https://example.com/a_(b)) now");
        assert_eq!(runs[1].content, "the docs");
        assert_eq!(runs[1].link.as_deref(), Some("https://example.com/a_(b)"));
    }

    #[test]
    fn test_bold_link_inherits() {
        let runs = format("**[x](https://example.com)**");
        assert_eq!(runs.len(), 1);
        assert!(runs[0].annotations.bold);
        assert_eq!(runs[0].link.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_protocol_relative_link_upgraded() {
        let runs = format("[cdn](//cdn.example.com/x.js)");
        assert_eq!(runs[0].link.as_deref(), Some("https://cdn.example.com/x.js"));
    }

    #[test]
    fn test_relative_link_degrades_to_text() {
        let runs = format("go [home](/index.html) now");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].content, "go home now");
        assert!(runs[0].link.is_none());

        let runs = format("[mail](mailto:a@b.c)");
        assert!(runs[0].link.is_none());
    }

    #[test]
    fn test_escapes_are_literal() {
        let runs = format(r"5 \* 3 \* 2 and \_x\_");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].content, "5 * 3 * 2 and _x_");
    }

    #[test]
    fn test_snake_case_not_italic() {
        let runs = format("call my_func_name now");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].content, "call my_func_name now");
    }

    #[test]
    fn test_underscore_italic() {
        let runs = format("an _emphasised_ word");
        assert_eq!(runs[1].content, "emphasised");
        assert!(runs[1].annotations.italic);
    }

    #[test]
    fn test_earlier_span_wins_overlap() {
        // The code span starts first and swallows the bold opener
        let runs = format("`a**b` c**");
        assert_eq!(runs[0].content, "a**b");
        assert!(runs[0].annotations.code);
        assert_eq!(runs[1].content, " c**");
    }

    #[test]
    fn test_long_runs_split() {
        let text = format!("**{}**", "x".repeat(4100));
        let runs = format(&text);
        assert_eq!(runs.len(), 3);
        assert!(runs.iter().all(|r| r.annotations.bold));
        assert!(runs.iter().all(|r| r.content.len() <= 2000));
    }

    #[test]
    fn test_normalize_link() {
        assert_eq!(
            normalize_link("https://example.com"),
            Some("https://example.com".to_string())
        );
        assert_eq!(normalize_link("ftp://example.com"), None);
        assert_eq!(normalize_link("relative/path"), None);
        assert_eq!(normalize_link("http://"), None);
    }
}
