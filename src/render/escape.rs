//! Markdown escaping shared by the HTML writer and the block serializer.

use once_cell::sync::Lazy;
use regex::Regex;

static ORDERED_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]").expect("valid ordered prefix pattern"));

/// Characters with inline meaning.
const INLINE_SPECIAL: &[char] = &['\\', '`', '*', '_', '[', ']', '~', '|'];

/// Characters that start a block construct at the beginning of a line.
const LINE_START_SPECIAL: &[char] = &['#', '>', '-', '+'];

/// Backslash-escape characters that would otherwise start inline markup.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if INLINE_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape a line so it cannot open a heading, quote, list or rule.
pub fn escape_line_start(line: &str) -> String {
    if line.starts_with(LINE_START_SPECIAL) {
        return format!("\\{}", line);
    }
    if let Some(m) = ORDERED_PREFIX.find(line) {
        let split = m.end() - 1;
        return format!("{}\\{}", &line[..split], &line[split..]);
    }
    line.to_string()
}

/// Escape a trailing `#` so heading text is not cut as a closing sequence.
pub fn escape_heading(text: &str) -> String {
    match text.strip_suffix('#') {
        Some(rest) => format!("{}\\#", rest),
        None => text.to_string(),
    }
}

/// Longest run of consecutive backticks.
pub fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Wrap text in an inline code span.
///
/// Text containing a double backtick cannot be expressed as a span and is
/// returned as escaped plain text instead.
pub fn inline_code(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }
    match longest_backtick_run(code) {
        0 => format!("`{}`", code),
        1 => format!("`` {} ``", code),
        _ => escape_text(code),
    }
}

/// Fence for a code block, longer than any backtick run inside it.
pub fn code_fence(code: &str) -> String {
    "`".repeat((longest_backtick_run(code) + 1).max(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_heading() {
        assert_eq!(escape_heading("C #"), r"C \#");
        assert_eq!(escape_heading("Issue ##"), r"Issue #\#");
        assert_eq!(escape_heading("C# basics"), "C# basics");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a*b_c"), r"a\*b\_c");
        assert_eq!(escape_text("[x] | y"), r"\[x\] \| y");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn test_escape_line_start() {
        assert_eq!(escape_line_start("# not a heading"), r"\# not a heading");
        assert_eq!(escape_line_start("- not a list"), r"\- not a list");
        assert_eq!(escape_line_start("1. not numbered"), r"1\. not numbered");
        assert_eq!(escape_line_start("2020 was"), "2020 was");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(inline_code("x"), "`x`");
        assert_eq!(inline_code("a`b"), "`` a`b ``");
        assert_eq!(inline_code("a``b"), r"a\`\`b");
    }

    #[test]
    fn test_code_fence() {
        assert_eq!(code_fence("plain"), "```");
        assert_eq!(code_fence("```inner```"), "````");
    }
}
