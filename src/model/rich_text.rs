//! Rich text runs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Maximum length of a single run, in UTF-16 code units.
pub const MAX_TEXT_LENGTH: usize = 2000;

/// Maximum number of runs in one rich text array.
pub const MAX_RICH_TEXT_RUNS: usize = 100;

/// Style annotations carried by a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotations {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Strikethrough text
    pub strikethrough: bool,

    /// Inline code
    pub code: bool,
}

impl Annotations {
    /// Bold only.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Italic only.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    /// Strikethrough only.
    pub fn strikethrough() -> Self {
        Self {
            strikethrough: true,
            ..Default::default()
        }
    }

    /// Code only.
    pub fn code() -> Self {
        Self {
            code: true,
            ..Default::default()
        }
    }

    /// Combine with annotations from a nested span.
    pub fn merge(self, child: Annotations) -> Self {
        Self {
            bold: self.bold || child.bold,
            italic: self.italic || child.italic,
            strikethrough: self.strikethrough || child.strikethrough,
            code: self.code || child.code,
        }
    }

    /// Check if any styling is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.strikethrough || self.code
    }
}

/// A span of text with its own annotations and optional link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub content: String,

    /// Style annotations
    pub annotations: Annotations,

    /// Absolute http(s) link target
    pub link: Option<String>,
}

impl TextRun {
    /// Create an unstyled run.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            annotations: Annotations::default(),
            link: None,
        }
    }

    /// Create a run with the given annotations.
    pub fn styled(content: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            content: content.into(),
            annotations,
            link: None,
        }
    }

    /// Create a linked run.
    pub fn link(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            annotations: Annotations::default(),
            link: Some(url.into()),
        }
    }

    /// Replace the annotations.
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Length in UTF-16 code units, the unit the API counts in.
    pub fn len_utf16(&self) -> usize {
        utf16_len(&self.content)
    }

    /// Check if this run can be merged with `other` without losing styling.
    pub fn same_style(&self, other: &TextRun) -> bool {
        self.annotations == other.annotations && self.link == other.link
    }

    /// Notion rich text object.
    pub fn to_notion(&self) -> Value {
        let link = match &self.link {
            Some(url) => json!({ "url": url }),
            None => Value::Null,
        };
        json!({
            "type": "text",
            "text": {
                "content": self.content,
                "link": link,
            },
            "annotations": {
                "bold": self.annotations.bold,
                "italic": self.annotations.italic,
                "strikethrough": self.annotations.strikethrough,
                "underline": false,
                "code": self.annotations.code,
                "color": "default",
            },
        })
    }
}

/// Length of a string in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Split a string into chunks of at most `max` UTF-16 code units.
///
/// Never splits inside a surrogate pair.
pub fn chunk_utf16(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for c in text.chars() {
        let len = c.len_utf16();
        if current_len + len > max && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push(c);
        current_len += len;
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split every run longer than [`MAX_TEXT_LENGTH`] into sibling runs.
pub fn split_long_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut result = Vec::with_capacity(runs.len());
    for run in runs {
        if run.len_utf16() <= MAX_TEXT_LENGTH {
            result.push(run);
            continue;
        }
        for chunk in chunk_utf16(&run.content, MAX_TEXT_LENGTH) {
            result.push(TextRun {
                content: chunk,
                annotations: run.annotations,
                link: run.link.clone(),
            });
        }
    }
    result
}

/// Merge neighbouring runs that share annotations and link.
pub fn merge_adjacent(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut result: Vec<TextRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match result.last_mut() {
            Some(last) if last.same_style(&run) => last.content.push_str(&run.content),
            _ => result.push(run),
        }
    }
    result
}

/// Concatenated content of a run sequence.
pub fn plain_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.content.as_str()).collect()
}

/// Notion rich text array.
pub fn to_notion_array(runs: &[TextRun]) -> Value {
    Value::Array(runs.iter().map(TextRun::to_notion).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations_merge() {
        let merged = Annotations::bold().merge(Annotations::italic());
        assert!(merged.bold);
        assert!(merged.italic);
        assert!(!merged.code);
        assert!(merged.has_styling());
        assert!(!Annotations::default().has_styling());
    }

    #[test]
    fn test_chunk_utf16_counts_code_units() {
        // Each emoji is two UTF-16 code units
        let text = "😀😀😀";
        let chunks = chunk_utf16(text, 4);
        assert_eq!(chunks, vec!["😀😀".to_string(), "😀".to_string()]);
    }

    #[test]
    fn test_chunk_utf16_empty() {
        assert_eq!(chunk_utf16("", 10), vec![String::new()]);
    }

    #[test]
    fn test_split_long_runs_keeps_annotations() {
        let run = TextRun::link("a".repeat(4500), "https://example.com")
            .with_annotations(Annotations::bold());
        let runs = split_long_runs(vec![run]);

        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].content.len(), 2000);
        assert_eq!(runs[2].content.len(), 500);
        assert!(runs.iter().all(|r| r.annotations.bold));
        assert!(runs
            .iter()
            .all(|r| r.link.as_deref() == Some("https://example.com")));
    }

    #[test]
    fn test_merge_adjacent() {
        let runs = vec![
            TextRun::plain("a"),
            TextRun::plain("b"),
            TextRun::styled("c", Annotations::bold()),
            TextRun::plain("d"),
        ];
        let merged = merge_adjacent(runs);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].content, "ab");
    }

    #[test]
    fn test_to_notion_shape() {
        let value = TextRun::link("docs", "https://example.com").to_notion();
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"]["content"], "docs");
        assert_eq!(value["text"]["link"]["url"], "https://example.com");
        assert_eq!(value["annotations"]["color"], "default");

        let value = TextRun::plain("x").to_notion();
        assert!(value["text"]["link"].is_null());
    }
}
