//! Removal of numbering noise left in list item text by source renderers.
//!
//! Some wiki renderers bake their own outline numbers into list content,
//! producing items like `11、Setup` or `13.1、Details` under a Markdown list
//! marker that already numbers them.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered substitutions; the first pattern that matches wins.
static ARTIFACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "1[1、" bracket-garbled counters
        r"^\d+\[\d+[、.．]\s*",
        // "13.1、" outline numbers
        r"^\d+(?:\.\d+)+[、．]\s*",
        // "11、" ideographic comma counters
        r"^\d+、\s*",
        // "1．" full-width stop counters
        r"^\d+．\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid numbering pattern"))
    .collect()
});

/// Strip a leading numbering artifact from list item text.
///
/// Text without an artifact is returned unchanged.
pub fn strip_numbering_artifacts(text: &str) -> String {
    let trimmed = text.trim_start();
    for pattern in ARTIFACT_PATTERNS.iter() {
        if let Some(m) = pattern.find(trimmed) {
            let rest = &trimmed[m.end()..];
            // Never strip an item down to nothing
            if !rest.trim().is_empty() {
                return rest.to_string();
            }
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_known_artifacts() {
        assert_eq!(strip_numbering_artifacts("11、Setup"), "Setup");
        assert_eq!(strip_numbering_artifacts("13.1、Details"), "Details");
        assert_eq!(strip_numbering_artifacts("1[1、Broken"), "Broken");
        assert_eq!(strip_numbering_artifacts("2．Full width"), "Full width");
    }

    #[test]
    fn test_leaves_regular_text() {
        assert_eq!(strip_numbering_artifacts("2020 was a year"), "2020 was a year");
        assert_eq!(strip_numbering_artifacts("3.5 million"), "3.5 million");
        assert_eq!(strip_numbering_artifacts("Plain item"), "Plain item");
    }

    #[test]
    fn test_keeps_artifact_only_items() {
        assert_eq!(strip_numbering_artifacts("11、"), "11、");
    }
}
