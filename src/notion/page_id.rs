//! Page id parsing and normalization.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::Error;

static COMPACT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{32}$").expect("valid compact id pattern"));
static HYPHENATED_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid hyphenated id pattern")
});
static SLUG_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-([0-9a-fA-F]{32})$").expect("valid slug suffix pattern"));

/// A page id in canonical lowercase `8-4-4-4-12` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    /// Parse a bare id, a hyphenated id, a page slug or a page URL.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let candidate = match Url::parse(input) {
            Ok(url) if url.has_host() => url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_string)?,
            _ => input.to_string(),
        };
        Self::from_segment(&candidate)
    }

    fn from_segment(segment: &str) -> Option<Self> {
        let compact = if COMPACT_ID.is_match(segment) {
            segment.to_string()
        } else if HYPHENATED_ID.is_match(segment) {
            segment.replace('-', "")
        } else {
            SLUG_SUFFIX.captures(segment)?[1].to_string()
        };
        Some(Self::from_compact(&compact.to_ascii_lowercase()))
    }

    fn from_compact(hex: &str) -> Self {
        Self(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }

    /// Hyphenated form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 32 hex digits without hyphens.
    pub fn compact(&self) -> String {
        self.0.replace('-', "")
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::Validation(format!("'{}' is not a valid page id", s)))
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract a hyphenated page id from an id, slug or page URL.
pub fn extract_page_id(input: &str) -> Option<String> {
    PageId::parse(input).map(|id| id.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYPHENATED: &str = "2dadca9a-3fff-8027-8295-e23720dd2a53";

    #[test]
    fn test_url_with_slug() {
        assert_eq!(
            extract_page_id("https://www.notion.so/workspace/Page-2dadca9a3fff80278295e23720dd2a53")
                .as_deref(),
            Some(HYPHENATED)
        );
    }

    #[test]
    fn test_url_with_query_and_bare_id() {
        assert_eq!(
            extract_page_id("https://www.notion.so/2dadca9a3fff80278295e23720dd2a53?pvs=4")
                .as_deref(),
            Some(HYPHENATED)
        );
    }

    #[test]
    fn test_bare_and_hyphenated() {
        assert_eq!(
            extract_page_id("2DADCA9A3FFF80278295E23720DD2A53").as_deref(),
            Some(HYPHENATED)
        );
        assert_eq!(extract_page_id(HYPHENATED).as_deref(), Some(HYPHENATED));
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(extract_page_id("not-a-valid-id"), None);
        assert_eq!(extract_page_id(""), None);
        assert_eq!(extract_page_id("https://www.notion.so/"), None);
        assert_eq!(extract_page_id("2dadca9a3fff80278295e23720dd2a5"), None);
    }

    #[test]
    fn test_from_str_error() {
        let err = "nope".parse::<PageId>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let id: PageId = HYPHENATED.parse().unwrap();
        assert_eq!(id.compact(), "2dadca9a3fff80278295e23720dd2a53");
    }
}
