//! Rendering options and configuration.

/// Options for rendering blocks back to Markdown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Spaces per list nesting level
    pub indent_width: usize,

    /// Page title rendered as a leading level-1 heading
    pub title: Option<String>,

    /// Collect conversion statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the list marker character (`-`, `*` or `+`).
    pub fn with_list_marker(mut self, marker: char) -> Self {
        if matches!(marker, '-' | '*' | '+') {
            self.list_marker = marker;
        }
        self
    }

    /// Set the title heading.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            list_marker: '-',
            indent_width: 2,
            title: None,
            collect_stats: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_marker_restricted() {
        assert_eq!(RenderOptions::new().with_list_marker('*').list_marker, '*');
        assert_eq!(RenderOptions::new().with_list_marker('x').list_marker, '-');
    }
}
