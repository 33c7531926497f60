//! Block types matching the Notion block schema.

use super::language::normalize_language;
use super::rich_text::{chunk_utf16, plain_text, to_notion_array, utf16_len, TextRun, MAX_TEXT_LENGTH};
use super::Table;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Appended to code that had to be cut to fit a single run.
pub const TRUNCATION_NOTICE: &str = "\n\n... (truncated)";

/// Maximum number of children in one block, and of blocks in one request.
pub const MAX_CHILDREN: usize = 100;

/// One typed content unit of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Plain paragraph
    Paragraph {
        /// Rich text content
        text: Vec<TextRun>,
    },

    /// Heading, level 1 to 3
    Heading {
        /// Heading level
        level: u8,
        /// Rich text content
        text: Vec<TextRun>,
    },

    /// Bulleted list item
    BulletedListItem {
        /// Rich text content
        text: Vec<TextRun>,
        /// Nested blocks
        children: Vec<Block>,
    },

    /// Numbered list item
    NumberedListItem {
        /// Rich text content
        text: Vec<TextRun>,
        /// Nested blocks
        children: Vec<Block>,
    },

    /// Task list item
    ToDo {
        /// Rich text content
        text: Vec<TextRun>,
        /// Whether the task is done
        checked: bool,
        /// Nested blocks
        children: Vec<Block>,
    },

    /// Block quote
    Quote {
        /// Rich text content
        text: Vec<TextRun>,
    },

    /// Icon-prefixed colored box
    Callout {
        /// Rich text content
        text: Vec<TextRun>,
        /// Emoji icon
        icon: String,
        /// Background color
        color: Color,
    },

    /// Literal code
    Code {
        /// Accepted language tag
        language: String,
        /// Code text, at most one run long
        text: String,
    },

    /// External image
    Image {
        /// Absolute image URL
        url: String,
        /// Caption runs
        caption: Vec<TextRun>,
    },

    /// Horizontal rule
    Divider,

    /// Table
    Table(Table),
}

impl Block {
    /// Create a paragraph.
    pub fn paragraph(text: Vec<TextRun>) -> Self {
        Block::Paragraph { text }
    }

    /// Create a heading, clamping the level to 1..=3.
    pub fn heading(level: u8, text: Vec<TextRun>) -> Self {
        Block::Heading {
            level: level.clamp(1, 3),
            text,
        }
    }

    /// Create a quote.
    pub fn quote(text: Vec<TextRun>) -> Self {
        Block::Quote { text }
    }

    /// Create a callout of the given kind with an explicit icon.
    pub fn callout(kind: CalloutKind, icon: impl Into<String>, text: Vec<TextRun>) -> Self {
        Block::Callout {
            text,
            icon: icon.into(),
            color: kind.color(),
        }
    }

    /// Create a code block, normalizing the language and truncating long code.
    pub fn code(language: &str, text: impl Into<String>) -> Self {
        Block::Code {
            language: normalize_language(language).to_string(),
            text: truncate_code(text.into()),
        }
    }

    /// Create an image block.
    pub fn image(url: impl Into<String>, caption: Vec<TextRun>) -> Self {
        Block::Image {
            url: url.into(),
            caption,
        }
    }

    /// API type name, e.g. `heading_2` or `bulleted_list_item`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { level: 1, .. } => "heading_1",
            Block::Heading { level: 2, .. } => "heading_2",
            Block::Heading { .. } => "heading_3",
            Block::BulletedListItem { .. } => "bulleted_list_item",
            Block::NumberedListItem { .. } => "numbered_list_item",
            Block::ToDo { .. } => "to_do",
            Block::Quote { .. } => "quote",
            Block::Callout { .. } => "callout",
            Block::Code { .. } => "code",
            Block::Image { .. } => "image",
            Block::Divider => "divider",
            Block::Table(_) => "table",
        }
    }

    /// Rich text of textual blocks.
    pub fn text(&self) -> Option<&[TextRun]> {
        match self {
            Block::Paragraph { text }
            | Block::Heading { text, .. }
            | Block::BulletedListItem { text, .. }
            | Block::NumberedListItem { text, .. }
            | Block::ToDo { text, .. }
            | Block::Quote { text }
            | Block::Callout { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Children of list blocks; empty for everything else.
    pub fn children(&self) -> &[Block] {
        match self {
            Block::BulletedListItem { children, .. }
            | Block::NumberedListItem { children, .. }
            | Block::ToDo { children, .. } => children,
            _ => &[],
        }
    }

    /// Mutable children of list blocks.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Block::BulletedListItem { children, .. }
            | Block::NumberedListItem { children, .. }
            | Block::ToDo { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Check if this block kind may carry children.
    pub fn is_list_item(&self) -> bool {
        matches!(
            self,
            Block::BulletedListItem { .. } | Block::NumberedListItem { .. } | Block::ToDo { .. }
        )
    }

    /// Number of levels of children below this block.
    pub fn nesting_depth(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.nesting_depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// This block plus all of its descendants.
    pub fn total_count(&self) -> usize {
        1 + self.children().iter().map(Block::total_count).sum::<usize>()
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Code { text, .. } => text.clone(),
            Block::Image { url, caption } => {
                let caption = plain_text(caption);
                if caption.is_empty() {
                    url.clone()
                } else {
                    caption
                }
            }
            Block::Divider => String::new(),
            Block::Table(table) => table.plain_text(),
            other => other.text().map(plain_text).unwrap_or_default(),
        }
    }

    /// Notion block object.
    pub fn to_notion(&self) -> Value {
        let type_name = self.type_name();
        let body = match self {
            Block::Paragraph { text } | Block::Heading { text, .. } | Block::Quote { text } => {
                json!({ "rich_text": to_notion_array(text) })
            }
            Block::BulletedListItem { text, children }
            | Block::NumberedListItem { text, children } => {
                let mut body = json!({ "rich_text": to_notion_array(text) });
                if !children.is_empty() {
                    body["children"] = children_to_notion(children);
                }
                body
            }
            Block::ToDo {
                text,
                checked,
                children,
            } => {
                let mut body = json!({
                    "rich_text": to_notion_array(text),
                    "checked": checked,
                });
                if !children.is_empty() {
                    body["children"] = children_to_notion(children);
                }
                body
            }
            Block::Callout { text, icon, color } => json!({
                "rich_text": to_notion_array(text),
                "icon": { "type": "emoji", "emoji": icon },
                "color": color.as_str(),
            }),
            Block::Code { language, text } => json!({
                "rich_text": to_notion_array(&[TextRun::plain(text.clone())]),
                "language": language,
            }),
            Block::Image { url, caption } => json!({
                "type": "external",
                "external": { "url": url },
                "caption": to_notion_array(caption),
            }),
            Block::Divider => json!({}),
            Block::Table(table) => table.to_notion(),
        };

        let mut value = json!({ "object": "block", "type": type_name });
        value[type_name] = body;
        value
    }
}

fn children_to_notion(children: &[Block]) -> Value {
    Value::Array(children.iter().map(Block::to_notion).collect())
}

fn truncate_code(text: String) -> String {
    if utf16_len(&text) <= MAX_TEXT_LENGTH {
        return text;
    }
    let budget = MAX_TEXT_LENGTH - utf16_len(TRUNCATION_NOTICE);
    let mut kept = chunk_utf16(&text, budget).swap_remove(0);
    kept.push_str(TRUNCATION_NOTICE);
    kept
}

/// Keep every children array within `max` entries.
///
/// Children past the limit move out to follow their parent as siblings,
/// in order. Deeper levels are limited first, so overflow pushed up from a
/// grandchild is limited again at the child level. The top-level sequence
/// itself is left unbounded.
pub fn limit_children(blocks: Vec<Block>, max: usize) -> Vec<Block> {
    let max = max.max(1);
    let mut limited = Vec::with_capacity(blocks.len());
    for mut block in blocks {
        let mut overflow = Vec::new();
        if let Some(children) = block.children_mut() {
            let mut kept = limit_children(std::mem::take(children), max);
            if kept.len() > max {
                overflow = kept.split_off(max);
                log::debug!("Moving {} children past the limit of {}", overflow.len(), max);
            }
            *children = kept;
        }
        limited.push(block);
        limited.extend(overflow);
    }
    limited
}

/// Block background colors used by callouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// No color
    #[default]
    Default,
    /// Gray background
    GrayBackground,
    /// Orange background
    OrangeBackground,
    /// Yellow background
    YellowBackground,
    /// Green background
    GreenBackground,
    /// Blue background
    BlueBackground,
    /// Purple background
    PurpleBackground,
    /// Red background
    RedBackground,
}

impl Color {
    /// API color name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Default => "default",
            Color::GrayBackground => "gray_background",
            Color::OrangeBackground => "orange_background",
            Color::YellowBackground => "yellow_background",
            Color::GreenBackground => "green_background",
            Color::BlueBackground => "blue_background",
            Color::PurpleBackground => "purple_background",
            Color::RedBackground => "red_background",
        }
    }
}

/// Kinds of information panels, mapped to callouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutKind {
    /// Informational panel
    #[default]
    Info,
    /// Warning panel
    Warning,
    /// Note panel
    Note,
    /// Tip panel
    Tip,
    /// Success panel
    Success,
    /// Error panel
    Error,
    /// Notification panel
    Notification,
    /// Comment panel
    Comment,
}

impl CalloutKind {
    /// All kinds, in emoji table order.
    pub const ALL: [CalloutKind; 8] = [
        CalloutKind::Info,
        CalloutKind::Warning,
        CalloutKind::Note,
        CalloutKind::Tip,
        CalloutKind::Success,
        CalloutKind::Error,
        CalloutKind::Notification,
        CalloutKind::Comment,
    ];

    /// Canonical emoji.
    pub fn emoji(&self) -> &'static str {
        match self {
            CalloutKind::Info => "ℹ️",
            CalloutKind::Warning => "⚠️",
            CalloutKind::Note => "📝",
            CalloutKind::Tip => "💡",
            CalloutKind::Success => "✅",
            CalloutKind::Error => "❌",
            CalloutKind::Notification => "🔔",
            CalloutKind::Comment => "💬",
        }
    }

    /// Background color of the callout.
    pub fn color(&self) -> Color {
        match self {
            CalloutKind::Info => Color::BlueBackground,
            CalloutKind::Warning => Color::YellowBackground,
            CalloutKind::Note => Color::PurpleBackground,
            CalloutKind::Tip => Color::GreenBackground,
            CalloutKind::Success => Color::GreenBackground,
            CalloutKind::Error => Color::RedBackground,
            CalloutKind::Notification => Color::OrangeBackground,
            CalloutKind::Comment => Color::GrayBackground,
        }
    }

    /// Kind for a leading emoji; unknown emoji are informational.
    pub fn from_emoji(emoji: &str) -> Self {
        let bare = emoji.trim_end_matches('\u{FE0F}');
        Self::ALL
            .into_iter()
            .find(|kind| kind.emoji().trim_end_matches('\u{FE0F}') == bare)
            .unwrap_or_default()
    }

    /// Kind for a `data-panel-type` attribute value.
    pub fn from_panel_type(panel_type: &str) -> Option<Self> {
        match panel_type.trim().to_lowercase().as_str() {
            "info" | "information" => Some(CalloutKind::Info),
            "warning" | "caution" => Some(CalloutKind::Warning),
            "note" => Some(CalloutKind::Note),
            "tip" => Some(CalloutKind::Tip),
            "success" => Some(CalloutKind::Success),
            "error" | "danger" => Some(CalloutKind::Error),
            "notification" => Some(CalloutKind::Notification),
            "comment" => Some(CalloutKind::Comment),
            _ => None,
        }
    }
}
