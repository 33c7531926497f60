//! JSON rendering of blocks in the Notion API shape.

use serde_json::Value;

use crate::error::Result;
use crate::model::Block;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Notion block objects for a block sequence.
pub fn to_value(blocks: &[Block]) -> Value {
    Value::Array(blocks.iter().map(Block::to_notion).collect())
}

/// Convert blocks to a JSON array of Notion block objects.
pub fn to_json(blocks: &[Block], format: JsonFormat) -> Result<String> {
    let value = to_value(blocks);
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&value)?,
        JsonFormat::Compact => serde_json::to_string(&value)?,
    };
    Ok(json)
}
