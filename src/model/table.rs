//! Table types.

use super::rich_text::{plain_text, to_notion_array, TextRun};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Cell content: one rich text sequence per cell.
pub type Cell = Vec<TextRun>;

/// A table with a header row and data rows of equal width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Number of columns
    pub width: usize,

    /// Header row
    pub header_row: Vec<Cell>,

    /// Body rows
    pub data_rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table, padding or truncating every row to the header width.
    pub fn new(header_row: Vec<Cell>, data_rows: Vec<Vec<Cell>>) -> Self {
        let width = header_row.len().max(1);
        let header_row = fit_row(header_row, width);
        let data_rows = data_rows
            .into_iter()
            .map(|row| fit_row(row, width))
            .collect();
        Self {
            width,
            header_row,
            data_rows,
        }
    }

    /// Get the number of rows including the header.
    pub fn row_count(&self) -> usize {
        self.data_rows.len() + 1
    }

    /// Split into tables of at most `max_rows` body rows, each repeating the header.
    pub fn split_rows(self, max_rows: usize) -> Vec<Table> {
        if max_rows == 0 || self.data_rows.len() <= max_rows {
            return vec![self];
        }
        let Table {
            width,
            header_row,
            data_rows,
        } = self;
        data_rows
            .chunks(max_rows)
            .map(|chunk| Table {
                width,
                header_row: header_row.clone(),
                data_rows: chunk.to_vec(),
            })
            .collect()
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        std::iter::once(&self.header_row)
            .chain(self.data_rows.iter())
            .map(|row| {
                row.iter()
                    .map(|cell| plain_text(cell))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Notion `table` payload, rows included as children.
    pub fn to_notion(&self) -> Value {
        let rows: Vec<Value> = std::iter::once(&self.header_row)
            .chain(self.data_rows.iter())
            .map(|row| {
                json!({
                    "object": "block",
                    "type": "table_row",
                    "table_row": {
                        "cells": row.iter().map(|cell| to_notion_array(cell)).collect::<Vec<_>>(),
                    },
                })
            })
            .collect();

        json!({
            "table_width": self.width,
            "has_column_header": true,
            "has_row_header": false,
            "children": rows,
        })
    }
}

fn fit_row(mut row: Vec<Cell>, width: usize) -> Vec<Cell> {
    row.truncate(width);
    while row.len() < width {
        row.push(vec![TextRun::plain("")]);
    }
    row
}
