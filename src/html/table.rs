//! Row/column span resolution for HTML tables.

/// Upper bound on a single span, guarding against absurd attribute values.
const MAX_SPAN: usize = 1000;

/// What to write into grid positions covered by a span but not its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanFill {
    /// A single space
    #[default]
    Blank,
    /// The origin cell's text
    Duplicate,
}

/// One HTML cell before placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanCell {
    /// Cell text, already in Markdown
    pub text: String,

    /// Columns covered, at least 1
    pub colspan: usize,

    /// Rows covered, at least 1
    pub rowspan: usize,
}

impl SpanCell {
    /// Create a cell covering one position.
    pub fn new(text: impl Into<String>) -> Self {
        Self::spanning(text, 1, 1)
    }

    /// Create a cell with explicit spans; zero spans count as 1.
    pub fn spanning(text: impl Into<String>, colspan: usize, rowspan: usize) -> Self {
        Self {
            text: text.into(),
            colspan: colspan.clamp(1, MAX_SPAN),
            rowspan: rowspan.clamp(1, MAX_SPAN),
        }
    }
}

/// Place cells into a dense grid.
///
/// The column count is fixed by row 0, including its colspans. Each cell
/// goes to the first unfilled position of its row, writes its text at the
/// anchor and the filler over the rest of its span. Cells that no longer fit
/// are dropped, positions nothing covers stay empty and spans reaching past
/// the last row are clipped.
pub fn resolve_span_grid(rows: &[Vec<SpanCell>], fill: SpanFill) -> Vec<Vec<String>> {
    let width: usize = rows
        .first()
        .map(|row| row.iter().map(|cell| cell.colspan).sum())
        .unwrap_or(0);
    if width == 0 {
        return Vec::new();
    }

    let height = rows.len();
    let mut grid: Vec<Vec<Option<String>>> = vec![vec![None; width]; height];

    for (r, row) in rows.iter().enumerate() {
        let mut c = 0;
        for cell in row {
            while c < width && grid[r][c].is_some() {
                c += 1;
            }
            if c >= width {
                log::debug!("Dropping cell past column {} in row {}", width, r);
                break;
            }

            let filler = match fill {
                SpanFill::Blank => " ".to_string(),
                SpanFill::Duplicate => cell.text.clone(),
            };
            for dr in 0..cell.rowspan.min(height - r) {
                for dc in 0..cell.colspan.min(width - c) {
                    let slot = &mut grid[r + dr][c + dc];
                    if slot.is_some() {
                        continue;
                    }
                    *slot = Some(if dr == 0 && dc == 0 {
                        cell.text.clone()
                    } else {
                        filler.clone()
                    });
                }
            }
            c += cell.colspan;
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
        .collect()
}
