//! Pipe table resolution.

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:?-+:?$").expect("valid separator pattern"));

/// A pipe table with a fixed column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTable {
    /// Header cells, raw Markdown
    pub headers: Vec<String>,

    /// Body rows, each exactly `headers.len()` cells
    pub rows: Vec<Vec<String>>,

    /// Index of the first line after the table
    pub next_index: usize,
}

impl ResolvedTable {
    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Resolve the pipe table starting at `start`.
///
/// Returns `None` when the lines do not form a table; the caller then treats
/// the line as ordinary text. A table needs a separator row right after the
/// header, or a fully delimited header (`| a | b |`) followed by more rows.
pub fn resolve_table(lines: &[&str], start: usize) -> Option<ResolvedTable> {
    let first = *lines.get(start)?;
    if !first.contains('|') || is_separator(first) {
        return None;
    }

    let mut end = start;
    while end < lines.len() && lines[end].contains('|') && !lines[end].trim().is_empty() {
        end += 1;
    }

    let has_separator = end > start + 1 && is_separator(lines[start + 1]);
    let trimmed = first.trim();
    let delimited = trimmed.starts_with('|')
        && trimmed.ends_with('|')
        && split_row(first).len() >= 2
        && end > start + 1;
    if !has_separator && !delimited {
        return None;
    }

    let headers = split_row(first);
    let column_count = headers.len();

    let rows = lines[start + 1..end]
        .iter()
        .filter(|line| !is_separator(line))
        .map(|line| fit_row(split_row(line), column_count))
        .collect();

    Some(ResolvedTable {
        headers,
        rows,
        next_index: end,
    })
}

/// Check if a line is a `|---|:---:|` separator row.
pub fn is_separator(line: &str) -> bool {
    if !line.contains('-') {
        return false;
    }
    let cells = split_cells(line);
    !cells.is_empty()
        && cells
            .iter()
            .all(|cell| SEPARATOR_CELL.is_match(&cell.replace(' ', "")))
}

/// Split a row into trimmed cells, dropping trailing empty cells (keeping one).
pub fn split_row(line: &str) -> Vec<String> {
    let mut cells = split_cells(line);
    while cells.len() > 1 && cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    if cells.is_empty() {
        cells.push(String::new());
    }
    cells
}

/// Split on pipes that are neither escaped nor inside a code span.
fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    let mut in_code = false;

    for c in trimmed.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '`' => {
                current.push(c);
                in_code = !in_code;
            }
            '|' if !in_code => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);

    // Leading and trailing pipes leave empty split artifacts
    if trimmed.starts_with('|') && !cells.is_empty() {
        cells.remove(0);
    }
    if trimmed.len() > 1 && trimmed.ends_with('|') && !trimmed.ends_with("\\|") {
        cells.pop();
    }

    cells.into_iter().map(|c| c.trim().to_string()).collect()
}

fn fit_row(mut row: Vec<String>, column_count: usize) -> Vec<String> {
    row.truncate(column_count);
    row.resize(column_count, String::new());
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let lines = [
            "| Name | Age |",
            "| --- | ---: |",
            "| Alice | 30 |",
            "| Bob | 25 |",
            "",
            "after",
        ];
        let table = resolve_table(&lines, 0).unwrap();
        assert_eq!(table.headers, vec!["Name", "Age"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["Bob", "25"]);
        assert_eq!(table.next_index, 4);
    }

    #[test]
    fn test_rows_padded_and_truncated() {
        let lines = ["a | b | c", "---|---|---", "1 |", "1 | 2 | 3 | 4"];
        let table = resolve_table(&lines, 0).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[0], vec!["1", "", ""]);
        assert_eq!(table.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_single_pipe_is_not_a_table() {
        assert!(resolve_table(&["this | that"], 0).is_none());
        assert!(resolve_table(&["this | that", "and more | text"], 0).is_none());
        assert!(resolve_table(&["| lone row |"], 0).is_none());
    }

    #[test]
    fn test_delimited_rows_without_separator() {
        let lines = ["| a | b |", "| 1 | 2 |"];
        let table = resolve_table(&lines, 0).unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_escaped_and_code_pipes() {
        let cells = split_row(r"| a \| b | `x|y` | c |");
        assert_eq!(cells, vec![r"a \| b", "`x|y`", "c"]);
    }

    #[test]
    fn test_trailing_empty_cells_trimmed() {
        assert_eq!(split_row("| a | | |"), vec!["a"]);
        assert_eq!(split_row("| | |"), vec![""]);
    }

    #[test]
    fn test_is_separator() {
        assert!(is_separator("|---|:---:|"));
        assert!(is_separator("| --- | --- |"));
        assert!(!is_separator("| a | b |"));
        assert!(!is_separator("|   |"));
    }
}
