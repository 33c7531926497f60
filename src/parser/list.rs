//! Nested list reconstruction.
//!
//! List lines are folded into a tree by indentation (two columns per level)
//! and emitted under the two-level children ceiling of a single write: items
//! at depth 0 and 1 carry native children, deeper descendants follow their
//! depth-2 ancestor as flat siblings, tagged `[indN]` from depth 4 on.

use once_cell::sync::Lazy;
use regex::Regex;

use super::inline::format;
use super::numbering::strip_numbering_artifacts;
use super::ParseOptions;
use crate::model::{limit_children, merge_adjacent, Block, TextRun, MAX_CHILDREN};

/// Columns per nesting level.
const INDENT_WIDTH: usize = 2;

/// Deepest tree depth that may still carry native children.
const MAX_CHILD_DEPTH: usize = 1;

/// First 1-indexed depth rendered with a visible `[indN]` marker.
const MARKER_DEPTH: usize = 4;

static TODO_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)[-*+]\s+\[([ xX])\](?:\s+(.*))?$").expect("valid todo pattern")
});
static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s+(.*)$").expect("valid bullet pattern"));
static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)\d{1,9}[.)]\s+(.*)$").expect("valid numbered pattern"));

/// Kind of list a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `- item`
    Bulleted,
    /// `1. item`
    Numbered,
    /// `- [ ] item`
    ToDo,
}

/// One list line, before tree folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Leading whitespace width (tab = one level)
    pub indent_columns: usize,

    /// Depth in the folded tree (0 = top level)
    pub depth: usize,

    /// Raw Markdown content after the marker
    pub content: String,

    /// Task state for to-do items
    pub checked: Option<bool>,

    /// List kind of this line
    pub kind: ListKind,

    /// Index of the source line
    pub line_index: usize,
}

/// Result of consuming a list run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBuild {
    /// Emitted top-level blocks
    pub blocks: Vec<Block>,

    /// Index of the first line after the list
    pub next_index: usize,
}

/// Recognize a list line.
pub fn parse_list_line(line: &str) -> Option<ListItem> {
    let (kind, indent, content, checked) = if let Some(caps) = TODO_ITEM.captures(line) {
        let checked = !caps[2].trim().is_empty();
        let content = caps.get(3).map_or("", |m| m.as_str());
        (ListKind::ToDo, caps[1].to_string(), content.to_string(), Some(checked))
    } else if let Some(caps) = BULLET_ITEM.captures(line) {
        (ListKind::Bulleted, caps[1].to_string(), caps[2].to_string(), None)
    } else if let Some(caps) = NUMBERED_ITEM.captures(line) {
        (ListKind::Numbered, caps[1].to_string(), caps[2].to_string(), None)
    } else {
        return None;
    };

    Some(ListItem {
        indent_columns: indent_width(&indent),
        depth: 0,
        content: content.trim_end().to_string(),
        checked,
        kind,
        line_index: 0,
    })
}

/// Width of leading whitespace in columns.
pub fn indent_width(text: &str) -> usize {
    text.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { INDENT_WIDTH } else { 1 })
        .sum()
}

/// Build the list starting at `start` with default options.
pub fn build_list(lines: &[&str], start: usize, kind: ListKind) -> ListBuild {
    ListBuilder::new(&ParseOptions::default()).build(lines, start, kind)
}

struct Node {
    item: ListItem,
    children: Vec<usize>,
}

/// Folds list runs into blocks.
pub struct ListBuilder<'a> {
    options: &'a ParseOptions,
}

impl<'a> ListBuilder<'a> {
    /// Create a builder using the given parse options.
    pub fn new(options: &'a ParseOptions) -> Self {
        Self { options }
    }

    /// Consume the list run at `start` whose top-level items are of `kind`.
    pub fn build(&self, lines: &[&str], start: usize, kind: ListKind) -> ListBuild {
        let (items, next_index) = collect_items(lines, start, kind);
        if items.is_empty() {
            return ListBuild {
                blocks: Vec::new(),
                next_index: start,
            };
        }

        let (nodes, roots) = fold_tree(items);
        let blocks = roots
            .iter()
            .flat_map(|&root| self.emit(&nodes, root))
            .collect();
        let blocks = limit_children(blocks, MAX_CHILDREN);

        ListBuild { blocks, next_index }
    }

    fn emit(&self, nodes: &[Node], index: usize) -> Vec<Block> {
        let node = &nodes[index];
        let depth = node.item.depth;
        let mut block = self.item_block(&node.item);

        if depth <= MAX_CHILD_DEPTH {
            let children: Vec<Block> = node
                .children
                .iter()
                .flat_map(|&child| self.emit(nodes, child))
                .collect();
            if let Some(slot) = block.children_mut() {
                *slot = children;
            }
            return vec![block];
        }

        // Too deep to carry children: descendants follow as siblings
        let mut flat = vec![block];
        for &child in &node.children {
            flat.extend(self.emit(nodes, child));
        }
        flat
    }

    fn item_block(&self, item: &ListItem) -> Block {
        let content = match item.kind {
            ListKind::Bulleted | ListKind::Numbered if self.options.strip_numbering_artifacts => {
                strip_numbering_artifacts(&item.content)
            }
            _ => item.content.clone(),
        };

        let mut text = format(&content);
        let display_depth = item.depth + 1;
        if display_depth >= MARKER_DEPTH {
            text.insert(0, TextRun::plain(format!("[ind{}] ", display_depth)));
            text = merge_adjacent(text.into_iter().filter(|r| !r.is_empty()).collect());
        }

        match item.kind {
            ListKind::Bulleted => Block::BulletedListItem {
                text,
                children: Vec::new(),
            },
            ListKind::Numbered => Block::NumberedListItem {
                text,
                children: Vec::new(),
            },
            ListKind::ToDo => Block::ToDo {
                text,
                checked: item.checked.unwrap_or(false),
                children: Vec::new(),
            },
        }
    }
}

/// Scan the contiguous list run, returning its items and the next line index.
fn collect_items(lines: &[&str], start: usize, kind: ListKind) -> (Vec<ListItem>, usize) {
    let Some(first) = lines.get(start).and_then(|l| parse_list_line(l)) else {
        return (Vec::new(), start);
    };
    let base = first.indent_columns;
    let continues = |item: &ListItem| {
        item.indent_columns >= base
            && (item.indent_columns >= base + INDENT_WIDTH || item.kind == kind)
    };

    let mut items: Vec<ListItem> = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            let next = (i + 1..lines.len()).find(|&j| !lines[j].trim().is_empty());
            match next.and_then(|j| parse_list_line(lines[j]).map(|item| (j, item))) {
                Some((j, item)) if continues(&item) => {
                    i = j;
                    continue;
                }
                _ => break,
            }
        }

        if let Some(mut item) = parse_list_line(line) {
            if !continues(&item) {
                break;
            }
            item.line_index = i;
            items.push(item);
            i += 1;
            continue;
        }

        // Indented text continues the previous item; a fence ends the list
        let stripped = line.trim_start();
        if indent_width(line) > base && !stripped.starts_with("```") {
            if let Some(last) = items.last_mut() {
                last.content.push('\n');
                last.content.push_str(line.trim());
                i += 1;
                continue;
            }
        }
        break;
    }

    (items, i)
}

/// Fold items into a tree with a level-keyed stack. Returns nodes and roots.
fn fold_tree(items: Vec<ListItem>) -> (Vec<Node>, Vec<usize>) {
    let base = items.first().map_or(0, |item| item.indent_columns);
    let mut nodes: Vec<Node> = Vec::with_capacity(items.len());
    let mut levels: Vec<usize> = Vec::with_capacity(items.len());
    let mut roots = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for mut item in items {
        let level = item.indent_columns.saturating_sub(base) / INDENT_WIDTH;

        while let Some(&top) = stack.last() {
            if levels[top] >= level {
                stack.pop();
            } else {
                break;
            }
        }

        let index = nodes.len();
        item.depth = stack.len();
        match stack.last() {
            Some(&parent) => nodes[parent].children.push(index),
            None => roots.push(index),
        }
        nodes.push(Node {
            item,
            children: Vec::new(),
        });
        levels.push(level);
        stack.push(index);
    }

    (nodes, roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::plain_text;

    fn text_of(block: &Block) -> String {
        block.text().map(plain_text).unwrap_or_default()
    }

    #[test]
    fn test_wide_list_children_capped() {
        let mut owned = vec!["- parent".to_string()];
        owned.extend((0..150).map(|i| format!("  - child {}", i)));
        owned.push("- last".to_string());
        let lines: Vec<&str> = owned.iter().map(String::as_str).collect();

        let build = build_list(&lines, 0, ListKind::Bulleted);
        assert_eq!(build.next_index, lines.len());
        assert_eq!(build.blocks.len(), 52);
        assert_eq!(build.blocks[0].children().len(), MAX_CHILDREN);
        assert_eq!(text_of(&build.blocks[0].children()[99]), "child 99");
        assert_eq!(text_of(&build.blocks[1]), "child 100");
        assert_eq!(text_of(&build.blocks[50]), "child 149");
        assert_eq!(text_of(&build.blocks[51]), "last");
    }

    #[test]
    fn test_parse_list_line_kinds() {
        let item = parse_list_line("  - [x] done").unwrap();
        assert_eq!(item.kind, ListKind::ToDo);
        assert_eq!(item.checked, Some(true));
        assert_eq!(item.indent_columns, 2);
        assert_eq!(item.content, "done");

        assert_eq!(parse_list_line("* star").unwrap().kind, ListKind::Bulleted);
        assert_eq!(parse_list_line("12. twelve").unwrap().kind, ListKind::Numbered);
        assert!(parse_list_line("**bold** text").is_none());
        assert!(parse_list_line("plain").is_none());
    }

    #[test]
    fn test_flat_list() {
        let lines = ["- a", "- b", "- c", "", "after"];
        let build = build_list(&lines, 0, ListKind::Bulleted);
        assert_eq!(build.blocks.len(), 3);
        assert_eq!(build.next_index, 3);
    }

    #[test]
    fn test_blank_line_continuation() {
        let lines = ["1. one", "", "2. two", "", "text"];
        let build = build_list(&lines, 0, ListKind::Numbered);
        assert_eq!(build.blocks.len(), 2);
        assert_eq!(build.next_index, 3);
    }

    #[test]
    fn test_five_level_nesting() {
        let lines = [
            "- L0",
            "  - L1",
            "    - L2",
            "      - L3",
            "        - L4",
        ];
        let build = build_list(&lines, 0, ListKind::Bulleted);
        assert_eq!(build.blocks.len(), 1);

        let l0 = &build.blocks[0];
        assert_eq!(l0.children().len(), 1);
        let l1 = &l0.children()[0];
        assert_eq!(text_of(l1), "L1");

        // L2 carries nothing; its descendants follow it as siblings
        let siblings = l1.children();
        assert_eq!(siblings.len(), 3);
        assert_eq!(text_of(&siblings[0]), "L2");
        assert!(siblings[0].children().is_empty());
        assert_eq!(text_of(&siblings[1]), "[ind4] L3");
        assert_eq!(text_of(&siblings[2]), "[ind5] L4");
        assert!(l0.nesting_depth() <= 2);
    }

    #[test]
    fn test_mixed_nested_kinds() {
        let lines = ["- parent", "  1. first", "  2. second", "- next"];
        let build = build_list(&lines, 0, ListKind::Bulleted);
        assert_eq!(build.blocks.len(), 2);
        let children = build.blocks[0].children();
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], Block::NumberedListItem { .. }));
    }

    #[test]
    fn test_different_kind_at_base_ends_list() {
        let lines = ["- bullet", "1. number"];
        let build = build_list(&lines, 0, ListKind::Bulleted);
        assert_eq!(build.blocks.len(), 1);
        assert_eq!(build.next_index, 1);
    }

    #[test]
    fn test_level_jump_attaches_to_open_parent() {
        let lines = ["- a", "      - deep", "- b"];
        let build = build_list(&lines, 0, ListKind::Bulleted);
        assert_eq!(build.blocks.len(), 2);
        assert_eq!(text_of(&build.blocks[0].children()[0]), "deep");
    }

    #[test]
    fn test_numbering_artifacts_removed() {
        let lines = ["1. 11、Install", "2. 13.1、Configure"];
        let build = build_list(&lines, 0, ListKind::Numbered);
        assert_eq!(text_of(&build.blocks[0]), "Install");
        assert_eq!(text_of(&build.blocks[1]), "Configure");
    }

    #[test]
    fn test_numbering_cleanup_optional() {
        let options = ParseOptions::new().with_numbering_cleanup(false);
        let lines = ["- 11、Install"];
        let build = ListBuilder::new(&options).build(&lines, 0, ListKind::Bulleted);
        assert_eq!(text_of(&build.blocks[0]), "11、Install");
    }

    #[test]
    fn test_continuation_lines_join() {
        let lines = ["- first line", "  wrapped text", "- second"];
        let build = build_list(&lines, 0, ListKind::Bulleted);
        assert_eq!(build.blocks.len(), 2);
        assert_eq!(text_of(&build.blocks[0]), "first line\nwrapped text");
    }

    #[test]
    fn test_fence_ends_list() {
        let lines = ["- item", "  ```", "  code", "  ```"];
        let build = build_list(&lines, 0, ListKind::Bulleted);
        assert_eq!(build.next_index, 1);
    }

    #[test]
    fn test_todo_items() {
        let lines = ["- [ ] open", "- [x] done"];
        let build = build_list(&lines, 0, ListKind::ToDo);
        assert!(matches!(build.blocks[0], Block::ToDo { checked: false, .. }));
        assert!(matches!(build.blocks[1], Block::ToDo { checked: true, .. }));
    }
}
