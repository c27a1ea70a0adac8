use std::cmp::Ordering;

use crate::document::{BlockPath, Document};

/// A caret position: a text block and a character offset into its content.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub path: BlockPath,
    pub offset: usize,
}

impl Position {
    pub fn new(path: BlockPath, offset: usize) -> Self {
        Self { path, offset }
    }

    pub fn at_root(idx: usize, offset: usize) -> Self {
        Self::new(BlockPath::new_root(idx), offset)
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then(self.offset.cmp(&other.offset))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionRange {
    pub anchor: Position,
    pub head: Position,
}

impl SelectionRange {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub fn collapsed(pos: Position) -> Self {
        Self {
            anchor: pos.clone(),
            head: pos,
        }
    }

    pub fn from(&self) -> &Position {
        if self.anchor <= self.head {
            &self.anchor
        } else {
            &self.head
        }
    }

    pub fn to(&self) -> &Position {
        if self.anchor <= self.head {
            &self.head
        } else {
            &self.anchor
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Text blocks touched by this range, in document order.
    pub fn textblocks(&self, document: &Document) -> Vec<BlockPath> {
        let from = &self.from().path;
        let to = &self.to().path;
        document
            .textblocks()
            .into_iter()
            .filter(|path| path >= from && path <= to)
            .collect()
    }
}

/// One or more ranges; the first range is the primary one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    ranges: Vec<SelectionRange>,
}

impl Selection {
    pub fn cursor(pos: Position) -> Self {
        Self {
            ranges: vec![SelectionRange::collapsed(pos)],
        }
    }

    pub fn range(anchor: Position, head: Position) -> Self {
        Self {
            ranges: vec![SelectionRange::new(anchor, head)],
        }
    }

    /// Builds a multi-range selection; an empty list yields `None`.
    pub fn from_ranges(ranges: Vec<SelectionRange>) -> Option<Self> {
        if ranges.is_empty() {
            return None;
        }
        Some(Self { ranges })
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    pub(crate) fn ranges_mut(&mut self) -> &mut [SelectionRange] {
        &mut self.ranges
    }

    pub fn primary(&self) -> &SelectionRange {
        &self.ranges[0]
    }

    pub fn head(&self) -> &Position {
        &self.primary().head
    }

    pub fn anchor(&self) -> &Position {
        &self.primary().anchor
    }

    pub fn is_collapsed(&self) -> bool {
        self.ranges.iter().all(SelectionRange::is_empty)
    }

    /// Text blocks touched by any range, deduplicated, in selection order.
    pub fn textblocks(&self, document: &Document) -> Vec<BlockPath> {
        let mut result: Vec<BlockPath> = Vec::new();
        for range in &self.ranges {
            for path in range.textblocks(document) {
                if !result.contains(&path) {
                    result.push(path);
                }
            }
        }
        result
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::cursor(Position::at_root(0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, ListItem};

    #[test]
    fn range_orders_endpoints() {
        let range = SelectionRange::new(Position::at_root(2, 1), Position::at_root(0, 4));
        assert_eq!(range.from(), &Position::at_root(0, 4));
        assert_eq!(range.to(), &Position::at_root(2, 1));
    }

    #[test]
    fn textblocks_follow_range_order_without_duplicates() {
        let doc = Document::new().with_blocks(vec![
            ListItem::ordered().with_text("a").into(),
            ListItem::ordered().with_text("b").into(),
            Block::paragraph("c"),
        ]);
        let selection = Selection::from_ranges(vec![
            SelectionRange::new(Position::at_root(2, 0), Position::at_root(1, 0)),
            SelectionRange::collapsed(Position::at_root(1, 1)),
            SelectionRange::collapsed(Position::at_root(0, 0)),
        ])
        .unwrap();
        assert_eq!(
            selection.textblocks(&doc),
            vec![
                BlockPath::new_root(1),
                BlockPath::new_root(2),
                BlockPath::new_root(0)
            ]
        );
    }
}
