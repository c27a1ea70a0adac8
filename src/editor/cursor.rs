use crate::document::{Block, Document};
use crate::selection::{Position, Selection, SelectionRange};

use super::content::{next_word_boundary, previous_word_boundary};
use super::Editor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Motion {
    Left,
    Right,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    Up,
    Down,
    DocumentStart,
    DocumentEnd,
}

impl Editor {
    /// Moves the head of the primary range. With `extend` the anchor stays.
    pub fn move_cursor(&mut self, motion: Motion, extend: bool) -> bool {
        let primary = self.selection.primary().clone();
        let target = if !extend
            && !primary.is_empty()
            && matches!(motion, Motion::Left | Motion::Right)
        {
            match motion {
                Motion::Left => primary.from().clone(),
                _ => primary.to().clone(),
            }
        } else {
            let Some(target) = motion_target(&self.document, &primary.head, motion) else {
                return false;
            };
            target
        };
        let anchor = if extend { primary.anchor } else { target.clone() };
        let selection = Selection::range(anchor, target);
        if selection == self.selection {
            return false;
        }
        self.selection = selection;
        self.stored_style = None;
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.move_cursor(Motion::Left, false)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_cursor(Motion::Right, false)
    }

    pub fn move_up(&mut self) -> bool {
        self.move_cursor(Motion::Up, false)
    }

    pub fn move_down(&mut self) -> bool {
        self.move_cursor(Motion::Down, false)
    }

    pub fn select_all(&mut self) -> bool {
        let (Some(first), Some(last)) = (
            self.document.first_textblock(),
            self.document.last_textblock(),
        ) else {
            return false;
        };
        let end = self.document.block(&last).map_or(0, Block::content_len);
        self.selection = Selection::range(Position::new(first, 0), Position::new(last, end));
        true
    }
}

fn content_len(doc: &Document, pos: &Position) -> usize {
    doc.block(&pos.path).map_or(0, Block::content_len)
}

fn motion_target(doc: &Document, pos: &Position, motion: Motion) -> Option<Position> {
    let len = content_len(doc, pos);
    let target = match motion {
        Motion::Left if pos.offset > 0 => Position::new(pos.path.clone(), pos.offset - 1),
        Motion::Left => {
            let previous = doc.previous_textblock(&pos.path)?;
            let end = doc.block(&previous).map_or(0, Block::content_len);
            Position::new(previous, end)
        }
        Motion::Right if pos.offset < len => Position::new(pos.path.clone(), pos.offset + 1),
        Motion::Right => Position::new(doc.next_textblock(&pos.path)?, 0),
        Motion::WordLeft | Motion::WordRight => {
            let text = doc.block(&pos.path)?.text();
            let offset = if motion == Motion::WordLeft {
                previous_word_boundary(&text, pos.offset)
            } else {
                next_word_boundary(&text, pos.offset)
            };
            if offset == pos.offset {
                return motion_target(
                    doc,
                    pos,
                    if motion == Motion::WordLeft { Motion::Left } else { Motion::Right },
                );
            }
            Position::new(pos.path.clone(), offset)
        }
        Motion::LineStart => Position::new(pos.path.clone(), 0),
        Motion::LineEnd => Position::new(pos.path.clone(), len),
        Motion::Up => {
            let previous = doc.previous_textblock(&pos.path)?;
            let end = doc.block(&previous).map_or(0, Block::content_len);
            Position::new(previous, pos.offset.min(end))
        }
        Motion::Down => {
            let next = doc.next_textblock(&pos.path)?;
            let end = doc.block(&next).map_or(0, Block::content_len);
            Position::new(next, pos.offset.min(end))
        }
        Motion::DocumentStart => Position::new(doc.first_textblock()?, 0),
        Motion::DocumentEnd => {
            let last = doc.last_textblock()?;
            let end = doc.block(&last).map_or(0, Block::content_len);
            Position::new(last, end)
        }
    };
    Some(target)
}

/// Moves `pos` onto the nearest text block and clamps its offset.
pub(crate) fn clamp_position(doc: &Document, pos: &Position) -> Position {
    if let Some(block) = doc.block(&pos.path) {
        if block.is_textblock() {
            return Position::new(pos.path.clone(), pos.offset.min(block.content_len()));
        }
    }
    let textblocks = doc.textblocks();
    if let Some(inside) = textblocks.iter().find(|path| path.starts_with(&pos.path)) {
        return Position::new(inside.clone(), 0);
    }
    if let Some(before) = textblocks.iter().filter(|path| **path < pos.path).last() {
        let end = doc.block(before).map_or(0, Block::content_len);
        return Position::new(before.clone(), end);
    }
    match textblocks.first() {
        Some(first) => Position::new(first.clone(), 0),
        None => pos.clone(),
    }
}

pub(crate) fn normalize_selection(doc: &Document, selection: Selection) -> Selection {
    let ranges: Vec<SelectionRange> = selection
        .ranges()
        .iter()
        .map(|range| {
            SelectionRange::new(
                clamp_position(doc, &range.anchor),
                clamp_position(doc, &range.head),
            )
        })
        .collect();
    Selection::from_ranges(ranges).unwrap_or(selection)
}
