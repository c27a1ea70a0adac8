//! Indent renormalization for pasted fragments.

use log::debug;

use crate::document::{Block, PLACEHOLDER};
use crate::editor::content::{delete_range, starts_with_char};

/// Top-level blocks of a fragment about to be inserted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slice {
    pub blocks: Vec<Block>,
}

impl Slice {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn indents(&self) -> Vec<Option<usize>> {
        self.blocks
            .iter()
            .map(|block| block.as_list_item().map(|item| item.indent))
            .collect()
    }
}

/// What the insertion point looks like.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PasteContext {
    /// Indent of the list item holding the insertion point, 0 outside lists.
    pub indent: usize,
    /// The insertion point sits at the very start of a list item's content.
    pub at_item_start: bool,
}

impl PasteContext {
    /// Whether the first fragment node merges into the target block instead
    /// of being inserted as a block of its own.
    pub fn absorbs_first(&self) -> bool {
        !self.at_item_start
    }
}

/// Rewrites the indents of `slice` in place to fit `context`.
pub fn normalize(slice: &mut Slice, context: PasteContext) {
    let mut context_indent = context.indent as isize;
    let mut shift: Option<isize> = None;
    let mut last_emitted: isize = 0;

    for (idx, block) in slice.blocks.iter_mut().enumerate() {
        let Block::ListItem(item) = block else {
            shift = None;
            context_indent = 0;
            continue;
        };

        match shift {
            None => {
                shift = Some(context_indent - item.indent as isize);
                last_emitted = context_indent;
                // An absorbed first node takes the target's place; its own
                // indent is dropped along with the node.
                if idx > 0 || !context.absorbs_first() {
                    item.indent = context_indent as usize;
                }
            }
            Some(current) => {
                let raw = item.indent as isize + current;
                let clamped = raw.clamp(0, last_emitted + 1);
                shift = Some(current + (clamped - raw));
                item.indent = clamped as usize;
                last_emitted = clamped;
            }
        }
    }

    if let Some(Block::ListItem(first)) = slice.blocks.first_mut() {
        if first.temp_propped {
            first.temp_propped = false;
            if starts_with_char(&first.content, PLACEHOLDER) {
                delete_range(&mut first.content, 0, 1);
            }
        }
    }

    debug!("paste normalized to indents {:?}", slice.indents());
}
