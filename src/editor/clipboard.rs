use log::debug;

use crate::document::Block;
use crate::error::StepError;
use crate::html::{blocks_to_html, parse_html, ExportTarget};
use crate::paste::{self, PasteContext, Slice};
use crate::selection::{Position, Selection};
use crate::transaction::{Step, Transaction};

use super::content::slice_spans;
use super::inspect::leaf_blocks;
use super::keys::delete_range_in;
use super::Editor;

impl Editor {
    /// Copy of the selected content; partially selected blocks are cut down
    /// to their selected text.
    pub fn selection_slice(&self) -> Slice {
        let range = self.selection.primary();
        let (from, to) = (range.from(), range.to());
        let mut blocks = Vec::new();
        for path in leaf_blocks(&self.document) {
            if path < from.path || path > to.path {
                continue;
            }
            let Some(block) = self.document.block(&path) else {
                continue;
            };
            let Some(content) = block.content() else {
                blocks.push(block.clone());
                continue;
            };
            let start = if path == from.path { from.offset } else { 0 };
            let end = if path == to.path {
                to.offset
            } else {
                block.content_len()
            };
            blocks.push(block.with_same_type(slice_spans(content, start, end)));
        }
        Slice::new(blocks)
    }

    /// Clipboard HTML for the selection, `None` when nothing is selected.
    pub fn copy_html(&self) -> Option<String> {
        if self.selection.is_collapsed() {
            return None;
        }
        Some(self.clipboard_serializer.serialize(&self.selection_slice()))
    }

    pub fn cut_html(&mut self) -> Option<String> {
        let html = self.copy_html()?;
        self.delete_selection();
        Some(html)
    }

    pub fn paste_html(&mut self, html: &str) -> bool {
        self.paste(parse_html(html))
    }

    /// Inserts `slice` at the cursor after renormalizing its indents.
    pub fn paste(&mut self, mut slice: Slice) -> bool {
        if slice.is_empty() {
            return false;
        }
        let mut tx = self.transaction();
        if delete_range_in(&mut tx).is_err() {
            return false;
        }
        let pos = tx.selection().head().clone();
        let Some(target) = tx.doc().block(&pos.path).cloned() else {
            return false;
        };
        let context = PasteContext {
            indent: target.as_list_item().map_or(0, |item| item.indent),
            at_item_start: target.is_list_item() && pos.offset == 0,
        };
        paste::normalize(&mut slice, context);

        let inserted = if context.absorbs_first() {
            insert_absorbed(&mut tx, &pos, &target, slice.blocks)
        } else {
            insert_before_item(&mut tx, &pos, &target, slice.blocks)
        };
        match inserted {
            Ok(()) => self.commit(tx),
            Err(err) => {
                debug!("paste rejected: {err}");
                false
            }
        }
    }

    /// Folded HTML of the whole document.
    pub fn to_html(&self, target: ExportTarget) -> String {
        blocks_to_html(&self.document.blocks, target)
    }
}

/// Inserts the slice as siblings in front of the target item, replacing the
/// target when it is empty.
fn insert_before_item(
    tx: &mut Transaction,
    pos: &Position,
    target: &Block,
    blocks: Vec<Block>,
) -> Result<(), StepError> {
    let count = blocks.len();
    if target.content_len() == 0 {
        tx.step(Step::RemoveBlock {
            path: pos.path.clone(),
        })?;
    }
    tx.step(Step::InsertBlocks {
        path: pos.path.clone(),
        blocks,
    })?;
    let idx = pos.path.index().unwrap_or(0);
    if let Some(last) = pos.path.sibling((idx + count).saturating_sub(1)) {
        let end = tx.doc().block(&last).map_or(0, Block::content_len);
        tx.set_selection(Selection::cursor(Position::new(last, end)));
    }
    Ok(())
}

/// Merges the first slice block into the target and inserts the rest after
/// it; the last pasted text block takes over the remainder of the target.
fn insert_absorbed(
    tx: &mut Transaction,
    pos: &Position,
    target: &Block,
    mut blocks: Vec<Block>,
) -> Result<(), StepError> {
    let first_is_text = blocks.first().is_some_and(Block::is_textblock);
    if blocks.len() == 1 && first_is_text {
        let content = blocks.remove(0).into_content();
        tx.step(Step::InsertContent {
            path: pos.path.clone(),
            offset: pos.offset,
            content,
        })?;
        return Ok(());
    }

    tx.step(Step::Split {
        path: pos.path.clone(),
        offset: pos.offset,
        tail: target.with_same_type(Vec::new()),
    })?;
    if first_is_text {
        let content = blocks.remove(0).into_content();
        tx.step(Step::InsertContent {
            path: pos.path.clone(),
            offset: pos.offset,
            content,
        })?;
    }

    let idx = pos.path.index().unwrap_or(0);
    let count = blocks.len();
    let Some(tail) = pos.path.sibling(idx + 1 + count) else {
        return Ok(());
    };
    if count > 0 {
        let Some(first_rest) = pos.path.sibling(idx + 1) else {
            return Ok(());
        };
        tx.step(Step::InsertBlocks {
            path: first_rest,
            blocks,
        })?;
    }

    let Some(last) = pos.path.sibling(idx + count) else {
        return Ok(());
    };
    let last_is_text = tx.doc().block(&last).is_some_and(Block::is_textblock);
    if last_is_text {
        let end = tx.doc().block(&last).map_or(0, Block::content_len);
        tx.step(Step::Join {
            target: last.clone(),
            source: tail,
        })?;
        tx.set_selection(Selection::cursor(Position::new(last, end)));
    } else {
        tx.set_selection(Selection::cursor(Position::new(tail, 0)));
    }
    Ok(())
}
