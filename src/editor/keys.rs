use log::{debug, trace};

use crate::document::{Block, BlockPath, InlineStyle};
use crate::error::{ListError, StepError};
use crate::keymap::Command;
use crate::schema::Schema;
use crate::selection::{Position, Selection};
use crate::transaction::{Step, Transaction};

use super::commands::{dedent_in, set_list_item_in, ListAttrs};
use super::content::{style_at, styled_text};
use super::input_rules::match_input_rule;
use super::inspect::{is_empty_list_item, leaf_blocks};
use super::Editor;

impl Editor {
    /// Runs an editing command. Clipboard, save and quit are left to the host.
    pub fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::ToggleList(kind) => match self.toggle_list_item(kind, ListAttrs::default()) {
                Ok(changed) => changed,
                Err(err) => {
                    debug!("toggle {kind} failed: {err}");
                    false
                }
            },
            Command::Indent => self.indent(),
            Command::Dedent => self.dedent(false),
            Command::ToggleChecked => self.toggle_checked(),
            Command::Enter => self.enter(),
            Command::Backspace => self.backspace(),
            Command::Delete => self.delete(),
            Command::Move { motion, extend } => self.move_cursor(motion, extend),
            Command::SelectAll => self.select_all(),
            Command::Insert(ch) => {
                let mut buf = [0u8; 4];
                self.insert_text(ch.encode_utf8(&mut buf))
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::Copy | Command::Cut | Command::Paste | Command::Save | Command::Quit => false,
        }
    }

    /// Inserts `text` at the cursor, replacing a non-empty selection.
    ///
    /// Typing a list marker at the start of a text block converts the block.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let mut tx = self.transaction();
        if delete_range_in(&mut tx).is_err() {
            return false;
        }
        let pos = tx.selection().head().clone();
        let Some(block) = tx.doc().block(&pos.path) else {
            return false;
        };
        if !block.is_textblock() {
            return false;
        }
        let is_code = matches!(block, Block::CodeBlock { .. });
        let style = self
            .stored_style
            .or_else(|| {
                block
                    .content()
                    .and_then(|spans| style_at(spans, pos.offset))
                    .map(|span| span.style)
            })
            .filter(|style| *style != InlineStyle::Link)
            .unwrap_or(InlineStyle::None);

        if tx
            .step(Step::InsertContent {
                path: pos.path.clone(),
                offset: pos.offset,
                content: vec![styled_text(text, style, None)],
            })
            .is_err()
        {
            return false;
        }
        if !is_code {
            apply_input_rule(&mut tx, &self.config.schema, &pos.path);
        }
        if self.stored_style.is_some() {
            tx.set_stored_style(self.stored_style);
        }
        self.commit(tx)
    }

    /// Splits the current block, or leaves the list when the item is empty.
    pub fn enter(&mut self) -> bool {
        let mut tx = self.transaction();
        if delete_range_in(&mut tx).is_err() {
            return false;
        }
        let pos = tx.selection().head().clone();
        let Some(block) = tx.doc().block(&pos.path).cloned() else {
            return false;
        };
        if is_empty_list_item(&block) {
            return dedent_in(&mut tx, true) && self.commit(tx);
        }
        let step = match &block {
            Block::CodeBlock { .. } => Step::InsertContent {
                path: pos.path.clone(),
                offset: pos.offset,
                content: vec![styled_text("\n", InlineStyle::None, None)],
            },
            Block::Heading { .. } if pos.offset == block.content_len() => Step::Split {
                path: pos.path.clone(),
                offset: pos.offset,
                tail: Block::empty_paragraph(),
            },
            _ if block.is_textblock() => Step::Split {
                path: pos.path.clone(),
                offset: pos.offset,
                tail: block.with_same_type(Vec::new()),
            },
            _ => return false,
        };
        if tx.step(step).is_err() {
            return false;
        }
        let pending = self
            .stored_style
            .or_else(|| {
                block
                    .content()
                    .and_then(|spans| style_at(spans, pos.offset))
                    .map(|span| span.style)
            })
            .filter(|style| *style != InlineStyle::None && style.is_splittable());
        tx.set_stored_style(pending);
        self.commit(tx)
    }

    /// Deletes backwards from the cursor.
    pub fn backspace(&mut self) -> bool {
        let mut tx = self.transaction();
        match delete_range_in(&mut tx) {
            Ok(true) => return self.commit(tx),
            Ok(false) => {}
            Err(_) => return false,
        }
        let pos = tx.selection().head().clone();
        let Some(block) = tx.doc().block(&pos.path).cloned() else {
            return false;
        };
        if pos.offset > 0 {
            let step = Step::DeleteText {
                path: pos.path.clone(),
                from: pos.offset - 1,
                to: pos.offset,
            };
            return tx.step(step).is_ok() && self.commit(tx);
        }

        let previous = pos
            .path
            .previous_sibling()
            .and_then(|path| tx.doc().block(&path).cloned().map(|block| (path, block)));

        let step = match &previous {
            Some((target, previous)) if is_empty_list_item(previous) => {
                trace!("joining {} into empty item {target}", pos.path);
                Step::Join {
                    target: target.clone(),
                    source: pos.path.clone(),
                }
            }
            _ if block.is_list_item() => {
                return dedent_in(&mut tx, true) && self.commit(tx);
            }
            _ if pos.path.index() == Some(0) && pos.path.depth() > 1 => Step::Lift {
                path: pos.path.clone(),
            },
            Some((rule, Block::Rule)) => Step::RemoveBlock { path: rule.clone() },
            _ => {
                let Some(target) = tx.doc().previous_textblock(&pos.path) else {
                    return false;
                };
                Step::Join {
                    target,
                    source: pos.path.clone(),
                }
            }
        };
        tx.step(step).is_ok() && self.commit(tx)
    }

    /// Deletes forwards from the cursor.
    pub fn delete(&mut self) -> bool {
        let mut tx = self.transaction();
        match delete_range_in(&mut tx) {
            Ok(true) => return self.commit(tx),
            Ok(false) => {}
            Err(_) => return false,
        }
        let pos = tx.selection().head().clone();
        let Some(block) = tx.doc().block(&pos.path).cloned() else {
            return false;
        };
        let len = block.content_len();
        if pos.offset < len {
            let step = Step::DeleteText {
                path: pos.path.clone(),
                from: pos.offset,
                to: pos.offset + 1,
            };
            return tx.step(step).is_ok() && self.commit(tx);
        }

        let next_is_rule = pos
            .path
            .next_sibling()
            .is_some_and(|path| matches!(tx.doc().block(&path), Some(Block::Rule)));
        let step = if next_is_rule {
            let Some(rule) = pos.path.next_sibling() else {
                return false;
            };
            Step::RemoveBlock { path: rule }
        } else {
            let Some(next) = tx.doc().next_textblock(&pos.path) else {
                return false;
            };
            if len == 0 && !block.is_list_item() {
                Step::RemoveBlock {
                    path: pos.path.clone(),
                }
            } else {
                Step::Join {
                    target: pos.path.clone(),
                    source: next,
                }
            }
        };
        tx.step(step).is_ok() && self.commit(tx)
    }

    /// Removes the selected content, joining the blocks at either end.
    pub fn delete_selection(&mut self) -> bool {
        let mut tx = self.transaction();
        match delete_range_in(&mut tx) {
            Ok(true) => self.commit(tx),
            _ => false,
        }
    }
}

/// Converts the block at `path` when the text before the cursor is a list
/// marker. A failed conversion leaves `tx` as it was.
fn apply_input_rule(tx: &mut Transaction, schema: &Schema, path: &BlockPath) {
    let head = tx.selection().head().clone();
    if &head.path != path {
        return;
    }
    let Some(block) = tx.doc().block(path) else {
        return;
    };
    let before: String = block.text().chars().take(head.offset).collect();
    let Some(rule) = match_input_rule(&before) else {
        return;
    };
    if !schema.is_textblock_kind(rule.kind)
        || block
            .as_list_item()
            .is_some_and(|item| item.kind() == rule.kind)
    {
        return;
    }

    let checkpoint = tx.clone();
    let attrs = ListAttrs {
        indent: None,
        checked: rule.checked,
    };
    let converted = tx
        .step(Step::DeleteText {
            path: path.clone(),
            from: 0,
            to: rule.len,
        })
        .map_err(ListError::from)
        .and_then(|_| set_list_item_in(tx, schema, rule.kind, attrs));
    match converted {
        Ok(true) => debug!("input rule turned {path} into a {} item", rule.kind),
        Ok(false) | Err(_) => *tx = checkpoint,
    }
}

/// Deletes the primary range of `tx`. Returns false for an empty range.
pub(crate) fn delete_range_in(tx: &mut Transaction) -> Result<bool, StepError> {
    let range = tx.selection().primary().clone();
    if range.is_empty() {
        return Ok(false);
    }
    let from = range.from().clone();
    let to = range.to().clone();

    if from.path == to.path {
        tx.step(Step::DeleteText {
            path: from.path.clone(),
            from: from.offset,
            to: to.offset,
        })?;
        tx.set_selection(Selection::cursor(from));
        return Ok(true);
    }

    let mut tail = Position::new(to.path.clone(), 0);
    track(tx, Step::DeleteText {
        path: to.path.clone(),
        from: 0,
        to: to.offset,
    }, &mut tail)?;

    let between: Vec<BlockPath> = leaf_blocks(tx.doc())
        .into_iter()
        .filter(|path| *path > from.path && *path < to.path)
        .collect();
    for path in between.into_iter().rev() {
        track(tx, Step::RemoveBlock { path: path.clone() }, &mut tail)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.is_root()) {
            let emptied = tx.doc().container(&parent).is_some_and(Vec::is_empty);
            if emptied {
                track(tx, Step::RemoveBlock { path: parent }, &mut tail)?;
            }
        }
    }

    let end = tx.doc().block(&from.path).map_or(0, Block::content_len);
    tx.step(Step::DeleteText {
        path: from.path.clone(),
        from: from.offset,
        to: end,
    })?;
    if tail.path != from.path {
        let container = tail.path.parent().filter(|parent| !parent.is_root());
        tx.step(Step::Join {
            target: from.path.clone(),
            source: tail.path,
        })?;
        if let Some(quote) = container {
            if tx.doc().container(&quote).is_some_and(Vec::is_empty) {
                tx.step(Step::RemoveBlock { path: quote })?;
            }
        }
    }
    tx.set_selection(Selection::cursor(from));
    Ok(true)
}

/// Applies `step` while mapping `tracked` through it.
fn track(tx: &mut Transaction, step: Step, tracked: &mut Position) -> Result<(), StepError> {
    let mapped = step.map_position(tracked, tx.doc());
    tx.step(step)?;
    *tracked = mapped;
    Ok(())
}
