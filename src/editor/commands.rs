use log::{debug, trace, warn};

use crate::document::{Block, BlockPath, ListItem, ListKind, ListVariant};
use crate::error::ListError;
use crate::schema::Schema;
use crate::selection::Position;
use crate::transaction::{Step, Transaction};

use super::inspect::{selected_list_items, selected_textblocks};
use super::Editor;

/// Optional attribute overrides for list conversions. Unset fields are
/// taken from the block being converted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListAttrs {
    pub indent: Option<usize>,
    pub checked: Option<bool>,
}

impl ListAttrs {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    fn matches(&self, item: &ListItem) -> bool {
        self.indent.is_none_or(|indent| indent == item.indent)
            && self
                .checked
                .is_none_or(|checked| item.variant.checked() == Some(checked))
    }
}

impl Editor {
    /// Converts every text block in the selection into a list item of `kind`.
    ///
    /// Returns `Ok(false)` when nothing needed to change.
    pub fn set_list_item(&mut self, kind: ListKind, attrs: ListAttrs) -> Result<bool, ListError> {
        let mut tx = self.transaction();
        if !set_list_item_in(&mut tx, &self.config.schema, kind, attrs)? {
            return Ok(false);
        }
        self.dispatch(tx)?;
        Ok(true)
    }

    /// Turns the selected items back into paragraphs when they already are
    /// `kind` items matching `attrs`, otherwise behaves like
    /// [`Editor::set_list_item`].
    pub fn toggle_list_item(
        &mut self,
        kind: ListKind,
        attrs: ListAttrs,
    ) -> Result<bool, ListError> {
        ensure_registered(&self.config.schema, kind)?;
        if !self.list_matches(kind, attrs) {
            return self.set_list_item(kind, attrs);
        }
        let mut tx = self.transaction();
        for path in selected_list_items(tx.doc(), tx.selection()).into_iter().rev() {
            let Some(block) = tx.doc().block(&path) else {
                continue;
            };
            let paragraph = Block::Paragraph {
                content: block.content().cloned().unwrap_or_default(),
            };
            tx.step(Step::ReplaceBlock {
                path,
                block: paragraph,
            })?;
        }
        self.dispatch(tx)?;
        Ok(true)
    }

    fn list_matches(&self, kind: ListKind, attrs: ListAttrs) -> bool {
        let paths = selected_textblocks(&self.document, &self.selection);
        !paths.is_empty()
            && paths.iter().all(|path| {
                self.document
                    .list_item(path)
                    .is_some_and(|item| item.kind() == kind && attrs.matches(item))
            })
    }

    /// Raises every selected item by one level where the staircase allows.
    pub fn indent(&mut self) -> bool {
        let mut tx = self.transaction();
        if !indent_in(&mut tx) {
            return false;
        }
        self.commit(tx)
    }

    /// Lowers every selected item by one level, converting items already at
    /// level 0 into paragraphs when `can_convert` is set. Items following the
    /// last changed one that sat deeper than it are lowered along with it.
    pub fn dedent(&mut self, can_convert: bool) -> bool {
        let mut tx = self.transaction();
        if !dedent_in(&mut tx, can_convert) {
            return false;
        }
        self.commit(tx)
    }

    /// Flips `checked` on every selected task item.
    pub fn toggle_checked(&mut self) -> bool {
        let mut tx = self.transaction();
        let mut changed = false;
        for path in selected_list_items(tx.doc(), tx.selection()) {
            let Some(ListVariant::Task { checked }) =
                tx.doc().list_item(&path).map(|item| item.variant)
            else {
                continue;
            };
            if tx
                .step(Step::SetChecked {
                    path,
                    checked: !checked,
                })
                .is_err()
            {
                return false;
            }
            changed = true;
        }
        changed && self.commit(tx)
    }
}

pub(crate) fn ensure_registered(schema: &Schema, kind: ListKind) -> Result<(), ListError> {
    if schema.is_textblock_kind(kind) {
        return Ok(());
    }
    warn!("list kind `{kind}` is not registered as a text block");
    Err(ListError::UnregisteredListKind(kind))
}

pub(crate) fn set_list_item_in(
    tx: &mut Transaction,
    schema: &Schema,
    kind: ListKind,
    attrs: ListAttrs,
) -> Result<bool, ListError> {
    ensure_registered(schema, kind)?;
    let targets = selected_textblocks(tx.doc(), tx.selection());
    let mut changed = false;
    // Last to first: lifting a block never renumbers the blocks before it.
    for path in targets.into_iter().rev() {
        let Some(block) = tx.doc().block(&path).cloned() else {
            continue;
        };
        if !schema.can_become_list_item(&block) {
            return Err(ListError::ConversionBlocked(path));
        }
        let replacement = Block::ListItem(converted_item(&block, kind, attrs));
        if replacement == block {
            continue;
        }
        let path = if block.is_list_item() {
            path
        } else {
            lift_until_accepted(tx, schema, path)?
        };
        tx.step(Step::ReplaceBlock {
            path,
            block: replacement,
        })?;
        changed = true;
    }
    Ok(changed)
}

fn converted_item(block: &Block, kind: ListKind, attrs: ListAttrs) -> ListItem {
    let existing = block.as_list_item();
    let indent = attrs
        .indent
        .or(existing.map(|item| item.indent))
        .unwrap_or(0);
    let variant = match existing {
        Some(item) if item.kind() == kind => match item.variant {
            ListVariant::Task { checked } => ListVariant::Task {
                checked: attrs.checked.unwrap_or(checked),
            },
            other => other,
        },
        _ => ListVariant::new(kind, attrs.checked.unwrap_or(false)),
    };
    ListItem {
        indent,
        variant,
        temp_propped: existing.is_some_and(|item| item.temp_propped),
        content: block.content().cloned().unwrap_or_default(),
    }
}

/// Lifts the block at `path` out of containers that refuse list items.
fn lift_until_accepted(
    tx: &mut Transaction,
    schema: &Schema,
    mut path: BlockPath,
) -> Result<BlockPath, ListError> {
    loop {
        let Some(container) = path.parent() else {
            return Err(ListError::ConversionBlocked(path));
        };
        if schema.container_accepts_list(tx.doc(), &container) {
            return Ok(path);
        }
        debug!("lifting {path} before converting it to a list item");
        let step = Step::Lift { path: path.clone() };
        let lifted = step
            .map_position(&Position::new(path.clone(), 0), tx.doc())
            .path;
        if tx.step(step).is_err() {
            return Err(ListError::ConversionBlocked(path));
        }
        path = lifted;
    }
}

pub(crate) fn indent_in(tx: &mut Transaction) -> bool {
    let mut changed = false;
    for path in selected_list_items(tx.doc(), tx.selection()) {
        let Some(item) = tx.doc().list_item(&path) else {
            continue;
        };
        let indent = item.indent + 1;
        let previous = path
            .previous_sibling()
            .and_then(|sibling| tx.doc().list_item(&sibling))
            .map_or(-1, |sibling| sibling.indent as isize);
        if indent as isize > previous + 1 {
            trace!("indenting {path} would break the staircase");
            continue;
        }
        if tx.step(Step::SetIndent { path, indent }).is_err() {
            return false;
        }
        changed = true;
    }
    changed
}

pub(crate) fn dedent_in(tx: &mut Transaction, can_convert: bool) -> bool {
    // Last changed item and its indent before this command.
    let mut last: Option<(BlockPath, usize)> = None;
    for path in selected_list_items(tx.doc(), tx.selection()) {
        let Some(item) = tx.doc().list_item(&path) else {
            continue;
        };
        let original = item.indent;
        let step = if original > 0 {
            Step::SetIndent {
                path: path.clone(),
                indent: original - 1,
            }
        } else if can_convert {
            Step::ReplaceBlock {
                path: path.clone(),
                block: Block::Paragraph {
                    content: item.content.clone(),
                },
            }
        } else {
            continue;
        };
        if tx.step(step).is_err() {
            return false;
        }
        last = Some((path, original));
    }

    let Some((path, original)) = last else {
        return false;
    };
    let mut next = path.next_sibling();
    while let Some(sibling) = next {
        let Some(item) = tx.doc().list_item(&sibling) else {
            break;
        };
        if item.indent <= original {
            break;
        }
        let indent = item.indent - 1;
        trace!("cascading dedent to {sibling}");
        if tx
            .step(Step::SetIndent {
                path: sibling.clone(),
                indent,
            })
            .is_err()
        {
            return false;
        }
        next = sibling.next_sibling();
    }
    true
}
