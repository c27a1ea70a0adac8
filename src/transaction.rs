use crate::document::{Block, BlockPath, Document, InlineStyle, ListVariant, Span};
use crate::editor::content::{delete_range, insert_spans_at, spans_len, split_spans};
use crate::error::StepError;
use crate::selection::{Position, Selection};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    ReplaceBlock { path: BlockPath, block: Block },
    SetIndent { path: BlockPath, indent: usize },
    SetCounter { path: BlockPath, counter: u32 },
    SetChecked { path: BlockPath, checked: bool },
    ClearTempProp { path: BlockPath },
    InsertContent { path: BlockPath, offset: usize, content: Vec<Span> },
    DeleteText { path: BlockPath, from: usize, to: usize },
    /// Cuts the block at `offset`; the trailing content moves into `tail`,
    /// inserted as the next sibling.
    Split { path: BlockPath, offset: usize, tail: Block },
    /// Appends the content of `source` to `target` and removes `source`.
    Join { target: BlockPath, source: BlockPath },
    /// Inserts `blocks` before the position named by `path`.
    InsertBlocks { path: BlockPath, blocks: Vec<Block> },
    RemoveBlock { path: BlockPath },
    /// Moves a block out of its quote, splitting the quote around it.
    Lift { path: BlockPath },
}

impl Step {
    pub fn apply(&self, doc: &mut Document) -> Result<(), StepError> {
        match self {
            Step::ReplaceBlock { path, block } => {
                let slot = doc
                    .block_mut(path)
                    .ok_or_else(|| StepError::MissingBlock(path.clone()))?;
                *slot = block.clone();
            }
            Step::SetIndent { path, indent } => {
                list_item_mut(doc, path)?.indent = *indent;
            }
            Step::SetCounter { path, counter } => {
                let item = list_item_mut(doc, path)?;
                match &mut item.variant {
                    ListVariant::Ordered { counter: current } => *current = *counter,
                    _ => return Err(StepError::NotListItem(path.clone())),
                }
            }
            Step::SetChecked { path, checked } => {
                let item = list_item_mut(doc, path)?;
                match &mut item.variant {
                    ListVariant::Task { checked: current } => *current = *checked,
                    _ => return Err(StepError::NotListItem(path.clone())),
                }
            }
            Step::ClearTempProp { path } => {
                list_item_mut(doc, path)?.temp_propped = false;
            }
            Step::InsertContent {
                path,
                offset,
                content,
            } => {
                let spans = content_mut(doc, path)?;
                if *offset > spans_len(spans) {
                    return Err(StepError::OffsetOutOfRange {
                        path: path.clone(),
                        offset: *offset,
                    });
                }
                insert_spans_at(spans, *offset, content.clone());
            }
            Step::DeleteText { path, from, to } => {
                let spans = content_mut(doc, path)?;
                if from > to || *to > spans_len(spans) {
                    return Err(StepError::OffsetOutOfRange {
                        path: path.clone(),
                        offset: *to,
                    });
                }
                delete_range(spans, *from, *to);
            }
            Step::Split { path, offset, tail } => {
                let spans = content_mut(doc, path)?;
                if *offset > spans_len(spans) {
                    return Err(StepError::OffsetOutOfRange {
                        path: path.clone(),
                        offset: *offset,
                    });
                }
                let trailing = split_spans(spans, *offset);
                let mut tail = tail.clone();
                let tail_content = tail
                    .content_mut()
                    .ok_or_else(|| StepError::NotTextblock(path.clone()))?;
                *tail_content = trailing;
                let (container, idx) = container_slot(doc, path)?;
                container.insert(idx + 1, tail);
            }
            Step::Join { target, source } => {
                let moved = doc
                    .block(source)
                    .ok_or_else(|| StepError::MissingBlock(source.clone()))?
                    .content()
                    .cloned()
                    .ok_or_else(|| StepError::NotTextblock(source.clone()))?;
                let spans = content_mut(doc, target)?;
                let end = spans_len(spans);
                insert_spans_at(spans, end, moved);
                let (container, idx) = container_slot(doc, source)?;
                container.remove(idx);
            }
            Step::InsertBlocks { path, blocks } => {
                let parent = path
                    .parent()
                    .ok_or_else(|| StepError::MissingBlock(path.clone()))?;
                let idx = path.index().unwrap_or(0);
                let container = doc
                    .container_mut(&parent)
                    .ok_or_else(|| StepError::MissingBlock(parent.clone()))?;
                if idx > container.len() {
                    return Err(StepError::MissingBlock(path.clone()));
                }
                container.splice(idx..idx, blocks.iter().cloned());
            }
            Step::RemoveBlock { path } => {
                let (container, idx) = container_slot(doc, path)?;
                container.remove(idx);
            }
            Step::Lift { path } => lift_block(doc, path)?,
        }
        Ok(())
    }

    /// Where `pos` ends up once this step is applied to `before`.
    pub fn map_position(&self, pos: &Position, before: &Document) -> Position {
        match self {
            Step::ReplaceBlock { path, block } => {
                if &pos.path == path {
                    Position::new(pos.path.clone(), pos.offset.min(block.content_len()))
                } else {
                    pos.clone()
                }
            }
            Step::SetIndent { .. }
            | Step::SetCounter { .. }
            | Step::SetChecked { .. }
            | Step::ClearTempProp { .. } => pos.clone(),
            Step::InsertContent {
                path,
                offset,
                content,
            } => {
                if &pos.path == path && pos.offset >= *offset {
                    Position::new(pos.path.clone(), pos.offset + spans_len(content))
                } else {
                    pos.clone()
                }
            }
            Step::DeleteText { path, from, to } => {
                if &pos.path != path || pos.offset <= *from {
                    pos.clone()
                } else if pos.offset >= *to {
                    Position::new(pos.path.clone(), pos.offset - (to - from))
                } else {
                    Position::new(pos.path.clone(), *from)
                }
            }
            Step::Split { path, offset, .. } => {
                if &pos.path == path && pos.offset >= *offset {
                    let idx = path.index().unwrap_or(0);
                    let tail_path = path.sibling(idx + 1).unwrap_or_else(|| path.clone());
                    Position::new(tail_path, pos.offset - offset)
                } else {
                    shift_following(pos, path, 1)
                }
            }
            Step::Join { target, source } => {
                let mapped = if &pos.path == source {
                    let target_len = before.block(target).map(Block::content_len).unwrap_or(0);
                    Position::new(target.clone(), target_len + pos.offset)
                } else {
                    pos.clone()
                };
                shift_following(&mapped, source, -1)
            }
            Step::InsertBlocks { path, blocks } => {
                let count = blocks.len() as isize;
                match path.index() {
                    Some(idx) if idx > 0 => match path.sibling(idx - 1) {
                        Some(previous) => shift_following(pos, &previous, count),
                        None => pos.clone(),
                    },
                    _ => shift_from_start(pos, path, count),
                }
            }
            Step::RemoveBlock { path } => {
                if pos.path.starts_with(path) {
                    Position::new(path.clone(), 0)
                } else {
                    shift_following(pos, path, -1)
                }
            }
            Step::Lift { path } => map_through_lift(pos, path, before),
        }
    }
}

fn list_item_mut<'a>(
    doc: &'a mut Document,
    path: &BlockPath,
) -> Result<&'a mut crate::document::ListItem, StepError> {
    match doc.block_mut(path) {
        Some(Block::ListItem(item)) => Ok(item),
        Some(_) => Err(StepError::NotListItem(path.clone())),
        None => Err(StepError::MissingBlock(path.clone())),
    }
}

fn content_mut<'a>(
    doc: &'a mut Document,
    path: &BlockPath,
) -> Result<&'a mut Vec<Span>, StepError> {
    doc.block_mut(path)
        .ok_or_else(|| StepError::MissingBlock(path.clone()))?
        .content_mut()
        .ok_or_else(|| StepError::NotTextblock(path.clone()))
}

fn container_slot<'a>(
    doc: &'a mut Document,
    path: &BlockPath,
) -> Result<(&'a mut Vec<Block>, usize), StepError> {
    let parent = path
        .parent()
        .ok_or_else(|| StepError::MissingBlock(path.clone()))?;
    let idx = path
        .index()
        .ok_or_else(|| StepError::MissingBlock(path.clone()))?;
    let container = doc
        .container_mut(&parent)
        .ok_or_else(|| StepError::MissingBlock(parent.clone()))?;
    if idx >= container.len() {
        return Err(StepError::MissingBlock(path.clone()));
    }
    Ok((container, idx))
}

fn lift_block(doc: &mut Document, path: &BlockPath) -> Result<(), StepError> {
    let quote_path = path
        .parent()
        .filter(|parent| !parent.is_root())
        .ok_or_else(|| StepError::CannotLift(path.clone()))?;
    let idx = path
        .index()
        .ok_or_else(|| StepError::CannotLift(path.clone()))?;
    let (container, quote_idx) = container_slot(doc, &quote_path)?;
    let Block::Quote { children } = &mut container[quote_idx] else {
        return Err(StepError::CannotLift(path.clone()));
    };
    if idx >= children.len() {
        return Err(StepError::MissingBlock(path.clone()));
    }
    let mut after = children.split_off(idx);
    let lifted = after.remove(0);
    let before = std::mem::take(children);

    let mut replacement = Vec::new();
    if !before.is_empty() {
        replacement.push(Block::Quote { children: before });
    }
    replacement.push(lifted);
    if !after.is_empty() {
        replacement.push(Block::Quote { children: after });
    }
    container.splice(quote_idx..=quote_idx, replacement);
    Ok(())
}

/// Shifts positions inside siblings that follow `anchor` in its container.
fn shift_following(pos: &Position, anchor: &BlockPath, delta: isize) -> Position {
    let (Some(parent), Some(idx)) = (anchor.parent(), anchor.index()) else {
        return pos.clone();
    };
    let depth = parent.depth();
    if pos.path.depth() <= depth || !pos.path.starts_with(&parent) {
        return pos.clone();
    }
    let step = pos.path.steps()[depth];
    if step <= idx {
        return pos.clone();
    }
    let mut mapped = pos.clone();
    mapped.path.steps_mut()[depth] = (step as isize + delta).max(0) as usize;
    mapped
}

/// Shifts positions in the container of `first` whose index is at least `first`'s.
fn shift_from_start(pos: &Position, first: &BlockPath, delta: isize) -> Position {
    let Some(parent) = first.parent() else {
        return pos.clone();
    };
    let depth = parent.depth();
    if pos.path.depth() <= depth || !pos.path.starts_with(&parent) {
        return pos.clone();
    }
    let mut mapped = pos.clone();
    let step = mapped.path.steps()[depth];
    mapped.path.steps_mut()[depth] = (step as isize + delta).max(0) as usize;
    mapped
}

fn map_through_lift(pos: &Position, path: &BlockPath, before: &Document) -> Position {
    let (Some(quote_path), Some(idx)) = (path.parent(), path.index()) else {
        return pos.clone();
    };
    let (Some(outer), Some(quote_idx)) = (quote_path.parent(), quote_path.index()) else {
        return pos.clone();
    };
    let child_count = before
        .container(&quote_path)
        .map(Vec::len)
        .unwrap_or(0);
    let has_before = idx > 0;
    let has_after = idx + 1 < child_count;
    let lifted_idx = quote_idx + usize::from(has_before);

    if pos.path.starts_with(&quote_path) && pos.path.depth() > quote_path.depth() {
        let depth = quote_path.depth();
        let child = pos.path.steps()[depth];
        let rest = &pos.path.steps()[depth + 1..];
        let mut steps = outer.steps().to_vec();
        if child < idx {
            return pos.clone();
        } else if child == idx {
            steps.push(lifted_idx);
        } else {
            steps.push(lifted_idx + 1);
            steps.push(child - idx - 1);
        }
        steps.extend_from_slice(rest);
        return Position::new(BlockPath::new(steps), pos.offset);
    }

    let added = usize::from(has_before) + usize::from(has_after);
    shift_following(pos, &quote_path, added as isize)
}

/// A working copy of the document plus the steps applied to it.
#[derive(Clone, Debug)]
pub struct Transaction {
    doc: Document,
    selection: Selection,
    steps: Vec<Step>,
    stored_style: Option<InlineStyle>,
    stored_style_set: bool,
    add_to_history: bool,
}

impl Transaction {
    pub fn new(doc: Document, selection: Selection) -> Self {
        Self {
            doc,
            selection,
            steps: Vec::new(),
            stored_style: None,
            stored_style_set: false,
            add_to_history: true,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn stored_style(&self) -> Option<InlineStyle> {
        self.stored_style
    }

    pub fn stored_style_is_set(&self) -> bool {
        self.stored_style_set
    }

    pub fn set_stored_style(&mut self, style: Option<InlineStyle>) {
        self.stored_style = style;
        self.stored_style_set = true;
    }

    pub fn add_to_history(&self) -> bool {
        self.add_to_history
    }

    pub fn set_add_to_history(&mut self, add: bool) {
        self.add_to_history = add;
    }

    /// Applies `step` to the working copy and maps the selection through it.
    pub fn step(&mut self, step: Step) -> Result<(), StepError> {
        let mut mapped = self.selection.clone();
        for range in mapped.ranges_mut() {
            range.anchor = step.map_position(&range.anchor, &self.doc);
            range.head = step.map_position(&range.head, &self.doc);
        }
        step.apply(&mut self.doc)?;
        self.selection = mapped;
        self.steps.push(step);
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (Document, Selection) {
        (self.doc, self.selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ListItem;

    fn doc() -> Document {
        Document::new().with_blocks(vec![
            Block::paragraph("before"),
            Block::quote(vec![
                Block::paragraph("one"),
                Block::paragraph("two"),
                Block::paragraph("three"),
            ]),
            Block::paragraph("after"),
        ])
    }

    #[test]
    fn lift_splits_the_quote_and_maps_positions() {
        let mut tx = Transaction::new(
            doc(),
            Selection::cursor(Position::new(BlockPath::new(vec![1, 2]), 2)),
        );
        tx.step(Step::Lift {
            path: BlockPath::new(vec![1, 1]),
        })
        .unwrap();

        let blocks = &tx.doc().blocks;
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[2], Block::paragraph("two"));
        assert_eq!(blocks[1].children().unwrap().len(), 1);
        assert_eq!(blocks[3].children().unwrap().len(), 1);
        assert_eq!(
            tx.selection().head(),
            &Position::new(BlockPath::new(vec![3, 0]), 2)
        );
    }

    #[test]
    fn split_moves_trailing_content_and_cursor() {
        let mut tx = Transaction::new(
            Document::new().with_blocks(vec![ListItem::task(true).with_text("abcd").into()]),
            Selection::cursor(Position::at_root(0, 3)),
        );
        let tail = tx.doc().blocks[0].with_same_type(Vec::new());
        tx.step(Step::Split {
            path: BlockPath::new_root(0),
            offset: 2,
            tail,
        })
        .unwrap();

        assert_eq!(tx.doc().blocks[0].text(), "ab");
        assert_eq!(tx.doc().blocks[1].text(), "cd");
        assert_eq!(tx.doc().list_items()[1].variant, ListVariant::Task { checked: true });
        assert_eq!(tx.selection().head(), &Position::at_root(1, 1));
    }

    #[test]
    fn join_appends_content_and_maps_source_positions() {
        let mut tx = Transaction::new(
            doc(),
            Selection::cursor(Position::new(BlockPath::new(vec![1, 1]), 1)),
        );
        tx.step(Step::Join {
            target: BlockPath::new(vec![1, 0]),
            source: BlockPath::new(vec![1, 1]),
        })
        .unwrap();
        assert_eq!(tx.doc().blocks[1].children().unwrap()[0].text(), "onetwo");
        assert_eq!(
            tx.selection().head(),
            &Position::new(BlockPath::new(vec![1, 0]), 4)
        );
    }

    #[test]
    fn failed_step_leaves_working_copy_untouched() {
        let mut tx = Transaction::new(doc(), Selection::default());
        let err = tx
            .step(Step::SetIndent {
                path: BlockPath::new_root(0),
                indent: 1,
            })
            .unwrap_err();
        assert_eq!(err, StepError::NotListItem(BlockPath::new_root(0)));
        assert!(!tx.doc_changed());
        assert_eq!(tx.doc(), &doc());
    }

    #[test]
    fn delete_text_pulls_later_offsets_back() {
        let mut tx = Transaction::new(doc(), Selection::cursor(Position::at_root(0, 5)));
        tx.step(Step::DeleteText {
            path: BlockPath::new_root(0),
            from: 0,
            to: 2,
        })
        .unwrap();
        assert_eq!(tx.doc().blocks[0].text(), "fore");
        assert_eq!(tx.selection().head(), &Position::at_root(0, 3));
    }
}
