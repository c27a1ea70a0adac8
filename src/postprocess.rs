//! Document-wide repair pass run after every accepted change.
//!
//! [`plan`] is a pure function of the document: it recomputes ordered-list
//! counters, collects temp-propped items whose placeholder must go, and
//! (optionally) clamps indents that break the staircase. [`apply`] turns the
//! plan into steps on the transaction that triggered it.

use log::{debug, trace};

use crate::document::{Block, BlockPath, Document, ListVariant, PLACEHOLDER};
use crate::editor::content::starts_with_char;
use crate::error::StepError;
use crate::selection::Selection;
use crate::transaction::{Step, Transaction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostprocessOptions {
    pub repair_staircase: bool,
}

impl Default for PostprocessOptions {
    fn default() -> Self {
        Self {
            repair_staircase: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlaceholderDeletion {
    pub path: BlockPath,
    pub from: usize,
    pub to: usize,
}

/// Corrective rewrites for one document state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixupPlan {
    pub indents: Vec<(BlockPath, usize)>,
    pub counters: Vec<(BlockPath, u32)>,
    pub unprops: Vec<BlockPath>,
    /// Sorted in descending document order.
    pub deletions: Vec<PlaceholderDeletion>,
}

impl FixupPlan {
    pub fn is_empty(&self) -> bool {
        self.indents.is_empty()
            && self.counters.is_empty()
            && self.unprops.is_empty()
            && self.deletions.is_empty()
    }
}

/// Computes the fixups `doc` needs, or `None` when it is already consistent.
pub fn plan(doc: &Document, options: PostprocessOptions) -> Option<FixupPlan> {
    let mut plan = FixupPlan::default();
    scan_container(&doc.blocks, &BlockPath::root(), options, &mut plan);
    plan.deletions.sort_by(|a, b| b.cmp(a));
    if plan.is_empty() { None } else { Some(plan) }
}

fn scan_container(
    blocks: &[Block],
    parent: &BlockPath,
    options: PostprocessOptions,
    plan: &mut FixupPlan,
) {
    // Last counter seen per indent level since the last reset.
    let mut counters: Vec<Option<u32>> = Vec::new();
    let mut previous_indent: Option<usize> = None;

    for (idx, block) in blocks.iter().enumerate() {
        let path = parent.child(idx);
        match block {
            Block::ListItem(item) => {
                let mut indent = item.indent;
                if options.repair_staircase {
                    let max = previous_indent.map_or(0, |prev| prev + 1);
                    if indent > max {
                        trace!("clamping indent {indent} -> {max} at {path}");
                        indent = max;
                        plan.indents.push((path.clone(), indent));
                    }
                }
                previous_indent = Some(indent);

                match item.variant {
                    ListVariant::Ordered { counter } => {
                        if counters.len() <= indent {
                            counters.resize(indent + 1, None);
                        }
                        let next = counters[indent].map_or(1, |last| last + 1);
                        counters[indent] = Some(next);
                        counters.truncate(indent + 1);
                        if counter != next {
                            plan.counters.push((path.clone(), next));
                        }
                    }
                    ListVariant::Unordered | ListVariant::Task { .. } => {
                        counters.truncate(indent);
                    }
                }

                if item.temp_propped {
                    plan.unprops.push(path.clone());
                    if starts_with_char(&item.content, PLACEHOLDER) {
                        plan.deletions.push(PlaceholderDeletion {
                            path,
                            from: 0,
                            to: 1,
                        });
                    }
                }
            }
            Block::Quote { children } => {
                counters.clear();
                previous_indent = None;
                scan_container(children, &path, options, plan);
            }
            Block::Paragraph { .. }
            | Block::Heading { .. }
            | Block::CodeBlock { .. }
            | Block::Rule => {
                counters.clear();
                previous_indent = None;
            }
        }
    }
}

/// Appends the plan's rewrites to `tx`.
pub fn apply(plan: &FixupPlan, tx: &mut Transaction) -> Result<(), StepError> {
    debug!(
        "postprocess: {} indents, {} counters, {} placeholders",
        plan.indents.len(),
        plan.counters.len(),
        plan.unprops.len()
    );
    for (path, indent) in &plan.indents {
        tx.step(Step::SetIndent {
            path: path.clone(),
            indent: *indent,
        })?;
    }
    for (path, counter) in &plan.counters {
        tx.step(Step::SetCounter {
            path: path.clone(),
            counter: *counter,
        })?;
    }
    for path in &plan.unprops {
        tx.step(Step::ClearTempProp { path: path.clone() })?;
    }
    for deletion in &plan.deletions {
        tx.step(Step::DeleteText {
            path: deletion.path.clone(),
            from: deletion.from,
            to: deletion.to,
        })?;
    }
    Ok(())
}

/// Runs the pass directly on a document outside of an editor.
/// Returns true when anything was rewritten.
pub fn run(doc: &mut Document, options: PostprocessOptions) -> Result<bool, StepError> {
    let Some(plan) = plan(doc, options) else {
        return Ok(false);
    };
    let mut tx = Transaction::new(std::mem::take(doc), Selection::default());
    let result = apply(&plan, &mut tx);
    let (updated, _) = tx.into_parts();
    *doc = updated;
    result.map(|_| true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ListItem, Span};

    fn ordered(indent: usize) -> Block {
        ListItem::ordered().with_indent(indent).with_text("o").into()
    }

    fn bullet(indent: usize) -> Block {
        ListItem::unordered().with_indent(indent).with_text("u").into()
    }

    fn counters(doc: &Document) -> Vec<Option<u32>> {
        doc.list_items().iter().map(|item| item.variant.counter()).collect()
    }

    fn processed(blocks: Vec<Block>) -> Document {
        let mut doc = Document::new().with_blocks(blocks);
        run(&mut doc, PostprocessOptions::default()).unwrap();
        doc
    }

    #[test]
    fn counters_continue_across_deeper_runs() {
        let doc = processed(vec![ordered(0), ordered(1), ordered(1), ordered(0)]);
        assert_eq!(counters(&doc), vec![Some(1), Some(1), Some(2), Some(2)]);
    }

    #[test]
    fn shallower_ordered_item_restarts_deeper_counters() {
        let doc = processed(vec![ordered(0), ordered(1), ordered(0), ordered(1)]);
        assert_eq!(counters(&doc), vec![Some(1), Some(1), Some(2), Some(1)]);
    }

    #[test]
    fn bullet_at_same_level_resets_counter() {
        let doc = processed(vec![ordered(0), ordered(0), bullet(0), ordered(0)]);
        assert_eq!(counters(&doc), vec![Some(1), Some(2), None, Some(1)]);
    }

    #[test]
    fn deeper_bullet_keeps_outer_counter() {
        let doc = processed(vec![ordered(0), bullet(1), ordered(0)]);
        assert_eq!(counters(&doc), vec![Some(1), None, Some(2)]);
    }

    #[test]
    fn paragraph_breaks_every_list() {
        let doc = processed(vec![
            ordered(0),
            ordered(0),
            Block::paragraph("break"),
            ordered(0),
        ]);
        assert_eq!(counters(&doc), vec![Some(1), Some(2), Some(1)]);
    }

    #[test]
    fn quote_edges_reset_counters() {
        let doc = processed(vec![
            ordered(0),
            Block::quote(vec![ordered(0), ordered(0)]),
            ordered(0),
        ]);
        assert_eq!(counters(&doc), vec![Some(1), Some(1), Some(2), Some(1)]);
    }

    #[test]
    fn propped_items_lose_marker_and_placeholder() {
        let doc = processed(vec![
            ListItem::unordered().with_text("first").propped().into(),
            ListItem::unordered().with_indent(1).with_text("second").propped().into(),
        ]);
        let items = doc.list_items();
        assert!(items.iter().all(|item| !item.temp_propped));
        assert_eq!(items[0].content, vec![Span::new_text("first")]);
        assert_eq!(items[1].content, vec![Span::new_text("second")]);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut doc = Document::new().with_blocks(vec![
            ordered(0),
            ListItem::ordered().with_indent(3).with_text("x").propped().into(),
            bullet(0),
        ]);
        assert!(run(&mut doc, PostprocessOptions::default()).unwrap());
        assert_eq!(plan(&doc, PostprocessOptions::default()), None);
    }

    #[test]
    fn staircase_violations_are_clamped() {
        let doc = processed(vec![
            bullet(2),
            bullet(0),
            bullet(3),
            Block::paragraph("p"),
            bullet(1),
        ]);
        let indents: Vec<usize> = doc.list_items().iter().map(|item| item.indent).collect();
        assert_eq!(indents, vec![0, 0, 1, 0]);
    }

    #[test]
    fn staircase_repair_can_be_disabled() {
        let mut doc = Document::new().with_blocks(vec![bullet(0), bullet(3)]);
        let options = PostprocessOptions {
            repair_staircase: false,
        };
        assert!(!run(&mut doc, options).unwrap());
        assert_eq!(doc.list_items()[1].indent, 3);
    }

    #[test]
    fn deletions_are_ordered_last_to_first() {
        let doc = Document::new().with_blocks(vec![
            ListItem::unordered().with_text("a").propped().into(),
            Block::paragraph("p"),
            ListItem::unordered().with_text("b").propped().into(),
        ]);
        let plan = plan(&doc, PostprocessOptions::default()).unwrap();
        let paths: Vec<BlockPath> = plan.deletions.iter().map(|d| d.path.clone()).collect();
        assert_eq!(paths, vec![BlockPath::new_root(2), BlockPath::new_root(0)]);
    }
}
