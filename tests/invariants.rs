//! Property-based tests for the flat list invariants
//!
//! These check that, whatever the user does:
//! - list items never skip a level (each indent is at most one deeper than
//!   the item before it, and a list starts at level 0)
//! - ordered counters and temporary placeholders are always settled
//! - nested HTML export parses back to the same indents

use flatlist::html::blocks_to_html;
use flatlist::paste::{self, PasteContext};
use flatlist::postprocess::{self, PostprocessOptions};
use flatlist::{
    Block, Command, Document, Editor, EditorConfig, ExportTarget, ListItem, ListKind, Motion,
    Position, Selection, Slice, parse_html,
};
use proptest::prelude::*;

/// Indents that already form a valid staircase.
fn staircase_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..4, 1..12).prop_map(|steps| {
        let mut indents = Vec::with_capacity(steps.len());
        let mut previous: Option<usize> = None;
        for step in steps {
            let indent = step.min(previous.map_or(0, |prev| prev + 1));
            indents.push(indent);
            previous = Some(indent);
        }
        indents
    })
}

fn kind_strategy() -> impl Strategy<Value = ListKind> {
    prop_oneof![
        Just(ListKind::Ordered),
        Just(ListKind::Unordered),
        Just(ListKind::Task),
    ]
}

/// A document of list items with occasional paragraphs in between.
fn document_strategy() -> impl Strategy<Value = Document> {
    staircase_strategy()
        .prop_flat_map(|indents| {
            let len = indents.len();
            (
                Just(indents),
                prop::collection::vec(kind_strategy(), len),
                prop::collection::vec(prop::bool::weighted(0.1), len),
            )
        })
        .prop_map(|(indents, kinds, breaks)| {
            let blocks = indents
                .iter()
                .zip(kinds)
                .zip(breaks)
                .enumerate()
                .map(|(idx, ((indent, kind), paragraph))| {
                    let text = format!("item {idx}");
                    if paragraph {
                        Block::paragraph(&text)
                    } else {
                        ListItem::new(kind).with_indent(*indent).with_text(&text).into()
                    }
                })
                .collect();
            Document::new().with_blocks(blocks)
        })
}

#[derive(Clone, Debug)]
enum Action {
    Run(Command),
    Select(usize, usize),
    Paste(Vec<usize>),
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Indent),
        Just(Command::Dedent),
        Just(Command::Enter),
        Just(Command::Backspace),
        Just(Command::Delete),
        Just(Command::ToggleChecked),
        Just(Command::Undo),
        Just(Command::Redo),
        Just(Command::Insert('x')),
        Just(Command::Move {
            motion: Motion::Down,
            extend: false
        }),
        Just(Command::Move {
            motion: Motion::Up,
            extend: true
        }),
        kind_strategy().prop_map(Command::ToggleList),
    ]
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        6 => command_strategy().prop_map(Action::Run),
        2 => (0usize..16, 0usize..16).prop_map(|(a, b)| Action::Select(a, b)),
        1 => prop::collection::vec(0usize..5, 1..5).prop_map(Action::Paste),
    ]
}

fn indent_action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Run(Command::Indent)),
        Just(Action::Run(Command::Dedent)),
        (0usize..16, 0usize..16).prop_map(|(a, b)| Action::Select(a, b)),
    ]
}

fn perform(editor: &mut Editor, action: &Action) {
    match action {
        Action::Run(command) => {
            editor.execute(*command);
        }
        Action::Select(anchor, head) => {
            let len = editor.document().blocks.len().max(1);
            editor.set_selection(Selection::range(
                Position::at_root(anchor % len, 0),
                Position::at_root(head % len, 0),
            ));
        }
        Action::Paste(indents) => {
            let blocks = indents
                .iter()
                .map(|indent| ListItem::unordered().with_indent(*indent).with_text("p").into())
                .collect();
            editor.paste(Slice::new(blocks));
        }
    }
}

/// First violation of the staircase in any container, as (container depth, index).
fn staircase_violation(blocks: &[Block], depth: usize) -> Option<(usize, usize)> {
    let mut previous: Option<usize> = None;
    for (idx, block) in blocks.iter().enumerate() {
        match block {
            Block::ListItem(item) => {
                if item.indent > previous.map_or(0, |prev| prev + 1) {
                    return Some((depth, idx));
                }
                previous = Some(item.indent);
            }
            Block::Quote { children } => {
                if let Some(found) = staircase_violation(children, depth + 1) {
                    return Some(found);
                }
                previous = None;
            }
            _ => previous = None,
        }
    }
    None
}

fn list_shape(blocks: &[Block]) -> Vec<(usize, ListKind)> {
    blocks
        .iter()
        .filter_map(|block| block.as_list_item().map(|item| (item.indent, item.kind())))
        .collect()
}

proptest! {
    #[test]
    fn edits_leave_the_document_settled(
        doc in document_strategy(),
        actions in prop::collection::vec(action_strategy(), 1..20),
    ) {
        let mut editor = Editor::new(doc, EditorConfig::default());
        for action in &actions {
            perform(&mut editor, action);
            let pending = postprocess::plan(editor.document(), PostprocessOptions::default());
            prop_assert!(
                pending.is_none(),
                "unsettled after {:?}: {:?}",
                action,
                pending
            );
        }
    }

    #[test]
    fn indent_commands_keep_the_staircase_without_repair(
        doc in document_strategy(),
        actions in prop::collection::vec(indent_action_strategy(), 1..20),
    ) {
        let config = EditorConfig::default().with_repair_staircase(false);
        let mut editor = Editor::new(doc, config);
        for action in &actions {
            perform(&mut editor, action);
            prop_assert_eq!(staircase_violation(&editor.document().blocks, 0), None);
        }
    }

    #[test]
    fn pasted_runs_start_at_the_drop_indent(
        indents in prop::collection::vec(0usize..6, 1..10),
        context_indent in 0usize..4,
    ) {
        let blocks = indents
            .iter()
            .map(|indent| ListItem::ordered().with_indent(*indent).with_text("x").into())
            .collect();
        let mut slice = Slice::new(blocks);
        paste::normalize(&mut slice, PasteContext { indent: context_indent, at_item_start: true });

        let result: Vec<usize> = slice.indents().into_iter().flatten().collect();
        prop_assert_eq!(result[0], context_indent);
        for pair in result.windows(2) {
            prop_assert!(pair[1] <= pair[0] + 1, "jump in {:?}", result);
        }
    }

    #[test]
    fn postprocess_is_idempotent(
        doc in document_strategy(),
        shifts in prop::collection::vec(0usize..3, 12),
    ) {
        let mut doc = doc;
        for (block, shift) in doc.blocks.iter_mut().zip(shifts) {
            if let Some(item) = block.as_list_item_mut() {
                item.indent += shift;
            }
        }
        postprocess::run(&mut doc, PostprocessOptions::default()).unwrap();
        let settled = doc.clone();
        prop_assert!(!postprocess::run(&mut doc, PostprocessOptions::default()).unwrap());
        prop_assert_eq!(doc, settled);
    }

    #[test]
    fn document_export_parses_back_to_the_same_indents(
        indents in staircase_strategy(),
        kind in prop_oneof![Just(ListKind::Ordered), Just(ListKind::Unordered)],
    ) {
        let blocks: Vec<Block> = indents
            .iter()
            .enumerate()
            .map(|(idx, indent)| {
                ListItem::new(kind).with_indent(*indent).with_text(&format!("i{idx}")).into()
            })
            .collect();
        let html = blocks_to_html(&blocks, ExportTarget::Document);
        let parsed = parse_html(&html);
        prop_assert_eq!(list_shape(&parsed.blocks), list_shape(&blocks), "html: {}", html);
    }

    #[test]
    fn clipboard_export_keeps_any_indents(
        items in prop::collection::vec(
            (0usize..5, prop_oneof![Just(ListKind::Ordered), Just(ListKind::Unordered)]),
            1..10,
        ),
    ) {
        let blocks: Vec<Block> = items
            .iter()
            .enumerate()
            .map(|(idx, (indent, kind))| {
                ListItem::new(*kind).with_indent(*indent).with_text(&format!("i{idx}")).into()
            })
            .collect();
        let html = blocks_to_html(&blocks, ExportTarget::Clipboard);
        let parsed = parse_html(&html);
        prop_assert_eq!(list_shape(&parsed.blocks), list_shape(&blocks), "html: {}", html);
    }
}
