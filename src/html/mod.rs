//! HTML import and export.

pub mod dom;
pub mod fold;
pub mod parse;
pub mod serialize;

pub use fold::{fold_lists, ExportTarget};
pub use parse::parse_html;

use crate::document::{Block, Document};
use crate::paste::Slice;

/// Folded HTML for `blocks`.
pub fn blocks_to_html(blocks: &[Block], target: ExportTarget) -> String {
    let mut nodes = serialize::blocks_to_nodes(blocks);
    fold_lists(&mut nodes, target);
    dom::to_html(&nodes)
}

/// Folded HTML for the whole document.
pub fn document_to_html(document: &Document) -> String {
    blocks_to_html(&document.blocks, ExportTarget::Document)
}

/// Turns a copied slice into clipboard HTML.
pub trait ClipboardSerializer {
    fn serialize(&self, slice: &Slice) -> String;
}

/// Default clipboard serializer: nested lists that keep item indents.
#[derive(Clone, Copy, Debug, Default)]
pub struct FoldingSerializer;

impl ClipboardSerializer for FoldingSerializer {
    fn serialize(&self, slice: &Slice) -> String {
        blocks_to_html(&slice.blocks, ExportTarget::Clipboard)
    }
}

/// Serializer that leaves every item in its own wrapper.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatSerializer;

impl ClipboardSerializer for FlatSerializer {
    fn serialize(&self, slice: &Slice) -> String {
        dom::to_html(&serialize::blocks_to_nodes(&slice.blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ListItem, ListKind};

    fn bullets(indents: &[usize]) -> Vec<Block> {
        indents
            .iter()
            .enumerate()
            .map(|(idx, indent)| {
                ListItem::unordered()
                    .with_indent(*indent)
                    .with_text(&format!("item {idx}"))
                    .into()
            })
            .collect()
    }

    fn parsed_indents(html: &str) -> Vec<(usize, ListKind)> {
        parse_html(html)
            .blocks
            .iter()
            .filter_map(|block| block.as_list_item().map(|item| (item.indent, item.kind())))
            .collect()
    }

    #[test]
    fn document_export_round_trips_nesting() {
        let doc = Document::new().with_blocks(bullets(&[0, 1, 1]));
        let html = document_to_html(&doc);
        assert_eq!(
            html,
            "<ul><li>item 0<ul><li>item 1</li><li>item 2</li></ul></li></ul>"
        );
        assert_eq!(
            parsed_indents(&html),
            vec![
                (0, ListKind::Unordered),
                (1, ListKind::Unordered),
                (1, ListKind::Unordered)
            ]
        );
    }

    #[test]
    fn clipboard_round_trip_keeps_indents_nesting_cannot_express() {
        let slice = Slice::new(bullets(&[1, 0, 1]));
        let html = FoldingSerializer.serialize(&slice);
        let indents: Vec<usize> = parsed_indents(&html).iter().map(|(indent, _)| *indent).collect();
        assert_eq!(indents, vec![1, 0, 1]);
    }

    #[test]
    fn flat_serializer_does_not_nest() {
        let html = FlatSerializer.serialize(&Slice::new(bullets(&[0, 1])));
        assert_eq!(html.matches("<ul").count(), 2);
        assert!(!html.contains("</li><ul") && !html.contains("item 0<ul"));
    }
}
