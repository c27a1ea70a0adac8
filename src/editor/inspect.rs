use crate::document::{Block, BlockPath, Document, ListItem, ListKind};
use crate::selection::Selection;

use super::Editor;

/// Paths of the list items touched by `selection`, in document order.
pub(crate) fn selected_list_items(doc: &Document, selection: &Selection) -> Vec<BlockPath> {
    let mut paths: Vec<BlockPath> = selection
        .textblocks(doc)
        .into_iter()
        .filter(|path| doc.list_item(path).is_some())
        .collect();
    paths.sort();
    paths
}

/// Text blocks touched by `selection`, in document order.
pub(crate) fn selected_textblocks(doc: &Document, selection: &Selection) -> Vec<BlockPath> {
    let mut paths = selection.textblocks(doc);
    paths.sort();
    paths
}

pub(crate) fn is_empty_list_item(block: &Block) -> bool {
    block.is_list_item() && block.content_len() == 0
}

impl Editor {
    /// List item holding the cursor, if any.
    pub fn current_list_item(&self) -> Option<&ListItem> {
        self.document.list_item(&self.selection.head().path)
    }

    pub fn current_block(&self) -> Option<&Block> {
        self.document.block(&self.selection.head().path)
    }

    /// Every text block in the selection is a list item of `kind`.
    pub fn is_list_active(&self, kind: ListKind) -> bool {
        let paths = selected_textblocks(&self.document, &self.selection);
        !paths.is_empty()
            && paths.iter().all(|path| {
                self.document
                    .list_item(path)
                    .is_some_and(|item| item.kind() == kind)
            })
    }

    /// Whether [`Editor::indent`] would change anything.
    pub fn can_indent(&self) -> bool {
        let mut tx = self.transaction();
        super::commands::indent_in(&mut tx)
    }

    /// Whether [`Editor::dedent`] without conversion would change anything.
    pub fn can_dedent(&self) -> bool {
        selected_list_items(&self.document, &self.selection)
            .iter()
            .any(|path| self.document.list_item(path).is_some_and(|item| item.indent > 0))
    }
}

/// Every non-container block in document order, rules included.
pub(crate) fn leaf_blocks(doc: &Document) -> Vec<BlockPath> {
    fn walk(blocks: &[Block], parent: &BlockPath, out: &mut Vec<BlockPath>) {
        for (idx, block) in blocks.iter().enumerate() {
            let path = parent.child(idx);
            match block {
                Block::Quote { children } => walk(children, &path, out),
                _ => out.push(path),
            }
        }
    }
    let mut out = Vec::new();
    walk(&doc.blocks, &BlockPath::root(), &mut out);
    out
}
