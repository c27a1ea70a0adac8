use crate::document::{Block, BlockPath, Document, ListKind};

/// Node schema declared by the host: which list kinds exist as text blocks
/// and where list items may live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    list_kinds: Vec<ListKind>,
    quote_accepts_lists: bool,
}

impl Schema {
    pub fn new() -> Self {
        Self {
            list_kinds: ListKind::ALL.to_vec(),
            quote_accepts_lists: true,
        }
    }

    pub fn with_list_kinds(mut self, kinds: &[ListKind]) -> Self {
        self.list_kinds = kinds.to_vec();
        self
    }

    pub fn with_quote_accepts_lists(mut self, accepts: bool) -> Self {
        self.quote_accepts_lists = accepts;
        self
    }

    pub fn list_kinds(&self) -> &[ListKind] {
        &self.list_kinds
    }

    /// True when `kind` is registered as a text block node type.
    pub fn is_textblock_kind(&self, kind: ListKind) -> bool {
        self.list_kinds.contains(&kind)
    }

    /// Code blocks keep raw text and are never turned into list items.
    pub fn can_become_list_item(&self, block: &Block) -> bool {
        block.is_textblock() && !matches!(block, Block::CodeBlock { .. })
    }

    /// Whether the container at `container` may hold a list item.
    pub fn container_accepts_list(&self, document: &Document, container: &BlockPath) -> bool {
        if container.is_root() {
            return true;
        }
        match document.block(container) {
            Some(Block::Quote { .. }) => self.quote_accepts_lists,
            _ => false,
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}
