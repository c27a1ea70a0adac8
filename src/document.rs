use std::fmt;

/// Synthetic character inserted in front of an item whose only content was a
/// nested list, so the item itself survives parsing.
pub const PLACEHOLDER: char = '\u{a0}';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    None,
    Bold,
    Italic,
    Underline,
    Strike,
    Highlight,
    Code,
    Link,
}

impl InlineStyle {
    /// Whether the style carries over to the new block when a block is split.
    pub fn is_splittable(self) -> bool {
        !matches!(self, InlineStyle::Link)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: InlineStyle,
    pub link_target: Option<String>,
}

impl Span {
    pub fn new_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: InlineStyle::None,
            link_target: None,
        }
    }

    pub fn styled(style: InlineStyle, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style,
            link_target: None,
        }
    }

    pub fn link(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: InlineStyle::Link,
            link_target: Some(target.into()),
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Ordered,
    Unordered,
    Task,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [ListKind::Ordered, ListKind::Unordered, ListKind::Task];

    pub fn name(self) -> &'static str {
        match self {
            ListKind::Ordered => "ordered",
            ListKind::Unordered => "unordered",
            ListKind::Task => "task",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ordered" => Some(ListKind::Ordered),
            "unordered" | "bullet" => Some(ListKind::Unordered),
            "task" => Some(ListKind::Task),
            _ => None,
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Variant-specific list attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListVariant {
    Ordered { counter: u32 },
    Unordered,
    Task { checked: bool },
}

impl ListVariant {
    pub fn new(kind: ListKind, checked: bool) -> Self {
        match kind {
            ListKind::Ordered => ListVariant::Ordered { counter: 1 },
            ListKind::Unordered => ListVariant::Unordered,
            ListKind::Task => ListVariant::Task { checked },
        }
    }

    pub fn kind(&self) -> ListKind {
        match self {
            ListVariant::Ordered { .. } => ListKind::Ordered,
            ListVariant::Unordered => ListKind::Unordered,
            ListVariant::Task { .. } => ListKind::Task,
        }
    }

    pub fn counter(&self) -> Option<u32> {
        match self {
            ListVariant::Ordered { counter } => Some(*counter),
            _ => None,
        }
    }

    pub fn checked(&self) -> Option<bool> {
        match self {
            ListVariant::Task { checked } => Some(*checked),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub indent: usize,
    pub variant: ListVariant,
    /// Content starts with [`PLACEHOLDER`] that must be removed on the next
    /// postprocess pass.
    pub temp_propped: bool,
    pub content: Vec<Span>,
}

impl ListItem {
    pub fn new(kind: ListKind) -> Self {
        Self {
            indent: 0,
            variant: ListVariant::new(kind, false),
            temp_propped: false,
            content: Vec::new(),
        }
    }

    pub fn ordered() -> Self {
        Self::new(ListKind::Ordered)
    }

    pub fn unordered() -> Self {
        Self::new(ListKind::Unordered)
    }

    pub fn task(checked: bool) -> Self {
        let mut item = Self::new(ListKind::Task);
        item.variant = ListVariant::Task { checked };
        item
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_content(mut self, content: Vec<Span>) -> Self {
        self.content = content;
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_content(vec![Span::new_text(text)])
    }

    pub fn propped(mut self) -> Self {
        self.temp_propped = true;
        self.content.insert(0, Span::new_text(PLACEHOLDER.to_string()));
        self
    }

    pub fn kind(&self) -> ListKind {
        self.variant.kind()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Paragraph { content: Vec<Span> },
    Heading { level: u8, content: Vec<Span> },
    CodeBlock { content: Vec<Span> },
    Quote { children: Vec<Block> },
    ListItem(ListItem),
    Rule,
}

impl Block {
    pub fn paragraph(text: &str) -> Self {
        Block::Paragraph {
            content: vec![Span::new_text(text)],
        }
    }

    pub fn empty_paragraph() -> Self {
        Block::Paragraph {
            content: Vec::new(),
        }
    }

    pub fn heading(level: u8, text: &str) -> Self {
        Block::Heading {
            level,
            content: vec![Span::new_text(text)],
        }
    }

    pub fn quote(children: Vec<Block>) -> Self {
        Block::Quote { children }
    }

    pub fn is_textblock(&self) -> bool {
        !matches!(self, Block::Quote { .. } | Block::Rule)
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, Block::ListItem(_))
    }

    pub fn as_list_item(&self) -> Option<&ListItem> {
        match self {
            Block::ListItem(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_list_item_mut(&mut self) -> Option<&mut ListItem> {
        match self {
            Block::ListItem(item) => Some(item),
            _ => None,
        }
    }

    pub fn content(&self) -> Option<&Vec<Span>> {
        match self {
            Block::Paragraph { content }
            | Block::Heading { content, .. }
            | Block::CodeBlock { content } => Some(content),
            Block::ListItem(item) => Some(&item.content),
            Block::Quote { .. } | Block::Rule => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut Vec<Span>> {
        match self {
            Block::Paragraph { content }
            | Block::Heading { content, .. }
            | Block::CodeBlock { content } => Some(content),
            Block::ListItem(item) => Some(&mut item.content),
            Block::Quote { .. } | Block::Rule => None,
        }
    }

    /// Consumes the block and returns its inline content.
    pub fn into_content(self) -> Vec<Span> {
        match self {
            Block::Paragraph { content }
            | Block::Heading { content, .. }
            | Block::CodeBlock { content } => content,
            Block::ListItem(item) => item.content,
            Block::Quote { .. } | Block::Rule => Vec::new(),
        }
    }

    pub fn children(&self) -> Option<&Vec<Block>> {
        match self {
            Block::Quote { children } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Block::Quote { children } => Some(children),
            _ => None,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Block::Quote { children } => children
                .iter()
                .map(Block::text)
                .collect::<Vec<_>>()
                .join("\n"),
            _ => self
                .content()
                .map(|spans| spans.iter().map(|span| span.text.as_str()).collect())
                .unwrap_or_default(),
        }
    }

    /// Length of the inline content in characters, 0 for non-text blocks.
    pub fn content_len(&self) -> usize {
        self.content()
            .map(|spans| spans.iter().map(Span::char_len).sum())
            .unwrap_or(0)
    }

    /// Same node type and attributes, different content.
    pub fn with_same_type(&self, content: Vec<Span>) -> Block {
        match self {
            Block::Heading { level, .. } => Block::Heading {
                level: *level,
                content,
            },
            Block::CodeBlock { .. } => Block::CodeBlock { content },
            Block::ListItem(item) => Block::ListItem(ListItem {
                indent: item.indent,
                variant: item.variant,
                temp_propped: false,
                content,
            }),
            Block::Paragraph { .. } | Block::Quote { .. } | Block::Rule => {
                Block::Paragraph { content }
            }
        }
    }
}

impl From<ListItem> for Block {
    fn from(item: ListItem) -> Self {
        Block::ListItem(item)
    }
}

/// Index path from the document root through quote containers.
///
/// The empty path names the root container itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockPath {
    steps: Vec<usize>,
}

impl BlockPath {
    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn new(steps: Vec<usize>) -> Self {
        Self { steps }
    }

    pub fn new_root(idx: usize) -> Self {
        Self { steps: vec![idx] }
    }

    pub fn child(&self, idx: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(idx);
        Self { steps }
    }

    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    pub fn index(&self) -> Option<usize> {
        self.steps.last().copied()
    }

    /// Path of the container holding this block.
    pub fn parent(&self) -> Option<BlockPath> {
        let (_, prefix) = self.steps.split_last()?;
        Some(BlockPath::new(prefix.to_vec()))
    }

    pub fn sibling(&self, idx: usize) -> Option<BlockPath> {
        let mut steps = self.steps.clone();
        *steps.last_mut()? = idx;
        Some(BlockPath { steps })
    }

    pub fn previous_sibling(&self) -> Option<BlockPath> {
        let idx = self.index()?;
        if idx == 0 {
            return None;
        }
        self.sibling(idx - 1)
    }

    pub fn next_sibling(&self) -> Option<BlockPath> {
        let idx = self.index()?;
        self.sibling(idx + 1)
    }

    /// True when `self` equals `ancestor` or lies inside it.
    pub fn starts_with(&self, ancestor: &BlockPath) -> bool {
        self.steps.starts_with(&ancestor.steps)
    }

    pub(crate) fn steps_mut(&mut self) -> &mut Vec<usize> {
        &mut self.steps
    }
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.steps.iter().map(ToString::to_string).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn block(&self, path: &BlockPath) -> Option<&Block> {
        let (first, rest) = path.steps().split_first()?;
        let mut block = self.blocks.get(*first)?;
        for idx in rest {
            block = block.children()?.get(*idx)?;
        }
        Some(block)
    }

    pub fn block_mut(&mut self, path: &BlockPath) -> Option<&mut Block> {
        let (first, rest) = path.steps().split_first()?;
        let mut block = self.blocks.get_mut(*first)?;
        for idx in rest {
            block = block.children_mut()?.get_mut(*idx)?;
        }
        Some(block)
    }

    pub fn list_item(&self, path: &BlockPath) -> Option<&ListItem> {
        self.block(path)?.as_list_item()
    }

    pub fn list_item_mut(&mut self, path: &BlockPath) -> Option<&mut ListItem> {
        self.block_mut(path)?.as_list_item_mut()
    }

    /// Children of the container at `path`; the root path yields the top level.
    pub fn container(&self, path: &BlockPath) -> Option<&Vec<Block>> {
        if path.is_root() {
            return Some(&self.blocks);
        }
        self.block(path)?.children()
    }

    pub fn container_mut(&mut self, path: &BlockPath) -> Option<&mut Vec<Block>> {
        if path.is_root() {
            return Some(&mut self.blocks);
        }
        self.block_mut(path)?.children_mut()
    }

    /// All text blocks in document order.
    pub fn textblocks(&self) -> Vec<BlockPath> {
        let mut result = Vec::new();
        collect_textblocks(&self.blocks, &BlockPath::root(), &mut result);
        result
    }

    pub fn first_textblock(&self) -> Option<BlockPath> {
        self.textblocks().into_iter().next()
    }

    pub fn last_textblock(&self) -> Option<BlockPath> {
        self.textblocks().into_iter().last()
    }

    pub fn previous_textblock(&self, path: &BlockPath) -> Option<BlockPath> {
        self.textblocks().into_iter().filter(|p| p < path).last()
    }

    pub fn next_textblock(&self, path: &BlockPath) -> Option<BlockPath> {
        self.textblocks()
            .into_iter()
            .find(|p| p > path && !p.starts_with(path))
    }

    pub fn list_items(&self) -> Vec<&ListItem> {
        self.textblocks()
            .iter()
            .filter_map(|path| self.list_item(path))
            .collect()
    }
}

fn collect_textblocks(blocks: &[Block], parent: &BlockPath, out: &mut Vec<BlockPath>) {
    for (idx, block) in blocks.iter().enumerate() {
        let path = parent.child(idx);
        match block {
            Block::Quote { children } => collect_textblocks(children, &path, out),
            Block::Rule => {}
            _ => out.push(path),
        }
    }
}
