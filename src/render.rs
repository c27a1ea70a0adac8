use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::document::{
    Block, BlockPath, Document, InlineStyle, ListItem, ListVariant, Span as DocSpan,
};
use crate::selection::Position;
use crate::theme::Theme;

const INDENT_WIDTH: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
}

pub fn render_document(
    document: &Document,
    cursor: &Position,
    width: usize,
    theme: &Theme,
) -> RenderResult {
    let mut renderer = Renderer {
        wrap_width: width.max(1),
        target: cursor,
        theme,
        cursor: None,
        lines: Vec::new(),
    };
    renderer.render_blocks(&document.blocks, &BlockPath::root(), &[]);
    renderer.finish()
}

/// Text for the marker in front of an item, trailing space included.
pub fn marker_text(item: &ListItem) -> String {
    match item.variant {
        ListVariant::Ordered { counter } => format!("{counter}. "),
        ListVariant::Unordered => "• ".to_string(),
        ListVariant::Task { checked: true } => "[x] ".to_string(),
        ListVariant::Task { checked: false } => "[ ] ".to_string(),
    }
}

struct Renderer<'a> {
    wrap_width: usize,
    target: &'a Position,
    theme: &'a Theme,
    cursor: Option<CursorVisualPosition>,
    lines: Vec<Line<'static>>,
}

impl Renderer<'_> {
    fn render_blocks(&mut self, blocks: &[Block], parent: &BlockPath, prefix: &[Span<'static>]) {
        for (idx, block) in blocks.iter().enumerate() {
            let follows_item = idx > 0 && blocks[idx - 1].is_list_item();
            if idx > 0 && !(follows_item && block.is_list_item()) {
                self.lines.push(Line::from(prefix.to_vec()));
            }
            self.render_block(block, &parent.child(idx), prefix);
        }
    }

    fn render_block(&mut self, block: &Block, path: &BlockPath, prefix: &[Span<'static>]) {
        match block {
            Block::Paragraph { content } => {
                self.render_text(path, content, prefix, prefix, Style::default());
            }
            Block::Heading { level, content } => {
                let mut first = prefix.to_vec();
                first.push(Span::styled(
                    format!("{} ", "#".repeat(usize::from(*level))),
                    self.theme.marker_style(),
                ));
                let base = Style::default().add_modifier(Modifier::BOLD);
                self.render_text(path, content, &first, prefix, base);
            }
            Block::CodeBlock { content } => {
                self.render_text(path, content, prefix, prefix, self.theme.code_style());
            }
            Block::Quote { children } => {
                let mut nested = prefix.to_vec();
                nested.push(Span::styled("│ ", self.theme.quote_bar_style()));
                self.render_blocks(children, path, &nested);
            }
            Block::ListItem(item) => self.render_item(item, path, prefix),
            Block::Rule => {
                let used: usize = prefix.iter().map(|span| span.width()).sum();
                let mut line = prefix.to_vec();
                line.push(Span::raw("─".repeat(self.wrap_width.saturating_sub(used))));
                self.lines.push(Line::from(line));
            }
        }
    }

    fn render_item(&mut self, item: &ListItem, path: &BlockPath, prefix: &[Span<'static>]) {
        let indent = " ".repeat(item.indent * INDENT_WIDTH);
        let marker = marker_text(item);
        let mut first = prefix.to_vec();
        first.push(Span::raw(indent.clone()));
        first.push(Span::styled(marker.clone(), self.theme.marker_style()));
        let mut continuation = prefix.to_vec();
        continuation.push(Span::raw(format!("{indent}{}", " ".repeat(marker.chars().count()))));
        let base = match item.variant {
            ListVariant::Task { checked: true } => self.theme.checked_style(),
            _ => Style::default(),
        };
        self.render_text(path, &item.content, &first, &continuation, base);
    }

    /// Lays out inline content, breaking at the wrap width and at newlines.
    fn render_text(
        &mut self,
        path: &BlockPath,
        content: &[DocSpan],
        first_prefix: &[Span<'static>],
        continuation_prefix: &[Span<'static>],
        base: Style,
    ) {
        let has_cursor = self.target.path == *path;
        let continuation_width = prefix_width(continuation_prefix);
        let mut line = first_prefix.to_vec();
        let mut column = prefix_width(first_prefix);
        let mut offset = 0;

        for span in content {
            let style = merge_style(base, span.style, self.theme);
            for ch in span.text.chars() {
                if has_cursor && offset == self.target.offset {
                    self.place_cursor(column);
                }
                offset += 1;
                if ch == '\n' {
                    self.lines.push(Line::from(std::mem::replace(
                        &mut line,
                        continuation_prefix.to_vec(),
                    )));
                    column = continuation_width;
                    continue;
                }
                let ch_width = ch.width().unwrap_or(0);
                if column + ch_width > self.wrap_width && column > continuation_width {
                    self.lines.push(Line::from(std::mem::replace(
                        &mut line,
                        continuation_prefix.to_vec(),
                    )));
                    column = continuation_width;
                }
                push_char(&mut line, ch, style);
                column += ch_width;
            }
        }
        if has_cursor && self.target.offset >= offset {
            self.place_cursor(column);
        }
        self.lines.push(Line::from(line));
    }

    fn place_cursor(&mut self, column: usize) {
        self.cursor = Some(CursorVisualPosition {
            line: self.lines.len(),
            column: u16::try_from(column).unwrap_or(u16::MAX),
        });
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
        }
    }
}

fn push_char(line: &mut Vec<Span<'static>>, ch: char, style: Style) {
    if let Some(last) = line.last_mut().filter(|span| span.style == style) {
        last.content.to_mut().push(ch);
        return;
    }
    line.push(Span::styled(ch.to_string(), style));
}

fn prefix_width(prefix: &[Span<'_>]) -> usize {
    prefix.iter().map(|span| span.width()).sum()
}

fn merge_style(base: Style, inline: InlineStyle, theme: &Theme) -> Style {
    match inline {
        InlineStyle::None => base,
        InlineStyle::Bold => base.add_modifier(Modifier::BOLD),
        InlineStyle::Italic => base.add_modifier(Modifier::ITALIC),
        InlineStyle::Underline => base.add_modifier(Modifier::UNDERLINED),
        InlineStyle::Strike => base.add_modifier(Modifier::CROSSED_OUT),
        InlineStyle::Highlight => base.patch(theme.highlight_style()),
        InlineStyle::Code => base.patch(theme.code_style()),
        InlineStyle::Link => base.patch(theme.link_style()),
    }
}
