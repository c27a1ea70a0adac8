use html5ever::tendril::TendrilSink;
use html5ever::{parse_fragment, LocalName, Namespace, ParseOpts, QualName};
use log::{debug, trace};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::document::{Block, InlineStyle, ListItem, ListKind, ListVariant, Span};
use crate::editor::content::{prune_and_merge_spans, styled_text};
use crate::paste::Slice;

use super::dom::{Element, Node};
use super::serialize::{CHECKED_ATTR, INDENT_ATTR, LIST_TYPE_ATTR};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

const BLOCK_TAGS: [&str; 22] = [
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "ul", "ol", "li",
    "hr", "section", "article", "main", "header", "footer", "aside", "figure", "body",
];

const CONTAINER_TAGS: [&str; 9] = [
    "div", "section", "article", "main", "header", "footer", "aside", "figure", "body",
];

/// Parses an HTML fragment into the blocks it describes.
pub fn parse_html(html: &str) -> Slice {
    let nodes = parse_nodes(html);
    let mut blocks = Vec::new();
    collect_blocks(&nodes, 0, &mut blocks);
    debug!("parsed {} blocks from {} bytes of html", blocks.len(), html.len());
    Slice::new(blocks)
}

/// Parses `html` as body content into light DOM nodes.
pub fn parse_nodes(html: &str) -> Vec<Node> {
    let context = QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from("body"),
    );
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new()).one(html);

    let mut nodes = Vec::new();
    for child in dom.document.children.borrow().iter() {
        convert(child, &mut nodes);
    }
    // Fragment parsing hangs the content off a synthetic <html> root.
    if nodes.len() == 1 && nodes[0].as_element().is_some_and(|root| root.is("html")) {
        if let Some(Node::Element(root)) = nodes.pop() {
            return root.children;
        }
    }
    nodes
}

fn convert(handle: &Handle, out: &mut Vec<Node>) {
    match &handle.data {
        NodeData::Text { contents } => out.push(Node::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let mut element = Element::new(&name.local.to_string());
            element.attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            for child in handle.children.borrow().iter() {
                convert(child, &mut element.children);
            }
            out.push(Node::Element(element));
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                convert(child, out);
            }
        }
        NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => {}
    }
}

/// List kind of a wrapper element, or `None` for anything that is not a list.
///
/// Ordered wins over task, task over unordered. Task lists need an explicit
/// marker attribute since plain HTML has no such list.
pub fn wrapper_kind(element: &Element) -> Option<ListKind> {
    let marker = element.attr(LIST_TYPE_ATTR).and_then(ListKind::from_name);
    if element.is("ol") || marker == Some(ListKind::Ordered) {
        return Some(ListKind::Ordered);
    }
    if marker == Some(ListKind::Task) || element.attr("data-type") == Some("taskList") {
        return Some(ListKind::Task);
    }
    if element.is("ul") || marker == Some(ListKind::Unordered) {
        return Some(ListKind::Unordered);
    }
    None
}

fn is_block(element: &Element) -> bool {
    BLOCK_TAGS.contains(&element.tag.as_str()) || wrapper_kind(element).is_some()
}

fn is_checkbox(element: &Element) -> bool {
    element.is("input")
        && element
            .attr("type")
            .is_some_and(|kind| kind.eq_ignore_ascii_case("checkbox"))
}

fn collect_blocks(nodes: &[Node], depth: usize, out: &mut Vec<Block>) {
    let mut inline = Vec::new();
    for node in nodes {
        match node {
            Node::Element(element) if is_block(element) => {
                flush_paragraph(&mut inline, out);
                collect_block(element, depth, out);
            }
            _ => collect_inline(node, &InlineContext::default(), &mut inline),
        }
    }
    flush_paragraph(&mut inline, out);
}

fn flush_paragraph(inline: &mut Vec<Span>, out: &mut Vec<Block>) {
    let content = normalize_inline(std::mem::take(inline));
    if !content.is_empty() {
        out.push(Block::Paragraph { content });
    }
}

fn collect_block(element: &Element, depth: usize, out: &mut Vec<Block>) {
    if wrapper_kind(element).is_some() {
        collect_list(element, depth + 1, out);
        return;
    }
    match element.tag.as_str() {
        "p" => out.push(Block::Paragraph {
            content: inline_content(element),
        }),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = element.tag[1..].parse().unwrap_or(1);
            out.push(Block::Heading {
                level,
                content: inline_content(element),
            });
        }
        "pre" => {
            let text = element.text_content();
            let content = if text.is_empty() {
                Vec::new()
            } else {
                vec![Span::new_text(text)]
            };
            out.push(Block::CodeBlock { content });
        }
        "blockquote" => {
            let mut children = Vec::new();
            collect_blocks(&element.children, 0, &mut children);
            out.push(Block::Quote { children });
        }
        "hr" => out.push(Block::Rule),
        "li" => collect_item(element, ListKind::Unordered, depth + 1, out),
        tag if CONTAINER_TAGS.contains(&tag) => {
            if element.elements().any(is_block) {
                collect_blocks(&element.children, depth, out);
            } else {
                let content = inline_content(element);
                if !content.is_empty() {
                    out.push(Block::Paragraph { content });
                }
            }
        }
        _ => out.push(Block::Paragraph {
            content: inline_content(element),
        }),
    }
}

/// `depth` counts the list wrappers enclosing the items of `list`, itself
/// included.
fn collect_list(list: &Element, depth: usize, out: &mut Vec<Block>) {
    let kind = wrapper_kind(list).unwrap_or(ListKind::Unordered);
    for child in &list.children {
        match child {
            Node::Element(element) if element.is("li") => collect_item(element, kind, depth, out),
            Node::Element(element) if wrapper_kind(element).is_some() => {
                collect_list(element, depth + 1, out)
            }
            Node::Text(text) if text.trim().is_empty() => {}
            other => collect_blocks(std::slice::from_ref(other), depth, out),
        }
    }
}

#[derive(Default)]
struct ItemParts {
    content: Vec<Span>,
    saw_content: bool,
    content_closed: bool,
    leading_list: bool,
    trailing: Vec<Block>,
}

fn collect_item(li: &Element, kind: ListKind, depth: usize, out: &mut Vec<Block>) {
    let indent = li
        .attr(INDENT_ATTR)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(depth.saturating_sub(1));
    let checked = match li.attr(CHECKED_ATTR) {
        Some(value) => value == "true",
        None => own_checkbox(li).is_some_and(|input| input.has_attr("checked")),
    };

    let mut parts = ItemParts::default();
    walk_item(&li.children, depth, &mut parts);

    let mut item = ListItem::new(kind).with_indent(indent);
    item.variant = ListVariant::new(kind, checked);
    item.content = normalize_inline(parts.content);
    if parts.leading_list && item.content.is_empty() {
        trace!("propping item at indent {indent} that starts with a nested list");
        item = item.propped();
    }
    out.push(Block::ListItem(item));
    out.append(&mut parts.trailing);
}

fn walk_item(nodes: &[Node], depth: usize, parts: &mut ItemParts) {
    for node in nodes {
        let element = match node {
            Node::Element(element) => element,
            Node::Text(text) => {
                if !text.trim().is_empty() {
                    parts.saw_content = true;
                }
                collect_inline(node, &InlineContext::default(), &mut parts.content);
                continue;
            }
        };
        if is_checkbox(element) || (element.is("label") && element.elements().any(is_checkbox)) {
            continue;
        }
        if wrapper_kind(element).is_some() {
            if !parts.saw_content && parts.trailing.is_empty() {
                parts.leading_list = true;
            }
            collect_list(element, depth + 1, &mut parts.trailing);
        } else if element.is("p") || element.is("div") {
            if parts.content_closed || !parts.trailing.is_empty() {
                collect_block(element, depth, &mut parts.trailing);
            } else {
                walk_item(&element.children, depth, parts);
                parts.content_closed = parts.saw_content;
            }
        } else if is_block(element) {
            collect_block(element, depth, &mut parts.trailing);
        } else {
            if !element.text_content().trim().is_empty() {
                parts.saw_content = true;
            }
            collect_inline(node, &InlineContext::default(), &mut parts.content);
        }
    }
}

/// The item's own checkbox, ignoring any inside nested lists.
fn own_checkbox(li: &Element) -> Option<&Element> {
    li.elements().find_map(|element| {
        if is_checkbox(element) {
            Some(element)
        } else if element.is("label") || element.is("div") {
            element.elements().find(|inner| is_checkbox(inner))
        } else {
            None
        }
    })
}

#[derive(Clone, Debug, Default)]
struct InlineContext {
    style: Option<InlineStyle>,
    link: Option<String>,
}

fn inline_content(element: &Element) -> Vec<Span> {
    let mut spans = Vec::new();
    for child in &element.children {
        collect_inline(child, &InlineContext::default(), &mut spans);
    }
    normalize_inline(spans)
}

fn collect_inline(node: &Node, context: &InlineContext, out: &mut Vec<Span>) {
    match node {
        Node::Text(text) => {
            let style = context.style.unwrap_or(InlineStyle::None);
            out.push(styled_text(&collapse_whitespace(text), style, context.link.clone()));
        }
        Node::Element(element) => {
            if element.is("br") {
                out.push(Span::styled(context.style.unwrap_or(InlineStyle::None), "\n"));
                return;
            }
            if matches!(element.tag.as_str(), "input" | "script" | "style" | "template") {
                return;
            }
            let mut inner = context.clone();
            if context.style != Some(InlineStyle::Link) {
                match element_style(element) {
                    Some(InlineStyle::Link) => {
                        inner.style = Some(InlineStyle::Link);
                        inner.link = element.attr("href").map(str::to_string);
                    }
                    Some(style) => inner.style = Some(style),
                    None => {}
                }
            }
            for child in &element.children {
                collect_inline(child, &inner, out);
            }
        }
    }
}

fn element_style(element: &Element) -> Option<InlineStyle> {
    let style = match element.tag.as_str() {
        "strong" | "b" => InlineStyle::Bold,
        "em" | "i" => InlineStyle::Italic,
        "u" | "ins" => InlineStyle::Underline,
        "s" | "strike" | "del" => InlineStyle::Strike,
        "mark" => InlineStyle::Highlight,
        "code" | "kbd" | "samp" => InlineStyle::Code,
        "a" if element.has_attr("href") => InlineStyle::Link,
        _ => return None,
    };
    Some(style)
}

/// Collapses ASCII whitespace runs to one space. Non-breaking spaces stay.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn normalize_inline(mut spans: Vec<Span>) -> Vec<Span> {
    let mut previous_space = true;
    for span in &mut spans {
        if span.text == "\n" {
            previous_space = true;
            continue;
        }
        if previous_space && span.text.starts_with(' ') {
            span.text.remove(0);
        }
        if !span.text.is_empty() {
            previous_space = span.text.ends_with(' ');
        }
    }
    if let Some(last) = spans.iter_mut().rev().find(|span| !span.text.is_empty()) {
        let trimmed = last.text.trim_end_matches(|ch: char| ch.is_ascii_whitespace());
        last.text = trimmed.to_string();
    }
    prune_and_merge_spans(&mut spans);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PLACEHOLDER;

    fn indents(slice: &Slice) -> Vec<usize> {
        slice
            .blocks
            .iter()
            .filter_map(|block| block.as_list_item().map(|item| item.indent))
            .collect()
    }

    #[test]
    fn foreign_nesting_becomes_indents() {
        let slice = parse_html(
            "<ul>\n  <li>a\n    <ul><li>b<ul><li>c</li></ul></li></ul>\n  </li>\n  <li>d</li>\n</ul>",
        );
        assert_eq!(indents(&slice), vec![0, 1, 2, 0]);
        assert_eq!(slice.blocks[0].text(), "a");
        assert_eq!(slice.blocks[3].text(), "d");
    }

    #[test]
    fn stored_indent_wins_over_nesting() {
        let slice = parse_html(
            "<ul data-indent=\"1\"><li data-indent=\"1\">x</li></ul>\
             <ul data-indent=\"0\"><li data-indent=\"0\">y</li></ul>",
        );
        assert_eq!(indents(&slice), vec![1, 0]);
    }

    #[test]
    fn kind_priority_prefers_ordered_then_task() {
        let slice = parse_html(
            "<ol data-list-type=\"task\"><li>o</li></ol>\
             <ul data-list-type=\"task\"><li><label><input type=\"checkbox\" checked></label><div>t</div></li></ul>\
             <ul><li><input type=\"checkbox\">u</li></ul>",
        );
        let kinds: Vec<ListKind> = slice
            .blocks
            .iter()
            .filter_map(|block| block.as_list_item().map(ListItem::kind))
            .collect();
        assert_eq!(kinds, vec![ListKind::Ordered, ListKind::Task, ListKind::Unordered]);
        assert_eq!(
            slice.blocks[1].as_list_item().unwrap().variant,
            ListVariant::Task { checked: true }
        );
        assert_eq!(slice.blocks[1].text(), "t");
        assert_eq!(slice.blocks[2].text(), "u");
    }

    #[test]
    fn item_holding_only_a_nested_list_is_propped() {
        let slice = parse_html("<ol><li><ol><li>inner</li></ol></li></ol>");
        let outer = slice.blocks[0].as_list_item().unwrap();
        assert!(outer.temp_propped);
        assert_eq!(slice.blocks[0].text(), PLACEHOLDER.to_string());
        assert_eq!(indents(&slice), vec![0, 1]);
    }

    #[test]
    fn empty_item_is_not_propped() {
        let slice = parse_html("<ul><li></li></ul>");
        let item = slice.blocks[0].as_list_item().unwrap();
        assert!(!item.temp_propped);
        assert!(item.content.is_empty());
    }

    #[test]
    fn inline_styles_and_whitespace() {
        let slice = parse_html("<p>  a <strong>b</strong>\n <a href=\"u\">c</a> </p>");
        assert_eq!(
            slice.blocks,
            vec![Block::Paragraph {
                content: vec![
                    Span::new_text("a "),
                    Span::styled(InlineStyle::Bold, "b"),
                    Span::new_text(" "),
                    Span::link("u", "c"),
                ]
            }]
        );
    }

    #[test]
    fn quotes_hold_their_own_lists() {
        let slice = parse_html("<ul><li>a</li></ul><blockquote><ul><li>q</li></ul></blockquote>");
        assert_eq!(slice.blocks.len(), 2);
        let children = slice.blocks[1].children().unwrap();
        assert_eq!(children[0].as_list_item().unwrap().indent, 0);
    }

    #[test]
    fn loose_text_becomes_paragraphs() {
        let slice = parse_html("hello <em>world</em><h2>title</h2><hr>");
        assert_eq!(slice.blocks.len(), 3);
        assert_eq!(slice.blocks[0].text(), "hello world");
        assert_eq!(slice.blocks[1], Block::heading(2, "title"));
        assert_eq!(slice.blocks[2], Block::Rule);
    }
}
