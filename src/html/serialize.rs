use crate::document::{Block, InlineStyle, ListItem, ListVariant, Span};

use super::dom::{Element, Node};

pub const INDENT_ATTR: &str = "data-indent";
pub const LIST_TYPE_ATTR: &str = "data-list-type";
pub const CHECKED_ATTR: &str = "data-checked";

/// Left margin per indent level, matching the editor's own rendering.
const INDENT_STEP_EM: f32 = 1.5;

pub fn blocks_to_nodes(blocks: &[Block]) -> Vec<Node> {
    blocks.iter().map(block_to_node).collect()
}

pub fn block_to_node(block: &Block) -> Node {
    let element = match block {
        Block::Paragraph { content } => Element::new("p").with_children(inline_nodes(content)),
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            Element::new(&format!("h{level}")).with_children(inline_nodes(content))
        }
        Block::CodeBlock { content } => {
            let text: String = content.iter().map(|span| span.text.as_str()).collect();
            Element::new("pre").with_child(Node::Element(
                Element::new("code").with_child(Node::Text(text)),
            ))
        }
        Block::Quote { children } => {
            Element::new("blockquote").with_children(blocks_to_nodes(children))
        }
        Block::ListItem(item) => list_item_wrapper(item),
        Block::Rule => Element::new("hr"),
    };
    Node::Element(element)
}

fn list_item_wrapper(item: &ListItem) -> Element {
    let indent = item.indent.to_string();
    let mut wrapper = match item.variant {
        ListVariant::Ordered { counter } => Element::new("ol")
            .with_attr(LIST_TYPE_ATTR, item.kind().name())
            .with_attr(INDENT_ATTR, indent.clone())
            .with_attr("start", counter.to_string()),
        ListVariant::Unordered | ListVariant::Task { .. } => Element::new("ul")
            .with_attr(LIST_TYPE_ATTR, item.kind().name())
            .with_attr(INDENT_ATTR, indent.clone()),
    };
    if item.indent > 0 {
        let margin = item.indent as f32 * INDENT_STEP_EM;
        wrapper.set_attr("style", format!("margin-left: {margin}em"));
    }

    let mut li = Element::new("li").with_attr(INDENT_ATTR, indent);
    match item.variant {
        ListVariant::Task { checked } => {
            li.set_attr(CHECKED_ATTR, checked.to_string());
            let mut checkbox = Element::new("input").with_attr("type", "checkbox");
            if checked {
                checkbox.set_attr("checked", "");
            }
            let label = Element::new("label")
                .with_attr("contenteditable", "false")
                .with_child(Node::Element(checkbox));
            li.children.push(Node::Element(label));
            li.children.push(Node::Element(
                Element::new("div").with_children(inline_nodes(&item.content)),
            ));
        }
        ListVariant::Ordered { .. } | ListVariant::Unordered => {
            li.children = inline_nodes(&item.content);
        }
    }
    wrapper.with_child(Node::Element(li))
}

pub fn inline_nodes(spans: &[Span]) -> Vec<Node> {
    spans.iter().map(inline_node).collect()
}

fn inline_node(span: &Span) -> Node {
    let text = Node::Text(span.text.clone());
    let tag = match span.style {
        InlineStyle::None => return text,
        InlineStyle::Bold => "strong",
        InlineStyle::Italic => "em",
        InlineStyle::Underline => "u",
        InlineStyle::Strike => "s",
        InlineStyle::Highlight => "mark",
        InlineStyle::Code => "code",
        InlineStyle::Link => "a",
    };
    let mut element = Element::new(tag).with_child(text);
    if let Some(target) = &span.link_target {
        element.set_attr("href", target.clone());
    }
    Node::Element(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::dom::to_html;

    #[test]
    fn ordered_item_carries_indent_start_and_margin() {
        let item = ListItem::ordered().with_indent(2).with_text("x");
        assert_eq!(
            to_html(&[block_to_node(&item.into())]),
            "<ol data-list-type=\"ordered\" data-indent=\"2\" start=\"1\" style=\"margin-left: 3em\">\
             <li data-indent=\"2\">x</li></ol>"
        );
    }

    #[test]
    fn task_item_renders_checkbox_and_content_div() {
        let item = ListItem::task(true).with_content(vec![Span::styled(InlineStyle::Bold, "done")]);
        assert_eq!(
            to_html(&[block_to_node(&item.into())]),
            "<ul data-list-type=\"task\" data-indent=\"0\">\
             <li data-indent=\"0\" data-checked=\"true\">\
             <label contenteditable=\"false\"><input type=\"checkbox\" checked></label>\
             <div><strong>done</strong></div></li></ul>"
        );
    }

    #[test]
    fn links_keep_their_target() {
        let nodes = inline_nodes(&[Span::new_text("see "), Span::link("https://x.test", "here")]);
        assert_eq!(to_html(&nodes), "see <a href=\"https://x.test\">here</a>");
    }
}
