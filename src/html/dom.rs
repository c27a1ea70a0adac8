use html_escape::{encode_double_quoted_attribute, encode_text};

const VOID_ELEMENTS: [&str; 4] = ["br", "hr", "img", "input"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Removes `name` from this element and every descendant.
    pub fn remove_attr_deep(&mut self, name: &str) {
        self.remove_attr(name);
        for child in &mut self.children {
            if let Node::Element(element) = child {
                element.remove_attr_deep(name);
            }
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn first_element(&self, tag: &str) -> Option<&Element> {
        self.elements().find(|element| element.is(tag))
    }

    /// Index in `children` of the last child element named `tag`.
    pub fn last_element_index(&self, tag: &str) -> Option<usize> {
        self.children
            .iter()
            .rposition(|child| child.as_element().is_some_and(|element| element.is(tag)))
    }

    /// True when any descendant element satisfies `predicate`.
    pub fn any_descendant(&self, predicate: &dyn Fn(&Element) -> bool) -> bool {
        self.elements()
            .any(|element| predicate(element) || element.any_descendant(predicate))
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
        }
    }
}

/// Walks `path` (child indexes) down from `nodes` to an element.
pub fn element_at_mut<'a>(nodes: &'a mut [Node], path: &[usize]) -> Option<&'a mut Element> {
    let (first, rest) = path.split_first()?;
    let mut element = nodes.get_mut(*first)?.as_element_mut()?;
    for idx in rest {
        element = element.children.get_mut(*idx)?.as_element_mut()?;
    }
    Some(element)
}

pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&encode_text(text)),
        Node::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&encode_double_quoted_attribute(value));
            out.push('"');
        }
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }
    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_attributes_and_escapes_text() {
        let element = Element::new("a")
            .with_attr("href", "x?a=1&b=\"2\"")
            .with_child(Node::Text("1 < 2".into()));
        assert_eq!(
            element.to_html(),
            "<a href=\"x?a=1&amp;b=&quot;2&quot;\">1 &lt; 2</a>"
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let input = Element::new("input")
            .with_attr("type", "checkbox")
            .with_attr("checked", "");
        assert_eq!(input.to_html(), "<input type=\"checkbox\" checked>");
    }

    #[test]
    fn element_paths_descend_through_children() {
        let mut nodes = vec![Node::Element(
            Element::new("ul").with_child(Node::Element(Element::new("li"))),
        )];
        let li = element_at_mut(&mut nodes, &[0, 0]).unwrap();
        li.set_attr("data-indent", "1");
        assert_eq!(to_html(&nodes), "<ul><li data-indent=\"1\"></li></ul>");
    }
}
