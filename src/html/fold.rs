use log::trace;

use crate::document::ListKind;

use super::dom::{element_at_mut, Element, Node};
use super::parse::wrapper_kind;
use super::serialize::{INDENT_ATTR, LIST_TYPE_ATTR};

/// Which consumer the folded markup is for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportTarget {
    /// Whole-document export: no editor bookkeeping survives.
    #[default]
    Document,
    /// Clipboard HTML: item indents are kept so a paste back into the
    /// editor recovers levels plain nesting cannot express.
    Clipboard,
}

/// Merges runs of single-item wrappers in `nodes` into nested lists.
///
/// Wrappers are recognised by their list kind; their indent is read from the
/// indent attribute (0 when missing). Any other non-whitespace node breaks
/// every open list. Children of other elements are folded recursively.
pub fn fold_lists(nodes: &mut Vec<Node>, target: ExportTarget) {
    let input = std::mem::take(nodes);
    // Path (child indexes from `nodes`) of the last wrapper seen per indent.
    let mut last_list_at_indent: Vec<Option<Vec<usize>>> = Vec::new();

    for node in input {
        let element = match node {
            Node::Element(element) => element,
            text => {
                if !text.is_whitespace() {
                    last_list_at_indent.clear();
                }
                nodes.push(text);
                continue;
            }
        };
        let Some(kind) = wrapper_kind(&element) else {
            last_list_at_indent.clear();
            let mut element = element;
            fold_lists(&mut element.children, target);
            nodes.push(Node::Element(element));
            continue;
        };

        let indent = element
            .attr(INDENT_ATTR)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let mut wrapper = element;
        let items = take_items(&mut wrapper, target);

        if let Some(existing) = last_list_at_indent.get(indent).cloned().flatten() {
            if let Some(list) = element_at_mut(nodes, &existing) {
                if wrapper_kind(list) == Some(kind) {
                    trace!("folding {kind} item into list at indent {indent}");
                    list.children.extend(items);
                    last_list_at_indent.truncate(indent + 1);
                    continue;
                }
            }
        }

        strip_wrapper(&mut wrapper, kind, target);
        wrapper.children = items;

        let parent = indent
            .checked_sub(1)
            .and_then(|level| last_list_at_indent.get(level).cloned().flatten());
        let path = match parent.and_then(|parent| nest_into(nodes, &parent, wrapper.clone())) {
            Some(path) => path,
            None => {
                nodes.push(Node::Element(wrapper));
                vec![nodes.len() - 1]
            }
        };

        if last_list_at_indent.len() <= indent {
            last_list_at_indent.resize(indent + 1, None);
        }
        last_list_at_indent[indent] = Some(path);
        last_list_at_indent.truncate(indent + 1);
    }
}

/// Removes the item elements from `wrapper`, cleaned for `target`.
fn take_items(wrapper: &mut Element, target: ExportTarget) -> Vec<Node> {
    std::mem::take(&mut wrapper.children)
        .into_iter()
        .filter_map(|child| match child {
            Node::Element(mut li) if li.is("li") => {
                clean_item(&mut li, target);
                Some(Node::Element(li))
            }
            Node::Element(other) => Some(Node::Element(other)),
            Node::Text(text) if text.trim().is_empty() => None,
            text => Some(text),
        })
        .collect()
}

fn clean_item(li: &mut Element, target: ExportTarget) {
    match target {
        ExportTarget::Document => {
            li.remove_attr(INDENT_ATTR);
            li.remove_attr("style");
        }
        ExportTarget::Clipboard => {
            li.remove_attr_deep("style");
            li.remove_attr_deep("contenteditable");
            flatten_task_content(li);
        }
    }
}

/// Replaces a task item's checkbox and content wrapper with the plain content.
fn flatten_task_content(li: &mut Element) {
    let has_checkbox = li.first_element("label").is_some_and(|label| {
        label.any_descendant(&|element| element.is("input"))
    });
    if !has_checkbox {
        return;
    }
    let mut flattened = Vec::new();
    for child in std::mem::take(&mut li.children) {
        match child {
            Node::Element(label) if label.is("label") => {}
            Node::Element(div) if div.is("div") => flattened.extend(div.children),
            other => flattened.push(other),
        }
    }
    li.children = flattened;
}

fn strip_wrapper(wrapper: &mut Element, kind: ListKind, target: ExportTarget) {
    wrapper.remove_attr("start");
    wrapper.remove_attr("style");
    match target {
        ExportTarget::Document => {
            wrapper.remove_attr(INDENT_ATTR);
            if kind != ListKind::Task {
                wrapper.remove_attr(LIST_TYPE_ATTR);
            }
        }
        ExportTarget::Clipboard => {}
    }
}

/// Appends `wrapper` to the content element of the last item of the list at
/// `parent`, returning the new wrapper's path.
fn nest_into(nodes: &mut [Node], parent: &[usize], wrapper: Element) -> Option<Vec<usize>> {
    let list = element_at_mut(nodes, parent)?;
    let item_idx = list.last_element_index("li")?;
    let mut path = parent.to_vec();
    path.push(item_idx);

    let item = list.children.get_mut(item_idx)?.as_element_mut()?;
    let host = match item.last_element_index("div") {
        Some(div_idx) if item.first_element("label").is_some() => {
            path.push(div_idx);
            item.children.get_mut(div_idx)?.as_element_mut()?
        }
        _ => item,
    };
    host.children.push(Node::Element(wrapper));
    path.push(host.children.len() - 1);
    Some(path)
}
