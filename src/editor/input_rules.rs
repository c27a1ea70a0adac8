use std::sync::LazyLock;

use regex::Regex;

use crate::document::ListKind;

static LIST_MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<bullet>[-*+])|(?P<number>\d{1,9})\.|\[(?P<check>[ xX]?)\]) $").ok()
});

/// A list marker typed at the start of a text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputRule {
    pub kind: ListKind,
    /// Set for task markers only.
    pub checked: Option<bool>,
    /// Marker length in characters, trailing space included.
    pub len: usize,
}

/// Matches `text` (everything before the cursor) against the list markers:
/// `- `, `* `, `+ `, `1. `, `[ ] ` and `[x] `.
pub fn match_input_rule(text: &str) -> Option<InputRule> {
    let captures = LIST_MARKER.as_ref()?.captures(text)?;
    let (kind, checked) = if captures.name("bullet").is_some() {
        (ListKind::Unordered, None)
    } else if captures.name("number").is_some() {
        (ListKind::Ordered, None)
    } else {
        let mark = captures.name("check").map_or("", |mark| mark.as_str());
        (ListKind::Task, Some(!mark.trim().is_empty()))
    };
    Some(InputRule {
        kind,
        checked,
        len: text.chars().count(),
    })
}
