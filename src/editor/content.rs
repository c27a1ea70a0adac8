use crate::document::{InlineStyle, Span};

pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

pub(crate) fn spans_len(spans: &[Span]) -> usize {
    spans.iter().map(Span::char_len).sum()
}

#[cfg(test)]
pub(crate) fn spans_text(spans: &[Span]) -> String {
    spans.iter().map(|span| span.text.as_str()).collect()
}

fn split_text(text: &str, offset: usize) -> (String, String) {
    let byte_idx = char_to_byte_idx(text, offset);
    (text[..byte_idx].to_string(), text[byte_idx..].to_string())
}

/// Splits `spans` at the character `offset`, returning the tail.
pub(crate) fn split_spans(spans: &mut Vec<Span>, offset: usize) -> Vec<Span> {
    let mut remaining = offset;
    let mut idx = 0;
    while idx < spans.len() {
        let len = spans[idx].char_len();
        if remaining < len {
            break;
        }
        remaining -= len;
        idx += 1;
    }
    if idx >= spans.len() {
        return Vec::new();
    }
    let mut trailing = spans.split_off(idx);
    if remaining > 0 {
        let (left_text, right_text) = split_text(&trailing[0].text, remaining);
        let mut left = trailing[0].clone();
        left.text = left_text;
        trailing[0].text = right_text;
        spans.push(left);
    }
    prune_and_merge_spans(spans);
    prune_and_merge_spans(&mut trailing);
    trailing
}

/// Inserts `inserted` at `offset`, merging neighbours with equal styling.
pub(crate) fn insert_spans_at(spans: &mut Vec<Span>, offset: usize, inserted: Vec<Span>) {
    let tail = split_spans(spans, offset);
    spans.extend(inserted);
    spans.extend(tail);
    prune_and_merge_spans(spans);
}

/// Removes the characters in `from..to`. Returns false when nothing was removed.
pub(crate) fn delete_range(spans: &mut Vec<Span>, from: usize, to: usize) -> bool {
    let len = spans_len(spans);
    let to = to.min(len);
    if from >= to {
        return false;
    }
    let mut tail = split_spans(spans, to);
    split_spans(spans, from);
    spans.append(&mut tail);
    prune_and_merge_spans(spans);
    true
}

/// Content between `from` and `to` without modifying `spans`.
pub(crate) fn slice_spans(spans: &[Span], from: usize, to: usize) -> Vec<Span> {
    let mut head = spans.to_vec();
    let _ = split_spans(&mut head, to);
    split_spans(&mut head, from)
}

/// Style of the character before `offset`, or after it at offset 0.
pub(crate) fn style_at(spans: &[Span], offset: usize) -> Option<&Span> {
    let mut remaining = offset;
    for span in spans {
        let len = span.char_len();
        if remaining <= len && (remaining > 0 || len > 0) {
            return Some(span);
        }
        remaining -= len.min(remaining);
    }
    spans.last()
}

pub(crate) fn starts_with_char(spans: &[Span], ch: char) -> bool {
    spans
        .iter()
        .find_map(|span| span.text.chars().next())
        .is_some_and(|first| first == ch)
}

pub(crate) fn prune_and_merge_spans(spans: &mut Vec<Span>) {
    spans.retain(|span| !span.text.is_empty());

    let mut i = 0;
    while i + 1 < spans.len() {
        if can_merge_spans(&spans[i], &spans[i + 1]) {
            let right = spans.remove(i + 1);
            spans[i].text.push_str(&right.text);
        } else {
            i += 1;
        }
    }
}

fn can_merge_spans(left: &Span, right: &Span) -> bool {
    left.style == right.style && left.link_target == right.link_target
}

pub(crate) fn styled_text(text: &str, style: InlineStyle, link_target: Option<String>) -> Span {
    Span {
        text: text.to_string(),
        style,
        link_target: if style == InlineStyle::Link {
            link_target
        } else {
            None
        },
    }
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub fn previous_word_boundary(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut idx = offset.min(chars.len());
    while idx > 0 && chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    if idx > 0 && is_word_char(chars[idx - 1]) {
        while idx > 0 && is_word_char(chars[idx - 1]) {
            idx -= 1;
        }
    } else {
        while idx > 0 && !is_word_char(chars[idx - 1]) && !chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
    }
    idx
}

pub fn next_word_boundary(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut idx = offset.min(len);
    if idx < len && is_word_char(chars[idx]) {
        while idx < len && is_word_char(chars[idx]) {
            idx += 1;
        }
    } else {
        while idx < len && !chars[idx].is_whitespace() && !is_word_char(chars[idx]) {
            idx += 1;
        }
    }
    while idx < len && chars[idx].is_whitespace() {
        idx += 1;
    }
    idx
}
