//! Option-string tokenizer
//!
//! Splits one free-form option string such as
//! `manifest=false ignore+="*.tmp build/" ssh=true` into ordered entries.
//! Conventions:
//! - Segments are separated by whitespace outside quotes
//! - `"…"` and `'…'` spans are atomic and do not nest
//! - Whitespace inside a closed `[…]` does not split either
//! - `\` before `=`, `+`, whitespace, a quote or another `\` makes that
//!   character literal; any other backslash is kept as is
//! - `key=value` assigns, `key+=value` appends
//! - A bare `key` is `key=""`

use serde::{Deserialize, Serialize};

use crate::value::{coerce, OptionValue};

/// How an entry combines with a value already present for its key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// `key=value`
    Assign,
    /// `key+=value`
    Append,
}

/// One tokenized `key=value` for a plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub plugin: String,
    pub key: String,
    pub operator: Operator,
    pub value: OptionValue,
}

impl OptionEntry {
    pub fn assign(plugin: &str, key: &str, value: impl Into<OptionValue>) -> Self {
        Self {
            plugin: plugin.to_string(),
            key: key.to_string(),
            operator: Operator::Assign,
            value: value.into(),
        }
    }

    pub fn append(plugin: &str, key: &str, value: impl Into<OptionValue>) -> Self {
        Self {
            plugin: plugin.to_string(),
            key: key.to_string(),
            operator: Operator::Append,
            value: value.into(),
        }
    }
}

/// Tokenize a raw option string into entries tagged with `plugin`.
///
/// Never fails. An empty (or all-whitespace) string yields no entries.
pub fn tokenize(plugin: &str, raw: &str) -> Vec<OptionEntry> {
    split_segments(raw, true)
        .iter()
        .map(|segment| parse_segment(plugin, segment))
        .collect()
}

/// Split on whitespace that is neither quoted nor escaped.
///
/// Quote characters and escapes are kept in the segments; they are
/// interpreted later, per key and value. A `[` still open at the end of
/// input does not group: that tail is split again on plain whitespace.
fn split_segments(raw: &str, group_brackets: bool) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                current.push(c);
            }
            c if quote == Some(c) => {
                quote = None;
                current.push(c);
            }
            '[' if quote.is_none() && group_brackets => {
                depth += 1;
                current.push(c);
            }
            ']' if quote.is_none() && group_brackets => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && quote.is_none() && depth == 0 => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if depth > 0 {
        segments.extend(split_segments(&current, false));
    } else if !current.is_empty() {
        // An unterminated quote swallows the rest of the input
        segments.push(current);
    }

    segments
}

fn parse_segment(plugin: &str, segment: &str) -> OptionEntry {
    let (raw_key, token) = match find_separator(segment) {
        Some(idx) => (&segment[..idx], &segment[idx + 1..]),
        None => (segment, ""),
    };

    let (raw_key, operator) = match raw_key.strip_suffix('+') {
        Some(stripped) if trailing_backslashes(stripped) % 2 == 0 => (stripped, Operator::Append),
        _ => (raw_key, Operator::Assign),
    };

    OptionEntry {
        plugin: plugin.to_string(),
        key: unescape(raw_key),
        operator,
        value: coerce(&unescape(token)),
    }
}

/// Byte index of the first `=` not preceded by an escaping backslash
fn find_separator(segment: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in segment.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' => return Some(idx),
            _ => {}
        }
    }
    None
}

fn trailing_backslashes(s: &str) -> usize {
    s.chars().rev().take_while(|&c| c == '\\').count()
}

fn is_escapable(c: char) -> bool {
    matches!(c, '=' | '+' | '"' | '\'' | '\\') || c.is_whitespace()
}

/// Drop the backslash of each escape sequence; other backslashes stay
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == '\\' && is_escapable(next) => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}
