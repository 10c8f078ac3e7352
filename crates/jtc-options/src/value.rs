//! Option values and token coercion
//!
//! Every raw token taken from an option string becomes an [`OptionValue`].
//! Coercion never fails: anything that is not a boolean, a bracket list or
//! a plain integer is kept as a string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tokens that coerce to `true` (compared case-insensitively)
const TRUE_WORDS: &[&str] = &["true", "yes", "1"];

/// Tokens that coerce to `false` (compared case-insensitively)
const FALSE_WORDS: &[&str] = &["false", "no", "0"];

/// A typed plugin option value
///
/// Lists hold strings only, so a list can never contain another list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    String(String),
    List(Vec<String>),
}

impl OptionValue {
    /// True for everything except lists
    pub fn is_scalar(&self) -> bool {
        !matches!(self, OptionValue::List(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Flatten this value into list items.
    ///
    /// Scalars become a single item holding their string form.
    pub fn into_items(self) -> Vec<String> {
        match self {
            OptionValue::Boolean(b) => vec![b.to_string()],
            OptionValue::Integer(i) => vec![i.to_string()],
            OptionValue::String(s) => vec![s],
            OptionValue::List(items) => items,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Boolean(b) => write!(f, "{}", b),
            OptionValue::Integer(i) => write!(f, "{}", i),
            OptionValue::String(s) => write!(f, "\"{}\"", s),
            OptionValue::List(items) => {
                let quoted: Vec<String> = items.iter().map(|i| format!("\"{}\"", i)).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Boolean(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Integer(i)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::String(s)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(items: Vec<String>) -> Self {
        OptionValue::List(items)
    }
}

/// Coerce a raw token into a typed value.
///
/// Rules, first match wins:
/// 1. `true`/`yes`/`1` and `false`/`no`/`0` (any case) → boolean
/// 2. `[a, "b", 'c']` → list of strings (`[]` → empty list)
/// 3. all decimal digits → integer
/// 4. anything else → string, minus one layer of matching quotes
pub fn coerce(token: &str) -> OptionValue {
    if TRUE_WORDS.iter().any(|w| token.eq_ignore_ascii_case(w)) {
        return OptionValue::Boolean(true);
    }
    if FALSE_WORDS.iter().any(|w| token.eq_ignore_ascii_case(w)) {
        return OptionValue::Boolean(false);
    }

    if let Some(body) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return OptionValue::List(split_list_body(body));
    }

    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        // Too large for i64: keep the digits as text
        if let Ok(i) = token.parse::<i64>() {
            return OptionValue::Integer(i);
        }
    }

    OptionValue::String(strip_matching_quotes(token).to_string())
}

/// Split comma-separated text into trimmed, unquoted, non-empty items
pub fn split_list_body(body: &str) -> Vec<String> {
    body.split(',')
        .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\''))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Remove one layer of matching `"…"` or `'…'` around `s`
pub fn strip_matching_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
