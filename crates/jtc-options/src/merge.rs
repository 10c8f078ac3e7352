//! Per-key merge rules
//!
//! - Assign: the incoming value replaces whatever was there
//! - Append: the incoming value is combined into a deduplicated list
//!
//! A comma-bearing string appended to a key is split into separate items
//! first, so `ignore+="*.log,*.bak"` contributes two patterns.

use std::collections::BTreeMap;

use crate::tokenizer::{OptionEntry, Operator};
use crate::value::{split_list_body, OptionValue};

/// Option values for a single plugin, keyed by option name
pub type OptionMap = BTreeMap<String, OptionValue>;

/// Plugin identifier -> option map
pub type PluginOptionMap = BTreeMap<String, OptionMap>;

/// Combine an incoming value with the value already stored for a key.
pub fn combine(
    existing: Option<OptionValue>,
    operator: Operator,
    incoming: OptionValue,
) -> OptionValue {
    match operator {
        Operator::Assign => incoming,
        Operator::Append => match (existing, split_appended(incoming)) {
            (None, OptionValue::String(s)) if s.trim().is_empty() => OptionValue::List(Vec::new()),
            (None, OptionValue::List(items)) => OptionValue::List(clean_items(items)),
            (None, scalar) => scalar,
            (Some(existing), incoming) => {
                let mut items = existing.into_items();
                items.extend(incoming.into_items());
                OptionValue::List(clean_items(items))
            }
        },
    }
}

/// Apply one entry to a plugin's option map
pub fn apply_entry(options: &mut OptionMap, entry: OptionEntry) {
    let existing = options.remove(&entry.key);
    let merged = combine(existing, entry.operator, entry.value);
    options.insert(entry.key, merged);
}

/// Apply entries in order to the map, creating plugin sections as needed.
///
/// Every plugin named by an entry ends up with a section in `map`.
pub fn apply_entries(map: &mut PluginOptionMap, entries: impl IntoIterator<Item = OptionEntry>) {
    for entry in entries {
        let options = map.entry(entry.plugin.clone()).or_default();
        apply_entry(options, entry);
    }
}

/// Fold `overlay` into `base` key by key with Assign semantics
pub fn overlay_options(base: &mut OptionMap, overlay: &OptionMap) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

fn split_appended(value: OptionValue) -> OptionValue {
    match value {
        OptionValue::String(s) if s.contains(',') => OptionValue::List(split_list_body(&s)),
        other => other,
    }
}

/// Drop blank items and duplicates, keeping first-seen order
fn clean_items(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
