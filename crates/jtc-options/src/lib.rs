//! Plugin option strings for jtc.
//!
//! Turns free-form option strings (`ssh=true ignore+="*.log"`) into typed
//! entries and defines how entries for the same key combine.

mod merge;
mod tokenizer;
mod value;

pub use merge::{apply_entries, apply_entry, combine, overlay_options, OptionMap, PluginOptionMap};
pub use tokenizer::{tokenize, Operator, OptionEntry};
pub use value::{coerce, split_list_body, strip_matching_quotes, OptionValue};
