//! jtc - plugin option resolution for Julia package templates
//!
//! Plugin options reach the package generator from three places: built-in
//! template defaults, the user's config file and command-line flags. This
//! crate parses each of them into one option model and merges them with a
//! fixed precedence.

pub mod catalog;
pub mod cli;
pub mod config;

pub use config::{ConfigDocument, ResolveInputs, ResolvedConfig};
pub use jtc_options::{coerce, tokenize, Operator, OptionEntry, OptionValue, PluginOptionMap};
