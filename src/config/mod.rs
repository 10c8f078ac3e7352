//! Configuration layering
//!
//! Implements the 3-layer plugin option merge:
//! 1. Built-in template defaults
//! 2. User config (~/.config/jtc/config.toml)
//! 3. CLI plugin flags, one layer per occurrence

mod defaults;
mod document;
mod merge;
mod resolved;
mod store;

pub use defaults::{BuiltinDefaults, Template, DEFAULT_LICENSE, DEFAULT_TEMPLATE};
pub use document::{
    flatten, option_value_from_toml, option_value_to_toml, unflatten, ConfigDocument,
    FlatDocument, DEFAULT_SECTION,
};
pub use merge::{merge_settings, resolve, ConfigOrigin, OptionLayer, Resolution};
pub use resolved::{ConfigSource, ResolveInputs, ResolvedConfig, SCHEMA_ID, SCHEMA_VERSION};
pub use store::{
    config_path, default_config_path, load, load_for_update, save, LoadedDocument, StoreError,
    StoreWarning, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
};
