//! Precedence-layer merge
//!
//! Layers are folded lowest precedence first:
//! 1. Built-in template defaults
//! 2. User config document
//! 3. One layer per CLI option string, in command-line order
//!
//! Within a plugin, entries merge key by key (Assign replaces, Append
//! extends), so keys a later layer does not mention survive from earlier
//! ones.

use std::collections::{BTreeMap, BTreeSet};

use jtc_options::{
    apply_entry, overlay_options, tokenize, OptionEntry, OptionMap, PluginOptionMap,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog;

/// Origin of a precedence layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Config,
    Cli,
}

/// One precedence layer: the entries it supplies per plugin.
///
/// A plugin listed with no entries was enabled without options.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionLayer {
    pub origin: ConfigOrigin,
    pub plugins: BTreeMap<String, Vec<OptionEntry>>,
}

impl OptionLayer {
    pub fn new(origin: ConfigOrigin) -> Self {
        Self {
            origin,
            plugins: BTreeMap::new(),
        }
    }

    /// Layer that assigns every value of an option map
    pub fn from_options(origin: ConfigOrigin, options: &PluginOptionMap) -> Self {
        let mut layer = Self::new(origin);
        for (plugin, values) in options {
            let entries = values
                .iter()
                .map(|(key, value)| OptionEntry::assign(plugin, key, value.clone()))
                .collect();
            layer.push_entries(plugin, entries);
        }
        layer
    }

    /// Layer holding one raw option string for one plugin
    pub fn from_option_string(origin: ConfigOrigin, plugin: &str, raw: &str) -> Self {
        let mut layer = Self::new(origin);
        layer.push_entries(plugin, tokenize(plugin, raw));
        layer
    }

    /// Mark a plugin as supplied by this layer without adding options
    pub fn enable(&mut self, plugin: &str) {
        self.plugins.entry(plugin.to_string()).or_default();
    }

    pub fn push_entries(&mut self, plugin: &str, entries: Vec<OptionEntry>) {
        self.plugins
            .entry(plugin.to_string())
            .or_default()
            .extend(entries);
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Merged plugin options and the set of plugins any layer supplied
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub options: PluginOptionMap,
    pub enabled: BTreeSet<String>,
}

/// Fold layers (lowest precedence first) into one resolution
pub fn resolve(layers: &[OptionLayer]) -> Resolution {
    layers.iter().fold(Resolution::default(), |mut acc, layer| {
        for (plugin, entries) in &layer.plugins {
            if !catalog::is_known(plugin) {
                debug!(%plugin, origin = ?layer.origin, "passing through unknown plugin");
            }
            acc.enabled.insert(plugin.clone());
            let options = acc.options.entry(plugin.clone()).or_default();
            for entry in entries {
                apply_entry(options, entry.clone());
            }
        }
        debug!(origin = ?layer.origin, plugins = layer.plugins.len(), "merged layer");
        acc
    })
}

/// Merge base-setting layers in order (first is base, last has highest precedence)
pub fn merge_settings(layers: Vec<OptionMap>) -> OptionMap {
    layers.into_iter().fold(OptionMap::new(), |mut acc, layer| {
        overlay_options(&mut acc, &layer);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jtc_options::OptionValue;

    fn cli(plugin: &str, raw: &str) -> OptionLayer {
        OptionLayer::from_option_string(ConfigOrigin::Cli, plugin, raw)
    }

    fn options(plugin: &str, pairs: &[(&str, OptionValue)]) -> PluginOptionMap {
        let map: OptionMap = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        PluginOptionMap::from([(plugin.to_string(), map)])
    }

    #[test]
    fn test_config_overrides_default() {
        let default = OptionLayer::from_options(
            ConfigOrigin::Builtin,
            &options("Git", &[("ssh", OptionValue::Boolean(false))]),
        );
        let config = OptionLayer::from_options(
            ConfigOrigin::Config,
            &options("Git", &[("ssh", OptionValue::Boolean(true))]),
        );

        let result = resolve(&[default.clone(), config.clone()]);
        assert_eq!(result.options["Git"]["ssh"], OptionValue::Boolean(true));

        let result = resolve(&[default, config, cli("Git", "ssh=false")]);
        assert_eq!(result.options["Git"]["ssh"], OptionValue::Boolean(false));
    }

    #[test]
    fn test_separate_occurrences_merge_key_by_key() {
        let result = resolve(&[cli("Git", "ssh=true manifest=false"), cli("Git", "manifest=true")]);
        let git = &result.options["Git"];
        assert_eq!(git["manifest"], OptionValue::Boolean(true));
        assert_eq!(git["ssh"], OptionValue::Boolean(true));
    }

    #[test]
    fn test_same_string_last_wins() {
        let result = resolve(&[cli("Git", "ssh=true ssh=false manifest=true")]);
        assert_eq!(result.options["Git"]["ssh"], OptionValue::Boolean(false));
    }

    #[test]
    fn test_append_across_layers() {
        let result = resolve(&[
            cli("Git", r#"ignore="*.tmp""#),
            cli("Git", r#"ignore+="*.log,*.bak""#),
        ]);
        assert_eq!(
            result.options["Git"]["ignore"],
            OptionValue::List(vec!["*.tmp".into(), "*.log".into(), "*.bak".into()])
        );
    }

    #[test]
    fn test_assign_overrides_ignore() {
        let result = resolve(&[cli("Git", r#"ignore="*.tmp""#), cli("Git", r#"ignore="*.log""#)]);
        assert_eq!(result.options["Git"]["ignore"], OptionValue::from("*.log"));
    }

    #[test]
    fn test_empty_string_enables_plugin() {
        let result = resolve(&[cli("Git", "")]);
        assert!(result.enabled.contains("Git"));
        assert!(result.options["Git"].is_empty());
    }

    #[test]
    fn test_enable_without_options() {
        let mut layer = OptionLayer::new(ConfigOrigin::Cli);
        layer.enable("SrcDir");
        let result = resolve(&[layer]);
        assert!(result.enabled.contains("SrcDir"));
    }

    #[test]
    fn test_unknown_plugin_passes_through() {
        let result = resolve(&[cli("MyExternalPlugin", "level=3")]);
        assert!(result.enabled.contains("MyExternalPlugin"));
        assert_eq!(result.options["MyExternalPlugin"]["level"], OptionValue::Integer(3));
    }

    #[test]
    fn test_no_layers() {
        let result = resolve(&[]);
        assert!(result.enabled.is_empty());
        assert!(result.options.is_empty());
    }

    #[test]
    fn test_merge_settings() {
        let builtin = OptionMap::from([
            ("template".to_string(), OptionValue::from("standard")),
            ("license".to_string(), OptionValue::from("MIT")),
        ]);
        let config = OptionMap::from([("template".to_string(), OptionValue::from("full"))]);
        let cli = OptionMap::from([("license".to_string(), OptionValue::from("BSD3"))]);

        let result = merge_settings(vec![builtin, config, cli]);

        assert_eq!(result["template"], OptionValue::from("full"));
        assert_eq!(result["license"], OptionValue::from("BSD3"));
    }
}
