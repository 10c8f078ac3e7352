//! Persisted configuration document
//!
//! On disk the document is TOML with a single `[default]` section:
//!
//! ```toml
//! [default]
//! author = "Jane Doe"
//! template = "standard"
//!
//! [default.Git]
//! ssh = true
//! ignore = ["*.tmp", "*.log"]
//! ```
//!
//! Older files stored plugin options as dotted keys directly under
//! `[default]` (`"Git.ssh" = true`), or as shortcut settings such as
//! `ssh = true` and `ignore_patterns = "*.tmp,*.log"`. Both are normalized
//! into plugin sections on read and never written back. Precedence for one
//! option: nested section, then dotted key, then shortcut.

use std::collections::BTreeMap;

use jtc_options::{
    apply_entries, split_list_body, OptionEntry, OptionMap, OptionValue, PluginOptionMap,
};
use tracing::debug;

/// Name of the only section jtc reads settings and plugins from
pub const DEFAULT_SECTION: &str = "default";

/// Older `[default]` shortcut keys and the plugin option each one sets
const LEGACY_SHORTCUTS: &[(&str, &str, &str)] = &[
    ("formatter_style", "Formatter", "style"),
    ("ssh", "Git", "ssh"),
    ("ignore_patterns", "Git", "ignore"),
    ("tests_aqua", "Tests", "aqua"),
    ("tests_jet", "Tests", "jet"),
    ("tests_project", "Tests", "project"),
    ("project_version", "ProjectFile", "version"),
];

/// The legacy flat layout: settings plus `Plugin.key` dotted keys
pub type FlatDocument = BTreeMap<String, OptionValue>;

/// Normalized configuration document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    /// Scalar base settings (author, user, mail, license, template, ...)
    pub settings: OptionMap,

    /// Per-plugin option sections. An empty section still enables the plugin.
    pub plugins: PluginOptionMap,

    /// Top-level tables other than `[default]`, kept for round trips
    pub extra: toml::Table,
}

impl ConfigDocument {
    /// Parse TOML text, normalizing the legacy dotted layout
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(text)?;
        Ok(Self::from_toml_table(table))
    }

    pub fn from_toml_table(table: toml::Table) -> Self {
        let mut document = Self::default();
        for (name, value) in table {
            if name != DEFAULT_SECTION {
                document.extra.insert(name, value);
                continue;
            }
            match value {
                toml::Value::Table(section) => document.absorb_default_section(section),
                other => debug!(value = %other, "ignoring non-table [default] entry"),
            }
        }
        document
    }

    fn absorb_default_section(&mut self, section: toml::Table) {
        let mut nested = Vec::new();
        let mut shortcuts = Vec::new();

        for (key, value) in section {
            match value {
                toml::Value::Table(options) => nested.push((key, options)),
                scalar => {
                    let Some(value) = option_value_from_toml(scalar) else {
                        continue;
                    };
                    match key.split_once('.') {
                        Some((plugin, option)) => {
                            self.plugins
                                .entry(plugin.to_string())
                                .or_default()
                                .insert(option.to_string(), value);
                        }
                        None => match legacy_shortcut(&key) {
                            Some((plugin, option)) => shortcuts.push((plugin, option, value)),
                            None => {
                                self.settings.insert(key, value);
                            }
                        },
                    }
                }
            }
        }

        for (plugin, option, value) in shortcuts {
            let value = match (option, value) {
                ("ignore", OptionValue::String(s)) => OptionValue::List(split_list_body(&s)),
                (_, value) => value,
            };
            debug!(%plugin, %option, "normalizing legacy shortcut setting");
            self.plugins
                .entry(plugin.to_string())
                .or_default()
                .entry(option.to_string())
                .or_insert(value);
        }

        // Nested sections win over legacy dotted keys for the same option
        for (plugin, options) in nested {
            let section = self.plugins.entry(plugin.clone()).or_default();
            for (key, value) in options {
                match option_value_from_toml(value) {
                    Some(value) => {
                        section.insert(key, value);
                    }
                    None => debug!(%plugin, %key, "skipping table nested in plugin section"),
                }
            }
        }
    }

    /// Build the TOML table written to disk (plugins as sub-tables)
    pub fn to_toml_table(&self) -> toml::Table {
        let mut root = self.extra.clone();
        let mut section = toml::Table::new();

        for (key, value) in &self.settings {
            section.insert(key.clone(), option_value_to_toml(value));
        }
        for (plugin, options) in &self.plugins {
            let table: toml::Table = options
                .iter()
                .map(|(k, v)| (k.clone(), option_value_to_toml(v)))
                .collect();
            section.insert(plugin.clone(), toml::Value::Table(table));
        }

        root.insert(DEFAULT_SECTION.to_string(), toml::Value::Table(section));
        root
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(&self.to_toml_table())
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty() && self.plugins.is_empty() && self.extra.is_empty()
    }

    pub fn setting(&self, key: &str) -> Option<&OptionValue> {
        self.settings.get(key)
    }

    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.setting(key).and_then(|v| v.as_str())
    }

    pub fn set_setting(&mut self, key: &str, value: impl Into<OptionValue>) {
        self.settings.insert(key.to_string(), value.into());
    }

    pub fn plugin_options(&self, plugin: &str) -> Option<&OptionMap> {
        self.plugins.get(plugin)
    }

    /// Merge tokenized entries into a plugin section.
    ///
    /// The section is created even when `entries` is empty, which records
    /// the plugin as enabled with default options.
    pub fn merge_plugin_entries(&mut self, plugin: &str, entries: Vec<OptionEntry>) {
        self.plugins.entry(plugin.to_string()).or_default();
        apply_entries(
            &mut self.plugins,
            entries.into_iter().map(|mut entry| {
                entry.plugin = plugin.to_string();
                entry
            }),
        );
    }

    /// Drop a plugin section; returns whether it existed
    pub fn remove_plugin(&mut self, plugin: &str) -> bool {
        self.plugins.remove(plugin).is_some()
    }

    /// Remove `Plugin.key`, a setting, or a whole plugin section.
    ///
    /// Returns whether anything was removed.
    pub fn unset(&mut self, key: &str) -> bool {
        if let Some((plugin, option)) = key.split_once('.') {
            return self
                .plugins
                .get_mut(plugin)
                .map(|options| options.remove(option).is_some())
                .unwrap_or(false);
        }
        self.settings.remove(key).is_some() || self.remove_plugin(key)
    }
}

fn legacy_shortcut(key: &str) -> Option<(&'static str, &'static str)> {
    LEGACY_SHORTCUTS
        .iter()
        .find(|(shortcut, _, _)| *shortcut == key)
        .map(|&(_, plugin, option)| (plugin, option))
}

/// Flatten a document into the legacy dotted-key layout.
///
/// Empty plugin sections and tables outside `[default]` have no flat
/// representation and are dropped.
pub fn flatten(document: &ConfigDocument) -> FlatDocument {
    let mut flat = document.settings.clone();
    for (plugin, options) in &document.plugins {
        for (key, value) in options {
            flat.insert(format!("{}.{}", plugin, key), value.clone());
        }
    }
    flat
}

/// Rebuild a nested document from the dotted-key layout.
///
/// The key is split at its first `.`: `Git.ssh` is option `ssh` of
/// plugin `Git`. Keys without a dot are base settings.
pub fn unflatten(flat: &FlatDocument) -> ConfigDocument {
    let mut document = ConfigDocument::default();
    for (key, value) in flat {
        match key.split_once('.') {
            Some((plugin, option)) => {
                document
                    .plugins
                    .entry(plugin.to_string())
                    .or_default()
                    .insert(option.to_string(), value.clone());
            }
            None => {
                document.settings.insert(key.clone(), value.clone());
            }
        }
    }
    document
}

/// Convert a TOML value to an option value. Tables have no equivalent.
pub fn option_value_from_toml(value: toml::Value) -> Option<OptionValue> {
    match value {
        toml::Value::String(s) => Some(OptionValue::String(s)),
        toml::Value::Integer(i) => Some(OptionValue::Integer(i)),
        toml::Value::Boolean(b) => Some(OptionValue::Boolean(b)),
        toml::Value::Float(f) => Some(OptionValue::String(f.to_string())),
        toml::Value::Datetime(dt) => Some(OptionValue::String(dt.to_string())),
        toml::Value::Array(items) => Some(OptionValue::List(
            items.into_iter().flat_map(toml_list_items).collect(),
        )),
        toml::Value::Table(_) => None,
    }
}

/// Array elements as strings; nested arrays are flattened one level down
fn toml_list_items(value: toml::Value) -> Vec<String> {
    match value {
        toml::Value::String(s) => vec![s],
        toml::Value::Array(items) => items.into_iter().flat_map(toml_list_items).collect(),
        toml::Value::Table(_) => Vec::new(),
        other => vec![other.to_string()],
    }
}

pub fn option_value_to_toml(value: &OptionValue) -> toml::Value {
    match value {
        OptionValue::Boolean(b) => toml::Value::Boolean(*b),
        OptionValue::Integer(i) => toml::Value::Integer(*i),
        OptionValue::String(s) => toml::Value::String(s.clone()),
        OptionValue::List(items) => {
            toml::Value::Array(items.iter().cloned().map(toml::Value::String).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jtc_options::tokenize;

    fn sample_document() -> ConfigDocument {
        let mut doc = ConfigDocument::default();
        doc.set_setting("author", "Test Author");
        doc.set_setting("template", "full");
        doc.merge_plugin_entries(
            "Git",
            vec![
                OptionEntry::assign("Git", "ssh", true),
                OptionEntry::assign(
                    "Git",
                    "ignore",
                    OptionValue::List(vec!["*.tmp".into(), "*.log".into()]),
                ),
            ],
        );
        doc.merge_plugin_entries("Tests", vec![OptionEntry::assign("Tests", "aqua", true)]);
        doc
    }

    #[test]
    fn test_parse_nested_layout() {
        let doc = ConfigDocument::parse(
            r#"
[default]
author = "Test Author"
license = "MIT"

[default.Git]
ssh = true
manifest = false

[default.Formatter]
style = "blue"
"#,
        )
        .unwrap();

        assert_eq!(doc.setting_str("author"), Some("Test Author"));
        assert_eq!(doc.plugins["Git"]["ssh"], OptionValue::Boolean(true));
        assert_eq!(doc.plugins["Git"]["manifest"], OptionValue::Boolean(false));
        assert_eq!(doc.plugins["Formatter"]["style"], OptionValue::from("blue"));
        assert!(doc.setting("Git").is_none());
    }

    #[test]
    fn test_parse_legacy_dotted_keys() {
        let doc = ConfigDocument::parse(
            r#"
[default]
template = "standard"
"Git.ssh" = true
"Git.manifest" = false
"Tests.aqua" = true
"#,
        )
        .unwrap();

        assert_eq!(doc.settings.len(), 1);
        assert_eq!(doc.plugins["Git"]["ssh"], OptionValue::Boolean(true));
        assert_eq!(doc.plugins["Git"]["manifest"], OptionValue::Boolean(false));
        assert_eq!(doc.plugins["Tests"]["aqua"], OptionValue::Boolean(true));
    }

    #[test]
    fn test_nested_wins_over_dotted() {
        let doc = ConfigDocument::parse(
            r#"
[default]
"Git.ssh" = false
"Git.manifest" = true

[default.Git]
ssh = true
"#,
        )
        .unwrap();

        assert_eq!(doc.plugins["Git"]["ssh"], OptionValue::Boolean(true));
        assert_eq!(doc.plugins["Git"]["manifest"], OptionValue::Boolean(true));
    }

    #[test]
    fn test_legacy_shortcut_settings_become_plugin_options() {
        let doc = ConfigDocument::parse(
            r#"
[default]
author = "A"
formatter_style = "blue"
ssh = true
ignore_patterns = "*.tmp, *.log"
tests_aqua = true
tests_jet = false
tests_project = true
project_version = "0.2.0"
"#,
        )
        .unwrap();

        assert_eq!(doc.settings.keys().collect::<Vec<_>>(), vec!["author"]);
        assert_eq!(doc.plugins["Formatter"]["style"], OptionValue::from("blue"));
        assert_eq!(doc.plugins["Git"]["ssh"], OptionValue::Boolean(true));
        assert_eq!(
            doc.plugins["Git"]["ignore"],
            OptionValue::List(vec!["*.tmp".into(), "*.log".into()])
        );
        assert_eq!(doc.plugins["Tests"]["aqua"], OptionValue::Boolean(true));
        assert_eq!(doc.plugins["Tests"]["jet"], OptionValue::Boolean(false));
        assert_eq!(doc.plugins["Tests"]["project"], OptionValue::Boolean(true));
        assert_eq!(doc.plugins["ProjectFile"]["version"], OptionValue::from("0.2.0"));
    }

    #[test]
    fn test_legacy_shortcut_loses_to_dotted_and_nested() {
        let doc = ConfigDocument::parse(
            r#"
[default]
ssh = true
formatter_style = "blue"
"Formatter.style" = "sciml"
tests_aqua = true

[default.Git]
ssh = false

[default.Tests]
aqua = false
"#,
        )
        .unwrap();

        assert_eq!(doc.plugins["Git"]["ssh"], OptionValue::Boolean(false));
        assert_eq!(doc.plugins["Formatter"]["style"], OptionValue::from("sciml"));
        assert_eq!(doc.plugins["Tests"]["aqua"], OptionValue::Boolean(false));
        assert!(doc.settings.is_empty());
    }

    #[test]
    fn test_legacy_layout_written_nested() {
        let doc = ConfigDocument::parse("[default]\n\"Git.ssh\" = true\n").unwrap();
        let text = doc.to_toml_string().unwrap();

        assert!(text.contains("[default.Git]"), "got: {}", text);
        assert!(!text.contains("Git.ssh"), "got: {}", text);
        assert_eq!(ConfigDocument::parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_toml_round_trip() {
        let doc = sample_document();
        let text = doc.to_toml_string().unwrap();
        assert_eq!(ConfigDocument::parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_empty_plugin_section_survives_toml() {
        let mut doc = ConfigDocument::default();
        doc.merge_plugin_entries("SrcDir", Vec::new());
        let text = doc.to_toml_string().unwrap();
        let reparsed = ConfigDocument::parse(&text).unwrap();
        assert!(reparsed.plugins["SrcDir"].is_empty());
    }

    #[test]
    fn test_other_sections_preserved() {
        let doc = ConfigDocument::parse("[default]\nauthor = \"A\"\n\n[profiles]\nwork = \"x\"\n")
            .unwrap();
        assert!(doc.extra.contains_key("profiles"));
        let reparsed = ConfigDocument::parse(&doc.to_toml_string().unwrap()).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_toml_value_conversion() {
        let doc = ConfigDocument::parse(
            r#"
[default.Custom]
ratio = 0.5
nested = [["a", "b"], "c", 3]
deeper = { x = 1 }
"#,
        )
        .unwrap();
        let custom = &doc.plugins["Custom"];
        assert_eq!(custom["ratio"], OptionValue::from("0.5"));
        assert_eq!(
            custom["nested"],
            OptionValue::List(vec!["a".into(), "b".into(), "c".into(), "3".into()])
        );
        assert!(!custom.contains_key("deeper"));
    }

    #[test]
    fn test_flatten() {
        let flat = flatten(&sample_document());
        assert_eq!(flat["author"], OptionValue::from("Test Author"));
        assert_eq!(flat["Git.ssh"], OptionValue::Boolean(true));
        assert_eq!(flat["Tests.aqua"], OptionValue::Boolean(true));
        assert!(!flat.contains_key("Git"));
    }

    #[test]
    fn test_unflatten_flatten_round_trip() {
        let doc = sample_document();
        assert_eq!(unflatten(&flatten(&doc)), doc);
    }

    #[test]
    fn test_flatten_unflatten_round_trip() {
        let mut flat = FlatDocument::new();
        flat.insert("user".into(), OptionValue::from("octocat"));
        flat.insert("Git.manifest".into(), OptionValue::Boolean(false));
        flat.insert("ProjectFile.version".into(), OptionValue::from("0.1.0"));
        flat.insert("Documenter.makedocs_kwargs".into(), OptionValue::List(vec![]));

        assert_eq!(flatten(&unflatten(&flat)), flat);
    }

    #[test]
    fn test_unflatten_splits_at_first_dot() {
        let mut flat = FlatDocument::new();
        flat.insert("Custom.a.b".into(), OptionValue::Integer(2));
        let doc = unflatten(&flat);
        assert_eq!(doc.plugins["Custom"]["a.b"], OptionValue::Integer(2));
    }

    #[test]
    fn test_merge_plugin_entries_key_level() {
        let mut doc = ConfigDocument::default();
        doc.merge_plugin_entries("Git", tokenize("Git", "ssh=true manifest=false"));
        doc.merge_plugin_entries("Git", tokenize("Git", "manifest=true"));
        doc.merge_plugin_entries("Git", tokenize("Git", r#"ignore="*.tmp" ignore+="*.log""#));

        let git = &doc.plugins["Git"];
        assert_eq!(git["ssh"], OptionValue::Boolean(true));
        assert_eq!(git["manifest"], OptionValue::Boolean(true));
        assert_eq!(git["ignore"], OptionValue::List(vec!["*.tmp".into(), "*.log".into()]));
    }

    #[test]
    fn test_remove_plugin() {
        let mut doc = sample_document();
        assert!(doc.remove_plugin("Tests"));
        assert!(!doc.remove_plugin("Tests"));
        assert!(doc.plugin_options("Tests").is_none());
    }
}
