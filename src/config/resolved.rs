//! Resolved configuration with provenance
//!
//! The resolved config is what the package generator consumes: the merged
//! per-plugin options, the enabled plugin set and the base settings, plus
//! a record of which sources contributed.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use jtc_options::{OptionMap, OptionValue, PluginOptionMap};
use serde::{Deserialize, Serialize};

use super::defaults::{BuiltinDefaults, Template, DEFAULT_TEMPLATE};
use super::document::ConfigDocument;
use super::merge::{merge_settings, resolve, ConfigOrigin, OptionLayer};

/// Schema version for resolved_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "jtc/resolved_config@1";

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ConfigSource {
    pub fn builtin() -> Self {
        Self {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }
    }

    pub fn cli() -> Self {
        Self {
            origin: ConfigOrigin::Cli,
            path: None,
            digest: None,
        }
    }

    pub fn file(path: &Path, digest: String) -> Self {
        Self {
            origin: ConfigOrigin::Config,
            path: Some(path.to_string_lossy().to_string()),
            digest: Some(digest),
        }
    }
}

/// Everything one invocation feeds into resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveInputs {
    /// Loaded config document (empty if none)
    pub document: ConfigDocument,

    /// Where `document` came from, if a file was read
    pub document_source: Option<ConfigSource>,

    /// Base settings given on the command line
    pub cli_settings: OptionMap,

    /// One layer per CLI plugin flag occurrence, in command-line order
    pub cli_layers: Vec<OptionLayer>,
}

/// Resolved configuration handed to the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// Template whose defaults formed the builtin layer
    pub template: Template,

    /// Merged base settings (author, license, ...)
    pub settings: OptionMap,

    /// Merged options for every enabled plugin
    pub plugins: PluginOptionMap,

    /// Plugins supplied by at least one layer
    pub enabled: BTreeSet<String>,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,

    /// Non-fatal problems found while resolving
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ResolvedConfig {
    /// Build the resolved config from its layers
    pub fn build(inputs: ResolveInputs) -> Self {
        let ResolveInputs {
            document,
            document_source,
            cli_settings,
            cli_layers,
        } = inputs;

        let mut warnings = Vec::new();
        let mut sources = vec![ConfigSource::builtin()];
        if let Some(source) = document_source {
            sources.push(source);
        }
        if !cli_settings.is_empty() || !cli_layers.is_empty() {
            sources.push(ConfigSource::cli());
        }

        // Settings first: the template decides the builtin plugin layer
        let defaults = BuiltinDefaults::default();
        let mut settings = merge_settings(vec![
            defaults.settings(),
            document.settings.clone(),
            cli_settings,
        ]);

        let template = match settings.get("template") {
            Some(OptionValue::String(name)) => name.parse::<Template>().unwrap_or_else(|e| {
                warnings.push(format!("{}; using '{}'", e, DEFAULT_TEMPLATE));
                DEFAULT_TEMPLATE
            }),
            Some(other) => {
                warnings.push(format!(
                    "template must be a name, got {}; using '{}'",
                    other, DEFAULT_TEMPLATE
                ));
                DEFAULT_TEMPLATE
            }
            None => defaults.template,
        };
        settings.insert("template".to_string(), OptionValue::from(template.name()));

        let mut layers = Vec::with_capacity(cli_layers.len() + 2);
        layers.push(OptionLayer::from_options(
            ConfigOrigin::Builtin,
            &template.plugin_options(),
        ));
        layers.push(OptionLayer::from_options(
            ConfigOrigin::Config,
            &document.plugins,
        ));
        layers.extend(cli_layers);

        let resolution = resolve(&layers);

        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            template,
            settings,
            plugins: resolution.options,
            enabled: resolution.enabled,
            sources,
            warnings,
        }
    }

    /// Get a plugin option value
    pub fn get(&self, plugin: &str, key: &str) -> Option<&OptionValue> {
        self.plugins.get(plugin)?.get(key)
    }

    pub fn is_enabled(&self, plugin: &str) -> bool {
        self.enabled.contains(plugin)
    }

    /// Get a base setting as string
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(|v| v.as_str())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }

    /// Human-readable summary
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Template: {}\n", self.template));
        for (key, value) in &self.settings {
            if key != "template" {
                out.push_str(&format!("{}: {}\n", key, value));
            }
        }
        out.push_str("\nPlugins:\n");
        for plugin in &self.enabled {
            let options = self.plugins.get(plugin).filter(|o| !o.is_empty());
            match options {
                Some(options) => {
                    let rendered: Vec<String> = options
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect();
                    out.push_str(&format!("  {}({})\n", plugin, rendered.join(", ")));
                }
                None => out.push_str(&format!("  {}()\n", plugin)),
            }
        }
        out
    }
}
