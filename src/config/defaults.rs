//! Built-in defaults (lowest precedence layer)
//!
//! Hardcoded base settings plus the plugin set each template enables.

use std::fmt;
use std::str::FromStr;

use jtc_options::{OptionMap, OptionValue, PluginOptionMap};
use serde::{Deserialize, Serialize};

/// Template used when neither the config file nor the CLI names one
pub const DEFAULT_TEMPLATE: Template = Template::Standard;

/// License used when neither the config file nor the CLI names one
pub const DEFAULT_LICENSE: &str = "MIT";

/// Package template presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Minimal,
    Standard,
    Full,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Minimal, Template::Standard, Template::Full];

    pub fn name(&self) -> &'static str {
        match self {
            Template::Minimal => "minimal",
            Template::Standard => "standard",
            Template::Full => "full",
        }
    }

    /// Plugins enabled by this template, with their default options
    pub fn plugin_options(&self) -> PluginOptionMap {
        let mut plugins = PluginOptionMap::new();

        // minimal
        plugins.insert("ProjectFile".to_string(), OptionMap::new());
        plugins.insert("License".to_string(), OptionMap::new());
        plugins.insert(
            "Git".to_string(),
            OptionMap::from([("manifest".to_string(), OptionValue::Boolean(true))]),
        );
        plugins.insert("Tests".to_string(), OptionMap::new());

        if matches!(self, Template::Standard | Template::Full) {
            plugins.insert("GitHubActions".to_string(), OptionMap::new());
            plugins.insert("Codecov".to_string(), OptionMap::new());
            plugins.insert(
                "Formatter".to_string(),
                OptionMap::from([("style".to_string(), OptionValue::from("nostyle"))]),
            );
        }

        if matches!(self, Template::Full) {
            plugins.insert("Documenter".to_string(), OptionMap::new());
            plugins.insert("TagBot".to_string(), OptionMap::new());
            plugins.insert("CompatHelper".to_string(), OptionMap::new());
        }

        plugins
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown template '{}' (expected one of: minimal, standard, full)",
                    s
                )
            })
    }
}

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Template (default: "standard")
    pub template: Template,

    /// License name (default: "MIT")
    pub license: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE,
            license: DEFAULT_LICENSE.to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Base settings as the lowest settings layer
    pub fn settings(&self) -> OptionMap {
        OptionMap::from([
            ("template".to_string(), OptionValue::from(self.template.name())),
            ("license".to_string(), OptionValue::from(self.license.as_str())),
        ])
    }
}
