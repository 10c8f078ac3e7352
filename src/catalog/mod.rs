//! Plugin catalog
//!
//! Static table of the plugins jtc knows how to pass to the generator.
//! The CLI registers one flag per entry; the resolver only uses it to tell
//! known identifiers from pass-through ones.

/// Whether a plugin takes `key=value` options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    /// Accepts option strings (`--git 'ssh=true'`)
    Options,
    /// Enabling it is all there is (`--srcdir`)
    Toggle,
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginSpec {
    /// Identifier as the generator expects it (case preserved)
    pub id: &'static str,
    /// Long CLI flag, without the leading dashes
    pub flag: &'static str,
    pub kind: PluginKind,
    pub help: &'static str,
}

/// Known plugins.
pub const PLUGINS: &[PluginSpec] = &[
    PluginSpec {
        id: "ProjectFile",
        flag: "projectfile",
        kind: PluginKind::Options,
        help: "ProjectFile options, e.g. 'version=\"0.1.0\"'",
    },
    PluginSpec {
        id: "License",
        flag: "license-plugin",
        kind: PluginKind::Options,
        help: "License options, e.g. 'name=MIT'",
    },
    PluginSpec {
        id: "Git",
        flag: "git",
        kind: PluginKind::Options,
        help: "Git options, e.g. 'manifest=false ssh=true ignore+=\"*.log\"'",
    },
    PluginSpec {
        id: "Tests",
        flag: "tests",
        kind: PluginKind::Options,
        help: "Tests options, e.g. 'aqua=true jet=false project=true'",
    },
    PluginSpec {
        id: "Formatter",
        flag: "formatter",
        kind: PluginKind::Options,
        help: "Formatter options, e.g. 'style=blue'",
    },
    PluginSpec {
        id: "GitHubActions",
        flag: "githubactions",
        kind: PluginKind::Options,
        help: "GitHubActions options, e.g. 'linux=true osx=false'",
    },
    PluginSpec {
        id: "Codecov",
        flag: "codecov",
        kind: PluginKind::Options,
        help: "Codecov options, e.g. 'file=.codecov.yml'",
    },
    PluginSpec {
        id: "Documenter",
        flag: "documenter",
        kind: PluginKind::Options,
        help: "Documenter options, e.g. 'logo=docs/logo.png'",
    },
    PluginSpec {
        id: "TagBot",
        flag: "tagbot",
        kind: PluginKind::Options,
        help: "TagBot options, e.g. 'trigger=JuliaTagBot'",
    },
    PluginSpec {
        id: "CompatHelper",
        flag: "compathelper",
        kind: PluginKind::Options,
        help: "CompatHelper options, e.g. 'cron=\"0 0 * * *\"'",
    },
    PluginSpec {
        id: "Readme",
        flag: "readme",
        kind: PluginKind::Options,
        help: "Readme options, e.g. 'inline_badges=true'",
    },
    PluginSpec {
        id: "SrcDir",
        flag: "srcdir",
        kind: PluginKind::Toggle,
        help: "Enable the SrcDir plugin",
    },
    PluginSpec {
        id: "Citation",
        flag: "citation",
        kind: PluginKind::Toggle,
        help: "Enable the Citation plugin",
    },
    PluginSpec {
        id: "Dependabot",
        flag: "dependabot",
        kind: PluginKind::Toggle,
        help: "Enable the Dependabot plugin",
    },
];

/// Look up a plugin by exact identifier
pub fn lookup(id: &str) -> Option<&'static PluginSpec> {
    PLUGINS.iter().find(|p| p.id == id)
}

/// Look up a plugin by its CLI flag
pub fn from_flag(flag: &str) -> Option<&'static PluginSpec> {
    PLUGINS.iter().find(|p| p.flag == flag)
}

pub fn is_known(id: &str) -> bool {
    lookup(id).is_some()
}

/// Map a user-typed name to the catalog's spelling.
///
/// Matching is case-insensitive; names not in the catalog come back
/// unchanged so newer external plugins still reach the generator.
pub fn canonical_name(name: &str) -> String {
    PLUGINS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(name))
        .map(|p| p.id.to_string())
        .unwrap_or_else(|| name.to_string())
}
