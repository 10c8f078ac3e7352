//! Command-line arguments shared by `resolve` and `config set`
//!
//! Plugin flags are not declared one by one: every catalog entry gets a
//! flag (`--git OPTIONS`, `--srcdir`), plus `--plugin NAME[:OPTIONS]` for
//! plugins the catalog does not know.

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Args, Command, FromArgMatches};
use jtc_options::{tokenize, OptionEntry, OptionMap, OptionValue};

use crate::catalog::{self, PluginKind, PLUGINS};
use crate::config::{ConfigOrigin, OptionLayer};

/// Id of the catch-all `--plugin` flag
const PLUGIN_ARG: &str = "plugin";

/// Base settings accepted on the command line
#[derive(Debug, Clone, Default, Args)]
pub struct SettingArgs {
    /// Author name
    #[arg(long, short = 'a')]
    pub author: Option<String>,

    /// Git hosting user name
    #[arg(long)]
    pub user: Option<String>,

    /// Author e-mail
    #[arg(long)]
    pub mail: Option<String>,

    /// License name (e.g. MIT, BSD3)
    #[arg(long)]
    pub license: Option<String>,

    /// Template preset
    #[arg(long, short = 't', value_parser = ["minimal", "standard", "full"])]
    pub template: Option<String>,

    /// Julia version constraint (e.g. 1.10)
    #[arg(long)]
    pub julia_version: Option<String>,
}

impl SettingArgs {
    /// Settings that were given, keyed as in the config document
    pub fn to_settings(&self) -> OptionMap {
        [
            ("author", &self.author),
            ("user", &self.user),
            ("mail", &self.mail),
            ("license", &self.license),
            ("template", &self.template),
            ("julia_version", &self.julia_version),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| (key.to_string(), OptionValue::String(v.clone())))
        })
        .collect()
    }
}

/// One plugin flag occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOccurrence {
    /// Canonical plugin identifier
    pub plugin: String,
    /// Raw option string ("" for a bare flag or toggle)
    pub options: String,
}

/// All plugin flag occurrences, in command-line order
#[derive(Debug, Clone, Default)]
pub struct PluginFlags {
    pub occurrences: Vec<PluginOccurrence>,
}

impl PluginFlags {
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// One precedence layer per occurrence
    pub fn to_layers(&self) -> Vec<OptionLayer> {
        self.occurrences
            .iter()
            .map(|o| OptionLayer::from_option_string(ConfigOrigin::Cli, &o.plugin, &o.options))
            .collect()
    }

    /// Tokenized entries per occurrence, for writing into the config document
    pub fn to_entries(&self) -> Vec<(String, Vec<OptionEntry>)> {
        self.occurrences
            .iter()
            .map(|o| (o.plugin.clone(), tokenize(&o.plugin, &o.options)))
            .collect()
    }
}

/// Parse a `--plugin` value: `Name` or `Name:options`
pub fn parse_plugin_arg(raw: &str) -> Result<PluginOccurrence, String> {
    let (name, options) = raw.split_once(':').unwrap_or((raw, ""));
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid --plugin value '{}': missing plugin name", raw));
    }
    Ok(PluginOccurrence {
        plugin: catalog::canonical_name(name),
        options: options.to_string(),
    })
}

fn register_plugin_args(mut cmd: Command) -> Command {
    for spec in PLUGINS {
        let arg = Arg::new(spec.flag).long(spec.flag).help(spec.help);
        let arg = match spec.kind {
            PluginKind::Options => arg
                .value_name("OPTIONS")
                .value_parser(clap::value_parser!(String))
                .num_args(0..=1)
                .default_missing_value("")
                .action(ArgAction::Append),
            PluginKind::Toggle => arg.action(ArgAction::Count),
        };
        cmd = cmd.arg(arg);
    }

    cmd.arg(
        Arg::new(PLUGIN_ARG)
            .long(PLUGIN_ARG)
            .value_name("NAME[:OPTIONS]")
            .value_parser(clap::value_parser!(String))
            .action(ArgAction::Append)
            .help("Enable any plugin by name, with optional options after ':'"),
    )
}

/// Values of an appendable argument paired with their argv positions
fn indexed_values(matches: &ArgMatches, id: &str) -> Vec<(usize, String)> {
    match (matches.get_many::<String>(id), matches.indices_of(id)) {
        (Some(values), Some(indices)) => indices.zip(values.cloned()).collect(),
        _ => Vec::new(),
    }
}

impl Args for PluginFlags {
    fn augment_args(cmd: Command) -> Command {
        register_plugin_args(cmd)
    }

    fn augment_args_for_update(cmd: Command) -> Command {
        register_plugin_args(cmd)
    }
}

impl FromArgMatches for PluginFlags {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut flags = Self::default();
        flags.update_from_arg_matches(matches)?;
        Ok(flags)
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        let mut found: Vec<(usize, PluginOccurrence)> = Vec::new();

        for spec in PLUGINS {
            match spec.kind {
                PluginKind::Options => {
                    found.extend(indexed_values(matches, spec.flag).into_iter().map(
                        |(index, options)| {
                            (
                                index,
                                PluginOccurrence {
                                    plugin: spec.id.to_string(),
                                    options,
                                },
                            )
                        },
                    ));
                }
                PluginKind::Toggle => {
                    if matches.get_count(spec.flag) > 0 {
                        let index = matches.index_of(spec.flag).unwrap_or(0);
                        found.push((
                            index,
                            PluginOccurrence {
                                plugin: spec.id.to_string(),
                                options: String::new(),
                            },
                        ));
                    }
                }
            }
        }

        for (index, raw) in indexed_values(matches, PLUGIN_ARG) {
            let occurrence = parse_plugin_arg(&raw)
                .map_err(|msg| clap::Error::raw(ErrorKind::InvalidValue, msg))?;
            found.push((index, occurrence));
        }

        found.sort_by_key(|(index, _)| *index);
        self.occurrences
            .extend(found.into_iter().map(|(_, occurrence)| occurrence));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        settings: SettingArgs,

        #[command(flatten)]
        plugins: PluginFlags,
    }

    fn parse(args: &[&str]) -> TestCli {
        TestCli::try_parse_from(std::iter::once("jtc").chain(args.iter().copied())).unwrap()
    }

    fn occ(plugin: &str, options: &str) -> PluginOccurrence {
        PluginOccurrence {
            plugin: plugin.to_string(),
            options: options.to_string(),
        }
    }

    #[test]
    fn test_repeated_flag_keeps_order() {
        let cli = parse(&["--git", "ssh=true manifest=false", "--git", "manifest=true"]);
        assert_eq!(
            cli.plugins.occurrences,
            vec![occ("Git", "ssh=true manifest=false"), occ("Git", "manifest=true")]
        );
    }

    #[test]
    fn test_bare_flag_is_empty_options() {
        let cli = parse(&["--git", "--tests", "aqua=true"]);
        assert_eq!(
            cli.plugins.occurrences,
            vec![occ("Git", ""), occ("Tests", "aqua=true")]
        );
    }

    #[test]
    fn test_empty_string_value() {
        let cli = parse(&["--git", ""]);
        assert_eq!(cli.plugins.occurrences, vec![occ("Git", "")]);
    }

    #[test]
    fn test_toggle_flag() {
        let cli = parse(&["--srcdir"]);
        assert_eq!(cli.plugins.occurrences, vec![occ("SrcDir", "")]);
    }

    #[test]
    fn test_repeated_toggle_enables_once() {
        let cli = parse(&["--srcdir", "--git", "--srcdir"]);
        let srcdir = cli.plugins.occurrences.iter().filter(|o| o.plugin == "SrcDir");
        assert_eq!(srcdir.count(), 1);
        assert!(cli.plugins.occurrences.contains(&occ("Git", "")));
        assert_eq!(cli.plugins.occurrences.len(), 2);
    }

    #[test]
    fn test_generic_plugin_flag() {
        let cli = parse(&["--plugin", "git:ssh=true", "--plugin", "BlueStyle"]);
        assert_eq!(
            cli.plugins.occurrences,
            vec![occ("Git", "ssh=true"), occ("BlueStyle", "")]
        );
    }

    #[test]
    fn test_interleaved_order() {
        let cli = parse(&[
            "--git",
            "ssh=true",
            "--plugin",
            "Git:ssh=false",
            "--git",
            "manifest=true",
        ]);
        let options: Vec<_> = cli.plugins.occurrences.iter().map(|o| o.options.as_str()).collect();
        assert_eq!(options, vec!["ssh=true", "ssh=false", "manifest=true"]);
    }

    #[test]
    fn test_invalid_generic_plugin() {
        let result = TestCli::try_parse_from(["jtc", "--plugin", ":ssh=true"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_flags() {
        let cli = parse(&[]);
        assert!(cli.plugins.is_empty());
        assert!(cli.settings.to_settings().is_empty());
    }

    #[test]
    fn test_settings() {
        let cli = parse(&["--author", "Jane", "--template", "full", "--julia-version", "1.10"]);
        let settings = cli.settings.to_settings();
        assert_eq!(settings["author"], OptionValue::from("Jane"));
        assert_eq!(settings["template"], OptionValue::from("full"));
        assert_eq!(settings["julia_version"], OptionValue::from("1.10"));
        assert!(!settings.contains_key("mail"));
    }

    #[test]
    fn test_to_layers() {
        let cli = parse(&["--git", "ssh=true", "--git", "manifest=true"]);
        let layers = cli.plugins.to_layers();
        assert_eq!(layers.len(), 2);
        assert!(layers.iter().all(|l| l.origin == ConfigOrigin::Cli));
        assert_eq!(layers[1].plugins["Git"][0].key, "manifest");
    }

    #[test]
    fn test_parse_plugin_arg() {
        assert_eq!(parse_plugin_arg("tagbot:trigger=x").unwrap(), occ("TagBot", "trigger=x"));
        assert_eq!(
            parse_plugin_arg("Custom:url=http://x").unwrap(),
            occ("Custom", "url=http://x")
        );
        assert!(parse_plugin_arg("  ").is_err());
    }
}
