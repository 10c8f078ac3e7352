//! jtc CLI
//!
//! Entry point for the `jtc` command-line tool.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use jtc::catalog;
use jtc::cli::{PluginFlags, SettingArgs};
use jtc::config::{self, ConfigDocument, LoadedDocument, ResolveInputs, ResolvedConfig};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jtc")]
#[command(about = "Resolve plugin options for Julia package templates", version)]
struct Cli {
    /// Log resolution steps to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve plugin options from defaults, config file and flags
    Resolve {
        /// Path to config file (default: $XDG_CONFIG_HOME/jtc/config.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        #[command(flatten)]
        settings: SettingArgs,

        #[command(flatten)]
        plugins: PluginFlags,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Also write the JSON result to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Manage the persisted default configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Merge settings and plugin options into the config file
    Set {
        /// Path to config file (default: $XDG_CONFIG_HOME/jtc/config.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        #[command(flatten)]
        settings: SettingArgs,

        #[command(flatten)]
        plugins: PluginFlags,
    },

    /// Remove settings (`author`), plugin sections (`Git`) or options (`Git.ssh`)
    Unset {
        /// Path to config file (default: $XDG_CONFIG_HOME/jtc/config.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Keys to remove
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Print the normalized config file
    Show {
        /// Path to config file (default: $XDG_CONFIG_HOME/jtc/config.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Print plugin options as dotted keys
        #[arg(long)]
        flat: bool,
    },

    /// Print the config file location
    Path {
        /// Path to config file (default: $XDG_CONFIG_HOME/jtc/config.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            config,
            settings,
            plugins,
            json,
            output,
        } => {
            run_resolve(config, &settings, &plugins, json, output);
        }
        Commands::Config { action } => match action {
            ConfigCommands::Set {
                config,
                settings,
                plugins,
            } => {
                run_config_set(config, &settings, &plugins);
            }
            ConfigCommands::Unset { config, keys } => {
                run_config_unset(config, &keys);
            }
            ConfigCommands::Show { config, flat } => {
                run_config_show(config, flat);
            }
            ConfigCommands::Path { config } => {
                let path = require_config_path(config);
                println!("{}", path.display());
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("jtc=debug,jtc_options=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn require_config_path(explicit: Option<PathBuf>) -> PathBuf {
    match config::default_config_path(explicit.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn load_with_warning(path: &Path) -> LoadedDocument {
    let loaded = config::load(path);
    if let Some(ref warning) = loaded.warning {
        warn!("{}", warning);
    }
    loaded
}

fn load_for_update_or_exit(path: &Path) -> LoadedDocument {
    match config::load_for_update(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_resolve(
    config_path: Option<PathBuf>,
    settings: &SettingArgs,
    plugins: &PluginFlags,
    json: bool,
    output: Option<PathBuf>,
) {
    // No config location at all is the same as an absent file
    let loaded = match config::default_config_path(config_path.as_deref()) {
        Ok(path) => load_with_warning(&path),
        Err(e) => {
            warn!("{}", e);
            LoadedDocument::default()
        }
    };

    let resolved = ResolvedConfig::build(ResolveInputs {
        document: loaded.document,
        document_source: loaded.source,
        cli_settings: settings.to_settings(),
        cli_layers: plugins.to_layers(),
    });

    for warning in &resolved.warnings {
        warn!("{}", warning);
    }

    if let Some(ref path) = output {
        if let Err(e) = resolved.write_to_file(path) {
            eprintln!("Error writing {}: {}", path.display(), e);
            process::exit(1);
        }
    }

    if json {
        match resolved.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        print!("{}", resolved.to_human());
    }
}

fn run_config_set(config_path: Option<PathBuf>, settings: &SettingArgs, plugins: &PluginFlags) {
    let path = require_config_path(config_path);
    let mut document = load_for_update_or_exit(&path).document;

    let new_settings = settings.to_settings();
    if new_settings.is_empty() && plugins.is_empty() {
        eprintln!("Nothing to set; pass a setting such as --author or a plugin flag such as --git");
        process::exit(2);
    }

    for (key, value) in new_settings {
        println!("Set default {}: {}", key, value);
        document.settings.insert(key, value);
    }

    for (plugin, entries) in plugins.to_entries() {
        let keys: Vec<String> = entries.iter().map(|e| e.key.clone()).collect();
        document.merge_plugin_entries(&plugin, entries);

        if keys.is_empty() {
            println!("Enabled default plugin: {}", plugin);
        }
        for key in keys {
            if let Some(value) = document.plugins.get(&plugin).and_then(|o| o.get(&key)) {
                println!("Set default {}.{}: {}", plugin, key, value);
            }
        }
    }

    save_or_exit(&path, &document);
}

fn run_config_unset(config_path: Option<PathBuf>, keys: &[String]) {
    let path = require_config_path(config_path);
    let mut document = load_for_update_or_exit(&path).document;

    let mut removed = 0;
    for key in keys {
        if document.unset(key) || document.unset(&canonical_key(key)) {
            println!("Removed: {}", key);
            removed += 1;
        } else {
            println!("Not set: {}", key);
        }
    }

    if removed == 0 {
        println!("Configuration unchanged: {}", path.display());
        return;
    }
    save_or_exit(&path, &document);
}

/// `git.ssh` -> `Git.ssh`, `git` -> `Git`
fn canonical_key(key: &str) -> String {
    match key.split_once('.') {
        Some((plugin, option)) => format!("{}.{}", catalog::canonical_name(plugin), option),
        None => catalog::canonical_name(key),
    }
}

fn save_or_exit(path: &Path, document: &ConfigDocument) {
    if let Err(e) = config::save(path, document) {
        eprintln!("Error saving configuration: {}", e);
        process::exit(1);
    }
    println!("Configuration saved to: {}", path.display());
}

fn run_config_show(config_path: Option<PathBuf>, flat: bool) {
    let path = require_config_path(config_path);
    let document = load_with_warning(&path).document;

    if flat {
        for (key, value) in config::flatten(&document) {
            println!("{} = {}", key, value);
        }
        return;
    }

    match document.to_toml_string() {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            process::exit(1);
        }
    }
}
