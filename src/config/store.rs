//! Config file location, loading and saving
//!
//! The file lives at `$XDG_CONFIG_HOME/jtc/config.toml`, falling back to
//! `~/.config/jtc/config.toml`. An explicit path always wins. The path is
//! passed to every call; nothing here is process-global.
//!
//! Loading never fails: a missing file is an empty document, and an
//! unreadable or malformed file is an empty document plus a warning.
//! Saving is the one operation whose failure is reported.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use super::document::ConfigDocument;
use super::resolved::ConfigSource;

/// Directory under the config base that holds the file
pub const CONFIG_DIR_NAME: &str = "jtc";

/// File name of the config document
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors from saving the config document or locating it
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to write config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No config location: pass --config or set XDG_CONFIG_HOME or HOME")]
    NoConfigDir,

    #[error("{0}; fix or remove the file before changing it")]
    Unusable(StoreWarning),
}

/// Non-fatal problems found while loading
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreWarning {
    #[error("Error reading config file {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("Error loading config file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Result of [`load`]
#[derive(Debug, Clone, Default)]
pub struct LoadedDocument {
    pub document: ConfigDocument,

    /// Set when a file was read and parsed
    pub source: Option<ConfigSource>,

    /// Set when the file existed but could not be used
    pub warning: Option<StoreWarning>,
}

/// Resolve the config file path.
///
/// Precedence: `explicit`, then `xdg_config_home/jtc/config.toml`, then
/// `home/.config/jtc/config.toml`. Empty variables count as unset.
pub fn config_path(
    explicit: Option<&Path>,
    xdg_config_home: Option<&OsStr>,
    home: Option<&OsStr>,
) -> Result<PathBuf, StoreError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let base = match (
        xdg_config_home.filter(|v| !v.is_empty()),
        home.filter(|v| !v.is_empty()),
    ) {
        (Some(xdg), _) => PathBuf::from(xdg),
        (None, Some(home)) => PathBuf::from(home).join(".config"),
        (None, None) => return Err(StoreError::NoConfigDir),
    };

    Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// [`config_path`] using the process environment
pub fn default_config_path(explicit: Option<&Path>) -> Result<PathBuf, StoreError> {
    let xdg = std::env::var_os("XDG_CONFIG_HOME");
    let home = std::env::var_os("HOME");
    config_path(explicit, xdg.as_deref(), home.as_deref())
}

/// Load the document at `path`
pub fn load(path: &Path) -> LoadedDocument {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file");
            return LoadedDocument::default();
        }
        Err(e) => {
            return LoadedDocument {
                warning: Some(StoreWarning::Unreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }),
                ..LoadedDocument::default()
            };
        }
    };

    let digest = hex::encode(Sha256::digest(&bytes));

    let parsed = String::from_utf8(bytes)
        .map_err(|e| format!("Invalid UTF-8: {}", e))
        .and_then(|text| ConfigDocument::parse(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(document) => {
            debug!(path = %path.display(), %digest, "loaded config");
            LoadedDocument {
                document,
                source: Some(ConfigSource::file(path, digest)),
                warning: None,
            }
        }
        Err(reason) => LoadedDocument {
            warning: Some(StoreWarning::Malformed {
                path: path.to_path_buf(),
                reason,
            }),
            ..LoadedDocument::default()
        },
    }
}

/// Load the document at `path` for modification.
///
/// Unlike [`load`], a file that exists but cannot be used is an error:
/// saving the empty fallback over it would lose the user's settings.
pub fn load_for_update(path: &Path) -> Result<LoadedDocument, StoreError> {
    let loaded = load(path);
    match loaded.warning {
        Some(warning) => Err(StoreError::Unusable(warning)),
        None => Ok(loaded),
    }
}

/// Write the document to `path`, creating parent directories
pub fn save(path: &Path, document: &ConfigDocument) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let text = document.to_toml_string()?;
    fs::write(path, text).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "saved config");
    Ok(())
}
