//! User settings loaded from `$XDG_CONFIG_HOME/workstation/config.toml`.
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::toml_loader;
use crate::paths::Dirs;

/// Default secret-storage service prefix for credential passwords.
pub const DEFAULT_KEYCHAIN_PREFIX: &str = "workstation-credentials-";

/// Default Python version pinned into new Python environments.
pub const DEFAULT_PYTHON_VERSION: &str = "3.12";

/// Raw settings as written in `config.toml`; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    registry_dir: Option<String>,
    credentials_dir: Option<String>,
    environments_dir: Option<String>,
    keychain_prefix: Option<String>,
    python_version: Option<String>,
}

/// Effective settings with defaults applied and paths resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding registry documents.
    pub registry_dir: PathBuf,
    /// Directory holding one ciphertext file per credential environment.
    pub credentials_dir: PathBuf,
    /// Directory holding one subdirectory per development environment.
    pub environments_dir: PathBuf,
    /// Secret-storage service prefix for credential passwords.
    pub keychain_prefix: String,
    /// Python version written to `.python-version`.
    pub python_version: String,
}

impl Settings {
    /// Path of the settings file.
    #[must_use]
    pub fn path(dirs: &Dirs) -> PathBuf {
        dirs.app_config_dir().join("config.toml")
    }

    /// Settings with every default applied.
    #[must_use]
    pub fn defaults(root: &Path, dirs: &Dirs) -> Self {
        Self {
            registry_dir: root.join("registries"),
            credentials_dir: dirs.app_config_dir().join("credentials"),
            environments_dir: dirs.app_data_dir().join("environments"),
            keychain_prefix: DEFAULT_KEYCHAIN_PREFIX.to_string(),
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
        }
    }

    /// Load the settings file, falling back to defaults for anything unset.
    ///
    /// A relative `registry_dir` is resolved against the repository `root`;
    /// other paths may start with `~`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be parsed.
    pub fn load(root: &Path, dirs: &Dirs) -> Result<Self> {
        Self::load_from(&Self::path(dirs), root, dirs)
    }

    /// Load settings from an explicit file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(path: &Path, root: &Path, dirs: &Dirs) -> Result<Self> {
        let file: SettingsFile = toml_loader::load_config(path)?;
        let defaults = Self::defaults(root, dirs);

        let expand = |raw: &str| -> PathBuf {
            raw.strip_prefix("~/")
                .map_or_else(|| PathBuf::from(raw), |rest| dirs.home.join(rest))
        };

        Ok(Self {
            registry_dir: file
                .registry_dir
                .map_or(defaults.registry_dir, |d| root.join(expand(&d))),
            credentials_dir: file
                .credentials_dir
                .map_or(defaults.credentials_dir, |d| expand(&d)),
            environments_dir: file
                .environments_dir
                .map_or(defaults.environments_dir, |d| expand(&d)),
            keychain_prefix: file.keychain_prefix.unwrap_or(defaults.keychain_prefix),
            python_version: file.python_version.unwrap_or(defaults.python_version),
        })
    }
}
