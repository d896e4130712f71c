//! Home and XDG base-directory resolution.
//!
//! Every location the engine touches is derived from `HOME` and the XDG
//! overrides. Resolution goes through a lookup function so tests can supply
//! an isolated environment instead of mutating the process environment.
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Context as _, Result};
use regex::Regex;

/// Application directory name under each XDG base directory.
pub const APP_DIR: &str = "workstation";

static NAME_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$"));

/// Whether `name` is usable as a single path component for a named
/// environment: letters, digits, `-` and `_` only.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN
        .as_ref()
        .is_ok_and(|re| re.is_match(name))
}

/// Resolved home and XDG base directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dirs {
    /// `$HOME`.
    pub home: PathBuf,
    /// `$XDG_CONFIG_HOME`, default `~/.config`.
    pub config_home: PathBuf,
    /// `$XDG_CACHE_HOME`, default `~/.cache`.
    pub cache_home: PathBuf,
    /// `$XDG_DATA_HOME`, default `~/.local/share`.
    pub data_home: PathBuf,
    /// `$XDG_STATE_HOME`, default `~/.local/state`.
    pub state_home: PathBuf,
}

impl Dirs {
    /// Resolve from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `HOME` nor the platform home directory
    /// can be determined.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve using `lookup` for every variable.
    ///
    /// Empty values are treated as unset, matching the XDG specification.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let home = match get("HOME") {
            Some(home) => PathBuf::from(home),
            None => directories::BaseDirs::new()
                .map(|b| b.home_dir().to_path_buf())
                .context("cannot determine home directory: HOME is not set")?,
        };

        let xdg = |name: &str, fallback: &str| {
            get(name).map_or_else(|| home.join(fallback), PathBuf::from)
        };

        Ok(Self {
            config_home: xdg("XDG_CONFIG_HOME", ".config"),
            cache_home: xdg("XDG_CACHE_HOME", ".cache"),
            data_home: xdg("XDG_DATA_HOME", ".local/share"),
            state_home: xdg("XDG_STATE_HOME", ".local/state"),
            home,
        })
    }

    /// Value to substitute for a well-known variable when the environment
    /// does not define it.
    #[must_use]
    pub fn fallback_for(&self, name: &str) -> Option<PathBuf> {
        match name {
            "HOME" => Some(self.home.clone()),
            "XDG_CONFIG_HOME" => Some(self.config_home.clone()),
            "XDG_CACHE_HOME" => Some(self.cache_home.clone()),
            "XDG_DATA_HOME" => Some(self.data_home.clone()),
            "XDG_STATE_HOME" => Some(self.state_home.clone()),
            _ => None,
        }
    }

    /// `$XDG_CONFIG_HOME/workstation`.
    #[must_use]
    pub fn app_config_dir(&self) -> PathBuf {
        self.config_home.join(APP_DIR)
    }

    /// `$XDG_CACHE_HOME/workstation`.
    #[must_use]
    pub fn app_cache_dir(&self) -> PathBuf {
        self.cache_home.join(APP_DIR)
    }

    /// `$XDG_DATA_HOME/workstation`.
    #[must_use]
    pub fn app_data_dir(&self) -> PathBuf {
        self.data_home.join(APP_DIR)
    }
}
