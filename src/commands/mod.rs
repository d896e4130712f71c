//! Command handlers.
//!
//! Each handler receives the resolved [`CommandSetup`], a [`Prompt`] and the
//! run's [`Logger`], and returns [`anyhow::Result`]. Library errors are
//! converted at this boundary.
pub mod config;
pub mod creds;
pub mod env;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::error::CredentialError;
use crate::logging::Logger;
use crate::paths::Dirs;
use crate::prompt::Prompt;

/// Variable naming the repository root.
pub const ROOT_ENV: &str = "WORKSTATION_ROOT";

/// Directory a repository root must contain.
pub const REGISTRY_DIR: &str = "registries";

/// Shared state produced by the common command setup sequence.
#[derive(Debug, Clone)]
pub struct CommandSetup {
    /// Repository root.
    pub root: PathBuf,
    /// Home and XDG directories.
    pub dirs: Dirs,
    /// Effective settings.
    pub settings: Settings,
    /// Treat undefined target variables as errors.
    pub strict: bool,
}

impl CommandSetup {
    /// Resolve the root and load settings.
    ///
    /// With `require_root`, failing to locate the repository is an error;
    /// otherwise the current directory stands in for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is required but cannot be determined, or
    /// the settings file cannot be parsed.
    pub fn init(global: &GlobalOpts, dirs: Dirs, log: &Logger, require_root: bool) -> Result<Self> {
        let root = match resolve_root(global) {
            Ok(root) => root,
            Err(e) if require_root => return Err(e),
            Err(_) => std::env::current_dir().context("cannot read current directory")?,
        };
        log.debug(&format!("root: {}", root.display()));

        let settings = Settings::load(&root, &dirs)?;
        log.debug(&format!("registries: {}", settings.registry_dir.display()));
        log.debug(&format!("credentials: {}", settings.credentials_dir.display()));
        log.debug(&format!("environments: {}", settings.environments_dir.display()));

        Ok(Self {
            root,
            dirs,
            settings,
            strict: global.strict,
        })
    }
}

/// Resolve the repository root from CLI arguments or auto-detection.
///
/// # Errors
///
/// Returns an error if no candidate contains a `registries/` directory.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    resolve_root_with(
        global,
        std::env::var(ROOT_ENV).ok(),
        std::env::current_exe().ok(),
        &std::env::current_dir().context("cannot read current directory")?,
    )
}

/// [`resolve_root`] with its inputs supplied explicitly.
///
/// Order: `--root`, `$WORKSTATION_ROOT`, the binary's location
/// (`target/<profile>/` or `bin/` inside the repository), then `cwd`.
///
/// # Errors
///
/// Returns an error if no candidate contains a `registries/` directory.
pub fn resolve_root_with(
    global: &GlobalOpts,
    env_root: Option<String>,
    exe: Option<PathBuf>,
    cwd: &Path,
) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return Ok(root.clone());
    }

    if let Some(root) = env_root.filter(|r| !r.is_empty()) {
        return Ok(PathBuf::from(root));
    }

    if let Some(parent) = exe.as_deref().and_then(Path::parent) {
        let candidates = [parent.join("../.."), parent.join("..")];
        for candidate in &candidates {
            if candidate.join(REGISTRY_DIR).is_dir() {
                return Ok(std::fs::canonicalize(candidate)?);
            }
        }
    }

    if cwd.join(REGISTRY_DIR).is_dir() {
        return Ok(cwd.to_path_buf());
    }

    anyhow::bail!(
        "cannot determine repository root. Use --root or set {ROOT_ENV} \
         (the root must contain {REGISTRY_DIR}/)"
    );
}

/// Return `value`, or ask for it when missing and someone can answer.
///
/// # Errors
///
/// [`CredentialError::MissingArgument`] when the value is missing and the
/// prompt is not interactive or yields nothing.
pub fn required(
    value: Option<String>,
    prompt: &dyn Prompt,
    question: &str,
    what: &'static str,
) -> Result<String, CredentialError> {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        return Ok(value);
    }
    if !prompt.is_interactive() {
        return Err(CredentialError::MissingArgument(what));
    }
    prompt
        .input(question)
        .ok()
        .map(|answer| answer.trim().to_string())
        .filter(|answer| !answer.is_empty())
        .ok_or(CredentialError::MissingArgument(what))
}
