//! Discovery of existing dotfiles that can be adopted into the repository.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::config::{ConfigEntry, Strategy};
use crate::logging::Log;
use crate::paths::Dirs;
use crate::prompt::Prompt;
use crate::resources::helpers::fs;

/// Directory under the repository root that receives adopted files.
pub const ADOPTED_DIR: &str = "adopted";

/// Files under `$HOME` worth offering.
const HOME_CANDIDATES: &[&str] = &[
    ".zshrc",
    ".zprofile",
    ".bashrc",
    ".bash_profile",
    ".gitconfig",
    ".vimrc",
    ".tmux.conf",
    ".inputrc",
    ".editorconfig",
];

/// Entries under `$XDG_CONFIG_HOME` worth offering.
const XDG_CONFIG_CANDIDATES: &[&str] = &["git", "nvim", "alacritty", "kitty", "starship.toml"];

/// A location that may hold an adoptable dotfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path on this machine.
    pub path: PathBuf,
    /// Path relative to `$HOME`, used under the adopted directory.
    pub relative: PathBuf,
    /// Target as it should be written in a registry.
    pub target: String,
}

/// The fixed candidate list for `dirs`.
#[must_use]
pub fn default_candidates(dirs: &Dirs) -> Vec<Candidate> {
    let home = HOME_CANDIDATES.iter().map(|name| Candidate {
        path: dirs.home.join(name),
        relative: PathBuf::from(name),
        target: format!("$HOME/{name}"),
    });
    let xdg = XDG_CONFIG_CANDIDATES.iter().map(|name| {
        let path = dirs.config_home.join(name);
        let relative = path
            .strip_prefix(&dirs.home)
            .map_or_else(|_| Path::new(".config").join(name), Path::to_path_buf);
        Candidate {
            path,
            relative,
            target: format!("${{XDG_CONFIG_HOME}}/{name}"),
        }
    });
    home.chain(xdg).collect()
}

/// A dotfile copied into the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adopted {
    /// Where the file was found.
    pub original: PathBuf,
    /// Registry entry describing it.
    pub entry: ConfigEntry,
}

#[derive(Serialize)]
struct Snippet<'a> {
    configs: &'a [ConfigEntry],
}

/// Render adopted entries as a registry `[[configs]]` block.
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn snippet(adopted: &[Adopted]) -> Result<String> {
    let entries: Vec<ConfigEntry> = adopted.iter().map(|a| a.entry.clone()).collect();
    toml::to_string(&Snippet { configs: &entries }).context("render registry snippet")
}

/// Entry name for a relative path: `.tmux.conf` becomes `tmux-conf`.
fn entry_name(relative: &Path) -> String {
    relative
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default()
        .trim_start_matches('.')
        .replace('.', "-")
}

/// Walk `candidates`, offer each adoptable one and copy accepted files into
/// `<root>/adopted/<relative>`. The original is never modified.
///
/// Missing candidates, symlinks into `root` and candidates already adopted
/// are skipped.
///
/// # Errors
///
/// Returns an error if a prompt cannot be answered or a copy fails.
pub fn scan(
    root: &Path,
    candidates: &[Candidate],
    prompt: &dyn Prompt,
    log: &dyn Log,
) -> Result<Vec<Adopted>> {
    let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let mut adopted = Vec::new();

    for candidate in candidates {
        if !fs::path_present(&candidate.path) {
            continue;
        }
        if candidate.path.is_symlink()
            && candidate
                .path
                .canonicalize()
                .is_ok_and(|p| p.starts_with(&canonical_root))
        {
            log.debug(&format!("{}: already managed", candidate.path.display()));
            continue;
        }

        let destination = root.join(ADOPTED_DIR).join(&candidate.relative);
        if fs::path_present(&destination) {
            log.info(&format!(
                "{}: already adopted at {}",
                candidate.path.display(),
                destination.display()
            ));
            continue;
        }

        if !prompt.confirm(&format!("Adopt {}?", candidate.path.display()), false)? {
            continue;
        }

        fs::ensure_parent_dir(&destination)?;
        fs::copy_path(&candidate.path, &destination, true)?;
        log.info(&format!(
            "adopted {} -> {}",
            candidate.path.display(),
            destination.display()
        ));

        let source = Path::new(ADOPTED_DIR).join(&candidate.relative);
        adopted.push(Adopted {
            original: candidate.path.clone(),
            entry: ConfigEntry {
                name: entry_name(&candidate.relative),
                description: format!("Adopted from {}", candidate.target),
                source: source.to_string_lossy().replace('\\', "/"),
                target: candidate.target.clone(),
                strategy: Strategy::Symlink,
            },
        });
    }

    Ok(adopted)
}
