//! Registry documents: named, ordered collections of config entries.
//!
//! One document per registry, looked up by filename stem in the registry
//! directory. Documents are authored outside this tool and are never
//! modified by it.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use super::toml_loader::{self, Format};
use crate::error::RegistryError;

/// How an entry's source becomes its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Target is a symlink to the source.
    #[default]
    Symlink,
    /// Target is a recursive copy of the source.
    Copy,
    /// Target is the source with `{{NAME}}` placeholders filled in.
    Template,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symlink => write!(f, "symlink"),
            Self::Copy => write!(f, "copy"),
            Self::Template => write!(f, "template"),
        }
    }
}

/// One declarative `source -> target` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigEntry {
    /// Entry name, unique within its registry by convention.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Source path, relative to the repository root or absolute.
    pub source: String,
    /// Target path; may contain `~`, `$VAR` and `${VAR}` references.
    pub target: String,
    /// Install strategy (`type` in documents), default `symlink`.
    #[serde(default, rename = "type")]
    pub strategy: Strategy,
}

/// A loaded registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    /// Registry name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Entries in declaration order.
    pub entries: Vec<ConfigEntry>,
}

/// On-disk shape of a registry document.
#[derive(Debug, Deserialize)]
struct RegistryDocument {
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    configs: Vec<ConfigEntry>,
}

/// Read-only view over the registry directory.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    dir: PathBuf,
}

impl RegistryStore {
    /// Create a store rooted at `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory that holds registry documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the registry named `name`.
    ///
    /// `<name>.toml` is preferred over `<name>.json` when both exist.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no document exists,
    /// [`RegistryError::Parse`] if it is malformed, and
    /// [`RegistryError::Io`] if it cannot be read.
    pub fn load(&self, name: &str) -> Result<Registry, RegistryError> {
        let not_found = || RegistryError::NotFound {
            name: name.to_string(),
            dir: self.dir.clone(),
        };

        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(not_found());
        }

        let path = Format::ALL
            .into_iter()
            .map(|f| self.dir.join(format!("{name}.{}", f.extension())))
            .find(|p| p.is_file())
            .ok_or_else(not_found)?;

        load_document(&path, name)
    }

    /// Names of every registry document, sorted and de-duplicated.
    ///
    /// A missing registry directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] if the directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<String>, RegistryError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let io_err = |source| RegistryError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut names = BTreeSet::new();
        for entry in std::fs::read_dir(&self.dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() || Format::from_path(&path).is_none() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && !stem.starts_with('.')
            {
                names.insert(stem.to_string());
            }
        }
        Ok(names.into_iter().collect())
    }
}

/// Read and parse a single registry document.
fn load_document(path: &Path, stem: &str) -> Result<Registry, RegistryError> {
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let format = Format::from_path(path).unwrap_or(Format::Toml);
    let doc: RegistryDocument =
        toml_loader::parse_document(&content, format).map_err(|message| RegistryError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

    Ok(Registry {
        name: doc.name.unwrap_or_else(|| stem.to_string()),
        description: doc.description,
        entries: doc.configs,
    })
}
