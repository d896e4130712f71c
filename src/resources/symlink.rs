//! Symlink resource.
use std::path::PathBuf;

use super::helpers::fs;
use super::{
    Applicable, Resource, ResourceChange, ResourceState, apply_failed, backup_target,
};
use crate::error::EntryError;

/// A symlink resource that can be checked and applied.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The source file/directory (what the symlink points to).
    pub source: PathBuf,
    /// The target path (where the symlink will be created).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange, EntryError> {
        if fs::link_points_to(&self.target, &self.source) {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        fs::ensure_parent_dir(&self.target).map_err(apply_failed)?;

        // Link elsewhere, regular file or directory: save it, then replace.
        let backup = backup_target(&self.target)?;
        fs::remove_path(&self.target).map_err(apply_failed)?;
        fs::create_symlink(&self.source, &self.target).map_err(apply_failed)?;

        Ok(ResourceChange::Applied { backup })
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState, EntryError> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        if fs::link_points_to(&self.target, &self.source) {
            return Ok(ResourceState::Correct);
        }

        let state = match std::fs::read_link(&self.target) {
            Ok(existing) => ResourceState::Incorrect {
                current: format!("points to {}", existing.display()),
            },
            Err(_) if self.target.is_dir() => ResourceState::Incorrect {
                current: "target is a directory".to_string(),
            },
            Err(_) if fs::path_present(&self.target) => ResourceState::Incorrect {
                current: "target is a regular file".to_string(),
            },
            Err(_) => ResourceState::Missing,
        };
        Ok(state)
    }
}
