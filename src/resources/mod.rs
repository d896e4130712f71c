//! Idempotent install primitives (check + apply pattern).
//!
//! Each install strategy is a resource: it can report the current state of
//! its target and apply the declared state, backing up whatever it is about
//! to overwrite.
pub mod backup;
pub mod copy;
pub mod helpers;
pub mod symlink;
pub mod template;

use std::path::{Path, PathBuf};

use crate::error::EntryError;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// Implementations create parent directories as needed and back up any
    /// existing target before replacing it.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::Backup`] if the existing target could not be
    /// saved (nothing was changed), or another [`EntryError`] if the change
    /// itself failed.
    fn apply(&self) -> Result<ResourceChange, EntryError>;
}

/// State of a resource target on disk.
///
/// # Examples
///
/// ```
/// use workstation::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "points to /other".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_ne!(wrong, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Target does not exist.
    Missing,
    /// Target exists and matches the desired state.
    Correct,
    /// Target exists but does not match the desired state.
    Incorrect {
        /// Description of what is there instead.
        current: String,
    },
    /// Resource cannot be applied at all (e.g. the source is missing).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Target was created or replaced.
    Applied {
        /// Backup of the previous target, if one existed.
        backup: Option<PathBuf>,
    },
    /// Target already matched; nothing was touched.
    AlreadyCorrect,
}

/// Resources that can determine their own state.
pub trait Resource: Applicable {
    /// Check the current state of the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState, EntryError>;
}

/// Back up `target`, mapping a failure to [`EntryError::Backup`].
fn backup_target(target: &Path) -> Result<Option<PathBuf>, EntryError> {
    backup::backup(target).map_err(|source| EntryError::Backup {
        path: target.to_path_buf(),
        source,
    })
}

/// Wrap a failure of the destructive step.
#[allow(clippy::needless_pass_by_value)]
fn apply_failed(e: anyhow::Error) -> EntryError {
    EntryError::Apply {
        reason: format!("{e:#}"),
    }
}

/// State shared by copy-like strategies: correct whenever the target exists.
fn presence_state(source: &Path, target: &Path) -> ResourceState {
    if !helpers::fs::path_present(source) {
        ResourceState::Invalid {
            reason: format!("source does not exist: {}", source.display()),
        }
    } else if target.exists() {
        ResourceState::Correct
    } else {
        ResourceState::Missing
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn presence_state_requires_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        let target = dir.path().join("dst");
        assert!(matches!(
            presence_state(&source, &target),
            ResourceState::Invalid { .. }
        ));
        std::fs::write(&source, "s").unwrap();
        assert_eq!(presence_state(&source, &target), ResourceState::Missing);
        std::fs::write(&target, "t").unwrap();
        assert_eq!(presence_state(&source, &target), ResourceState::Correct);
    }
}
