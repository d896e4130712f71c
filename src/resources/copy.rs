//! Copy resource: the target is a fresh copy of the source on every apply.
use std::path::PathBuf;

use super::helpers::fs;
use super::{
    Applicable, Resource, ResourceChange, ResourceState, apply_failed, backup_target,
    presence_state,
};
use crate::error::EntryError;

/// A file or directory copied into place.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// File or directory to copy.
    pub source: PathBuf,
    /// Destination path.
    pub target: PathBuf,
}

impl CopyResource {
    /// Create a new copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for CopyResource {
    fn description(&self) -> String {
        format!("{} <= {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange, EntryError> {
        fs::ensure_parent_dir(&self.target).map_err(apply_failed)?;
        let backup = backup_target(&self.target)?;
        fs::remove_path(&self.target).map_err(apply_failed)?;
        fs::copy_path(&self.source, &self.target, false).map_err(apply_failed)?;
        Ok(ResourceChange::Applied { backup })
    }
}

impl Resource for CopyResource {
    fn current_state(&self) -> Result<ResourceState, EntryError> {
        Ok(presence_state(&self.source, &self.target))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn copies_file_when_target_absent() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("gitconfig");
        let target = dir.path().join("home/.gitconfig");
        std::fs::write(&source, "[user]\n  name = dev\n").unwrap();

        let resource = CopyResource::new(source, target.clone());
        assert_eq!(
            resource.apply().unwrap(),
            ResourceChange::Applied { backup: None }
        );
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "[user]\n  name = dev\n"
        );
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn recopies_and_backs_up_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("settings.json");
        let target = dir.path().join("target.json");
        std::fs::write(&source, "{}").unwrap();
        std::fs::write(&target, "{\"edited\": true}").unwrap();

        let resource = CopyResource::new(source, target.clone());
        let ResourceChange::Applied { backup: Some(saved) } = resource.apply().unwrap() else {
            panic!("expected a backup");
        };
        assert_eq!(
            std::fs::read_to_string(saved).unwrap(),
            "{\"edited\": true}"
        );
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{}");
    }

    #[test]
    fn directory_copy_drops_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("kitty-src");
        let target = dir.path().join("kitty");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("kitty.conf"), "font_size 12").unwrap();
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("stale.conf"), "old").unwrap();

        CopyResource::new(source, target.clone()).apply().unwrap();

        assert!(target.join("kitty.conf").exists());
        assert!(!target.join("stale.conf").exists());
    }

    #[cfg(unix)]
    #[test]
    fn replaces_symlink_with_real_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let elsewhere = dir.path().join("elsewhere");
        let target = dir.path().join("target");
        std::fs::write(&source, "copied").unwrap();
        std::fs::write(&elsewhere, "untouched").unwrap();
        std::os::unix::fs::symlink(&elsewhere, &target).unwrap();

        CopyResource::new(source, target.clone()).apply().unwrap();

        assert!(!target.symlink_metadata().unwrap().is_symlink());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "copied");
        assert_eq!(std::fs::read_to_string(&elsewhere).unwrap(), "untouched");
    }
}
