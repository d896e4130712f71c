//! On-disk environment metadata.
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::Kind;
use crate::error::EnvironmentError;

/// Metadata file inside every environment directory.
pub const RECORD_FILE: &str = "environment.toml";

/// Contents of `environment.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    /// Environment name; equals the directory name.
    pub name: String,
    /// Environment kind.
    pub kind: Kind,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl EnvironmentRecord {
    /// Read the record stored in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read(dir: &Path) -> Result<Self, EnvironmentError> {
        let path = dir.join(RECORD_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| EnvironmentError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| EnvironmentError::Io {
            path,
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        })
    }

    /// Write the record into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    pub fn write(&self, dir: &Path) -> Result<(), EnvironmentError> {
        let path = dir.join(RECORD_FILE);
        let io = |source| EnvironmentError::Io {
            path: path.clone(),
            source,
        };
        let content = toml::to_string(self).map_err(|e| io(std::io::Error::other(e.to_string())))?;
        std::fs::write(&path, content).map_err(io)
    }
}

/// One line of `env list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentInfo {
    /// Directory name.
    pub name: String,
    /// Kind from metadata, if readable.
    pub kind: Option<Kind>,
    /// Creation time from metadata, if readable.
    pub created_at: Option<DateTime<Utc>>,
    /// Environment directory.
    pub root: PathBuf,
}

impl EnvironmentInfo {
    /// Kind for display; `unknown` without metadata.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        self.kind.map_or("unknown", Kind::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let record = EnvironmentRecord {
            name: "ml".to_string(),
            kind: Kind::Python,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        record.write(dir.path()).unwrap();

        let text = std::fs::read_to_string(dir.path().join(RECORD_FILE)).unwrap();
        assert!(text.contains("kind = \"python\""));
        assert_eq!(EnvironmentRecord::read(dir.path()).unwrap(), record);
    }

    #[test]
    fn unreadable_metadata_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RECORD_FILE), "kind = 3").unwrap();
        assert!(EnvironmentRecord::read(dir.path()).is_err());
        let empty = tempfile::tempdir().unwrap();
        assert!(EnvironmentRecord::read(empty.path()).is_err());
    }

    #[test]
    fn kind_label_defaults_to_unknown() {
        let info = EnvironmentInfo {
            name: "x".to_string(),
            kind: None,
            created_at: None,
            root: PathBuf::from("/envs/x"),
        };
        assert_eq!(info.kind_label(), "unknown");
    }
}
