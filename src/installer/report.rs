//! Per-entry install and check reports.
use std::path::PathBuf;

use crate::error::EntryError;
use crate::logging::{EntryStatus, Log};

/// What happened to one entry during `install`.
#[derive(Debug)]
pub enum Outcome {
    /// The target was created or replaced.
    Applied {
        /// Backup of the previous target, if one existed.
        backup: Option<PathBuf>,
    },
    /// The target already matched; nothing was touched.
    AlreadyCorrect,
    /// The entry failed; later entries were still processed.
    Failed(EntryError),
}

/// One line of an [`InstallReport`].
#[derive(Debug)]
pub struct EntryOutcome {
    /// Entry name.
    pub name: String,
    /// Result for this entry.
    pub outcome: Outcome,
}

/// Ordered per-entry results of installing a registry.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Registry that was installed.
    pub registry: String,
    /// Results in registry order.
    pub entries: Vec<EntryOutcome>,
}

impl InstallReport {
    /// Number of failed entries.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Failed(_)))
            .count()
    }

    /// Outcome for the entry named `name`.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.outcome)
    }

    /// Backups taken during the run.
    pub fn backups(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Outcome::Applied { backup } => backup.as_ref(),
            _ => None,
        })
    }

    /// Record every entry into `log` for the run summary.
    pub fn record_into(&self, log: &dyn Log) {
        for entry in &self.entries {
            match &entry.outcome {
                Outcome::Applied { backup } => {
                    let note = backup.as_ref().map(|b| format!("backup: {}", b.display()));
                    log.record(&entry.name, EntryStatus::Applied, note.as_deref());
                }
                Outcome::AlreadyCorrect => log.record(&entry.name, EntryStatus::Unchanged, None),
                Outcome::Failed(e) => {
                    log.record(&entry.name, EntryStatus::Failed, Some(&e.to_string()));
                }
            }
        }
    }
}

/// One line of a [`CheckReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    /// Entry name.
    pub name: String,
    /// Whether the target matches the declared state.
    pub passed: bool,
    /// Human-readable state.
    pub detail: String,
}

/// Read-only verification results for a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Registry that was checked.
    pub registry: String,
    /// Results in registry order.
    pub entries: Vec<CheckEntry>,
}

impl CheckReport {
    /// `true` when every entry passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.entries.iter().all(|e| e.passed)
    }

    /// Record every entry into `log` for the run summary.
    pub fn record_into(&self, log: &dyn Log) {
        for entry in &self.entries {
            let status = if entry.passed {
                EntryStatus::Unchanged
            } else {
                EntryStatus::Failed
            };
            log.record(&entry.name, status, Some(&entry.detail));
        }
    }
}

/// Registry listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySummary {
    /// Registry name.
    pub name: String,
    /// Registry description.
    pub description: String,
    /// Number of entries.
    pub entries: usize,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::RecordingLog;

    fn sample() -> InstallReport {
        InstallReport {
            registry: "shell".to_string(),
            entries: vec![
                EntryOutcome {
                    name: "zshrc".to_string(),
                    outcome: Outcome::Applied {
                        backup: Some(PathBuf::from("/h/.zshrc.backup-20240101-000000")),
                    },
                },
                EntryOutcome {
                    name: "aliases".to_string(),
                    outcome: Outcome::AlreadyCorrect,
                },
                EntryOutcome {
                    name: "broken".to_string(),
                    outcome: Outcome::Failed(EntryError::SourceMissing {
                        path: PathBuf::from("/repo/missing"),
                    }),
                },
            ],
        }
    }

    #[test]
    fn counts_failures_and_backups() {
        let report = sample();
        assert_eq!(report.failures(), 1);
        assert_eq!(report.backups().count(), 1);
        assert!(matches!(
            report.outcome("aliases"),
            Some(Outcome::AlreadyCorrect)
        ));
        assert!(report.outcome("nope").is_none());
    }

    #[test]
    fn records_each_entry_in_order() {
        let log = RecordingLog::default();
        sample().record_into(&log);
        assert_eq!(
            log.at("record"),
            vec!["zshrc: Applied", "aliases: Unchanged", "broken: Failed"]
        );
    }

    #[test]
    fn check_report_requires_all_entries() {
        let mut report = CheckReport {
            registry: "shell".to_string(),
            entries: vec![CheckEntry {
                name: "zshrc".to_string(),
                passed: true,
                detail: "ok".to_string(),
            }],
        };
        assert!(report.passed());
        report.entries.push(CheckEntry {
            name: "aliases".to_string(),
            passed: false,
            detail: "missing".to_string(),
        });
        assert!(!report.passed());
    }
}
