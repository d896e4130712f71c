//! Core logging types: entry records, status, and the [`Log`] trait.

/// Per-entry result for summary reporting.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    /// Entry name as declared in its registry.
    pub name: String,
    /// Final status of the entry.
    pub status: EntryStatus,
    /// Optional detail message (backup path, error description).
    pub message: Option<String>,
}

/// Status of a processed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// The entry changed the filesystem.
    Applied,
    /// The target already matched; nothing was touched.
    Unchanged,
    /// The entry could not be applied or did not pass a check.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation;
/// library code takes `&dyn Log` so tests can capture or discard output.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record an entry result for the summary.
    fn record(&self, name: &str, status: EntryStatus, message: Option<&str>);
}
