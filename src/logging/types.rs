//! Core logging types: package entries, status, and the [`Log`] trait.
use crate::mergers::MergeOutcome;

/// Package execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    /// Package name (e.g. `acme/demo-bundle`).
    pub name: String,
    /// Final status of the package recipe.
    pub status: PackageStatus,
    /// Optional detail message (e.g., the error that aborted the recipe).
    pub message: Option<String>,
}

/// Status of a processed package recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// Every file entry and directory was applied.
    Ok,
    /// The recipe ran but at least one entry or directory failed.
    Incomplete,
    /// The recipe could not be loaded and nothing was applied.
    Failed,
}

/// Per-run tally of merger outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// Files created.
    pub created: usize,
    /// Files rewritten in place.
    pub updated: usize,
    /// Files deleted.
    pub removed: usize,
    /// Entries that needed no write.
    pub unchanged: usize,
}

impl OutcomeCounts {
    /// Add one outcome to the tally.
    pub const fn add(&mut self, outcome: &MergeOutcome) {
        match outcome {
            MergeOutcome::Created(_) => self.created += 1,
            MergeOutcome::Updated(_) => self.updated += 1,
            MergeOutcome::Removed(_) => self.removed += 1,
            MergeOutcome::Unchanged(_) => self.unchanged += 1,
        }
    }
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation; tests
/// substitute an in-memory log so merger and orchestrator output can be
/// asserted on.
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
    /// Print text exactly as given, without indentation or decoration.
    fn verbatim(&self, msg: &str);
    /// Record a package result for the summary.
    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>);
    /// Record a file outcome for the summary.
    fn record_outcome(&self, outcome: &MergeOutcome);
}
