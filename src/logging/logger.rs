//! Structured logger with summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{STAGE_TARGET, VERBATIM_TARGET};
use super::types::{Log, OutcomeCounts, PackageEntry, PackageStatus};
use super::utils::log_file_path;
use crate::mergers::MergeOutcome;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// `record_package` and `record_outcome` are **not** included because their
/// signatures differ from the `fn(&self, &str)` pattern shared by the display
/// methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with summary collection.
///
/// All messages are also written to a persistent log file at
/// `$XDG_CACHE_HOME/cook/<command>.log` (default `~/.cache/cook/<command>.log`)
/// by the subscriber installed with
/// [`init_subscriber`](super::subscriber::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    packages: Mutex<Vec<PackageEntry>>,
    counts: Mutex<OutcomeCounts>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary; this
    /// constructor does not write to the file.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            packages: Mutex::new(Vec::new()),
            counts: Mutex::new(OutcomeCounts::default()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded package entries.
    #[must_use]
    pub fn package_entries(&self) -> Vec<PackageEntry> {
        self.packages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Return the tally of recorded file outcomes.
    #[must_use]
    pub fn outcome_counts(&self) -> OutcomeCounts {
        self.counts.lock().map_or_else(|_| OutcomeCounts::default(), |g| *g)
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Print text without indentation or decoration.
    pub fn verbatim(&self, msg: &str) {
        tracing::info!(target: VERBATIM_TARGET, "{msg}");
    }

    /// Record a package result for the summary.
    pub fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.packages.lock() {
            guard.push(PackageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Record a file outcome for the summary.
    pub fn record_outcome(&self, outcome: &MergeOutcome) {
        if let Ok(mut guard) = self.counts.lock() {
            guard.add(outcome);
        }
    }

    /// Count the packages that did not complete cleanly.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.packages.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|p| p.status != PackageStatus::Ok)
                .count()
        })
    }

    /// Print the summary of all recorded packages.
    pub fn print_summary(&self) {
        let packages = self.package_entries();
        if packages.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut incomplete = 0u32;
        let mut failed = 0u32;

        for package in &packages {
            let (icon, color) = match package.status {
                PackageStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                PackageStatus::Incomplete => {
                    incomplete += 1;
                    ("○", "\x1b[33m")
                }
                PackageStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = package
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", package.name));
        }

        let total = ok + incomplete + failed;
        self.info(&format!(
            "{total} recipes: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{incomplete} incomplete\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        let counts = self.outcome_counts();
        self.info(&format!(
            "files: {} created, {} updated, {} removed, {} unchanged",
            counts.created, counts.updated, counts.removed, counts.unchanged
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, verbatim);

    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        self.record_package(name, status, message);
    }

    fn record_outcome(&self, outcome: &MergeOutcome) {
        self.record_outcome(outcome);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.package_entries().is_empty());
        assert_eq!(log.outcome_counts(), OutcomeCounts::default());
    }

    #[test]
    fn record_package_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_package("acme/demo", PackageStatus::Failed, Some("bad recipe"));
        let packages = log.package_entries();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "acme/demo");
        assert_eq!(packages[0].message, Some("bad recipe".to_string()));
    }

    #[test]
    fn failure_count_includes_incomplete() {
        let (log, _tmp, _guard) = isolated_logger();
        assert_eq!(log.failure_count(), 0);
        log.record_package("a", PackageStatus::Ok, None);
        log.record_package("b", PackageStatus::Incomplete, None);
        log.record_package("c", PackageStatus::Failed, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_package("via-trait", PackageStatus::Ok, None);
        log_ref.record_outcome(&MergeOutcome::Created(PathBuf::from(".env")));
        assert_eq!(log.package_entries().len(), 1);
        assert_eq!(log.outcome_counts().created, 1);
    }

    #[test]
    fn log_file_is_created() {
        let (log, _tmp, _guard) = isolated_logger();
        let path = log.log_path().expect("log path should exist");
        assert!(path.exists(), "log file should be created by the file layer");
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains(&marker));
        assert!(contents.contains("[debug]"));
    }

    #[test]
    fn stage_written_to_file_with_arrow() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("Cooking recipes");
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("==> Cooking recipes"));
    }

    #[test]
    fn verbatim_written_line_by_line() {
        let (log, _tmp, _guard) = isolated_logger();
        log.verbatim("first line\nsecond line");
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("| first line"));
        assert!(contents.contains("| second line"));
    }

    #[test]
    fn warn_and_error_tagged_in_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.warn("warn-marker");
        log.error("error-marker");
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("[warn] warn-marker"));
        assert!(contents.contains("[error] error-marker"));
    }

    #[test]
    fn summary_is_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_package("acme/demo", PackageStatus::Ok, None);
        log.record_outcome(&MergeOutcome::Updated(PathBuf::from(".env")));
        log.print_summary();
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("==> Summary"));
        assert!(contents.contains("✓ acme/demo"));
        assert!(contents.contains("1 recipes: 1 ok, 0 incomplete, 0 failed"));
        assert!(contents.contains("files: 0 created, 1 updated, 0 removed, 0 unchanged"));
    }
}
