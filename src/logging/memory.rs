//! In-memory log backend for embedding and tests.
use std::sync::Mutex;

use super::types::{Log, OutcomeCounts, PackageEntry, PackageStatus};
use crate::mergers::MergeOutcome;

/// A single captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// A stage header entry.
    Stage(String),
    /// An informational entry.
    Info(String),
    /// A debug entry.
    Debug(String),
    /// A warning entry.
    Warn(String),
    /// An error entry.
    Error(String),
    /// An undecorated entry.
    Verbatim(String),
}

impl LogEntry {
    /// The message text, regardless of level.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Stage(m)
            | Self::Info(m)
            | Self::Debug(m)
            | Self::Warn(m)
            | Self::Error(m)
            | Self::Verbatim(m) => m,
        }
    }
}

/// Implement the display methods of [`Log`] by pushing each message into
/// `self.entries` as the corresponding [`LogEntry`] variant.
macro_rules! capture_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Log backend that keeps every message, package result, and outcome in
/// memory instead of emitting tracing events.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
    packages: Mutex<Vec<PackageEntry>>,
    counts: Mutex<OutcomeCounts>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured entries in emission order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Messages of every captured entry, in emission order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|e| e.message().to_string())
            .collect()
    }

    /// Return `true` if any entry's message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message().contains(needle))
    }

    /// Messages of captured warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::Warn(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Messages of captured errors.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::Error(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Recorded package results.
    #[must_use]
    pub fn packages(&self) -> Vec<PackageEntry> {
        self.packages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Tally of recorded outcomes.
    #[must_use]
    pub fn outcome_counts(&self) -> OutcomeCounts {
        self.counts.lock().map_or_else(|_| OutcomeCounts::default(), |g| *g)
    }
}

impl Log for MemoryLog {
    capture_log_methods!(
        stage => Stage,
        info => Info,
        debug => Debug,
        warn => Warn,
        error => Error,
        verbatim => Verbatim,
    );

    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.packages.lock() {
            guard.push(PackageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    fn record_outcome(&self, outcome: &MergeOutcome) {
        if let Ok(mut guard) = self.counts.lock() {
            guard.add(outcome);
        }
    }
}
