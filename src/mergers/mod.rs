//! Format mergers: apply a recipe file entry to its destination, or revert it.
//!
//! Each merger owns one `type` tag. The orchestrator looks mergers up by tag
//! through [`MergerRegistry`] and never sees the concrete types.
mod env;
mod json;
mod php_array;
mod text;
mod yaml;

pub use env::EnvMerger;
pub use json::JsonMerger;
pub use php_array::PhpArrayMerger;
pub use text::TextMerger;
pub use yaml::YamlMerger;

use std::path::{Path, PathBuf};

use crate::error::MergeError;
use crate::recipe::FileEntry;
use crate::state::Context;

/// What a merger did to its destination.
///
/// Paths are relative to the project root, placeholders resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The destination did not exist and was written.
    Created(PathBuf),
    /// The destination existed and was rewritten.
    Updated(PathBuf),
    /// Nothing needed to change.
    Unchanged(PathBuf),
    /// The destination was deleted.
    Removed(PathBuf),
}

impl MergeOutcome {
    /// Destination the outcome refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(p) | Self::Updated(p) | Self::Unchanged(p) | Self::Removed(p) => p,
        }
    }

    /// Operator-facing line for the outcome; `None` when nothing changed.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        let verb = match self {
            Self::Created(_) => "Created",
            Self::Updated(_) => "Updated",
            Self::Removed(_) => "Removed",
            Self::Unchanged(_) => return None,
        };
        Some(format!("{verb} file: {}", self.path().display()))
    }
}

/// A format-specific applier for one file entry type.
pub trait Merger: Send + Sync {
    /// The `type` tag this merger handles.
    fn name(&self) -> &'static str;

    /// Apply `entry` to its destination.
    ///
    /// Applying the same entry twice leaves the destination as after the
    /// first application.
    ///
    /// # Errors
    ///
    /// Returns a [`MergeError`] if the entry is incomplete, its source is
    /// missing, or the destination cannot be read, understood, or written.
    fn merge(&self, entry: &FileEntry, ctx: &Context<'_>) -> Result<MergeOutcome, MergeError>;

    /// Revert what [`merge`](Self::merge) contributed for the current package.
    ///
    /// # Errors
    ///
    /// Returns a [`MergeError`] if the destination cannot be read,
    /// understood, written, or removed.
    fn uninstall(&self, entry: &FileEntry, ctx: &Context<'_>)
    -> Result<MergeOutcome, MergeError>;
}

/// Type-tag-to-merger lookup, built once per run.
pub struct MergerRegistry {
    mergers: Vec<Box<dyn Merger>>,
}

impl std::fmt::Debug for MergerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.mergers.iter().map(|m| m.name()))
            .finish()
    }
}

impl Default for MergerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MergerRegistry {
    /// Registry holding every built-in merger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mergers: vec![
                Box::new(TextMerger),
                Box::new(EnvMerger),
                Box::new(JsonMerger),
                Box::new(YamlMerger::new()),
                Box::new(YamlMerger::docker_compose()),
                Box::new(PhpArrayMerger),
            ],
        }
    }

    /// Return `true` if a merger handles `file_type`.
    #[must_use]
    pub fn supports(&self, file_type: &str) -> bool {
        self.get(file_type).is_some()
    }

    /// Look up the merger for `file_type`.
    #[must_use]
    pub fn get(&self, file_type: &str) -> Option<&dyn Merger> {
        self.mergers
            .iter()
            .find(|m| m.name() == file_type)
            .map(AsRef::as_ref)
    }
}

/// Resolved destination of an entry.
struct Destination {
    /// Relative to the project root, for reporting.
    relative: PathBuf,
    /// Absolute path on disk.
    absolute: PathBuf,
}

impl Destination {
    fn of(entry: &FileEntry, ctx: &Context<'_>) -> Self {
        let relative = PathBuf::from(ctx.state.replace_placeholders(&entry.destination));
        let absolute = ctx.state.project_dir().join(&relative);
        Self { relative, absolute }
    }

    fn unchanged(&self) -> MergeOutcome {
        MergeOutcome::Unchanged(self.relative.clone())
    }

    /// Write `content`, reporting `Created` or `Updated` depending on whether
    /// the file existed before.
    fn write(&self, content: &str, existed: bool) -> Result<MergeOutcome, MergeError> {
        crate::fs::write(&self.absolute, content)?;
        Ok(if existed {
            MergeOutcome::Updated(self.relative.clone())
        } else {
            MergeOutcome::Created(self.relative.clone())
        })
    }

    fn remove(&self) -> Result<MergeOutcome, MergeError> {
        crate::fs::remove(&self.absolute)?;
        Ok(MergeOutcome::Removed(self.relative.clone()))
    }
}

/// Text an entry contributes: inline `content`, else the package file named
/// by `source`.
fn entry_content(entry: &FileEntry, ctx: &Context<'_>) -> Result<String, MergeError> {
    if let Some(content) = &entry.content {
        return Ok(content.clone());
    }
    let Some(source) = &entry.source else {
        return Err(MergeError::MissingRequiredField {
            package: ctx.package().to_string(),
            field: "\"source\" or \"content\"",
            file_type: entry.file_type.clone(),
        });
    };
    let path = ctx.state.source_path(source);
    crate::fs::read_optional(&path)?.ok_or_else(|| MergeError::MissingSourceFile {
        package: ctx.package().to_string(),
        path,
    })
}

/// `entries` of a structured entry, required for its type.
fn required_entries<'e>(
    entry: &'e FileEntry,
    ctx: &Context<'_>,
) -> Result<&'e serde_json::Map<String, serde_json::Value>, MergeError> {
    entry
        .entries
        .as_ref()
        .ok_or_else(|| MergeError::MissingRequiredField {
            package: ctx.package().to_string(),
            field: "\"entries\"",
            file_type: entry.file_type.clone(),
        })
}

/// `true` if `section` passes the entry's `valid_sections` whitelist.
fn section_allowed(entry: &FileEntry, section: &str) -> bool {
    entry
        .valid_sections
        .as_ref()
        .is_none_or(|valid| valid.iter().any(|s| s == section))
}
