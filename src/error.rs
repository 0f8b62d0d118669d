//! Domain-specific error types for the recipe engine.
//!
//! Internal modules return typed errors ([`RecipeError`], [`MergeError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! CookError
//! ├── Recipe(RecipeError) - recipe parsing and schema validation
//! └── Merge(MergeError)   - file entries and directory copies
//! ```
//!
//! None of these are fatal to a run: the orchestrator reports them and skips
//! the affected entry or package.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the recipe engine.
#[derive(Error, Debug)]
pub enum CookError {
    /// Loading a package recipe failed.
    #[error("Recipe error: {0}")]
    Recipe(#[from] RecipeError),

    /// Applying or reverting a file entry failed.
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),
}

/// Errors that abort a whole package recipe.
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The recipe document is not valid JSON or YAML.
    #[error("Invalid {format} syntax in {}: {message}", path.display())]
    Parse {
        /// Path of the recipe file.
        path: PathBuf,
        /// `"JSON"` or `"YAML"`.
        format: &'static str,
        /// Parser diagnostic.
        message: String,
    },

    /// The recipe document does not match the expected structure.
    #[error("Error found in {package} recipe: {}", violations.join("; "))]
    Schema {
        /// Package owning the recipe.
        package: String,
        /// One line per violation, prefixed by its property path.
        violations: Vec<String>,
    },

    /// The recipe file could not be read.
    #[error("IO error reading recipe {}: {source}", path.display())]
    Io {
        /// Path of the recipe file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors scoped to a single file entry or directory of a recipe.
#[derive(Error, Debug)]
pub enum MergeError {
    /// The entry's `source` file does not exist in the package.
    #[error("Error found in {package} recipe: file \"{}\" not found.", path.display())]
    MissingSourceFile {
        /// Package owning the recipe.
        package: String,
        /// Resolved source path.
        path: PathBuf,
    },

    /// A field required by the entry's type is absent.
    #[error("Error found in {package} recipe: {field} field is required for \"{file_type}\" file type.")]
    MissingRequiredField {
        /// Package owning the recipe.
        package: String,
        /// Human-readable field description (e.g. `"entries"`).
        field: &'static str,
        /// Type tag of the entry.
        file_type: String,
    },

    /// No merger is registered for the entry's type.
    #[error("Error found in {package} recipe: type \"{file_type}\" unknown.")]
    UnknownFileType {
        /// Package owning the recipe.
        package: String,
        /// Unrecognized type tag.
        file_type: String,
    },

    /// A filter name is not registered; the value passes through unchanged.
    #[error("Error found in {package} recipe: filter \"{filter}\" unknown.")]
    UnknownFilter {
        /// Package owning the recipe.
        package: String,
        /// Unrecognized filter name.
        filter: String,
    },

    /// The destination file exists but cannot be understood.
    #[error("Error found in {package} recipe: invalid {format} in file \"{destination}\": {message}")]
    MalformedDestination {
        /// Package owning the recipe.
        package: String,
        /// Destination as declared in the recipe.
        destination: String,
        /// Document format (e.g. `"JSON"`).
        format: &'static str,
        /// Parser diagnostic.
        message: String,
    },

    /// The recipe-provided content cannot be understood.
    #[error("Error found in {package} recipe: invalid {format} content for \"{destination}\": {message}")]
    MalformedSource {
        /// Package owning the recipe.
        package: String,
        /// Destination as declared in the recipe.
        destination: String,
        /// Document format (e.g. `"YAML"`).
        format: &'static str,
        /// Parser diagnostic.
        message: String,
    },

    /// A declared directory does not exist in the package.
    #[error("Error executing {package} recipe: {} directory doesn't exist.", path.display())]
    MissingSourceDirectory {
        /// Package owning the recipe.
        package: String,
        /// Resolved source directory.
        path: PathBuf,
    },

    /// Reading or writing a file failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A text pattern could not be compiled.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl MergeError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
