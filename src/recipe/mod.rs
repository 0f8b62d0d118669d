//! Package recipes: the declarative description of files and directories a
//! package contributes to the consuming project.
mod loader;
mod validation;

pub use loader::{load, parse_document};
pub use validation::validate;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Type tag used when a file entry declares none.
pub const DEFAULT_FILE_TYPE: &str = "text";

/// A validated, defaulted recipe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipe {
    /// File entries in declaration order.
    pub files: Vec<FileEntry>,
    /// `(destination, source)` directory pairs in declaration order.
    pub directories: Vec<(String, String)>,
    /// Text shown to the operator after installation.
    pub post_install_output: Option<String>,
}

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IfExists {
    /// Add the block next to existing content.
    Append,
    /// Replace the whole file with the block.
    Overwrite,
    /// Leave an existing file alone.
    Ignore,
    /// Comment out conflicting definitions, then append.
    Comment,
    /// Delete conflicting definitions, then append.
    Delete,
}

impl IfExists {
    /// Every accepted policy name.
    pub const NAMES: [&'static str; 5] = ["append", "overwrite", "ignore", "comment", "delete"];
}

/// Key and value filter chains for PHP array serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Filters {
    /// Filters applied to rendered keys.
    pub keys: Vec<String>,
    /// Filters applied to rendered values.
    pub values: Vec<String>,
}

/// One destination file a recipe contributes to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    /// Merger type tag (`text`, `env`, `json`, ...).
    #[serde(rename = "type", default = "default_file_type")]
    pub file_type: String,
    /// Destination relative to the project root; may hold `%PLACEHOLDER%`s.
    pub destination: String,
    /// File inside the package providing the content.
    #[serde(default)]
    pub source: Option<String>,
    /// Inline content.
    #[serde(default)]
    pub content: Option<String>,
    /// Structured entries for `json` and `php_array`.
    #[serde(default, deserialize_with = "deserialize_entries")]
    pub entries: Option<Map<String, Value>>,
    /// Key and value filters for `php_array`.
    #[serde(default)]
    pub filters: Filters,
    /// Sections to consider; every section of the source when absent.
    #[serde(default)]
    pub valid_sections: Option<Vec<String>>,
    /// Sections whose block is followed by a blank line.
    #[serde(default)]
    pub blank_line_after: Option<Vec<String>>,
    /// Policy for an existing destination.
    #[serde(default)]
    pub if_exists: Option<IfExists>,
    /// Remove section headers left empty by an uninstall.
    #[serde(default)]
    pub uninstall_empty_sections: bool,
}

fn default_file_type() -> String {
    DEFAULT_FILE_TYPE.to_string()
}

/// Accept `entries` as an object, or as a list keyed by position.
fn deserialize_entries<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        )),
        Some(other) => Err(serde::de::Error::custom(format!(
            "entries must be an object or an array, found {other}"
        ))),
    }
}

impl FileEntry {
    /// Entry of type `file_type` for `destination`, every other field unset.
    #[must_use]
    pub fn new(file_type: &str, destination: &str) -> Self {
        Self {
            file_type: file_type.to_string(),
            destination: destination.to_string(),
            source: None,
            content: None,
            entries: None,
            filters: Filters::default(),
            valid_sections: None,
            blank_line_after: None,
            if_exists: None,
            uninstall_empty_sections: false,
        }
    }

    /// Set inline content.
    #[must_use]
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }

    /// Set the package source file.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// Set structured entries from a JSON object.
    #[must_use]
    pub fn with_entries(mut self, entries: Value) -> Self {
        self.entries = entries.as_object().cloned();
        self
    }

    /// Set the existing-destination policy.
    #[must_use]
    pub const fn with_if_exists(mut self, policy: IfExists) -> Self {
        self.if_exists = Some(policy);
        self
    }
}
