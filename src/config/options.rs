//! Path options used to resolve `%PLACEHOLDER%` tokens in destinations.
use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Named path options (`bin-dir`, `config-dir`, ...) of the consuming project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, String>,
}

impl Options {
    /// Build options from the manifest's `extra` section.
    ///
    /// Defaults are overridden by any string-valued top-level `extra` key;
    /// `root-dir` defaults to `extra.symfony.root-dir` when present.
    #[must_use]
    pub fn from_extra(extra: &Map<String, Value>) -> Self {
        let root_dir = extra
            .get("symfony")
            .and_then(|s| s.get("root-dir"))
            .and_then(Value::as_str)
            .unwrap_or(".");

        let mut values: BTreeMap<String, String> = [
            ("bin-dir", "bin"),
            ("config-dir", "config"),
            ("src-dir", "src"),
            ("var-dir", "var"),
            ("public-dir", "public"),
            ("root-dir", root_dir),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for (key, value) in extra {
            if let Some(s) = value.as_str() {
                values.insert(key.clone(), s.to_string());
            }
        }

        Self { values }
    }

    /// Look up an option by its dashed, lower-case name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// All options, sorted by name.
    #[must_use]
    pub const fn all(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::from_extra(&Map::new())
    }
}
