//! PHP array literals: the value model, a parser for `<?php return [...];`
//! files, and a deterministic exporter.
mod export;
mod parser;

pub use export::{dump_file, export, export_inline, export_key};
pub use parser::{ParseError, parse_file};

use serde_json::Value;

/// Key of a PHP array entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhpKey {
    /// Integer key.
    Int(i64),
    /// String key.
    String(String),
}

impl PhpKey {
    /// Build a key from a string, normalizing decimal integers the way PHP
    /// does (`"1"` becomes `1`, `"01"` stays a string).
    #[must_use]
    pub fn from_str_key(key: &str) -> Self {
        let canonical = key
            .parse::<i64>()
            .ok()
            .filter(|n| n.to_string() == key);
        canonical.map_or_else(|| Self::String(key.to_string()), Self::Int)
    }

    /// The key as a value, for filters that inspect the original key.
    #[must_use]
    pub fn to_value(&self) -> PhpValue {
        match self {
            Self::Int(n) => PhpValue::Int(*n),
            Self::String(s) => PhpValue::String(s.clone()),
        }
    }
}

/// A PHP literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal (also `Name::class` constants).
    String(String),
    /// Ordered array.
    Array(PhpArray),
}

impl PhpValue {
    /// The array payload, if this value is an array.
    #[must_use]
    pub const fn as_array(&self) -> Option<&PhpArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl From<&Value> for PhpValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or_default()), Self::Int),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => {
                let mut array = PhpArray::default();
                for item in items {
                    array.push(Self::from(item));
                }
                Self::Array(array)
            }
            Value::Object(map) => {
                let mut array = PhpArray::default();
                for (k, v) in map {
                    array.insert(PhpKey::from_str_key(k), Self::from(v));
                }
                Self::Array(array)
            }
        }
    }
}

/// An ordered PHP array.
///
/// Insertion order is preserved; re-inserting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhpArray {
    entries: Vec<(PhpKey, PhpValue)>,
}

impl PhpArray {
    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if the array has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &PhpKey) -> Option<&PhpValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace the value under `key`.
    pub fn insert(&mut self, key: PhpKey, value: PhpValue) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Append `value` under the next free integer key.
    pub fn push(&mut self, value: PhpValue) {
        let next = self
            .entries
            .iter()
            .filter_map(|(k, _)| match k {
                PhpKey::Int(n) => Some(n.saturating_add(1)),
                PhpKey::String(_) => None,
            })
            .max()
            .unwrap_or(0)
            .max(0);
        self.entries.push((PhpKey::Int(next), value));
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &PhpKey) -> Option<PhpValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &(PhpKey, PhpValue)> {
        self.entries.iter()
    }

    /// Return `true` if keys are `0..len` in order, so they can be omitted.
    #[must_use]
    pub fn is_list(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| i64::try_from(i).is_ok_and(|i| *k == PhpKey::Int(i)))
    }
}
