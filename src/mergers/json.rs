//! JSON documents: recipe `entries` are merged one level deep into the
//! destination's top-level object.
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Destination, MergeOutcome, Merger, required_entries, section_allowed};
use crate::error::MergeError;
use crate::recipe::FileEntry;
use crate::state::Context;

/// Merger for `type: json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMerger;

impl Merger for JsonMerger {
    fn name(&self) -> &'static str {
        "json"
    }

    fn merge(&self, entry: &FileEntry, ctx: &Context<'_>) -> Result<MergeOutcome, MergeError> {
        let entries = required_entries(entry, ctx)?;
        let dest = Destination::of(entry, ctx);
        let existing = crate::fs::read_optional(&dest.absolute)?;
        let mut doc = match &existing {
            Some(text) => parse_object(text, entry, ctx)?,
            None => Map::new(),
        };

        let overwrite = ctx.state.overwrite();
        let mut changed = false;
        for (section, value) in entries {
            if section_allowed(entry, section) {
                changed |= merge_section(&mut doc, section, value, overwrite);
            }
        }

        if changed {
            dest.write(&render(&doc, &dest.absolute)?, existing.is_some())
        } else {
            Ok(dest.unchanged())
        }
    }

    fn uninstall(
        &self,
        entry: &FileEntry,
        ctx: &Context<'_>,
    ) -> Result<MergeOutcome, MergeError> {
        let entries = required_entries(entry, ctx)?;
        let dest = Destination::of(entry, ctx);
        let Some(text) = crate::fs::read_optional(&dest.absolute)? else {
            return Ok(dest.unchanged());
        };
        let mut doc = parse_object(&text, entry, ctx)?;

        let mut changed = false;
        for (section, declared) in entries {
            if section_allowed(entry, section) {
                changed |= remove_section(&mut doc, section, declared);
            }
        }

        if changed {
            dest.write(&render(&doc, &dest.absolute)?, true)
        } else {
            Ok(dest.unchanged())
        }
    }
}

/// Apply one declared section; returns `true` if the document changed.
fn merge_section(doc: &mut Map<String, Value>, section: &str, value: &Value, overwrite: bool) -> bool {
    if !doc.contains_key(section) {
        doc.insert(section.to_string(), value.clone());
        return true;
    }
    let Some(current) = doc.get_mut(section) else {
        return false;
    };
    if current == value {
        return false;
    }
    if is_scalar(current) && is_scalar(value) {
        *current = value.clone();
        return true;
    }

    match (current, value) {
        (Value::Object(current), Value::Object(new)) => {
            let disjoint = new.keys().all(|k| !current.contains_key(k));
            if !disjoint && !overwrite {
                return false;
            }
            let mut changed = false;
            for (key, v) in new {
                if current.get(key) != Some(v) {
                    current.insert(key.clone(), v.clone());
                    changed = true;
                }
            }
            changed
        }
        (Value::Array(current), Value::Array(new)) => {
            if !current.is_empty() && !overwrite {
                return false;
            }
            let missing: Vec<Value> = new
                .iter()
                .filter(|v| !current.contains(v))
                .cloned()
                .collect();
            let changed = !missing.is_empty();
            current.extend(missing);
            changed
        }
        (current, _) if overwrite => {
            *current = value.clone();
            true
        }
        _ => false,
    }
}

/// Revert one declared section; returns `true` if the document changed.
fn remove_section(doc: &mut Map<String, Value>, section: &str, declared: &Value) -> bool {
    let Some(current) = doc.get_mut(section) else {
        return false;
    };

    let (changed, now_empty) = match (current, declared) {
        (_, declared) if is_scalar(declared) => (true, true),
        (Value::Object(current), Value::Object(declared)) => {
            let before = current.len();
            current.retain(|k, _| !declared.contains_key(k));
            (current.len() != before, current.is_empty())
        }
        (Value::Array(current), Value::Array(declared)) => {
            let before = current.len();
            current.retain(|v| !declared.contains(v));
            (current.len() != before, current.is_empty())
        }
        _ => (false, false),
    };

    if now_empty {
        doc.shift_remove(section);
    }
    changed || now_empty
}

const fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Parse the destination's top-level object. Blank files count as empty.
fn parse_object(
    text: &str,
    entry: &FileEntry,
    ctx: &Context<'_>,
) -> Result<Map<String, Value>, MergeError> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    let malformed = |message: String| MergeError::MalformedDestination {
        package: ctx.package().to_string(),
        destination: entry.destination.clone(),
        format: "JSON",
        message,
    };
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(malformed("top-level value is not an object".to_string())),
        Err(e) => Err(malformed(e.to_string())),
    }
}

/// Pretty-print with four-space indentation and a trailing newline.
fn render(doc: &Map<String, Value>, path: &Path) -> Result<String, MergeError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut serializer)
        .map_err(|e| MergeError::io(path, e.into()))?;
    let mut out = String::from_utf8_lossy(&buf).into_owned();
    out.push('\n');
    Ok(out)
}
