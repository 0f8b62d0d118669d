//! Reading a recipe file into a [`Recipe`].
use std::path::Path;

use serde_json::{Map, Value};

use super::{FileEntry, Recipe, validate};
use crate::error::RecipeError;

/// Parse a recipe file into a generic document, choosing the format from the
/// file extension (`.yaml`/`.yml` or JSON otherwise).
///
/// # Errors
///
/// Returns [`RecipeError::Io`] if the file cannot be read and
/// [`RecipeError::Parse`] if it is not valid JSON or YAML.
pub fn parse_document(path: &Path) -> Result<Value, RecipeError> {
    let content = std::fs::read_to_string(path).map_err(|source| RecipeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        let doc: serde_yaml_ng::Value =
            serde_yaml_ng::from_str(&content).map_err(|e| RecipeError::Parse {
                path: path.to_path_buf(),
                format: "YAML",
                message: e.to_string(),
            })?;
        Ok(yaml_to_json(doc))
    } else {
        serde_json::from_str(content.trim()).map_err(|e| RecipeError::Parse {
            path: path.to_path_buf(),
            format: "JSON",
            message: e.to_string(),
        })
    }
}

/// Load, normalize, validate and default the recipe at `path`.
///
/// # Errors
///
/// Returns a [`RecipeError`] if the file cannot be read or parsed, or if the
/// document violates the recipe structure.
pub fn load(path: &Path, package: &str) -> Result<Recipe, RecipeError> {
    let doc = expand_shorthand(parse_document(path)?);

    let violations = validate(&doc);
    if !violations.is_empty() {
        return Err(RecipeError::Schema {
            package: package.to_string(),
            violations,
        });
    }

    build(doc, package)
}

/// A plain string file value is the `source` of a text entry, and every
/// entry's `destination` is its map key.
fn expand_shorthand(mut doc: Value) -> Value {
    if let Some(files) = doc.get_mut("files").and_then(Value::as_object_mut) {
        for (destination, entry) in files.iter_mut() {
            if let Value::String(source) = entry {
                let mut expanded = Map::new();
                expanded.insert("source".to_string(), Value::String(source.clone()));
                *entry = Value::Object(expanded);
            }
            if let Value::Object(fields) = entry {
                fields.insert(
                    "destination".to_string(),
                    Value::String(destination.clone()),
                );
            }
        }
    }
    doc
}

fn build(doc: Value, package: &str) -> Result<Recipe, RecipeError> {
    let schema_error = |message: String| RecipeError::Schema {
        package: package.to_string(),
        violations: vec![message],
    };

    let Value::Object(mut root) = doc else {
        return Err(schema_error("[]: This value should be of type array.".to_string()));
    };

    let mut recipe = Recipe::default();

    if let Some(Value::Object(files)) = root.remove("files") {
        for (destination, entry) in files {
            let entry: FileEntry = serde_json::from_value(entry)
                .map_err(|e| schema_error(format!("[files][{destination}]: {e}")))?;
            recipe.files.push(entry);
        }
    }

    if let Some(Value::Object(dirs)) = root.remove("directories") {
        recipe.directories = dirs
            .into_iter()
            .filter_map(|(dest, src)| src.as_str().map(|s| (dest.clone(), s.to_string())))
            .collect();
    }

    recipe.post_install_output = root
        .remove("post_install_output")
        .and_then(|v| v.as_str().map(String::from));

    Ok(recipe)
}

/// Convert a YAML document to JSON, rendering non-string keys as strings.
fn yaml_to_json(value: serde_yaml_ng::Value) -> Value {
    use serde_yaml_ng::Value as Yaml;
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml_ng::Value) -> String {
    use serde_yaml_ng::Value as Yaml;
    match key {
        Yaml::String(s) => s,
        Yaml::Null => String::new(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        other => serde_yaml_ng::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
