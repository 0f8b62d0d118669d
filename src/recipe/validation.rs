//! Structural validation of a raw recipe document.
//!
//! Every violation is collected with its property path so a recipe author
//! sees all problems at once.
use serde_json::{Map, Value};

use super::IfExists;

const RECIPE_KEYS: [&str; 3] = ["files", "directories", "post_install_output"];

const ENTRY_KEYS: [&str; 10] = [
    "type",
    "destination",
    "source",
    "content",
    "entries",
    "filters",
    "valid_sections",
    "blank_line_after",
    "if_exists",
    "uninstall_empty_sections",
];

const NOT_EXPECTED: &str = "This field was not expected.";
const MISSING: &str = "This field is missing.";
const NOT_BLANK: &str = "This value should not be blank.";
const BAD_CHOICE: &str = "The value you selected is not a valid choice.";

/// Validate a recipe document, returning one message per violation.
///
/// An empty result means the document can be turned into a
/// [`Recipe`](super::Recipe).
#[must_use]
pub fn validate(doc: &Value) -> Vec<String> {
    let mut violations = Violations::default();
    let Some(root) = doc.as_object() else {
        violations.type_error("", "array");
        return violations.0;
    };

    violations.unknown_keys("", root, &RECIPE_KEYS);

    match root.get("files") {
        None | Some(Value::Null) => {}
        Some(Value::Array(files)) if files.is_empty() => {}
        Some(Value::Object(files)) => {
            for (destination, entry) in files {
                validate_entry(&mut violations, &format!("[files][{destination}]"), entry);
            }
        }
        Some(_) => violations.type_error("[files]", "array"),
    }

    match root.get("directories") {
        None | Some(Value::Null) => {}
        Some(Value::Array(dirs)) if dirs.is_empty() => {}
        Some(Value::Object(dirs)) => {
            for (destination, source) in dirs {
                violations.non_blank_string(&format!("[directories][{destination}]"), source);
            }
        }
        Some(_) => violations.type_error("[directories]", "array"),
    }

    if let Some(output) = root.get("post_install_output")
        && !output.is_string()
    {
        violations.type_error("[post_install_output]", "string");
    }

    violations.0
}

fn validate_entry(violations: &mut Violations, path: &str, entry: &Value) {
    let Some(entry) = entry.as_object() else {
        violations.type_error(path, "array");
        return;
    };

    violations.unknown_keys(path, entry, &ENTRY_KEYS);

    match entry.get("destination") {
        Some(destination) => violations.non_blank_string(&format!("{path}[destination]"), destination),
        None => violations.push(&format!("{path}[destination]"), MISSING),
    }

    if let Some(source) = entry.get("source") {
        violations.non_blank_string(&format!("{path}[source]"), source);
    }

    for key in ["type", "content"] {
        if let Some(value) = entry.get(key)
            && !value.is_string()
        {
            violations.type_error(&format!("{path}[{key}]"), "string");
        }
    }

    if entry.contains_key("source") && entry.contains_key("content") {
        violations.push(path, "Only one of \"source\" or \"content\" may be set.");
    }

    if let Some(entries) = entry.get("entries")
        && !(entries.is_object() || entries.is_array())
    {
        violations.type_error(&format!("{path}[entries]"), "array");
    }

    match entry.get("if_exists") {
        None => {}
        Some(Value::String(policy)) if IfExists::NAMES.contains(&policy.as_str()) => {}
        Some(Value::String(_)) => violations.push(&format!("{path}[if_exists]"), BAD_CHOICE),
        Some(_) => violations.type_error(&format!("{path}[if_exists]"), "string"),
    }

    match entry.get("filters") {
        None => {}
        Some(Value::Object(filters)) => {
            let filters_path = format!("{path}[filters]");
            violations.unknown_keys(&filters_path, filters, &["keys", "values"]);
            for key in ["keys", "values"] {
                if let Some(list) = filters.get(key) {
                    violations.string_list(&format!("{filters_path}[{key}]"), list);
                }
            }
        }
        Some(_) => violations.type_error(&format!("{path}[filters]"), "array"),
    }

    for key in ["valid_sections", "blank_line_after"] {
        if let Some(list) = entry.get(key) {
            violations.string_list(&format!("{path}[{key}]"), list);
        }
    }

    if let Some(flag) = entry.get("uninstall_empty_sections")
        && !flag.is_boolean()
    {
        violations.type_error(&format!("{path}[uninstall_empty_sections]"), "bool");
    }
}

#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, path: &str, message: &str) {
        let path = if path.is_empty() { "[]" } else { path };
        self.0.push(format!("{path}: {message}"));
    }

    fn type_error(&mut self, path: &str, expected: &str) {
        self.push(path, &format!("This value should be of type {expected}."));
    }

    fn unknown_keys(&mut self, path: &str, map: &Map<String, Value>, allowed: &[&str]) {
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                self.push(&format!("{path}[{key}]"), NOT_EXPECTED);
            }
        }
    }

    fn non_blank_string(&mut self, path: &str, value: &Value) {
        match value {
            Value::String(s) if s.trim().is_empty() => self.push(path, NOT_BLANK),
            Value::String(_) => {}
            Value::Null => self.push(path, NOT_BLANK),
            _ => self.type_error(path, "string"),
        }
    }

    fn string_list(&mut self, path: &str, value: &Value) {
        let Some(items) = value.as_array() else {
            self.type_error(path, "array");
            return;
        };
        for (i, item) in items.iter().enumerate() {
            if !item.is_string() {
                self.type_error(&format!("{path}[{i}]"), "string");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_recipe_has_no_violations() {
        let doc = json!({
            "files": {
                ".env": {"type": "env", "destination": ".env", "source": ".env"},
                "config/bundles.php": {
                    "type": "php_array",
                    "destination": "config/bundles.php",
                    "entries": {"App\\Bundle": {"all": true}},
                    "filters": {"keys": ["class_constant"], "values": ["single_line_array"]}
                },
                "docker-compose.yml": {
                    "type": "docker_compose",
                    "destination": "docker-compose.yml",
                    "content": "services:\n  db: ~\n",
                    "valid_sections": ["services"],
                    "blank_line_after": [],
                    "if_exists": "append",
                    "uninstall_empty_sections": true
                }
            },
            "directories": {"templates/demo": "templates"},
            "post_install_output": "Done."
        });
        assert!(validate(&doc).is_empty(), "{:?}", validate(&doc));
    }

    #[test]
    fn empty_recipe_is_valid() {
        assert!(validate(&json!({})).is_empty());
    }

    #[test]
    fn root_must_be_an_object() {
        assert_eq!(validate(&json!("x")), vec!["[]: This value should be of type array."]);
    }

    #[test]
    fn reports_every_violation_with_its_path() {
        let doc = json!({
            "files": {
                "a.txt": {"destination": "  ", "source": 3, "content": "x", "colour": "red"},
                "b.txt": "not-an-object"
            },
            "directories": ["nope"],
            "post_install_output": 12,
            "extra": true
        });
        let violations = validate(&doc);
        insta::assert_snapshot!(violations.join("\n"), @r#"
        [extra]: This field was not expected.
        [files][a.txt][colour]: This field was not expected.
        [files][a.txt][destination]: This value should not be blank.
        [files][a.txt][source]: This value should be of type string.
        [files][a.txt]: Only one of "source" or "content" may be set.
        [files][b.txt]: This value should be of type array.
        [directories]: This value should be of type array.
        [post_install_output]: This value should be of type string.
        "#);
    }

    #[test]
    fn checks_lists_filters_and_policies() {
        let doc = json!({
            "files": {
                "x": {
                    "destination": "x",
                    "content": "",
                    "filters": {"keys": "class_constant", "extra": []},
                    "valid_sections": ["a", 1],
                    "if_exists": "merge",
                    "uninstall_empty_sections": "yes",
                    "entries": "scalar"
                }
            }
        });
        let violations = validate(&doc);
        assert!(violations.contains(&"[files][x][filters][extra]: This field was not expected.".to_string()));
        assert!(violations.contains(&"[files][x][filters][keys]: This value should be of type array.".to_string()));
        assert!(violations.contains(&"[files][x][valid_sections][1]: This value should be of type string.".to_string()));
        assert!(violations.contains(&"[files][x][if_exists]: The value you selected is not a valid choice.".to_string()));
        assert!(violations.contains(&"[files][x][uninstall_empty_sections]: This value should be of type bool.".to_string()));
        assert!(violations.contains(&"[files][x][entries]: This value should be of type array.".to_string()));
        assert_eq!(violations.len(), 6);
    }
}
