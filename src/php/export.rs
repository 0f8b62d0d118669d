//! Deterministic PHP literal exporter.
//!
//! Arrays use short syntax with four-space indentation and trailing commas;
//! keys of list arrays are omitted.
use std::fmt::Write as _;

use super::{PhpArray, PhpKey, PhpValue};

const INDENT: &str = "    ";

/// Render `value` as a PHP literal. Nested lines are indented relative to
/// `indent` spaces; the first line carries no indentation.
#[must_use]
pub fn export(value: &PhpValue, indent: usize) -> String {
    let mut out = String::new();
    write_value(&mut out, value, indent);
    out
}

/// Render `value` on a single line (`['dev' => true, 'test' => true]`).
#[must_use]
pub fn export_inline(value: &PhpValue) -> String {
    match value {
        PhpValue::Array(array) => {
            let list = array.is_list();
            let items: Vec<String> = array
                .iter()
                .map(|(k, v)| {
                    if list {
                        export_inline(v)
                    } else {
                        format!("{} => {}", export_key(k), export_inline(v))
                    }
                })
                .collect();
            format!("[{}]", items.join(", "))
        }
        scalar => export(scalar, 0),
    }
}

/// Render an array key: integers bare, strings single-quoted.
#[must_use]
pub fn export_key(key: &PhpKey) -> String {
    match key {
        PhpKey::Int(n) => n.to_string(),
        PhpKey::String(s) => quote(s),
    }
}

/// Render a whole `<?php return [...];` file.
///
/// `render_key` and `render_value` receive each entry's default rendering
/// and its original value, and return the text to emit; they are the hook
/// for filters.
pub fn dump_file(
    array: &PhpArray,
    mut render_key: impl FnMut(String, &PhpValue) -> String,
    mut render_value: impl FnMut(String, &PhpValue) -> String,
) -> String {
    let mut out = String::from("<?php\n\nreturn [\n");
    for (key, value) in array.iter() {
        let key_text = match key {
            PhpKey::Int(n) => n.to_string(),
            PhpKey::String(s) => format!("'{}'", escape_minimal(s)),
        };
        let key_text = render_key(key_text, &key.to_value());
        let value_text = render_value(export(value, INDENT.len()), value);
        let _ = writeln!(out, "{INDENT}{key_text} => {value_text},");
    }
    out.push_str("];\n");
    out
}

fn write_value(out: &mut String, value: &PhpValue, indent: usize) {
    match value {
        PhpValue::Null => out.push_str("null"),
        PhpValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        PhpValue::Int(n) => {
            let _ = write!(out, "{n}");
        }
        PhpValue::Float(f) => out.push_str(&format_float(*f)),
        PhpValue::String(s) => out.push_str(&quote(s)),
        PhpValue::Array(array) if array.is_empty() => out.push_str("[]"),
        PhpValue::Array(array) => {
            let list = array.is_list();
            let inner = " ".repeat(indent + INDENT.len());
            out.push_str("[\n");
            for (k, v) in array.iter() {
                out.push_str(&inner);
                if !list {
                    out.push_str(&export_key(k));
                    out.push_str(" => ");
                }
                write_value(out, v, indent + INDENT.len());
                out.push_str(",\n");
            }
            out.push_str(&" ".repeat(indent));
            out.push(']');
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NAN".to_string()
    } else if f.is_infinite() {
        if f.is_sign_positive() { "INF" } else { "-INF" }.to_string()
    } else {
        format!("{f:?}")
    }
}

/// Single-quote `s`, escaping every backslash and quote.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Escape only what a single-quoted literal requires: quotes, and
/// backslashes that precede a quote, another backslash, or the end.
fn escape_minimal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' if matches!(chars.peek(), None | Some('\'' | '\\')) => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}
