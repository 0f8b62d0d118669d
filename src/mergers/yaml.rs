//! YAML documents: one package block per top-level section, inserted as text
//! so the rest of the file keeps its formatting and comments.
use std::ops::Range;

use regex::Regex;

use super::{Destination, MergeOutcome, Merger, entry_content};
use crate::error::MergeError;
use crate::markers;
use crate::recipe::FileEntry;
use crate::state::Context;

const DOCKER_COMPOSE_SECTIONS: [&str; 5] = ["services", "volumes", "configs", "secrets", "networks"];

/// Merger for `type: yaml`, and for `type: docker_compose` through
/// [`YamlMerger::docker_compose`].
#[derive(Debug, Clone)]
pub struct YamlMerger {
    name: &'static str,
    valid_sections: Option<Vec<String>>,
    blank_line_after: Vec<String>,
}

impl Default for YamlMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl YamlMerger {
    /// Generic YAML merger: every section of the source is considered.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: "yaml",
            valid_sections: None,
            blank_line_after: Vec::new(),
        }
    }

    /// Compose-file merger: only the compose top-level sections, with a
    /// blank line after the `services` block.
    #[must_use]
    pub fn docker_compose() -> Self {
        Self {
            name: "docker_compose",
            valid_sections: Some(DOCKER_COMPOSE_SECTIONS.map(String::from).to_vec()),
            blank_line_after: vec!["services".to_string()],
        }
    }

    fn sections_for(&self, entry: &FileEntry, source_keys: Vec<String>) -> Vec<String> {
        entry
            .valid_sections
            .clone()
            .or_else(|| self.valid_sections.clone())
            .unwrap_or(source_keys)
    }

    fn blank_line_after(&self, entry: &FileEntry, section: &str) -> bool {
        entry
            .blank_line_after
            .as_ref()
            .unwrap_or(&self.blank_line_after)
            .iter()
            .any(|s| s == section)
    }
}

impl Merger for YamlMerger {
    fn name(&self) -> &'static str {
        self.name
    }

    fn merge(&self, entry: &FileEntry, ctx: &Context<'_>) -> Result<MergeOutcome, MergeError> {
        let content = entry_content(entry, ctx)?;
        let source_keys = top_level_keys(&content).map_err(|message| {
            MergeError::MalformedSource {
                package: ctx.package().to_string(),
                destination: entry.destination.clone(),
                format: "YAML",
                message,
            }
        })?;

        let dest = Destination::of(entry, ctx);
        let existing = crate::fs::read_optional(&dest.absolute)?;
        let package = ctx.package();
        let mut output = existing.clone().unwrap_or_default();

        for section in self.sections_for(entry, source_keys) {
            let Some(body) = section_body(&content, &section) else {
                continue;
            };
            let block = markers::wrap(package, &body);
            insert_section_block(
                &mut output,
                &section,
                &block,
                package,
                self.blank_line_after(entry, &section),
                ctx.state.overwrite(),
            );
        }

        if existing.is_none() && output.trim().is_empty() {
            return Ok(dest.unchanged());
        }
        let output = collapse_after_blocks(&output)?;
        let output = format!("{}\n", output.trim());

        match existing {
            Some(original) if original == output => Ok(dest.unchanged()),
            Some(_) => dest.write(&output, true),
            None => dest.write(&output, false),
        }
    }

    fn uninstall(
        &self,
        entry: &FileEntry,
        ctx: &Context<'_>,
    ) -> Result<MergeOutcome, MergeError> {
        let dest = Destination::of(entry, ctx);
        let Some(existing) = crate::fs::read_optional(&dest.absolute)? else {
            return Ok(dest.unchanged());
        };
        let package = ctx.package();
        let mut output = existing.clone();
        let mut touched = Vec::new();

        while let Some(range) = markers::find_block(&output, package) {
            if let Some(section) = enclosing_section(&output, range.start) {
                touched.push(section);
            }
            let start = line_start(&output, range.start);
            let mut end = markers::with_trailing_newline(&output, range).end;
            let blank = leading_blank_lines(&output[end..]);
            if blank > 0 && output[end + blank..].starts_with([' ', '\t']) {
                end += blank;
            }
            output.replace_range(start..end, "");
        }

        if output == existing {
            return Ok(dest.unchanged());
        }

        if entry.uninstall_empty_sections {
            for section in touched {
                remove_empty_section(&mut output, &section);
            }
        }

        let output = output.trim_start_matches('\n').trim_end();
        if output.is_empty() {
            dest.remove()
        } else {
            dest.write(&format!("{output}\n"), true)
        }
    }
}

/// String keys of the top-level mapping, in document order.
fn top_level_keys(content: &str) -> Result<Vec<String>, String> {
    let doc: serde_yaml_ng::Value = serde_yaml_ng::from_str(content).map_err(|e| e.to_string())?;
    Ok(match doc {
        serde_yaml_ng::Value::Mapping(map) => map
            .keys()
            .filter_map(|k| k.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    })
}

/// Lines following `section:` up to the next top-level key, without
/// surrounding newlines. Column-0 comments inside the body are kept; trailing
/// blank and comment lines are dropped. `None` if the header is absent,
/// inline, or has no body.
fn section_body(content: &str, section: &str) -> Option<String> {
    let header = format!("{section}:");
    let mut lines = content.lines().skip_while(|line| line.trim_end() != header);
    lines.next()?;
    let mut body: Vec<&str> = lines.take_while(|line| !starts_top_level(line)).collect();
    while body
        .last()
        .is_some_and(|line| line.trim().is_empty() || line.starts_with('#'))
    {
        body.pop();
    }
    let body = body.join("\n");
    let body = body.trim_start_matches('\n');
    (!body.trim().is_empty()).then(|| body.to_string())
}

/// Return `true` if `line` opens a new top-level entry.
fn starts_top_level(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| !c.is_whitespace() && c != '#')
}

/// Byte range of the `section:` header line, newline included.
fn find_header(text: &str, section: &str) -> Option<Range<usize>> {
    let header = format!("{section}:");
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        if line.trim_end() == header {
            return Some(start..offset);
        }
    }
    None
}

/// End of the section body starting at `from`: the start of the next line
/// beginning with something other than whitespace or `#`.
fn section_end(text: &str, from: usize) -> usize {
    let mut offset = from;
    for line in text[from..].split_inclusive('\n') {
        if starts_top_level(line) {
            return offset;
        }
        offset += line.len();
    }
    text.len()
}

fn insert_section_block(
    output: &mut String,
    section: &str,
    block: &str,
    package: &str,
    blank_line_after: bool,
    overwrite: bool,
) {
    let blank = if blank_line_after { "\n" } else { "" };

    let Some(header) = find_header(output, section) else {
        output.push_str(&format!("\n{section}:\n{block}{blank}\n"));
        return;
    };

    let end = section_end(output, header.end);
    if let Some(range) = markers::find_block_from(&output[..end], package, header.end) {
        let replacement = block.trim_end_matches('\n');
        if overwrite && output[range.clone()] != *replacement {
            output.replace_range(range, replacement);
        }
        return;
    }

    let mut insertion = String::new();
    if !output[..header.end].ends_with('\n') {
        insertion.push('\n');
    }
    insertion.push_str(block);
    insertion.push_str(blank);
    output.insert_str(header.end, &insertion);
}

/// Collapse runs of blank lines after a closing marker to a single one.
fn collapse_after_blocks(text: &str) -> Result<String, MergeError> {
    let runs = Regex::new(r"(###< [^\n]+ ###)\n{3,}")?;
    Ok(runs.replace_all(text, "$1\n\n").into_owned())
}

/// Name of the top-level section whose body contains `pos`.
fn enclosing_section(text: &str, pos: usize) -> Option<String> {
    text[..pos]
        .lines()
        .rev()
        .find(|line| starts_top_level(line))
        .and_then(|line| line.trim_end().strip_suffix(':'))
        .map(String::from)
}

fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// Length in bytes of the whitespace-only lines at the start of `text`.
fn leading_blank_lines(text: &str) -> usize {
    text.split_inclusive('\n')
        .take_while(|line| line.ends_with('\n') && line.trim().is_empty())
        .map(str::len)
        .sum()
}

/// Drop the `section:` header if nothing but whitespace is left under it.
fn remove_empty_section(output: &mut String, section: &str) {
    let Some(header) = find_header(output, section) else {
        return;
    };
    let end = section_end(output, header.end);
    if output[header.end..end].trim().is_empty() {
        output.replace_range(header.start..end, "");
    }
}
