//! Ownership markers delimiting a package's block inside a text file.
//!
//! A block for package `P` starts with the line `###> P ###` and ends with
//! `###< P ###`. Because the marker text embeds the package name, blocks of
//! different packages never match each other's markers.
use std::ops::Range;

const OPEN_PREFIX: &str = "###> ";

/// Opening marker line for `package`, without newline.
#[must_use]
pub fn open_marker(package: &str) -> String {
    format!("{OPEN_PREFIX}{package} ###")
}

/// Closing marker line for `package`, without newline.
#[must_use]
pub fn close_marker(package: &str) -> String {
    format!("###< {package} ###")
}

/// Surround `content` with the markers of `package`.
///
/// Trailing newlines of `content` are trimmed; the result always ends with
/// exactly one newline after the closing marker.
#[must_use]
pub fn wrap(package: &str, content: &str) -> String {
    format!(
        "{}\n{}\n{}\n",
        open_marker(package),
        content.trim_end_matches('\n'),
        close_marker(package)
    )
}

/// Locate the block of `package` in `text`.
///
/// Returns the byte range from the start of the opening marker to the end of
/// the closing marker (newline excluded). The shortest span is chosen, and a
/// span that would cross the opening marker of another block is rejected.
#[must_use]
pub fn find_block(text: &str, package: &str) -> Option<Range<usize>> {
    find_block_from(text, package, 0)
}

/// Like [`find_block`], starting the search at byte offset `from`.
#[must_use]
pub fn find_block_from(text: &str, package: &str, from: usize) -> Option<Range<usize>> {
    let open = open_marker(package);
    let close = close_marker(package);
    let mut cursor = from;

    while let Some(rel) = text.get(cursor..)?.find(&open) {
        let start = cursor + rel;
        let body_start = start + open.len();
        let close_rel = text[body_start..].find(&close)?;
        let close_start = body_start + close_rel;
        let intervening = text[body_start..close_start].rfind(OPEN_PREFIX);
        match intervening {
            // Resume at the innermost opening marker so a nested block of the
            // same package can still be matched.
            Some(offset) => cursor = body_start + offset,
            None => return Some(start..close_start + close.len()),
        }
    }
    None
}

/// Extend `range` over one trailing newline, if present.
#[must_use]
pub fn with_trailing_newline(text: &str, range: Range<usize>) -> Range<usize> {
    if text[range.end..].starts_with('\n') {
        range.start..range.end + 1
    } else {
        range
    }
}

/// Remove the block of `package` together with one trailing newline.
///
/// Returns `None` when `text` holds no block for `package`.
#[must_use]
pub fn remove_block(text: &str, package: &str) -> Option<String> {
    let range = with_trailing_newline(text, find_block(text, package)?);
    let mut out = String::with_capacity(text.len() - range.len());
    out.push_str(&text[..range.start]);
    out.push_str(&text[range.end..]);
    Some(out)
}

/// Byte ranges of every block in `text`, whatever package owns it.
///
/// Used to tell apart content inside blocks from user-owned lines.
#[must_use]
pub fn all_blocks(text: &str) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut cursor = 0;
    while let Some(rel) = text[cursor..].find(OPEN_PREFIX) {
        let start = cursor + rel;
        let name_start = start + OPEN_PREFIX.len();
        let Some(name_len) = text[name_start..].find(" ###") else {
            break;
        };
        let package = &text[name_start..name_start + name_len];
        if let Some(range) = find_block_from(text, package, start) {
            cursor = range.end;
            blocks.push(range);
        } else {
            cursor = name_start;
        }
    }
    blocks
}
