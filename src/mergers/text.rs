//! Plain text files: the package block is appended next to user content.
use super::{Destination, MergeOutcome, Merger, entry_content};
use crate::error::MergeError;
use crate::markers;
use crate::recipe::{FileEntry, IfExists};
use crate::state::Context;

/// Merger for `type: text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMerger;

impl Merger for TextMerger {
    fn name(&self) -> &'static str {
        "text"
    }

    fn merge(&self, entry: &FileEntry, ctx: &Context<'_>) -> Result<MergeOutcome, MergeError> {
        merge_block(entry, ctx, IfExists::Append, |existing, _, _| {
            Ok(existing.to_string())
        })
    }

    fn uninstall(
        &self,
        entry: &FileEntry,
        ctx: &Context<'_>,
    ) -> Result<MergeOutcome, MergeError> {
        uninstall_block(entry, ctx)
    }
}

/// Write the entry's block into its destination under `if_exists`.
///
/// `scrub` receives the existing destination, the entry content, and the
/// effective policy, and returns the destination text the block is then
/// appended to or replaced in.
pub(super) fn merge_block(
    entry: &FileEntry,
    ctx: &Context<'_>,
    default_policy: IfExists,
    scrub: impl Fn(&str, &str, IfExists) -> Result<String, MergeError>,
) -> Result<MergeOutcome, MergeError> {
    let content = entry_content(entry, ctx)?;
    let dest = Destination::of(entry, ctx);
    let package = ctx.package();
    let block = markers::wrap(package, &content);
    let policy = entry.if_exists.unwrap_or(default_policy);

    let Some(existing) = crate::fs::read_optional(&dest.absolute)? else {
        return dest.write(&block, false);
    };

    match policy {
        IfExists::Ignore => {
            ctx.log.debug(&format!(
                "{} exists, leaving it untouched",
                dest.relative.display()
            ));
            Ok(dest.unchanged())
        }
        IfExists::Overwrite if existing == block => Ok(dest.unchanged()),
        IfExists::Overwrite => dest.write(&block, true),
        IfExists::Append | IfExists::Comment | IfExists::Delete => {
            let mut output = scrub(&existing, &content, policy)?;
            if let Some(range) = markers::find_block(&output, package) {
                let replacement = block.trim_end_matches('\n');
                if ctx.state.overwrite() && output[range.clone()] != *replacement {
                    output.replace_range(range, replacement);
                }
            } else if output.trim().is_empty() {
                output = block;
            } else {
                if !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push('\n');
                output.push_str(&block);
            }

            if output == existing {
                Ok(dest.unchanged())
            } else {
                dest.write(&output, true)
            }
        }
    }
}

/// Remove the current package's block from the destination, deleting the
/// file once nothing but whitespace remains.
pub(super) fn uninstall_block(
    entry: &FileEntry,
    ctx: &Context<'_>,
) -> Result<MergeOutcome, MergeError> {
    let dest = Destination::of(entry, ctx);
    let Some(existing) = crate::fs::read_optional(&dest.absolute)? else {
        return Ok(dest.unchanged());
    };
    let Some(output) = markers::remove_block(&existing, ctx.package()) else {
        return Ok(dest.unchanged());
    };
    if output.trim().is_empty() {
        dest.remove()
    } else {
        dest.write(&output, true)
    }
}
