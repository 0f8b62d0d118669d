//! Dotenv files: like text, but user definitions of the variables the block
//! sets are commented out or deleted.
use std::collections::HashSet;

use regex::Regex;

use super::text::{merge_block, uninstall_block};
use super::{MergeOutcome, Merger};
use crate::error::MergeError;
use crate::markers;
use crate::recipe::{FileEntry, IfExists};
use crate::state::Context;

const ASSIGNMENT: &str = r"^\s*(?:export\s+)?(\w+)\s*=";

/// Merger for `type: env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvMerger;

impl Merger for EnvMerger {
    fn name(&self) -> &'static str {
        "env"
    }

    fn merge(&self, entry: &FileEntry, ctx: &Context<'_>) -> Result<MergeOutcome, MergeError> {
        merge_block(entry, ctx, IfExists::Comment, |existing, content, policy| {
            scrub_conflicts(existing, content, policy)
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

/// Comment out or drop lines outside any block that assign a variable also
/// assigned by `content`. Names compare case-insensitively.
fn scrub_conflicts(existing: &str, content: &str, policy: IfExists) -> Result<String, MergeError> {
    if policy == IfExists::Append {
        return Ok(existing.to_string());
    }

    let assignment = Regex::new(ASSIGNMENT)?;
    let names: HashSet<String> = content
        .lines()
        .filter_map(|line| assignment.captures(line))
        .map(|caps| caps[1].to_ascii_lowercase())
        .collect();
    if names.is_empty() {
        return Ok(existing.to_string());
    }

    let blocks = markers::all_blocks(existing);
    let mut output = String::with_capacity(existing.len());
    let mut offset = 0;
    for line in existing.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let conflicting = !blocks.iter().any(|block| block.contains(&start))
            && assignment
                .captures(line)
                .is_some_and(|caps| names.contains(&caps[1].to_ascii_lowercase()));

        match (conflicting, policy) {
            (true, IfExists::Delete) => {}
            (true, _) => {
                output.push('#');
                output.push_str(line);
            }
            (false, _) => output.push_str(line),
        }
    }
    Ok(output)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mergers::test_helpers::Fixture;
    use std::path::PathBuf;

    const CONTENT: &str = "SOME_ENV_VARIABLE='hello'\nANOTHER_ENV_VARIABLE=world\n";
    const BLOCK: &str = "###> williarin/cook-example ###\nSOME_ENV_VARIABLE='hello'\nANOTHER_ENV_VARIABLE=world\n###< williarin/cook-example ###\n";

    fn entry() -> FileEntry {
        FileEntry::new("env", ".env").with_content(CONTENT)
    }

    #[test]
    fn new_file_is_exactly_the_block() {
        let fx = Fixture::new();
        let outcome = EnvMerger.merge(&entry(), &fx.ctx()).unwrap();
        assert_eq!(outcome, MergeOutcome::Created(PathBuf::from(".env")));
        assert_eq!(fx.read(".env"), BLOCK);
    }

    #[test]
    fn comments_out_conflicting_user_definitions_by_default() {
        let fx = Fixture::new();
        fx.write(".env", "APP_ENV=dev\nexport some_env_variable=old\n# ANOTHER_ENV_VARIABLE=x\n");
        EnvMerger.merge(&entry(), &fx.ctx()).unwrap();
        assert_eq!(
            fx.read(".env"),
            format!("APP_ENV=dev\n#export some_env_variable=old\n# ANOTHER_ENV_VARIABLE=x\n\n{BLOCK}")
        );
    }

    #[test]
    fn delete_policy_drops_conflicting_lines() {
        let fx = Fixture::new();
        fx.write(".env", "ANOTHER_ENV_VARIABLE=old\nAPP_ENV=dev\n");
        let entry = entry().with_if_exists(IfExists::Delete);
        EnvMerger.merge(&entry, &fx.ctx()).unwrap();
        assert_eq!(fx.read(".env"), format!("APP_ENV=dev\n\n{BLOCK}"));
    }

    #[test]
    fn append_policy_keeps_conflicting_lines() {
        let fx = Fixture::new();
        fx.write(".env", "ANOTHER_ENV_VARIABLE=old\n");
        let entry = entry().with_if_exists(IfExists::Append);
        EnvMerger.merge(&entry, &fx.ctx()).unwrap();
        assert_eq!(fx.read(".env"), format!("ANOTHER_ENV_VARIABLE=old\n\n{BLOCK}"));
    }

    #[test]
    fn other_package_blocks_are_not_scrubbed() {
        let fx = Fixture::new();
        let other = "###> acme/other ###\nSOME_ENV_VARIABLE=theirs\n###< acme/other ###\n";
        fx.write(".env", other);
        EnvMerger.merge(&entry(), &fx.ctx()).unwrap();
        assert_eq!(fx.read(".env"), format!("{other}\n{BLOCK}"));
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let fx = Fixture::new();
        fx.write(".env", "SOME_ENV_VARIABLE=mine\n");
        EnvMerger.merge(&entry(), &fx.ctx()).unwrap();
        let first = fx.read(".env");
        let outcome = EnvMerger.merge(&entry(), &fx.ctx()).unwrap();
        assert!(matches!(outcome, MergeOutcome::Unchanged(_)));
        assert_eq!(fx.read(".env"), first);
    }

    #[test]
    fn uninstall_keeps_remaining_content() {
        let fx = Fixture::new();
        fx.write(".env", &format!("{BLOCK}\nREMAINING_CONTENT=true"));
        let outcome = EnvMerger.uninstall(&entry(), &fx.ctx()).unwrap();
        assert_eq!(outcome, MergeOutcome::Updated(PathBuf::from(".env")));
        assert_eq!(fx.read(".env"), "\nREMAINING_CONTENT=true");
    }

    #[test]
    fn uninstall_removes_file_left_empty() {
        let fx = Fixture::new();
        fx.write(".env", BLOCK);
        let outcome = EnvMerger.uninstall(&entry(), &fx.ctx()).unwrap();
        assert_eq!(outcome, MergeOutcome::Removed(PathBuf::from(".env")));
        assert!(!fx.exists(".env"));
    }
}
