//! PHP array files (`<?php return [...];`): recipe `entries` become keys of
//! the returned array, and the whole array is re-rendered on every write.
use super::{Destination, MergeOutcome, Merger, required_entries};
use crate::error::MergeError;
use crate::php::{self, PhpArray, PhpKey, PhpValue};
use crate::recipe::FileEntry;
use crate::state::Context;

/// Merger for `type: php_array`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpArrayMerger;

impl Merger for PhpArrayMerger {
    fn name(&self) -> &'static str {
        "php_array"
    }

    fn merge(&self, entry: &FileEntry, ctx: &Context<'_>) -> Result<MergeOutcome, MergeError> {
        let entries = required_entries(entry, ctx)?;
        let dest = Destination::of(entry, ctx);
        let existing = crate::fs::read_optional(&dest.absolute)?;
        let mut array = match &existing {
            Some(text) => load(text, entry, ctx)?,
            None => PhpArray::default(),
        };

        let overwrite = ctx.state.overwrite();
        let mut changed = false;
        for (key, value) in entries {
            let key = PhpKey::from_str_key(key);
            let value = PhpValue::from(value);
            let replace = array
                .get(&key)
                .is_none_or(|current| overwrite && *current != value);
            if replace {
                array.insert(key, value);
                changed = true;
            }
        }

        if changed {
            dest.write(&render(&array, entry, ctx), existing.is_some())
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
        let mut array = load(&text, entry, ctx)?;

        let mut removed = false;
        for key in entries.keys() {
            removed |= array.remove(&PhpKey::from_str_key(key)).is_some();
        }

        if removed {
            dest.write(&render(&array, entry, ctx), true)
        } else {
            Ok(dest.unchanged())
        }
    }
}

fn load(text: &str, entry: &FileEntry, ctx: &Context<'_>) -> Result<PhpArray, MergeError> {
    if text.trim().is_empty() {
        return Ok(PhpArray::default());
    }
    php::parse_file(text).map_err(|e| MergeError::MalformedDestination {
        package: ctx.package().to_string(),
        destination: entry.destination.clone(),
        format: "PHP",
        message: e.to_string(),
    })
}

/// Render the whole file, running the entry's key and value filters.
fn render(array: &PhpArray, entry: &FileEntry, ctx: &Context<'_>) -> String {
    let package = ctx.package();
    php::dump_file(
        array,
        |key, original| {
            ctx.filters
                .apply_all(&entry.filters.keys, key, original, package, ctx.log)
        },
        |value, original| {
            ctx.filters
                .apply_all(&entry.filters.values, value, original, package, ctx.log)
        },
    )
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mergers::test_helpers::Fixture;
    use crate::recipe::Filters;
    use serde_json::json;
    use std::path::PathBuf;

    const BUNDLES: &str = "config/bundles.php";

    fn entry() -> FileEntry {
        let mut entry = FileEntry::new("php_array", "%CONFIG_DIR%/bundles.php")
            .with_entries(json!({"Williarin\\CookExampleBundle": {"dev": true, "test": true}}));
        entry.filters = Filters {
            keys: vec!["class_constant".to_string()],
            values: vec!["single_line_array".to_string()],
        };
        entry
    }

    #[test]
    fn creates_file_with_filtered_entries() {
        let fx = Fixture::new();
        let outcome = PhpArrayMerger.merge(&entry(), &fx.ctx()).unwrap();
        assert_eq!(outcome, MergeOutcome::Created(PathBuf::from(BUNDLES)));
        assert_eq!(
            fx.read(BUNDLES),
            "<?php\n\nreturn [\n    Williarin\\CookExampleBundle::class => ['dev' => true, 'test' => true],\n];\n"
        );
    }

    #[test]
    fn appends_to_existing_bundles() {
        let fx = Fixture::new();
        fx.write(
            BUNDLES,
            "<?php\n\nreturn [\n    Symfony\\Bundle\\FrameworkBundle\\FrameworkBundle::class => ['all' => true],\n];\n",
        );
        let outcome = PhpArrayMerger.merge(&entry(), &fx.ctx()).unwrap();
        assert_eq!(outcome, MergeOutcome::Updated(PathBuf::from(BUNDLES)));
        assert_eq!(
            fx.read(BUNDLES),
            "<?php\n\nreturn [\n    Symfony\\Bundle\\FrameworkBundle\\FrameworkBundle::class => ['all' => true],\n    Williarin\\CookExampleBundle::class => ['dev' => true, 'test' => true],\n];\n"
        );
    }

    #[test]
    fn without_filters_renders_plain_literals() {
        let fx = Fixture::new();
        let e = FileEntry::new("php_array", "config/app.php").with_entries(json!({"debug": false, "hosts": ["a"]}));
        PhpArrayMerger.merge(&e, &fx.ctx()).unwrap();
        assert_eq!(
            fx.read("config/app.php"),
            "<?php\n\nreturn [\n    'debug' => false,\n    'hosts' => [\n        'a',\n    ],\n];\n"
        );
    }

    #[test]
    fn existing_key_needs_overwrite_flag() {
        let mut fx = Fixture::new();
        fx.write(BUNDLES, "<?php\n\nreturn [\n    Williarin\\CookExampleBundle::class => ['all' => true],\n];\n");

        let outcome = PhpArrayMerger.merge(&entry(), &fx.ctx()).unwrap();
        assert!(matches!(outcome, MergeOutcome::Unchanged(_)));
        assert!(fx.read(BUNDLES).contains("['all' => true]"));

        fx.state.set_overwrite(true);
        PhpArrayMerger.merge(&entry(), &fx.ctx()).unwrap();
        assert!(fx.read(BUNDLES).contains("['dev' => true, 'test' => true]"));
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let fx = Fixture::new();
        PhpArrayMerger.merge(&entry(), &fx.ctx()).unwrap();
        let outcome = PhpArrayMerger.merge(&entry(), &fx.ctx()).unwrap();
        assert!(matches!(outcome, MergeOutcome::Unchanged(_)));
    }

    #[test]
    fn unknown_filter_warns_and_still_writes() {
        let fx = Fixture::new();
        let mut e = entry();
        e.filters.values = vec!["shout".to_string()];
        PhpArrayMerger.merge(&e, &fx.ctx()).unwrap();
        assert_eq!(
            fx.log.warnings(),
            vec!["Error found in williarin/cook-example recipe: filter \"shout\" unknown."]
        );
        assert!(fx.read(BUNDLES).contains("Williarin\\CookExampleBundle::class => [\n"));
    }

    #[test]
    fn malformed_destination_is_reported() {
        let fx = Fixture::new();
        fx.write(BUNDLES, "<?php\n\nreturn $bundles;\n");
        let err = PhpArrayMerger.merge(&entry(), &fx.ctx()).unwrap_err();
        assert!(matches!(err, MergeError::MalformedDestination { format: "PHP", .. }));
    }

    #[test]
    fn uninstall_removes_declared_keys() {
        let fx = Fixture::new();
        fx.write(
            BUNDLES,
            "<?php\n\nreturn [\n    Symfony\\Bundle\\FrameworkBundle\\FrameworkBundle::class => ['all' => true],\n];\n",
        );
        PhpArrayMerger.merge(&entry(), &fx.ctx()).unwrap();
        let outcome = PhpArrayMerger.uninstall(&entry(), &fx.ctx()).unwrap();
        assert_eq!(outcome, MergeOutcome::Updated(PathBuf::from(BUNDLES)));
        assert_eq!(
            fx.read(BUNDLES),
            "<?php\n\nreturn [\n    Symfony\\Bundle\\FrameworkBundle\\FrameworkBundle::class => ['all' => true],\n];\n"
        );
    }

    #[test]
    fn uninstall_without_keys_is_a_no_op() {
        let fx = Fixture::new();
        fx.write(BUNDLES, "<?php\n\nreturn [];\n");
        let outcome = PhpArrayMerger.uninstall(&entry(), &fx.ctx()).unwrap();
        assert!(matches!(outcome, MergeOutcome::Unchanged(_)));
        assert_eq!(fx.read(BUNDLES), "<?php\n\nreturn [];\n");
    }
}
