#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `install` command.
//!
//! These tests lay out a whole project with installed packages and run the
//! recipes through the command handler or the [`Oven`](cook::oven::Oven),
//! then inspect the resulting files.

mod common;

use common::*;

use cook::cli::InstallOpts;
use cook::commands;
use cook::logging::{LogEntry, Logger, MemoryLog, PackageStatus};

fn install_all() -> InstallOpts {
    InstallOpts {
        packages: Vec::new(),
        overwrite: false,
    }
}

// ---------------------------------------------------------------------------
// Full example package
// ---------------------------------------------------------------------------

#[test]
fn install_cooks_every_file_type() {
    let project = ProjectBuilder::new().with_example_package().build();
    let log = Logger::new("install");

    commands::install::run(&project.global_opts(), &install_all(), &log).unwrap();

    assert_eq!(
        project.read(".env"),
        "###> williarin/cook-example ###\nSOME_ENV_VARIABLE='hello'\nANOTHER_ENV_VARIABLE=world\n###< williarin/cook-example ###\n"
    );
    assert_eq!(
        project.read("config/bundles.php"),
        "<?php\n\nreturn [\n    Williarin\\CookExampleBundle::class => ['dev' => true, 'test' => true],\n];\n"
    );
    insta::assert_snapshot!(project.read("config/services.yaml").trim_end(), @r"
    parameters:
    ###> williarin/cook-example ###
        locale: fr
    ###< williarin/cook-example ###

    services:
    ###> williarin/cook-example ###
        Some\Service: ~
    ###< williarin/cook-example ###
    ");
    insta::assert_snapshot!(project.read("docker-compose.yml").trim_end(), @r"
    services:
    ###> williarin/cook-example ###
      cook-db:
        image: postgres
    ###< williarin/cook-example ###

    volumes:
    ###> williarin/cook-example ###
      cook-data: ~
    ###< williarin/cook-example ###
    ");
    assert_eq!(
        project.read("var/notes.txt"),
        "###> williarin/cook-example ###\nCooked by the example package.\n###< williarin/cook-example ###\n"
    );
    assert_eq!(
        project.read("config/cook_example/cook_example.yaml"),
        "cook_example: ~\n"
    );

    let manifest: serde_json::Value = serde_json::from_str(&project.read("composer.json")).unwrap();
    assert_eq!(manifest["scripts"]["cook-example"], "echo cooked");
    assert_eq!(manifest["require"]["williarin/cook-example"], "*");

    let counts = log.outcome_counts();
    assert_eq!(counts.created, 6);
    assert_eq!(counts.updated, 1);
    assert_eq!(log.failure_count(), 0);
}

#[test]
fn cooking_twice_changes_nothing() {
    let project = ProjectBuilder::new().with_example_package().build();
    let packages = project.dependencies();

    let first = MemoryLog::new();
    project.oven(&first).cook(&packages, false);
    let snapshot: Vec<String> = [".env", "config/bundles.php", "config/services.yaml", "composer.json", "docker-compose.yml"]
        .iter()
        .map(|f| project.read(f))
        .collect();

    let second = MemoryLog::new();
    project.oven(&second).cook(&packages, false);
    let counts = second.outcome_counts();
    assert_eq!(counts.created + counts.updated + counts.removed, 0);
    assert_eq!(counts.unchanged, 7);

    let again: Vec<String> = [".env", "config/bundles.php", "config/services.yaml", "composer.json", "docker-compose.yml"]
        .iter()
        .map(|f| project.read(f))
        .collect();
    assert_eq!(snapshot, again);
}

#[test]
fn post_install_output_follows_the_run() {
    let project = ProjectBuilder::new().with_example_package().build();
    let packages = project.dependencies();
    let log = MemoryLog::new();
    let mut oven = project.oven(&log);

    oven.cook(&packages, false);
    oven.display_post_install_output(&packages);

    let entries = log.entries();
    let tail = &entries[entries.len() - 2..];
    assert_eq!(
        tail,
        [
            LogEntry::Verbatim("williarin/cook-example instructions:".to_string()),
            LogEntry::Verbatim("Cook example installed.\n".to_string()),
        ]
    );
}

// ---------------------------------------------------------------------------
// Package selection and project options
// ---------------------------------------------------------------------------

#[test]
fn explicit_packages_limit_the_run() {
    let project = ProjectBuilder::new()
        .with_example_package()
        .dependency("acme/other")
        .package_file("acme/other", "cook.json", r#"{"files": {"other.txt": {"content": "other"}}}"#)
        .build();
    let log = Logger::new("install");
    let opts = InstallOpts {
        packages: vec!["acme/other".to_string()],
        overwrite: false,
    };

    commands::install::run(&project.global_opts(), &opts, &log).unwrap();

    assert!(project.exists("other.txt"));
    assert!(!project.exists(".env"));
    let names: Vec<String> = log.package_entries().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["acme/other"]);
}

#[test]
fn packages_run_in_declaration_order() {
    let project = ProjectBuilder::new()
        .dependency("zeta/first")
        .dependency("alpha/second")
        .package_file("zeta/first", "cook.yaml", "files:\n  shared.txt:\n    content: zeta\n")
        .package_file("alpha/second", "cook.yaml", "files:\n  shared.txt:\n    content: alpha\n")
        .build();
    let log = MemoryLog::new();
    project.oven(&log).cook(&project.dependencies(), false);

    assert_eq!(
        project.read("shared.txt"),
        "###> zeta/first ###\nzeta\n###< zeta/first ###\n\n###> alpha/second ###\nalpha\n###< alpha/second ###\n"
    );
}

#[test]
fn config_dir_option_moves_destinations() {
    let project = ProjectBuilder::new()
        .extra("config-dir", "etc/")
        .with_example_package()
        .build();
    let log = MemoryLog::new();
    project.oven(&log).cook(&project.dependencies(), false);

    assert!(project.exists("etc/bundles.php"));
    assert!(project.exists("etc/cook_example/cook_example.yaml"));
    assert!(!project.exists("config"));
    assert!(log.contains("Created file: etc/services.yaml"));
}

// ---------------------------------------------------------------------------
// Overwrite flag
// ---------------------------------------------------------------------------

#[test]
fn overwrite_applies_changed_recipe_content() {
    let project = ProjectBuilder::new().with_example_package().build();
    let packages = project.dependencies();
    project.oven(&MemoryLog::new()).cook(&packages, false);

    project.write(
        "vendor/williarin/cook-example/.env",
        "SOME_ENV_VARIABLE='bonjour'\n",
    );
    project.oven(&MemoryLog::new()).cook(&packages, false);
    assert!(project.read(".env").contains("'hello'"));

    let log = MemoryLog::new();
    project.oven(&log).cook(&packages, true);
    assert_eq!(
        project.read(".env"),
        "###> williarin/cook-example ###\nSOME_ENV_VARIABLE='bonjour'\n###< williarin/cook-example ###\n"
    );
    assert!(log.contains("Updated file: .env"));
}

#[test]
fn user_definitions_are_commented_out() {
    let project = ProjectBuilder::new()
        .with_example_package()
        .project_file(".env", "APP_ENV=dev\nSOME_ENV_VARIABLE=mine\n")
        .build();
    project.oven(&MemoryLog::new()).cook(&project.dependencies(), false);

    assert!(project.read(".env").starts_with("APP_ENV=dev\n#SOME_ENV_VARIABLE=mine\n\n###> williarin/cook-example ###\n"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn broken_recipe_fails_the_command_but_not_the_run() {
    let project = ProjectBuilder::new()
        .dependency("acme/broken")
        .package_file("acme/broken", "cook.json", "{ not json")
        .with_example_package()
        .build();
    let log = Logger::new("install");

    let err = commands::install::run(&project.global_opts(), &install_all(), &log).unwrap_err();

    assert_eq!(err.to_string(), "1 package(s) failed");
    assert!(project.exists(".env"));
    let statuses: Vec<(String, PackageStatus)> = log
        .package_entries()
        .into_iter()
        .map(|p| (p.name, p.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("acme/broken".to_string(), PackageStatus::Failed),
            ("williarin/cook-example".to_string(), PackageStatus::Ok),
        ]
    );
}

#[test]
fn schema_violations_are_all_reported() {
    let project = ProjectBuilder::new()
        .dependency("acme/invalid")
        .package_file(
            "acme/invalid",
            "cook.yaml",
            "files:\n  a.txt:\n    source: ''\n    colour: red\npost_install_output: [1]\n",
        )
        .build();
    let log = MemoryLog::new();
    project.oven(&log).cook(&project.dependencies(), false);

    let errors = log.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains("[files][a.txt][colour]: This field was not expected."));
    assert!(errors[0].contains("[files][a.txt][source]: This value should not be blank."));
    assert!(errors[0].contains("[post_install_output]: This value should be of type string."));
    assert_eq!(errors[1], "Aborting acme/invalid recipe execution.");
    assert!(!project.exists("a.txt"));
}

#[test]
fn missing_source_file_skips_only_that_entry() {
    let project = ProjectBuilder::new()
        .dependency("acme/partial")
        .package_file(
            "acme/partial",
            "cook.yaml",
            "files:\n  a.txt: missing.txt\n  b.txt:\n    content: b\n",
        )
        .build();
    let log = MemoryLog::new();
    project.oven(&log).cook(&project.dependencies(), false);

    assert_eq!(log.errors().len(), 1);
    assert!(log.errors()[0].contains("missing.txt\" not found"));
    assert!(project.exists("b.txt"));
    assert_eq!(log.packages()[0].status, PackageStatus::Incomplete);
}
