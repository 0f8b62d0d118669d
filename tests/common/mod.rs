// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed project and a fluent builder so each
// integration test can lay out `composer.json`, installed packages and their
// recipes without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cook::cli::GlobalOpts;
use cook::config::ProjectConfig;
use cook::logging::MemoryLog;
use cook::oven::Oven;
use cook::state::State;

/// Name of the sample package used across tests.
pub const EXAMPLE: &str = "williarin/cook-example";

/// Recipe of the sample package: one entry per merger type, a directory,
/// and post-install instructions.
pub const EXAMPLE_RECIPE: &str = r"files:
  .env:
    type: env
    source: .env
  '%CONFIG_DIR%/bundles.php':
    type: php_array
    entries:
      Williarin\CookExampleBundle:
        dev: true
        test: true
    filters:
      keys: [class_constant]
      values: [single_line_array]
  '%CONFIG_DIR%/services.yaml':
    type: yaml
    source: resources/services.yaml
    uninstall_empty_sections: true
  composer.json:
    type: json
    entries:
      scripts:
        cook-example: echo cooked
  docker-compose.yml:
    type: docker_compose
    source: resources/docker-compose.yml
  var/notes.txt: resources/notes.txt
directories:
  '%CONFIG_DIR%/cook_example': resources/config
post_install_output: |
  Cook example installed.
";

/// An isolated project backed by a [`tempfile::TempDir`].
pub struct TestProject {
    /// Temporary directory holding the project.
    pub root: tempfile::TempDir,
}

impl TestProject {
    /// Path to the project root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Read a project file.
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| format!("<unreadable {relative}: {e}>"))
    }

    /// Return `true` if the project file exists.
    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Write a project file, creating parents.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        std::fs::write(path, content).expect("write project file");
    }

    /// Build a fresh run state for the project.
    pub fn state(&self) -> State {
        let project = ProjectConfig::load(self.root.path()).expect("load project");
        State::new(project).expect("build state")
    }

    /// An oven for the project reporting into `log`.
    pub fn oven<'a>(&self, log: &'a MemoryLog) -> Oven<'a> {
        Oven::new(self.state(), log)
    }

    /// Global options pointing at the project.
    pub fn global_opts(&self) -> GlobalOpts {
        GlobalOpts {
            project_dir: Some(self.root.path().to_path_buf()),
        }
    }

    /// Declared dependencies, in manifest order.
    pub fn dependencies(&self) -> Vec<String> {
        self.state().project().dependencies.clone()
    }
}

/// Fluent builder for [`TestProject`].
pub struct ProjectBuilder {
    project: TestProject,
    require: Vec<String>,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl ProjectBuilder {
    /// Begin building an empty project.
    pub fn new() -> Self {
        Self {
            project: TestProject {
                root: tempfile::tempdir().expect("create temp dir"),
            },
            require: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Declare `package` in `require`.
    pub fn dependency(mut self, package: &str) -> Self {
        self.require.push(package.to_string());
        self
    }

    /// Set a string option under `extra`.
    pub fn extra(mut self, key: &str, value: &str) -> Self {
        self.extra
            .insert(key.to_string(), serde_json::Value::String(value.to_string()));
        self
    }

    /// Write `relative` inside `vendor/<package>/`.
    pub fn package_file(self, package: &str, relative: &str, content: &str) -> Self {
        self.project
            .write(&format!("vendor/{package}/{relative}"), content);
        self
    }

    /// Write a file at the project root.
    pub fn project_file(self, relative: &str, content: &str) -> Self {
        self.project.write(relative, content);
        self
    }

    /// Install the sample package with its recipe and sources.
    pub fn with_example_package(self) -> Self {
        self.dependency(EXAMPLE)
            .package_file(EXAMPLE, "cook.yaml", EXAMPLE_RECIPE)
            .package_file(
                EXAMPLE,
                ".env",
                "SOME_ENV_VARIABLE='hello'\nANOTHER_ENV_VARIABLE=world\n",
            )
            .package_file(
                EXAMPLE,
                "resources/services.yaml",
                "parameters:\n    locale: fr\n\nservices:\n    Some\\Service: ~\n",
            )
            .package_file(
                EXAMPLE,
                "resources/docker-compose.yml",
                "services:\n  cook-db:\n    image: postgres\nvolumes:\n  cook-data: ~\n",
            )
            .package_file(EXAMPLE, "resources/notes.txt", "Cooked by the example package.\n")
            .package_file(EXAMPLE, "resources/config/cook_example.yaml", "cook_example: ~\n")
    }

    /// Write `composer.json` and return the project.
    pub fn build(self) -> TestProject {
        let require: serde_json::Map<String, serde_json::Value> = std::iter::once((
            "php".to_string(),
            serde_json::Value::String(">=8.1".to_string()),
        ))
        .chain(
            self.require
                .iter()
                .map(|p| (p.clone(), serde_json::Value::String("*".to_string()))),
        )
        .collect();
        let manifest = serde_json::json!({
            "name": "acme/app",
            "require": require,
            "extra": self.extra,
        });
        if !self.project.exists("composer.json") {
            self.project.write(
                "composer.json",
                &serde_json::to_string_pretty(&manifest).expect("serialize manifest"),
            );
        }
        self.project
    }
}
