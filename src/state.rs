//! Execution context shared by the orchestrator and the mergers.
//!
//! [`State`] holds the run-level facts (project layout, overwrite flag) and
//! the package currently being processed. [`Context`] bundles a borrowed
//! state with the log and filter registry for a single merger call.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::{Options, ProjectConfig};
use crate::filters::FilterRegistry;
use crate::logging::Log;

/// Recipe file names, in lookup order.
pub const RECIPE_FILES: [&str; 2] = ["cook.yaml", "cook.json"];

/// Per-run state: project layout, overwrite flag, and the current package.
#[derive(Debug)]
pub struct State {
    project: ProjectConfig,
    current_package: Option<String>,
    overwrite: bool,
    recipes: HashMap<String, Option<PathBuf>>,
    placeholder: Regex,
}

impl State {
    /// Create the state for a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the placeholder pattern fails to compile.
    pub fn new(project: ProjectConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            project,
            current_package: None,
            overwrite: false,
            recipes: HashMap::new(),
            placeholder: Regex::new(r"%(.+?)%")?,
        })
    }

    /// Name of the package being processed, if any.
    #[must_use]
    pub fn current_package(&self) -> Option<&str> {
        self.current_package.as_deref()
    }

    /// Name of the package being processed, or an empty string.
    #[must_use]
    pub fn package(&self) -> &str {
        self.current_package().unwrap_or_default()
    }

    /// Make `package` the current package.
    pub fn set_current_package(&mut self, package: Option<&str>) {
        self.current_package = package.map(String::from);
    }

    /// Whether mergers may replace content that already diverged.
    #[must_use]
    pub const fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Set the run-level overwrite flag.
    pub const fn set_overwrite(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
    }

    /// The project configuration.
    #[must_use]
    pub const fn project(&self) -> &ProjectConfig {
        &self.project
    }

    /// Path options of the project.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.project.options
    }

    /// Project root directory.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project.root
    }

    /// Vendor directory holding installed packages.
    #[must_use]
    pub fn vendor_dir(&self) -> PathBuf {
        self.project.root.join(&self.project.vendor_dir)
    }

    /// Directory of the current package.
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.vendor_dir().join(self.package())
    }

    /// Recipe file of the current package, `cook.yaml` preferred over
    /// `cook.json`.
    ///
    /// The lookup result, including the absence of a recipe, is cached per
    /// package for the lifetime of the state.
    pub fn recipe_path(&mut self) -> Option<PathBuf> {
        let package = self.package().to_string();
        if let Some(cached) = self.recipes.get(&package) {
            return cached.clone();
        }
        let dir = self.package_dir();
        let found = RECIPE_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file());
        self.recipes.insert(package, found.clone());
        found
    }

    /// Replace `%NAME%` tokens with the matching path option.
    ///
    /// Names are matched lower-cased with `_` read as `-`; resolved values
    /// lose their trailing `/`. Unknown tokens are left verbatim.
    #[must_use]
    pub fn replace_placeholders(&self, pathname: &str) -> String {
        self.placeholder
            .replace_all(pathname, |caps: &regex::Captures<'_>| {
                let name = caps[1].to_lowercase().replace('_', "-");
                self.options().get(&name).filter(|v| !v.is_empty()).map_or_else(
                    || caps[0].to_string(),
                    |value| value.trim_end_matches('/').to_string(),
                )
            })
            .into_owned()
    }

    /// Absolute path of a file shipped by the current package.
    #[must_use]
    pub fn source_path(&self, source: &str) -> PathBuf {
        self.package_dir().join(source)
    }
}

/// Everything a merger needs for one call.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Run state with the current package set.
    pub state: &'a State,
    /// Output sink for messages.
    pub log: &'a dyn Log,
    /// Filters available to serializers.
    pub filters: &'a FilterRegistry,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("state", &self.state)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    /// Bundle the parts of a merger call.
    #[must_use]
    pub const fn new(state: &'a State, log: &'a dyn Log, filters: &'a FilterRegistry) -> Self {
        Self {
            state,
            log,
            filters,
        }
    }

    /// Name of the package being processed.
    #[must_use]
    pub fn package(&self) -> &str {
        self.state.package()
    }
}
