//! Orchestration of recipes across packages.
//!
//! The [`Oven`] walks the target packages, loads each recipe, dispatches its
//! file entries to the mergers, copies or removes its directories, and
//! reports every outcome through the [`Log`].
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::MergeError;
use crate::filters::FilterRegistry;
use crate::logging::{Log, PackageStatus};
use crate::mergers::{MergeOutcome, MergerRegistry};
use crate::recipe::{self, FileEntry, Recipe};
use crate::state::{Context, State};

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Cook,
    Uninstall,
}

impl Mode {
    const fn noun(self) -> &'static str {
        match self {
            Self::Cook => "execution",
            Self::Uninstall => "uninstallation",
        }
    }
}

/// Applies and reverts package recipes for one project.
pub struct Oven<'a> {
    state: State,
    log: &'a dyn Log,
    mergers: MergerRegistry,
    filters: FilterRegistry,
    recipes: HashMap<String, Recipe>,
}

impl std::fmt::Debug for Oven<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oven")
            .field("state", &self.state)
            .field("mergers", &self.mergers)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl<'a> Oven<'a> {
    /// Build an oven with the built-in mergers and filters.
    #[must_use]
    pub fn new(state: State, log: &'a dyn Log) -> Self {
        Self {
            state,
            log,
            mergers: MergerRegistry::new(),
            filters: FilterRegistry::new(),
            recipes: HashMap::new(),
        }
    }

    /// The run state.
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Apply the recipes of `packages`.
    ///
    /// Packages without a recipe are skipped silently; a package whose
    /// recipe cannot be loaded is reported and the run moves on.
    pub fn cook(&mut self, packages: &[String], overwrite: bool) {
        self.state.set_overwrite(overwrite);
        for package in packages {
            self.process(package, Mode::Cook);
        }
        self.state.set_current_package(None);
    }

    /// Revert the recipes of `packages`.
    ///
    /// Content that diverged from the recipe is never overwritten or
    /// deleted.
    pub fn uninstall(&mut self, packages: &[String]) {
        self.state.set_overwrite(false);
        for package in packages {
            self.process(package, Mode::Uninstall);
        }
        self.state.set_current_package(None);
    }

    /// Print the `post_install_output` of every package that declares one.
    pub fn display_post_install_output(&mut self, packages: &[String]) {
        for package in packages {
            self.state.set_current_package(Some(package));
            let Some(output) = self
                .recipe_for(package)
                .and_then(|recipe| recipe.post_install_output.clone())
            else {
                continue;
            };
            if output.is_empty() {
                continue;
            }
            self.log.verbatim(&format!("{package} instructions:"));
            self.log.verbatim(&output);
        }
        self.state.set_current_package(None);
    }

    /// Loaded recipe of `package`, without reporting load errors.
    fn recipe_for(&mut self, package: &str) -> Option<&Recipe> {
        if !self.recipes.contains_key(package) {
            let path = self.state.recipe_path()?;
            match recipe::load(&path, package) {
                Ok(recipe) => {
                    self.recipes.insert(package.to_string(), recipe);
                }
                Err(e) => {
                    self.log.debug(&format!("{package}: {e}"));
                    return None;
                }
            }
        }
        self.recipes.get(package)
    }

    fn process(&mut self, package: &str, mode: Mode) {
        self.state.set_current_package(Some(package));
        let Some(path) = self.state.recipe_path() else {
            self.log.debug(&format!("{package}: no recipe"));
            return;
        };

        match mode {
            Mode::Cook => self.log.info(&format!("Found Cook recipe for {package}")),
            Mode::Uninstall => self
                .log
                .info(&format!("Uninstalling Cook recipe for {package}")),
        }

        let recipe = match recipe::load(&path, package) {
            Ok(recipe) => recipe,
            Err(e) => {
                self.log.error(&e.to_string());
                self.log
                    .error(&format!("Aborting {package} recipe {}.", mode.noun()));
                self.log
                    .record_package(package, PackageStatus::Failed, Some(&e.to_string()));
                return;
            }
        };

        let failures = self.apply(&recipe, mode);
        if failures == 0 {
            self.log.record_package(package, PackageStatus::Ok, None);
        } else {
            self.log.record_package(
                package,
                PackageStatus::Incomplete,
                Some(&format!("{failures} entry(ies) failed")),
            );
        }
        self.recipes.insert(package.to_string(), recipe);
    }

    /// Run every file entry and directory of `recipe`; returns the number of
    /// failures.
    fn apply(&self, recipe: &Recipe, mode: Mode) -> usize {
        let ctx = Context::new(&self.state, self.log, &self.filters);
        let mut failures = 0;

        for entry in &recipe.files {
            match self.apply_entry(entry, mode, &ctx) {
                Ok(outcome) => self.report(&outcome),
                Err(e) => {
                    self.log.error(&e.to_string());
                    failures += 1;
                }
            }
        }

        for (destination, source) in &recipe.directories {
            let result = match mode {
                Mode::Cook => self.copy_directory(destination, source),
                Mode::Uninstall => self.remove_directory(destination, source),
            };
            match result {
                Ok(outcomes) => outcomes.iter().for_each(|o| self.report(o)),
                Err(e) => {
                    self.log.error(&e.to_string());
                    failures += 1;
                }
            }
        }
        failures
    }

    fn apply_entry(
        &self,
        entry: &FileEntry,
        mode: Mode,
        ctx: &Context<'_>,
    ) -> Result<MergeOutcome, MergeError> {
        let merger =
            self.mergers
                .get(&entry.file_type)
                .ok_or_else(|| MergeError::UnknownFileType {
                    package: ctx.package().to_string(),
                    file_type: entry.file_type.clone(),
                })?;
        match mode {
            Mode::Cook => merger.merge(entry, ctx),
            Mode::Uninstall => merger.uninstall(entry, ctx),
        }
    }

    fn report(&self, outcome: &MergeOutcome) {
        match outcome.message() {
            Some(message) => self.log.info(&message),
            None => self
                .log
                .debug(&format!("Unchanged file: {}", outcome.path().display())),
        }
        self.log.record_outcome(outcome);
    }

    /// Files of a package directory paired with their project destinations.
    fn directory_pairs(
        &self,
        destination: &str,
        source: &str,
    ) -> Result<Vec<(PathBuf, PathBuf)>, MergeError> {
        let source_dir = self.state.source_path(source);
        if !source_dir.is_dir() {
            return Err(MergeError::MissingSourceDirectory {
                package: self.state.package().to_string(),
                path: source_dir,
            });
        }
        let destination = PathBuf::from(self.state.replace_placeholders(destination));
        Ok(crate::fs::files_under(&source_dir)?
            .into_iter()
            .map(|file| (source_dir.join(&file), destination.join(&file)))
            .collect())
    }

    fn copy_directory(
        &self,
        destination: &str,
        source: &str,
    ) -> Result<Vec<MergeOutcome>, MergeError> {
        let mut outcomes = Vec::new();
        for (from, relative) in self.directory_pairs(destination, source)? {
            let target = self.state.project_dir().join(&relative);
            let bytes = read_bytes(&from)?;
            let outcome = match read_optional_bytes(&target)? {
                None => {
                    crate::fs::write(&target, &bytes)?;
                    MergeOutcome::Created(relative)
                }
                Some(existing) if self.state.overwrite() && existing != bytes => {
                    crate::fs::write(&target, &bytes)?;
                    MergeOutcome::Updated(relative)
                }
                Some(_) => MergeOutcome::Unchanged(relative),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn remove_directory(
        &self,
        destination: &str,
        source: &str,
    ) -> Result<Vec<MergeOutcome>, MergeError> {
        let mut outcomes = Vec::new();
        for (from, relative) in self.directory_pairs(destination, source)? {
            let target = self.state.project_dir().join(&relative);
            let outcome = match read_optional_bytes(&target)? {
                Some(existing) if existing == read_bytes(&from)? => {
                    crate::fs::remove(&target)?;
                    MergeOutcome::Removed(relative)
                }
                _ => MergeOutcome::Unchanged(relative),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, MergeError> {
    std::fs::read(path).map_err(|e| MergeError::io(path, e))
}

fn read_optional_bytes(path: &Path) -> Result<Option<Vec<u8>>, MergeError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MergeError::io(path, e)),
    }
}
