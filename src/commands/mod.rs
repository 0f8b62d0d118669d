//! Top-level subcommand orchestration.
pub mod install;
pub mod uninstall;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{MANIFEST_FILE, ProjectConfig};
use crate::logging::Logger;
use crate::state::State;

/// Environment variable naming the project directory.
pub const PROJECT_DIR_ENV: &str = "COOK_PROJECT_DIR";

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Run state for the resolved project.
    pub state: State,
}

impl CommandSetup {
    /// Resolve the project directory and load its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the project directory cannot be determined or its
    /// manifest fails to parse.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let root = resolve_project_dir(global)?;

        log.stage("Loading project");
        let project = ProjectConfig::load(&root)?;
        log.info(&format!("project: {}", root.display()));
        log.debug(&format!("vendor dir: {}", project.vendor_dir));
        log.debug(&format!(
            "{} declared dependencies",
            project.dependencies.len()
        ));

        let state = State::new(project).context("building run state")?;
        Ok(Self { state })
    }

    /// `requested` packages, or every declared dependency when empty.
    #[must_use]
    pub fn targets(&self, requested: &[String]) -> Vec<String> {
        if requested.is_empty() {
            self.state.project().dependencies.clone()
        } else {
            requested.to_vec()
        }
    }
}

/// Resolve the project directory from CLI arguments or auto-detection.
///
/// # Errors
///
/// Returns an error if no project directory can be determined.
pub fn resolve_project_dir(global: &GlobalOpts) -> Result<PathBuf> {
    let from_env = std::env::var_os(PROJECT_DIR_ENV).map(PathBuf::from);
    let cwd = std::env::current_dir().context("reading current directory")?;
    find_project_dir(global.project_dir.as_deref(), from_env, &cwd)
}

/// `--project-dir`, then the environment, then the nearest ancestor of `cwd`
/// holding a manifest.
fn find_project_dir(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    cwd: &Path,
) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = from_env.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    cwd.ancestors()
        .find(|dir| dir.join(MANIFEST_FILE).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "cannot find {MANIFEST_FILE} in {} or its parents. Use --project-dir or set {PROJECT_DIR_ENV}",
                cwd.display()
            )
        })
}
