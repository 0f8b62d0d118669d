//! Uninstall command implementation.
use anyhow::Result;

use crate::cli::{GlobalOpts, UninstallOpts};
use crate::logging::Logger;
use crate::oven::Oven;

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded or at least one package
/// failed.
pub fn run(global: &GlobalOpts, opts: &UninstallOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let requested: Vec<String> = opts.package.iter().cloned().collect();
    let packages = if opts.all {
        setup.targets(&[])
    } else {
        requested
    };

    log.stage("Uninstalling recipes");
    let mut oven = Oven::new(setup.state, log);
    oven.uninstall(&packages);

    log.print_summary();

    let failures = log.failure_count();
    if failures > 0 {
        anyhow::bail!("{failures} package(s) failed");
    }
    Ok(())
}
