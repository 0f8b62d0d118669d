//! Install command implementation.
use anyhow::Result;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::Logger;
use crate::oven::Oven;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded or at least one package
/// failed.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let packages = setup.targets(&opts.packages);

    log.stage("Cooking recipes");
    log.debug(&format!(
        "{} package(s), overwrite: {}",
        packages.len(),
        opts.overwrite
    ));
    let mut oven = Oven::new(setup.state, log);
    oven.cook(&packages, opts.overwrite);
    oven.display_post_install_output(&packages);

    log.print_summary();

    let failures = log.failure_count();
    if failures > 0 {
        anyhow::bail!("{failures} package(s) failed");
    }
    Ok(())
}
