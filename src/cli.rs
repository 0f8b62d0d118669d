use clap::{ArgGroup, Parser, Subcommand};

/// Top-level CLI entry point for the recipe engine.
#[derive(Parser, Debug)]
#[command(
    name = "cook",
    about = "Apply and revert package recipes in a project",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Project directory (the one holding composer.json)
    #[arg(long, global = true)]
    pub project_dir: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply package recipes
    #[command(alias = "cook")]
    Install(InstallOpts),
    /// Revert a package recipe
    Uninstall(UninstallOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Uninstall(_) => "uninstall",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Packages to cook (default: every declared dependency)
    pub packages: Vec<String>,

    /// Replace content that diverged from the recipe
    #[arg(long)]
    pub overwrite: bool,
}

/// Options for the `uninstall` subcommand.
#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["package", "all"])))]
pub struct UninstallOpts {
    /// Package whose recipe to revert
    pub package: Option<String>,

    /// Revert the recipes of every declared dependency
    #[arg(long)]
    pub all: bool,
}
