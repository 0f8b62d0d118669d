use anyhow::Result;
use clap::Parser;

use cook::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);
    let log = logging::Logger::new(command);

    match args.command {
        cli::Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        cli::Command::Uninstall(opts) => commands::uninstall::run(&args.global, &opts, &log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
