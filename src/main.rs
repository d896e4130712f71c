//! `workstation` command-line entry point.
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use workstation::cli::{Cli, Command};
use workstation::commands::{self, CommandSetup};
use workstation::logging::{self, Logger};
use workstation::paths::Dirs;
use workstation::prompt;

fn main() -> Result<ExitCode> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(ExitCode::SUCCESS);
    }

    let dirs = Dirs::from_env()?;
    let log_path = logging::log_file_path(&dirs.app_cache_dir(), args.command.log_name());
    logging::init_subscriber(
        args.verbose,
        log_path.as_deref(),
        args.command.stdout_is_payload(),
    );
    let log = Logger::new(log_path);
    let prompt = prompt::for_terminal();

    // Only registry commands need the repository itself.
    let require_root = matches!(args.command, Command::Config(_));
    let setup = CommandSetup::init(&args.global, dirs, &log, require_root)?;

    match &args.command {
        Command::Config(cmd) => commands::config::run(cmd, &setup, prompt.as_ref(), &log)?,
        Command::Creds(cmd) => commands::creds::run(cmd, &setup, prompt.as_ref(), &log)?,
        Command::Env(cmd) => return commands::env::run(cmd, &setup, prompt.as_ref(), &log),
        Command::Version => commands::version::run(),
    }
    Ok(ExitCode::SUCCESS)
}
