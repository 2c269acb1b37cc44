use std::ffi::OsString;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::debug;

use crate::args::{BenchArgs, Command};
use crate::config::{apply_config, load_config};
use crate::error::{AppError, AppResult};

/// Runs the command line: parse, merge config, dispatch.
///
/// # Errors
///
/// Returns an error when arguments or config are invalid, or when a command
/// cannot be carried out.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    crate::system::logger::init_logging(args.verbose, args.no_color);

    if matches!(args.command, Command::Worker) {
        return crate::strategy::run_worker().map_err(AppError::from);
    }

    if let Some(config) = load_config(args.config.as_deref())? {
        debug!("Applying config file values");
        apply_config(&mut args, &matches, &config)?;
    }

    match &args.command {
        Command::Compare(compare) => crate::app::run_compare(compare),
        Command::Sweep(sweep) => crate::app::run_sweep(sweep),
        Command::Worker => Ok(()),
    }
}

fn parse_args() -> AppResult<Option<(BenchArgs, ArgMatches)>> {
    let mut cmd = BenchArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = BenchArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--")
}
