//! # Banker CLI Library
//!
//! Text front end for `banker-engine`: play a session interactively, run
//! simulated sessions, and summarize session logs.
//!
//! ## Main Entry Point
//!
//! [`run`] parses command-line arguments and executes the subcommand,
//! writing to the given streams and returning the process exit code.
//!
//! ```
//! let mut out = Vec::new();
//! let mut err = Vec::new();
//! let code = banker_cli::run(["banker", "values"], &mut out, &mut err);
//! assert_eq!(code, 0);
//! assert!(String::from_utf8(out).unwrap().contains("$1,000,000"));
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Play one session on stdin
//! - `sim`: Run automated sessions and write session records
//! - `stats`: Aggregate statistics from JSONL session logs
//! - `cfg`: Display current configuration settings
//! - `values`: Print the denomination table

use clap::Parser;
use std::io::Write;

#[macro_use]
mod macros;

pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod logging;
pub mod ui;
pub mod validation;

use cli::{BankerCli, Commands};
use commands::{
    handle_cfg_command, handle_play_command, handle_sim_command, handle_stats_command,
    handle_values_command,
};
pub use error::CliError;

const COMMANDS: &[&str] = &["play", "sim", "stats", "cfg", "values"];

/// Main entry point for the CLI application.
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stdin = std::io::stdin();
    let mut stdin_lock = stdin.lock();
    run_with_input(args, &mut stdin_lock, out, err)
}

/// Same as [`run`], reading interactive input from `input`.
pub fn run_with_input<I, S>(
    args: I,
    input: &mut dyn std::io::BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match BankerCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version go to stdout with success
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                if write!(out, "{}", e).is_err() {
                    return exit_code::ERROR;
                }
                return exit_code::SUCCESS;
            }
            write_or_exit!(err, "{}", e);
            write_or_exit!(err, "Usage: banker <command> [options]\n");
            write_or_exit!(err, "Commands:");
            for c in COMMANDS {
                write_or_exit!(err, "  {}", c);
            }
            write_or_exit!(err, "\nFor full help, run: banker --help");
            return exit_code::ERROR;
        }
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Values => handle_values_command(out),
        Commands::Stats { input } => handle_stats_command(input, out, err),
        Commands::Play { seed, log } => config::load()
            .map_err(CliError::from)
            .and_then(|cfg| handle_play_command(seed, log, &cfg, out, err, input)),
        Commands::Sim {
            sessions,
            seed,
            output,
            accept_ratio,
        } => config::load()
            .map_err(CliError::from)
            .and_then(|cfg| handle_sim_command(sessions, seed, output, accept_ratio, &cfg, out, err)),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}
