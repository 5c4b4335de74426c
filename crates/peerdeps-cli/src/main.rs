//! # peerdeps-cli
//!
//! Checks that the peer dependencies of one or more packages are installed
//! at compatible versions.
//!
//! This is the entry point for the `peerdeps` binary. It handles argument
//! parsing, sets up logging and panic reporting, and dispatches to the
//! command handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use peerdeps_core::error::PeerError;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Verify that declared peerDependencies are installed and in range
#[derive(Parser, Debug)]
#[command(name = "peerdeps", version, about = "Verify package peerDependencies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the peer dependencies of each package root
    Check {
        /// Package directories (defaults to the current directory)
        #[arg(value_name = "ROOT")]
        roots: Vec<String>,

        /// Resolve peer dependencies from this directory instead of each root
        #[arg(long, value_name = "DIR", env = "PEERDEPS_RESOLVE_FROM")]
        from: Option<String>,

        /// Treat a package as installed, e.g. `--assume react@18.2.0`
        #[arg(
            long = "assume",
            value_name = "NAME@VERSION",
            env = "PEERDEPS_ASSUME",
            value_delimiter = ','
        )]
        assume: Vec<String>,

        /// Re-resolve every root even when it repeats
        #[arg(long, env = "PEERDEPS_NO_CACHE")]
        no_cache: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
}

/// How check results are printed
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    debug!("Starting peerdeps v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(code) => code,
        Err(err) => {
            let formatter = ErrorFormatter::new();
            match err.downcast_ref::<PeerError>() {
                Some(peer_error) => eprintln!("{}", formatter.format_error(peer_error)),
                None => eprintln!("{}", formatter.format_simple(&format!("{:#}", err))),
            }
            ExitCode::from(2)
        },
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<ExitCode> {
    let ctx = CommandContext::new()?;
    let report = commands::dispatch_command(cli.command, &ctx)?;

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "peerdeps={level},peerdeps_validate={level},peerdeps_manifest={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("peerdeps encountered an unexpected error: {}", panic_info);
        eprintln!("peerdeps crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/peerdeps/peerdeps/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
