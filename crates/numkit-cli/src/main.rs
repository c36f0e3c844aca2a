//! # numkit: Command Line Front-End
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Startup Sequence                                │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. Initialize tracing (stderr, RUST_LOG or --verbose)                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  3. Load NumkitConfig (defaults → numkit.toml → NUMKIT_* env)           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  4. Run the command handler, print its output to stdout                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::cli::App;
use crate::config::NumkitConfig;
use crate::error::CliResult;

fn main() -> ExitCode {
    let app = App::parse();
    init_tracing(app.global.verbose);

    match run(app) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(app: App) -> CliResult<String> {
    let config = NumkitConfig::load(app.global.config.clone())?;
    debug!(?config, "Configuration loaded");
    commands::execute(&app.command, &config)
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so that command output on stdout stays clean.
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "warn,numkit=debug" } else { "warn,numkit=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
