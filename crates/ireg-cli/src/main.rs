//! # ireg CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ireg_cli::admin::{run_admin, AdminArgs};
use ireg_cli::events::{run_events, EventsArgs};
use ireg_cli::init::{run_init, InitArgs};
use ireg_cli::institution::{run_institution, InstitutionArgs};
use ireg_cli::{CliContext, DEFAULT_STATE_PATH};

/// Institution registry CLI.
///
/// Maintains a permissioned registry of verified institutions in a local
/// snapshot file: registration submission and approval, profile updates,
/// admin management, and the audit log.
#[derive(Parser, Debug)]
#[command(name = "ireg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the registry configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the registry snapshot.
    #[arg(long, global = true, default_value = DEFAULT_STATE_PATH)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a fresh registry snapshot.
    Init(InitArgs),

    /// Registration workflow and institution queries.
    Institution(InstitutionArgs),

    /// Ownership, admin set, and pause flag.
    Admin(AdminArgs),

    /// Audit log listing and verification.
    Events(EventsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = CliContext {
        state_path: cli.state,
        config_path: cli.config,
    };
    tracing::debug!(state = %ctx.state_path.display(), "ireg CLI starting");

    let result = match cli.command {
        Commands::Init(args) => run_init(&args, &ctx),
        Commands::Institution(args) => run_institution(&args, &ctx),
        Commands::Admin(args) => run_admin(&args, &ctx),
        Commands::Events(args) => run_events(&args, &ctx),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
