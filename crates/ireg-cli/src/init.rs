//! # Init Subcommand
//!
//! Creates a fresh registry snapshot from `--owner`, from the `--config`
//! file, or from both (the flag overrides the file's owner). The config's
//! limits and verifier are stored in the snapshot and apply to every later
//! invocation.

use anyhow::{bail, Context, Result};
use clap::Args;
use ireg_core::Principal;
use ireg_registry::{RegistryConfig, RegistryState};

use crate::{save_snapshot, CliContext, Snapshot};

/// Arguments for `ireg init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Initial owner. Required unless `--config` names one.
    #[arg(long)]
    pub owner: Option<Principal>,

    /// Overwrite an existing snapshot.
    #[arg(long)]
    pub force: bool,
}

/// Execute `ireg init`.
pub fn run_init(args: &InitArgs, ctx: &CliContext) -> Result<u8> {
    if ctx.state_path.exists() && !args.force {
        bail!(
            "registry snapshot already exists: {} (use --force to overwrite)",
            ctx.state_path.display()
        );
    }

    let config = match (ctx.load_config()?, &args.owner) {
        (Some(config), None) => config,
        (Some(config), Some(owner)) => RegistryConfig {
            owner: owner.clone(),
            ..config
        },
        (None, Some(owner)) => RegistryConfig::for_owner(owner.clone()),
        (None, None) => bail!("--owner is required when no --config is given"),
    };
    config.validate().context("invalid genesis configuration")?;

    let settings = config.settings();
    let state = RegistryState::genesis(config.owner.clone(), config.admins, config.paused)?;
    save_snapshot(&ctx.state_path, &Snapshot { settings, state })?;

    tracing::info!(
        owner = %config.owner,
        verifier = ?settings.verifier,
        path = %ctx.state_path.display(),
        "initialized registry"
    );
    println!(
        "OK: initialized registry owned by {} at {}",
        config.owner,
        ctx.state_path.display()
    );
    Ok(0)
}
