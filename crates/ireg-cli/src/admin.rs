//! # Admin Subcommand
//!
//! Ownership, admin set membership, and the pause flag.

use anyhow::Result;
use clap::{Args, Subcommand};
use ireg_core::Principal;

use crate::{finish, CliContext};

/// Arguments for `ireg admin`.
#[derive(Args, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands.
#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Transfer ownership to another principal. Owner only.
    TransferOwnership {
        /// Current owner.
        #[arg(long)]
        caller: Principal,
        /// New owner.
        #[arg(long)]
        new_owner: Principal,
    },

    /// Add a principal to the admin set.
    Add {
        /// Owner or admin.
        #[arg(long)]
        caller: Principal,
        /// Principal to add.
        #[arg(long)]
        admin: Principal,
    },

    /// Remove a principal from the admin set.
    Remove {
        /// Owner or admin.
        #[arg(long)]
        caller: Principal,
        /// Principal to remove.
        #[arg(long)]
        admin: Principal,
    },

    /// Pause the registry.
    Pause {
        /// Owner or admin.
        #[arg(long)]
        caller: Principal,
    },

    /// Unpause the registry.
    Unpause {
        /// Owner or admin.
        #[arg(long)]
        caller: Principal,
    },

    /// Show owner, admin set, pause flag, and version.
    Show,
}

/// Execute `ireg admin`.
pub fn run_admin(args: &AdminArgs, ctx: &CliContext) -> Result<u8> {
    let session = ctx.open_registry()?;
    let registry = &session.registry;

    match &args.command {
        AdminCommand::TransferOwnership { caller, new_owner } => {
            finish(ctx, &session, registry.transfer_ownership(caller, new_owner))
        }
        AdminCommand::Add { caller, admin } => {
            finish(ctx, &session, registry.add_admin(caller, admin))
        }
        AdminCommand::Remove { caller, admin } => {
            finish(ctx, &session, registry.remove_admin(caller, admin))
        }
        AdminCommand::Pause { caller } => finish(ctx, &session, registry.set_paused(caller, true)),
        AdminCommand::Unpause { caller } => {
            finish(ctx, &session, registry.set_paused(caller, false))
        }
        AdminCommand::Show => {
            println!("Owner: {}", registry.get_owner());
            println!("Paused: {}", registry.get_paused());
            println!("Version: {}", registry.version());
            let admins = registry.admins();
            println!("Admins ({}):", admins.len());
            for admin in admins {
                println!("  {admin}");
            }
            Ok(0)
        }
    }
}
