//! # Institution Subcommand
//!
//! Registration workflow against the local snapshot.
//!
//! ## Subcommands
//!
//! - `submit`: Submit a registration for the caller.
//! - `approve` / `reject`: Admin decision on a pending registration.
//! - `update`: Replace the caller's verified profile fields.
//! - `unverify`: Admin withdrawal of verification.
//! - `show`: Profile or pending registration for one institution.
//! - `status`: Lifecycle position of one institution.
//! - `pending`: All pending registrations.
//! - `list`: All verified institutions.

use anyhow::Result;
use clap::{Args, Subcommand};
use ireg_core::Principal;
use ireg_registry::{InstitutionStatus, Registry};

use crate::{finish, CliContext};

/// Arguments for `ireg institution`.
#[derive(Args, Debug)]
pub struct InstitutionArgs {
    #[command(subcommand)]
    pub command: InstitutionCommand,
}

/// Institution subcommands.
#[derive(Subcommand, Debug)]
pub enum InstitutionCommand {
    /// Submit a registration (UNREGISTERED → PENDING).
    Submit {
        /// Applicant principal.
        #[arg(long)]
        caller: Principal,
        /// Institution name.
        #[arg(long)]
        name: String,
        /// Institution URL.
        #[arg(long)]
        url: String,
        /// Institution public key.
        #[arg(long)]
        public_key: String,
        /// Registration proof, passed to the verifier as raw bytes.
        #[arg(long)]
        proof: String,
    },

    /// Approve a pending registration (PENDING → VERIFIED).
    Approve {
        /// Admin principal.
        #[arg(long)]
        caller: Principal,
        /// Applicant to approve.
        #[arg(long)]
        institution: Principal,
    },

    /// Reject a pending registration (PENDING → UNREGISTERED).
    Reject {
        /// Admin principal.
        #[arg(long)]
        caller: Principal,
        /// Applicant to reject.
        #[arg(long)]
        institution: Principal,
    },

    /// Replace the caller's profile fields. Requires a verified profile.
    Update {
        /// Institution principal.
        #[arg(long)]
        caller: Principal,
        /// New name.
        #[arg(long)]
        name: String,
        /// New URL.
        #[arg(long)]
        url: String,
        /// New public key.
        #[arg(long)]
        public_key: String,
    },

    /// Withdraw an institution's verification (VERIFIED → UNVERIFIED).
    Unverify {
        /// Admin principal.
        #[arg(long)]
        caller: Principal,
        /// Institution to unverify.
        #[arg(long)]
        institution: Principal,
    },

    /// Show an institution's profile or pending registration.
    Show {
        /// Institution principal.
        #[arg(long)]
        institution: Principal,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show an institution's lifecycle status.
    Status {
        /// Institution principal.
        #[arg(long)]
        institution: Principal,
    },

    /// List pending registrations.
    Pending,

    /// List verified institutions.
    List,
}

/// Execute `ireg institution`.
pub fn run_institution(args: &InstitutionArgs, ctx: &CliContext) -> Result<u8> {
    let session = ctx.open_registry()?;
    let registry = &session.registry;

    match &args.command {
        InstitutionCommand::Submit {
            caller,
            name,
            url,
            public_key,
            proof,
        } => {
            let outcome =
                registry.submit_registration(caller, name, url, public_key, proof.as_bytes());
            finish(ctx, &session, outcome)
        }

        InstitutionCommand::Approve {
            caller,
            institution,
        } => finish(ctx, &session, registry.approve_registration(caller, institution)),

        InstitutionCommand::Reject {
            caller,
            institution,
        } => finish(ctx, &session, registry.reject_registration(caller, institution)),

        InstitutionCommand::Update {
            caller,
            name,
            url,
            public_key,
        } => {
            let outcome = registry.update_profile(caller, name, url, public_key);
            finish(ctx, &session, outcome)
        }

        InstitutionCommand::Unverify {
            caller,
            institution,
        } => finish(ctx, &session, registry.unverify_institution(caller, institution)),

        InstitutionCommand::Show { institution, json } => {
            cmd_show(registry, institution, *json)
        }

        InstitutionCommand::Status { institution } => {
            println!("{}", registry.institution_status(institution));
            Ok(0)
        }

        InstitutionCommand::Pending => cmd_pending(registry),

        InstitutionCommand::List => cmd_list(registry),
    }
}

fn cmd_show(registry: &Registry, institution: &Principal, json: bool) -> Result<u8> {
    let status = registry.institution_status(institution);

    if json {
        let body = match status {
            InstitutionStatus::Unregistered => serde_json::json!({
                "institution": institution,
                "status": status,
            }),
            InstitutionStatus::Pending => serde_json::json!({
                "institution": institution,
                "status": status,
                "pending": registry.get_pending_registration(institution),
            }),
            InstitutionStatus::Verified | InstitutionStatus::Unverified => serde_json::json!({
                "institution": institution,
                "status": status,
                "profile": registry.get_institution_profile(institution),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(0);
    }

    println!("Institution: {institution}");
    println!("  Status: {status}");
    if let Some(pending) = registry.get_pending_registration(institution) {
        println!("  Name: {}", pending.name);
        println!("  URL: {}", pending.url);
        println!("  Public key: {}", pending.public_key);
        println!("  Submitted: {}", pending.submitted_at);
    } else if let Some(profile) = registry.get_institution_profile(institution) {
        println!("  Name: {}", profile.name);
        println!("  URL: {}", profile.url);
        println!("  Public key: {}", profile.public_key);
        println!("  Registered: {}", profile.registration_time);
        match profile.verification_time {
            Some(at) => println!("  Verified: {at}"),
            None => println!("  Verified: -"),
        }
    }
    Ok(0)
}

fn cmd_pending(registry: &Registry) -> Result<u8> {
    let pending = registry.pending_registrations();
    if pending.is_empty() {
        println!("No pending registrations.");
        return Ok(0);
    }
    for institution in &pending {
        if let Some(entry) = registry.get_pending_registration(institution) {
            println!("{institution}  {}  submitted {}", entry.name, entry.submitted_at);
        }
    }
    println!("{} pending registration(s)", pending.len());
    Ok(0)
}

fn cmd_list(registry: &Registry) -> Result<u8> {
    let verified = registry.verified_institutions();
    if verified.is_empty() {
        println!("No verified institutions.");
        return Ok(0);
    }
    for institution in &verified {
        if let Some(profile) = registry.get_institution_profile(institution) {
            println!("{institution}  {}  {}", profile.name, profile.url);
        }
    }
    println!("{} verified institution(s)", verified.len());
    Ok(0)
}
