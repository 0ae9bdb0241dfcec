//! # Events Subcommand
//!
//! Read-only access to the snapshot's audit log.
//!
//! - `list`: Print events, optionally filtered to one institution and
//!   limited to the most recent N.
//! - `verify`: Recompute the digest chain and check it against the
//!   snapshot version.

use anyhow::Result;
use clap::{Args, Subcommand};
use ireg_core::Principal;
use ireg_registry::{EventRecord, RegistryState};

use crate::{load_state, CliContext};

/// Arguments for `ireg events`.
#[derive(Args, Debug)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

/// Events subcommands.
#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// List audit events in commit order.
    List {
        /// Only events about this principal.
        #[arg(long)]
        institution: Option<Principal>,
        /// Only the most recent N matching events.
        #[arg(long)]
        last: Option<usize>,
        /// Print JSON lines instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Verify the audit log digest chain.
    Verify,
}

/// Execute `ireg events`.
pub fn run_events(args: &EventsArgs, ctx: &CliContext) -> Result<u8> {
    let state = load_state(&ctx.state_path)?;

    match &args.command {
        EventsCommand::List {
            institution,
            last,
            json,
        } => {
            let records = select(&state, institution.as_ref(), *last);
            for record in &records {
                if *json {
                    println!("{}", serde_json::to_string(record)?);
                } else {
                    println!(
                        "[{}] {} {} by {}",
                        record.sequence, record.recorded_at, record.event, record.actor
                    );
                }
            }
            if !*json {
                println!("{} event(s)", records.len());
            }
            Ok(0)
        }
        EventsCommand::Verify => cmd_verify(&state),
    }
}

fn select<'a>(
    state: &'a RegistryState,
    institution: Option<&Principal>,
    last: Option<usize>,
) -> Vec<&'a EventRecord> {
    let mut records: Vec<&EventRecord> = match institution {
        Some(principal) => state.events().for_principal(principal),
        None => state.events().entries().iter().collect(),
    };
    if let Some(n) = last {
        let skip = records.len().saturating_sub(n);
        records.drain(..skip);
    }
    records
}

fn cmd_verify(state: &RegistryState) -> Result<u8> {
    let log = state.events();
    if let Err(e) = log.verify_chain() {
        eprintln!("FAILED: {e}");
        return Ok(1);
    }
    if log.len() as u64 != state.version() {
        eprintln!(
            "FAILED: snapshot version {} does not match {} recorded events",
            state.version(),
            log.len()
        );
        return Ok(1);
    }
    println!("OK: {} event(s), head {}", log.len(), log.head_digest());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::institution::{run_institution, InstitutionArgs, InstitutionCommand};
    use crate::testing::{initialized, p, OWNER};

    fn populate(ctx: &CliContext) {
        for who in ["SP1A", "SP1B"] {
            let submit = InstitutionArgs {
                command: InstitutionCommand::Submit {
                    caller: p(who),
                    name: "Uni".to_string(),
                    url: "https://uni.edu".to_string(),
                    public_key: "0x01".to_string(),
                    proof: "signed".to_string(),
                },
            };
            run_institution(&submit, ctx).unwrap();
        }
        let approve = InstitutionArgs {
            command: InstitutionCommand::Approve {
                caller: p(OWNER),
                institution: p("SP1A"),
            },
        };
        run_institution(&approve, ctx).unwrap();
    }

    #[test]
    fn select_filters_and_limits() {
        let (_dir, ctx) = initialized();
        populate(&ctx);
        let state = load_state(&ctx.state_path).unwrap();

        assert_eq!(select(&state, None, None).len(), 3);
        let a: Vec<u64> = select(&state, Some(&p("SP1A")), None)
            .iter()
            .map(|r| r.sequence)
            .collect();
        assert_eq!(a, vec![1, 3]);
        let last: Vec<u64> = select(&state, None, Some(2)).iter().map(|r| r.sequence).collect();
        assert_eq!(last, vec![2, 3]);
        assert_eq!(select(&state, None, Some(10)).len(), 3);
        assert!(select(&state, None, Some(0)).is_empty());
    }

    #[test]
    fn verify_accepts_intact_log() {
        let (_dir, ctx) = initialized();
        populate(&ctx);
        let args = EventsArgs {
            command: EventsCommand::Verify,
        };
        assert_eq!(run_events(&args, &ctx).unwrap(), 0);
    }

    #[test]
    fn verify_detects_tampering() {
        let (_dir, ctx) = initialized();
        populate(&ctx);

        let mut json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&ctx.state_path).unwrap()).unwrap();
        json["state"]["events"][1]["actor"] = serde_json::Value::String("SP1MALLORY".to_string());
        std::fs::write(&ctx.state_path, json.to_string()).unwrap();

        let args = EventsArgs {
            command: EventsCommand::Verify,
        };
        assert_eq!(run_events(&args, &ctx).unwrap(), 1);
    }

    #[test]
    fn list_runs() {
        let (_dir, ctx) = initialized();
        populate(&ctx);
        let args = EventsArgs {
            command: EventsCommand::List {
                institution: Some(p("SP1B")),
                last: Some(1),
                json: true,
            },
        };
        assert_eq!(run_events(&args, &ctx).unwrap(), 0);
    }
}
