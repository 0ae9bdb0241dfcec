//! # ireg-cli: Operator CLI for the Institution Registry
//!
//! Drives a registry persisted as a JSON snapshot on disk. Each invocation
//! loads the snapshot, runs one operation through a [`Registry`], and
//! rewrites the snapshot only if the operation committed.
//!
//! The snapshot stores the field limits and proof verifier chosen at
//! `ireg init` next to the state. Later invocations always run with the
//! stored settings; a `--config` whose settings differ is refused.
//!
//! ## Subcommands
//!
//! - `ireg init`: Create a fresh snapshot.
//! - `ireg institution`: Registration workflow and profile queries.
//! - `ireg admin`: Ownership, admin set, and pause flag.
//! - `ireg events`: Audit log listing and chain verification.
//!
//! ```bash
//! ireg init --owner SP1OWNER
//! ireg institution submit --caller SP1UNI --name "Test University" \
//!     --url https://test.edu --public-key 0x1234 --proof signed
//! ireg institution approve --caller SP1OWNER --institution SP1UNI
//! ireg events verify
//! ```
//!
//! Rejected operations print `REJECTED: <reason>` and exit with status 1.

pub mod admin;
pub mod events;
pub mod init;
pub mod institution;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ireg_core::RegistryError;
use ireg_registry::{Registry, RegistryConfig, RegistrySettings, RegistryState, TracingEventSink};
use serde::{Deserialize, Serialize};

/// Default snapshot location, relative to the working directory.
pub const DEFAULT_STATE_PATH: &str = ".ireg/registry.json";

/// The on-disk snapshot: settings fixed at init, and the registry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    /// Limits and verifier the registry runs with.
    pub settings: RegistrySettings,
    /// Registry state.
    pub state: RegistryState,
}

/// A registry opened from a snapshot, with the settings to persist it under.
#[derive(Debug)]
pub struct Session {
    /// The live registry.
    pub registry: Registry,
    /// Settings read from the snapshot.
    pub settings: RegistrySettings,
}

/// Global options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Registry snapshot file.
    pub state_path: PathBuf,
    /// Optional registry configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliContext {
    /// Load the configuration file, if one was given.
    pub fn load_config(&self) -> Result<Option<RegistryConfig>> {
        self.config_path
            .as_deref()
            .map(|path| {
                RegistryConfig::load(path)
                    .with_context(|| format!("invalid registry config {}", path.display()))
            })
            .transpose()
    }

    /// Open the registry stored at the snapshot path.
    ///
    /// The registry runs with the snapshot's stored settings. A
    /// configuration file, when given, must carry the same limits and
    /// verifier; its genesis fields are ignored.
    pub fn open_registry(&self) -> Result<Session> {
        let snapshot = load_snapshot(&self.state_path)?;
        if let Some(config) = self.load_config()? {
            if config.settings() != snapshot.settings {
                bail!(
                    "config settings {:?} differ from the settings stored in {} ({:?})",
                    config.settings(),
                    self.state_path.display(),
                    snapshot.settings
                );
            }
        }
        let registry = Registry::builder(snapshot.state)
            .settings(snapshot.settings)
            .sink(Arc::new(TracingEventSink))
            .build()
            .with_context(|| format!("snapshot {} is inconsistent", self.state_path.display()))?;
        Ok(Session {
            registry,
            settings: snapshot.settings,
        })
    }
}

/// Read a registry snapshot.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "failed to read registry snapshot {} (run `ireg init` first)",
            path.display()
        )
    })?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid registry snapshot", path.display()))
}

/// Read only the registry state from a snapshot.
pub fn load_state(path: &Path) -> Result<RegistryState> {
    Ok(load_snapshot(path)?.state)
}

/// Write a registry snapshot, replacing the previous file atomically.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        version = snapshot.state.version(),
        "saved registry snapshot"
    );
    Ok(())
}

/// Persist a committed operation, or report a rejected one.
///
/// Returns the process exit code: 0 when the operation committed, 1 when
/// the registry rejected it. The snapshot is untouched on rejection.
pub fn finish<T>(
    ctx: &CliContext,
    session: &Session,
    outcome: Result<T, RegistryError>,
) -> Result<u8> {
    match outcome {
        Ok(_) => {
            let snapshot = Snapshot {
                settings: session.settings,
                state: session.registry.snapshot(),
            };
            save_snapshot(&ctx.state_path, &snapshot)?;
            if let Some(record) = snapshot.state.events().last() {
                println!("OK: [{}] {}", record.sequence, record.event);
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("REJECTED: {e}");
            Ok(1)
        }
    }
}
