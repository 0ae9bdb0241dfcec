//! # Audit Event Log
//!
//! Every committed mutation appends exactly one [`EventRecord`] naming the
//! operation and the affected principal (or the new pause value). Records
//! are never trimmed, reordered, or edited.
//!
//! ## Tamper Evidence
//!
//! Each record carries a SHA-256 digest over the JCS canonical form of its
//! own fields and the previous record's digest. [`EventLog::verify_chain`] recomputes the chain from the
//! genesis digest, so an edited or dropped record is detectable in a
//! restored snapshot.
//!
//! ## Subscribers
//!
//! External consumers implement [`EventSink`]. The registry calls every
//! registered sink after each commit, in commit order. The core never
//! depends on a sink being present.

use ireg_core::{
    sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, Principal, Timestamp,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Events ──────────────────────────────────────────────────────────

/// A committed registry mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RegistryEvent {
    /// Ownership moved to `new_owner`.
    OwnershipTransferred {
        /// Owner before the transfer.
        previous_owner: Principal,
        /// Owner after the transfer.
        new_owner: Principal,
    },
    /// `admin` joined the admin set.
    AdminAdded {
        /// The new admin.
        admin: Principal,
    },
    /// `admin` left the admin set.
    AdminRemoved {
        /// The removed admin.
        admin: Principal,
    },
    /// The pause flag was set.
    PauseSet {
        /// The new flag value.
        paused: bool,
    },
    /// A registration entered the pending set.
    RegistrationSubmitted {
        /// The applicant.
        institution: Principal,
    },
    /// A pending registration became a verified profile.
    RegistrationApproved {
        /// The institution.
        institution: Principal,
    },
    /// A pending registration was discarded.
    RegistrationRejected {
        /// The applicant.
        institution: Principal,
    },
    /// A verified institution replaced its profile fields.
    ProfileUpdated {
        /// The institution.
        institution: Principal,
    },
    /// An institution's verification was withdrawn.
    InstitutionUnverified {
        /// The institution.
        institution: Principal,
    },
}

impl RegistryEvent {
    /// The event name as published on the audit stream.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OwnershipTransferred { .. } => "ownership-transferred",
            Self::AdminAdded { .. } => "admin-added",
            Self::AdminRemoved { .. } => "admin-removed",
            Self::PauseSet { .. } => "pause-set",
            Self::RegistrationSubmitted { .. } => "registration-submitted",
            Self::RegistrationApproved { .. } => "registration-approved",
            Self::RegistrationRejected { .. } => "registration-rejected",
            Self::ProfileUpdated { .. } => "profile-updated",
            Self::InstitutionUnverified { .. } => "institution-unverified",
        }
    }

    /// The principal the event is about, if any.
    pub fn subject(&self) -> Option<&Principal> {
        match self {
            Self::OwnershipTransferred { new_owner, .. } => Some(new_owner),
            Self::AdminAdded { admin } | Self::AdminRemoved { admin } => Some(admin),
            Self::PauseSet { .. } => None,
            Self::RegistrationSubmitted { institution }
            | Self::RegistrationApproved { institution }
            | Self::RegistrationRejected { institution }
            | Self::ProfileUpdated { institution }
            | Self::InstitutionUnverified { institution } => Some(institution),
        }
    }
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PauseSet { paused } => write!(f, "{} paused={paused}", self.name()),
            other => match other.subject() {
                Some(subject) => write!(f, "{} {subject}", other.name()),
                None => f.write_str(other.name()),
            },
        }
    }
}

// ─── Records ─────────────────────────────────────────────────────────

/// An event as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 1.
    pub sequence: u64,
    /// The caller whose operation produced the event.
    pub actor: Principal,
    /// Commit time of the operation.
    pub recorded_at: Timestamp,
    /// The event payload.
    #[serde(flatten)]
    pub event: RegistryEvent,
    /// Digest of the preceding record (genesis digest for the first).
    pub previous_digest: ContentDigest,
    /// Digest over this record and `previous_digest`.
    pub digest: ContentDigest,
}

/// The fields covered by a record digest.
#[derive(Serialize)]
struct SealedFields<'a> {
    sequence: u64,
    actor: &'a Principal,
    recorded_at: &'a Timestamp,
    event: &'a RegistryEvent,
    previous_digest: &'a ContentDigest,
}

impl EventRecord {
    fn compute_digest(
        sequence: u64,
        actor: &Principal,
        recorded_at: &Timestamp,
        event: &RegistryEvent,
        previous_digest: &ContentDigest,
    ) -> Result<ContentDigest, CanonicalizationError> {
        let canonical = CanonicalBytes::new(&SealedFields {
            sequence,
            actor,
            recorded_at,
            event,
            previous_digest,
        })?;
        Ok(sha256_digest(canonical.as_bytes()))
    }

    /// Whether `digest` matches the record's contents.
    pub fn is_sealed(&self) -> bool {
        Self::compute_digest(
            self.sequence,
            &self.actor,
            &self.recorded_at,
            &self.event,
            &self.previous_digest,
        )
        .is_ok_and(|digest| digest == self.digest)
    }
}

/// A break detected while re-verifying the digest chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventChainError {
    /// Sequence numbers are not contiguous.
    #[error("event sequence gap: expected {expected}, found {found}")]
    SequenceGap {
        /// Sequence number that should have appeared.
        expected: u64,
        /// Sequence number that did appear.
        found: u64,
    },
    /// A record does not link to its predecessor.
    #[error("event {sequence} does not link to its predecessor")]
    BrokenLink {
        /// The offending record.
        sequence: u64,
    },
    /// A record's digest does not match its contents.
    #[error("event {sequence} digest mismatch")]
    DigestMismatch {
        /// The offending record.
        sequence: u64,
    },
}

// ─── Log ─────────────────────────────────────────────────────────────

/// Append-only audit log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seal the record that would follow the current head, without
    /// appending it.
    pub(crate) fn seal(
        &self,
        actor: Principal,
        event: RegistryEvent,
        recorded_at: Timestamp,
    ) -> Result<EventRecord, CanonicalizationError> {
        let sequence = self.records.len() as u64 + 1;
        let previous_digest = self.head_digest();
        let digest =
            EventRecord::compute_digest(sequence, &actor, &recorded_at, &event, &previous_digest)?;
        Ok(EventRecord {
            sequence,
            actor,
            recorded_at,
            event,
            previous_digest,
            digest,
        })
    }

    /// Append a record produced by [`EventLog::seal`] on this log.
    pub(crate) fn push(&mut self, record: EventRecord) {
        debug_assert_eq!(record.sequence, self.records.len() as u64 + 1);
        debug_assert_eq!(record.previous_digest, self.head_digest());
        self.records.push(record);
    }

    /// Seal and append an event.
    #[cfg(test)]
    pub(crate) fn append(
        &mut self,
        actor: Principal,
        event: RegistryEvent,
        recorded_at: Timestamp,
    ) -> Result<&EventRecord, CanonicalizationError> {
        let record = self.seal(actor, event, recorded_at)?;
        self.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// All records, oldest first.
    pub fn entries(&self) -> &[EventRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Digest of the most recent record, or the genesis digest.
    pub fn head_digest(&self) -> ContentDigest {
        self.records
            .last()
            .map(|r| r.digest)
            .unwrap_or_else(ContentDigest::genesis)
    }

    /// Records whose subject is `principal`.
    pub fn for_principal(&self, principal: &Principal) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| r.event.subject() == Some(principal))
            .collect()
    }

    /// Records with the given event name.
    pub fn by_name(&self, name: &str) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| r.event.name() == name)
            .collect()
    }

    /// The last `n` records (or all of them if fewer exist).
    pub fn last_n(&self, n: usize) -> &[EventRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// Recompute the digest chain from genesis.
    pub fn verify_chain(&self) -> Result<(), EventChainError> {
        let mut previous = ContentDigest::genesis();
        for (i, record) in self.records.iter().enumerate() {
            let expected = i as u64 + 1;
            if record.sequence != expected {
                return Err(EventChainError::SequenceGap {
                    expected,
                    found: record.sequence,
                });
            }
            if record.previous_digest != previous {
                return Err(EventChainError::BrokenLink {
                    sequence: record.sequence,
                });
            }
            if !record.is_sealed() {
                return Err(EventChainError::DigestMismatch {
                    sequence: record.sequence,
                });
            }
            previous = record.digest;
        }
        Ok(())
    }
}

// ─── Sinks ───────────────────────────────────────────────────────────

/// Receiver of committed audit events.
///
/// Sinks run while the registry's serialization point is held. They must
/// not call back into the registry.
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Called once per committed event, in commit order.
    fn on_event(&self, record: &EventRecord);
}

/// Sink that emits each event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn on_event(&self, record: &EventRecord) {
        tracing::info!(
            sequence = record.sequence,
            event = record.event.name(),
            actor = %record.actor,
            subject = record.event.subject().map(|p| p.as_str()).unwrap_or("-"),
            recorded_at = %record.recorded_at,
            digest = %record.digest,
            "registry event"
        );
    }
}
