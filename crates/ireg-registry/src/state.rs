//! # Registry State
//!
//! The single, explicit state object every operation runs against: owner,
//! admin set, pause flag, pending registrations, institution profiles, and
//! the audit log. It is serializable so a registry can be snapshotted and
//! restored.
//!
//! ## Invariants
//!
//! - `owner` is never the null principal.
//! - The null principal is never a member of `admins`.
//! - A principal never has both a pending registration and a profile.
//! - `version` equals the number of committed mutations, which is also the
//!   sequence number of the last audit event.

use std::collections::{BTreeMap, BTreeSet};

use ireg_core::{FieldLimits, Principal, RegistryError, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{EventChainError, EventLog, EventRecord, RegistryEvent};
use crate::verifier::ProofVerifier;

// ─── Keyed Store ─────────────────────────────────────────────────────

/// A keyed store with explicit optional lookups.
///
/// "Already exists" and "not found" checks are option matches against this
/// store; it has no invariants of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedStore<V> {
    entries: BTreeMap<Principal, V>,
}

impl<V> KeyedStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Retrieve a record.
    pub fn get(&self, key: &Principal) -> Option<&V> {
        self.entries.get(key)
    }

    /// Retrieve a record for in-place mutation.
    pub fn get_mut(&mut self, key: &Principal) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&mut self, key: Principal, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Remove a record.
    pub fn remove(&mut self, key: &Principal) -> Option<V> {
        self.entries.remove(key)
    }

    /// Check if a record exists.
    pub fn contains(&self, key: &Principal) -> bool {
        self.entries.contains_key(key)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate records in principal order.
    pub fn iter(&self) -> impl Iterator<Item = (&Principal, &V)> {
        self.entries.iter()
    }
}

impl<V> Default for KeyedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Records ─────────────────────────────────────────────────────────

/// A registration awaiting an admin decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    /// Proposed institution name.
    pub name: String,
    /// Proposed institution URL.
    pub url: String,
    /// Proposed institution public key.
    pub public_key: String,
    /// Opaque registration proof, checked by the proof verifier at approval.
    #[serde(with = "hex_bytes")]
    pub proof: Vec<u8>,
    /// When the registration was submitted.
    pub submitted_at: Timestamp,
}

/// An approved institution's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionProfile {
    /// Institution name.
    pub name: String,
    /// Institution URL.
    pub url: String,
    /// Institution public key.
    pub public_key: String,
    /// Whether the institution is currently verified.
    pub verified: bool,
    /// When the registration was approved.
    pub registration_time: Timestamp,
    /// When the institution was last verified; cleared on unverify.
    pub verification_time: Option<Timestamp>,
}

/// Where a principal sits in the registration lifecycle.
///
/// ```text
/// Unregistered ──submit──▶ Pending ──approve──▶ Verified ──unverify──▶ Unverified
///       ▲                     │
///       └──────reject─────────┘
/// ```
///
/// There is no transition out of `Verified` or `Unverified` back to
/// `Pending` or `Unregistered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstitutionStatus {
    /// No pending registration and no profile.
    Unregistered,
    /// Registration submitted, awaiting approval.
    Pending,
    /// Profile exists and is verified.
    Verified,
    /// Profile exists but verification was withdrawn.
    Unverified,
}

impl InstitutionStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unregistered => "UNREGISTERED",
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Unverified => "UNVERIFIED",
        }
    }
}

impl std::fmt::Display for InstitutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Operation Context ───────────────────────────────────────────────

/// Collaborators and commit time injected into every state operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationContext<'a> {
    /// Commit timestamp for the operation.
    pub now: Timestamp,
    /// Field constraints for profile data.
    pub limits: &'a FieldLimits,
    /// Registration proof verifier.
    pub verifier: &'a dyn ProofVerifier,
}

// ─── Registry State ──────────────────────────────────────────────────

/// A restored state that violates a registry invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The owner or an admin set member is the null principal.
    #[error("the null principal holds a role")]
    NullRole,

    /// A principal has both a pending registration and a profile.
    #[error("principal {principal} has both a pending registration and a profile")]
    PendingAndProfile {
        /// The offending principal.
        principal: Principal,
    },

    /// The version counter disagrees with the audit log length.
    #[error("state version {version} does not match {events} audit events")]
    VersionMismatch {
        /// Recorded version.
        version: u64,
        /// Audit log length.
        events: usize,
    },

    /// The audit log digest chain is broken.
    #[error("audit log: {0}")]
    Chain(#[from] EventChainError),
}

/// The complete, versioned registry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    pub(crate) version: u64,
    pub(crate) owner: Principal,
    pub(crate) admins: BTreeSet<Principal>,
    pub(crate) paused: bool,
    pub(crate) pending: KeyedStore<PendingRegistration>,
    pub(crate) profiles: KeyedStore<InstitutionProfile>,
    pub(crate) events: EventLog,
}

impl RegistryState {
    /// Create the initial state for `owner`.
    ///
    /// The owner is also inserted into the admin set, along with any extra
    /// `admins`. No audit events are recorded for the initial state.
    pub fn genesis(
        owner: Principal,
        admins: impl IntoIterator<Item = Principal>,
        paused: bool,
    ) -> Result<Self, RegistryError> {
        if owner.is_null() {
            return Err(RegistryError::ZeroAddress);
        }
        let mut admin_set = BTreeSet::new();
        admin_set.insert(owner.clone());
        for admin in admins {
            if admin.is_null() {
                return Err(RegistryError::ZeroAddress);
            }
            admin_set.insert(admin);
        }
        Ok(Self {
            version: 0,
            owner,
            admins: admin_set,
            paused,
            pending: KeyedStore::new(),
            profiles: KeyedStore::new(),
            events: EventLog::new(),
        })
    }

    /// Reject states that break a registry invariant, such as a
    /// hand-edited snapshot.
    pub fn check_invariants(&self) -> Result<(), StateError> {
        if self.owner.is_null() || self.admins.iter().any(Principal::is_null) {
            return Err(StateError::NullRole);
        }
        if let Some((principal, _)) = self
            .pending
            .iter()
            .find(|(principal, _)| self.profiles.contains(principal))
        {
            return Err(StateError::PendingAndProfile {
                principal: principal.clone(),
            });
        }
        if self.version != self.events.len() as u64 {
            return Err(StateError::VersionMismatch {
                version: self.version,
                events: self.events.len(),
            });
        }
        self.events.verify_chain()?;
        Ok(())
    }

    /// Number of committed mutations.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the registry is paused.
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// The audit log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Pending registrations.
    pub fn pending(&self) -> &KeyedStore<PendingRegistration> {
        &self.pending
    }

    /// Institution profiles.
    pub fn profiles(&self) -> &KeyedStore<InstitutionProfile> {
        &self.profiles
    }

    /// Seal the audit record for an operation that has passed its checks.
    ///
    /// Called before any mutation, so a sealing failure leaves the state
    /// untouched.
    pub(crate) fn seal(
        &self,
        actor: &Principal,
        event: RegistryEvent,
        at: Timestamp,
    ) -> Result<EventRecord, RegistryError> {
        self.events
            .seal(actor.clone(), event, at)
            .map_err(|e| RegistryError::Integrity {
                reason: e.to_string(),
            })
    }

    /// Record a committed mutation: bump the version and append its record.
    pub(crate) fn commit(&mut self, record: EventRecord) -> EventRecord {
        self.version += 1;
        self.events.push(record.clone());
        record
    }
}

/// Serde adapter that renders byte payloads as lowercase hex.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        serializer.serialize_str(&hex)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let hex = String::deserialize(deserializer)?;
        ireg_core::digest::hex_to_bytes(&hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    #[test]
    fn genesis_makes_owner_an_admin() {
        let state = RegistryState::genesis(p("SP1OWNER"), [p("SP1ADMIN")], false).unwrap();
        assert_eq!(state.owner, p("SP1OWNER"));
        assert!(state.admins.contains(&p("SP1OWNER")));
        assert!(state.admins.contains(&p("SP1ADMIN")));
        assert_eq!(state.version(), 0);
        assert!(state.events().is_empty());
        assert!(!state.paused());
    }

    #[test]
    fn genesis_rejects_null_owner() {
        let err = RegistryState::genesis(Principal::null(), [], false).unwrap_err();
        assert_eq!(err, RegistryError::ZeroAddress);
    }

    #[test]
    fn genesis_rejects_null_admin() {
        let err = RegistryState::genesis(p("SP1OWNER"), [Principal::null()], false).unwrap_err();
        assert_eq!(err, RegistryError::ZeroAddress);
    }

    #[test]
    fn genesis_can_start_paused() {
        let state = RegistryState::genesis(p("SP1OWNER"), [], true).unwrap();
        assert!(state.paused());
    }

    fn at(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn with_history() -> RegistryState {
        let mut state = RegistryState::genesis(p("SP1OWNER"), [], false).unwrap();
        for (admin, when) in [("SP1A", "2026-02-01T00:00:00Z"), ("SP1B", "2026-02-01T00:01:00Z")] {
            let record = state
                .seal(&p("SP1OWNER"), RegistryEvent::AdminAdded { admin: p(admin) }, at(when))
                .unwrap();
            state.admins.insert(p(admin));
            state.commit(record);
        }
        state
    }

    fn pending_entry() -> PendingRegistration {
        PendingRegistration {
            name: "Uni".to_string(),
            url: "https://uni.edu".to_string(),
            public_key: "0x01".to_string(),
            proof: b"proof".to_vec(),
            submitted_at: at("2026-02-01T00:00:00Z"),
        }
    }

    #[test]
    fn consistent_history_passes() {
        let state = with_history();
        assert_eq!(state.version(), 2);
        assert_eq!(state.check_invariants(), Ok(()));
    }

    #[test]
    fn null_owner_or_admin_is_refused() {
        let mut state = with_history();
        state.owner = Principal::null();
        assert_eq!(state.check_invariants(), Err(StateError::NullRole));

        let mut state = with_history();
        state.admins.insert(Principal::null());
        assert_eq!(state.check_invariants(), Err(StateError::NullRole));
    }

    #[test]
    fn pending_and_profile_together_is_refused() {
        let mut state = with_history();
        state.pending.insert(p("SP1UNI"), pending_entry());
        state.profiles.insert(
            p("SP1UNI"),
            InstitutionProfile {
                name: "Uni".to_string(),
                url: "https://uni.edu".to_string(),
                public_key: "0x01".to_string(),
                verified: true,
                registration_time: at("2026-02-01T00:00:00Z"),
                verification_time: Some(at("2026-02-01T00:00:00Z")),
            },
        );
        assert_eq!(
            state.check_invariants(),
            Err(StateError::PendingAndProfile {
                principal: p("SP1UNI")
            })
        );
    }

    #[test]
    fn version_must_match_event_count() {
        let mut state = with_history();
        state.version = 5;
        assert_eq!(
            state.check_invariants(),
            Err(StateError::VersionMismatch {
                version: 5,
                events: 2
            })
        );
    }

    #[test]
    fn broken_chain_is_refused() {
        let state = with_history();
        let mut json = serde_json::to_value(&state).unwrap();
        json["events"][0]["admin"] = serde_json::Value::String("SP1MALLORY".to_string());
        let tampered: RegistryState = serde_json::from_value(json).unwrap();
        assert_eq!(
            tampered.check_invariants(),
            Err(StateError::Chain(EventChainError::DigestMismatch { sequence: 1 }))
        );
    }

    #[test]
    fn seal_leaves_state_untouched() {
        let state = with_history();
        let before = state.clone();
        let record = state
            .seal(&p("SP1OWNER"), RegistryEvent::PauseSet { paused: true }, at("2026-02-02T00:00:00Z"))
            .unwrap();
        assert_eq!(record.sequence, 3);
        assert_eq!(state, before);
    }

    #[test]
    fn keyed_store_optional_lookups() {
        let mut store: KeyedStore<u32> = KeyedStore::new();
        assert!(store.get(&p("SP1A")).is_none());
        assert!(store.insert(p("SP1A"), 1).is_none());
        assert_eq!(store.insert(p("SP1A"), 2), Some(1));
        assert_eq!(store.get(&p("SP1A")), Some(&2));
        assert!(store.contains(&p("SP1A")));
        assert_eq!(store.remove(&p("SP1A")), Some(2));
        assert!(store.remove(&p("SP1A")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn keyed_store_iterates_in_principal_order() {
        let mut store: KeyedStore<u32> = KeyedStore::new();
        store.insert(p("SP3"), 3);
        store.insert(p("SP1"), 1);
        store.insert(p("SP2"), 2);
        let values: Vec<u32> = store.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn status_display() {
        assert_eq!(InstitutionStatus::Unregistered.to_string(), "UNREGISTERED");
        assert_eq!(InstitutionStatus::Pending.to_string(), "PENDING");
        assert_eq!(InstitutionStatus::Verified.to_string(), "VERIFIED");
        assert_eq!(InstitutionStatus::Unverified.to_string(), "UNVERIFIED");
    }

    #[test]
    fn pending_proof_serializes_as_hex() {
        let pending = PendingRegistration {
            name: "Test University".to_string(),
            url: "https://test.edu".to_string(),
            public_key: "0x1234".to_string(),
            proof: b"ok".to_vec(),
            submitted_at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
        };
        let json = serde_json::to_value(&pending).unwrap();
        assert_eq!(json["proof"], "6f6b");
        let back: PendingRegistration = serde_json::from_value(json).unwrap();
        assert_eq!(back, pending);
    }

    #[test]
    fn state_snapshot_roundtrip() {
        let state = RegistryState::genesis(p("SP1OWNER"), [p("SP1ADMIN")], true).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: RegistryState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
