//! # Registry Handle
//!
//! [`Registry`] is the single serialization point for the institution
//! registry. Every operation locks the whole [`RegistryState`], reads the
//! commit time from the injected clock, runs its checks, mutates, appends
//! its audit event, and notifies sinks before the lock is released. Cross
//! table invariants (pending XOR profile) are therefore checked and updated
//! atomically, and all operations observe one global order.
//!
//! The lock is `parking_lot::Mutex`: non-poisoning, never held across
//! `.await`, and no operation blocks while holding it.

use std::sync::Arc;

use ireg_core::{Clock, FieldLimits, Principal, RegistryError, SystemClock};
use parking_lot::{Mutex, RwLock};

use crate::config::{RegistryConfig, RegistrySettings};
use crate::events::{EventRecord, EventSink};
use crate::state::{
    InstitutionProfile, InstitutionStatus, OperationContext, PendingRegistration, RegistryState,
    StateError,
};
use crate::verifier::{NonEmptyProofVerifier, ProofVerifier};

/// Thread-safe institution registry.
pub struct Registry {
    state: Mutex<RegistryState>,
    limits: FieldLimits,
    verifier: Arc<dyn ProofVerifier>,
    clock: Arc<dyn Clock>,
    sinks: RwLock<Vec<Arc<dyn EventSink>>>,
}

// Sinks run with the state lock held, so formatting never blocks on it.
impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Registry");
        match self.state.try_lock() {
            Some(state) => debug
                .field("owner", &state.owner)
                .field("paused", &state.paused)
                .field("version", &state.version),
            None => debug.field("state", &format_args!("<locked>")),
        };
        debug
            .field("limits", &self.limits)
            .field("verifier", &self.verifier)
            .field("sinks", &self.sinks.try_read().map(|sinks| sinks.len()))
            .finish()
    }
}

/// Assembles a [`Registry`] around an initial or restored state.
#[derive(Debug)]
pub struct RegistryBuilder {
    state: RegistryState,
    limits: FieldLimits,
    verifier: Arc<dyn ProofVerifier>,
    clock: Arc<dyn Clock>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl RegistryBuilder {
    /// Start from `state` with default limits, verifier, and clock.
    pub fn new(state: RegistryState) -> Self {
        Self {
            state,
            limits: FieldLimits::default(),
            verifier: Arc::new(NonEmptyProofVerifier),
            clock: Arc::new(SystemClock),
            sinks: Vec::new(),
        }
    }

    /// Start from a configuration file's genesis state and settings.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let state =
            RegistryState::genesis(config.owner.clone(), config.admins.clone(), config.paused)?;
        Ok(Self::new(state).with_config(config))
    }

    /// Apply a configuration's limits and verifier without touching state.
    pub fn with_config(self, config: &RegistryConfig) -> Self {
        self.settings(config.settings())
    }

    /// Apply limits and verifier selection.
    pub fn settings(self, settings: RegistrySettings) -> Self {
        self.limits(settings.limits).verifier(settings.verifier.build())
    }

    /// Set field limits.
    pub fn limits(mut self, limits: FieldLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the proof verifier.
    pub fn verifier(mut self, verifier: Arc<dyn ProofVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Set the clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register an event sink.
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Build the registry, rejecting a state that breaks a registry
    /// invariant (see [`RegistryState::check_invariants`]).
    pub fn build(self) -> Result<Registry, StateError> {
        self.state.check_invariants()?;
        Ok(Registry {
            state: Mutex::new(self.state),
            limits: self.limits,
            verifier: self.verifier,
            clock: self.clock,
            sinks: RwLock::new(self.sinks),
        })
    }
}

impl Registry {
    /// A fresh registry owned by `owner`, with default settings.
    pub fn new(owner: Principal) -> Result<Self, RegistryError> {
        let state = RegistryState::genesis(owner, [], false)?;
        RegistryBuilder::new(state)
            .build()
            .map_err(|e| RegistryError::Integrity {
                reason: e.to_string(),
            })
    }

    /// Builder over an initial or restored state.
    pub fn builder(state: RegistryState) -> RegistryBuilder {
        RegistryBuilder::new(state)
    }

    /// Subscribe a sink to events committed from now on.
    pub fn add_sink(&self, sink: Arc<dyn EventSink>) {
        self.sinks.write().push(sink);
    }

    /// Run one operation under the serialization point.
    fn execute<F>(
        &self,
        operation: &'static str,
        caller: &Principal,
        op: F,
    ) -> Result<EventRecord, RegistryError>
    where
        F: FnOnce(&mut RegistryState, &OperationContext<'_>) -> Result<EventRecord, RegistryError>,
    {
        let mut state = self.state.lock();
        let ctx = OperationContext {
            now: self.clock.now(),
            limits: &self.limits,
            verifier: self.verifier.as_ref(),
        };
        match op(&mut *state, &ctx) {
            Ok(record) => {
                tracing::info!(
                    operation,
                    caller = %caller,
                    sequence = record.sequence,
                    event = record.event.name(),
                    "registry operation committed"
                );
                for sink in self.sinks.read().iter() {
                    sink.on_event(&record);
                }
                Ok(record)
            }
            Err(e) => {
                tracing::debug!(
                    operation,
                    caller = %caller,
                    error = %e,
                    code = e.code(),
                    "registry operation rejected"
                );
                Err(e)
            }
        }
    }

    // ── Access control ───────────────────────────────────────────────

    /// Transfer ownership to `new_owner`.
    pub fn transfer_ownership(
        &self,
        caller: &Principal,
        new_owner: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.execute("transfer_ownership", caller, |s, ctx| {
            s.transfer_ownership(ctx, caller, new_owner)
        })
    }

    /// Add `candidate` to the admin set.
    pub fn add_admin(
        &self,
        caller: &Principal,
        candidate: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.execute("add_admin", caller, |s, ctx| {
            s.add_admin(ctx, caller, candidate)
        })
    }

    /// Remove `target` from the admin set.
    pub fn remove_admin(
        &self,
        caller: &Principal,
        target: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.execute("remove_admin", caller, |s, ctx| {
            s.remove_admin(ctx, caller, target)
        })
    }

    /// Set the pause flag and return its new value.
    pub fn set_paused(&self, caller: &Principal, value: bool) -> Result<bool, RegistryError> {
        self.execute("set_paused", caller, |s, ctx| s.set_paused(ctx, caller, value))
            .map(|_| value)
    }

    // ── Registration workflow ────────────────────────────────────────

    /// Submit a registration for `caller`.
    pub fn submit_registration(
        &self,
        caller: &Principal,
        name: &str,
        url: &str,
        public_key: &str,
        proof: &[u8],
    ) -> Result<EventRecord, RegistryError> {
        self.execute("submit_registration", caller, |s, ctx| {
            s.submit_registration(ctx, caller, name, url, public_key, proof)
        })
    }

    /// Approve `institution`'s pending registration.
    pub fn approve_registration(
        &self,
        caller: &Principal,
        institution: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.execute("approve_registration", caller, |s, ctx| {
            s.approve_registration(ctx, caller, institution)
        })
    }

    /// Reject `institution`'s pending registration.
    pub fn reject_registration(
        &self,
        caller: &Principal,
        institution: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.execute("reject_registration", caller, |s, ctx| {
            s.reject_registration(ctx, caller, institution)
        })
    }

    /// Replace the caller's profile fields.
    pub fn update_profile(
        &self,
        caller: &Principal,
        name: &str,
        url: &str,
        public_key: &str,
    ) -> Result<EventRecord, RegistryError> {
        self.execute("update_profile", caller, |s, ctx| {
            s.update_profile(ctx, caller, name, url, public_key)
        })
    }

    /// Withdraw `institution`'s verification.
    pub fn unverify_institution(
        &self,
        caller: &Principal,
        institution: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.execute("unverify_institution", caller, |s, ctx| {
            s.unverify_institution(ctx, caller, institution)
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The profile for `institution`, if one exists.
    pub fn get_institution_profile(&self, institution: &Principal) -> Option<InstitutionProfile> {
        self.state.lock().institution_profile(institution).cloned()
    }

    /// Whether `institution` is verified. False when unknown.
    pub fn is_institution_verified(&self, institution: &Principal) -> bool {
        self.state.lock().is_institution_verified(institution)
    }

    /// The pending registration for `institution`, if one exists.
    pub fn get_pending_registration(
        &self,
        institution: &Principal,
    ) -> Option<PendingRegistration> {
        self.state.lock().pending_registration(institution).cloned()
    }

    /// Lifecycle position of `institution`.
    pub fn institution_status(&self, institution: &Principal) -> InstitutionStatus {
        self.state.lock().institution_status(institution)
    }

    /// The current owner.
    pub fn get_owner(&self) -> Principal {
        self.state.lock().owner().clone()
    }

    /// Whether the registry is paused.
    pub fn get_paused(&self) -> bool {
        self.state.lock().paused()
    }

    /// Whether `user` is an explicit admin set member.
    pub fn get_is_admin(&self, user: &Principal) -> bool {
        self.state.lock().is_admin(user)
    }

    /// Admin set members in principal order.
    pub fn admins(&self) -> Vec<Principal> {
        self.state.lock().admins().cloned().collect()
    }

    /// Verified institutions in principal order.
    pub fn verified_institutions(&self) -> Vec<Principal> {
        self.state
            .lock()
            .verified_institutions()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Principals with a pending registration, in principal order.
    pub fn pending_registrations(&self) -> Vec<Principal> {
        self.state
            .lock()
            .pending()
            .iter()
            .map(|(principal, _)| principal.clone())
            .collect()
    }

    /// Number of committed mutations.
    pub fn version(&self) -> u64 {
        self.state.lock().version()
    }

    /// Copy of the full audit log.
    pub fn events(&self) -> Vec<EventRecord> {
        self.state.lock().events().entries().to_vec()
    }

    /// Copy of the complete state, for persistence.
    pub fn snapshot(&self) -> RegistryState {
        self.state.lock().clone()
    }
}
