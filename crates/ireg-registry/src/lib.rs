//! # ireg-registry: Permissioned Institution Registry
//!
//! Institutions submit a registration with a proof; admins approve or
//! reject it. Approved institutions get a verified profile they can update
//! and admins can later unverify. An owner manages the admin set and any
//! admin can pause the registry.
//!
//! ## Layers
//!
//! - [`state`]: [`RegistryState`], the single explicit state object, and
//!   the [`OperationContext`] passed to every mutation.
//! - [`access`]: owner, admin set, and pause flag operations.
//! - [`workflow`]: the registration state machine and profile queries.
//! - [`events`]: the hash-chained audit log and event sinks.
//! - [`verifier`]: the pluggable registration proof check.
//! - [`registry`]: [`Registry`], the thread-safe handle that serializes
//!   operations and supplies clock, limits, verifier, and sinks.
//! - [`config`]: YAML genesis configuration.
//!
//! ## Example
//!
//! ```
//! use ireg_core::Principal;
//! use ireg_registry::{InstitutionStatus, Registry};
//!
//! let owner = Principal::new("SP1OWNER").unwrap();
//! let uni = Principal::new("SP1UNIVERSITY").unwrap();
//! let registry = Registry::new(owner.clone()).unwrap();
//!
//! registry
//!     .submit_registration(&uni, "Test University", "https://test.edu", "0x1234", b"proof")
//!     .unwrap();
//! registry.approve_registration(&owner, &uni).unwrap();
//!
//! assert!(registry.is_institution_verified(&uni));
//! assert_eq!(registry.institution_status(&uni), InstitutionStatus::Verified);
//! ```

pub mod access;
pub mod config;
pub mod events;
pub mod registry;
pub mod state;
pub mod verifier;
pub mod workflow;

pub use config::{ConfigError, RegistryConfig, RegistrySettings};
pub use events::{EventChainError, EventLog, EventRecord, EventSink, RegistryEvent, TracingEventSink};
pub use registry::{Registry, RegistryBuilder};
pub use state::{
    InstitutionProfile, InstitutionStatus, KeyedStore, OperationContext, PendingRegistration,
    RegistryState, StateError,
};
pub use verifier::{
    registration_message, Ed25519ProofVerifier, NonEmptyProofVerifier, ProofVerifier,
    VerifierKind, VerifyError,
};
