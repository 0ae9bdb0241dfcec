#![deny(missing_docs)]

//! # ireg-core: Foundational Types for the Institution Registry
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`Principal`] is validated
//!    at construction; the reserved null principal is a named value, not an
//!    empty string.
//!
//! 2. **One error taxonomy.** [`RegistryError`] is the complete set of
//!    outcomes an operation can be rejected with. Every variant maps to a
//!    stable [`ErrorKind`] and numeric code.
//!
//! 3. **Stateless validation.** [`validation`] holds the field constraint
//!    checks. They take the configured [`FieldLimits`] and never touch state.
//!
//! 4. **Canonical digests.** Audit digests hash [`CanonicalBytes`], the
//!    JCS form of a typed value, never ad hoc string concatenation.
//!
//! 5. **Injected time.** Operations read time through a [`Clock`], so tests
//!    pin timestamps with [`FixedClock`].

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;
pub mod validation;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::{CanonicalBytes, CanonicalizationError};
pub use digest::{sha256_digest, ContentDigest};
pub use error::{ErrorKind, RegistryError, ValidationError};
pub use identity::Principal;
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp};
pub use validation::FieldLimits;
