//! # Error Hierarchy
//!
//! Structured error types for the institution registry, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! [`RegistryError`] is the complete set of reasons an operation can be
//! rejected. Every rejection is synchronous and leaves registry state
//! untouched; callers correct the condition and resubmit.

use thiserror::Error;

use crate::identity::Principal;

/// Reasons a registry operation is rejected.
///
/// Each variant carries enough context for an operator to see which
/// principal or field tripped the check. Use [`RegistryError::kind`] to
/// compare outcomes without matching on that context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller lacks the role the operation requires.
    #[error("principal {caller} is not authorized for this operation")]
    NotAuthorized {
        /// The rejected caller.
        caller: Principal,
    },

    /// The applicant already has a pending registration or a profile.
    #[error("principal {principal} is already registered")]
    AlreadyRegistered {
        /// The applicant.
        principal: Principal,
    },

    /// No pending registration or profile exists for the principal.
    #[error("principal {principal} is not registered")]
    NotRegistered {
        /// The principal that was looked up.
        principal: Principal,
    },

    /// The proof verifier rejected the registration proof.
    #[error("registration proof rejected: {reason}")]
    InvalidProof {
        /// Verifier diagnostic.
        reason: String,
    },

    /// The profile is already verified.
    ///
    /// Part of the published error set; no current operation returns it.
    #[error("principal {principal} is already verified")]
    AlreadyVerified {
        /// The institution.
        principal: Principal,
    },

    /// A mutating operation was attempted while the registry is paused.
    #[error("registry is paused")]
    Paused,

    /// The null principal was supplied as an owner or admin.
    #[error("the null principal cannot hold a role")]
    ZeroAddress,

    /// Institution name is empty or too long.
    #[error("invalid name: length {len} (expected 1..={max})")]
    InvalidName {
        /// Supplied length in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Institution URL is empty or too long.
    #[error("invalid url: length {len} (expected 1..={max})")]
    InvalidUrl {
        /// Supplied length in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Institution public key is empty or too long.
    #[error("invalid public key: length {len} (expected 1..={max})")]
    InvalidPublicKey {
        /// Supplied length in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The operation requires a currently verified profile.
    #[error("principal {principal} is not verified")]
    NotVerified {
        /// The institution.
        principal: Principal,
    },

    /// The candidate is already a member of the admin set.
    #[error("principal {principal} is already an admin")]
    AlreadyAdmin {
        /// The candidate.
        principal: Principal,
    },

    /// The target is not a member of the admin set.
    #[error("principal {principal} is not an admin")]
    NotAdmin {
        /// The target.
        principal: Principal,
    },

    /// The audit record for the operation could not be sealed.
    ///
    /// Local to this implementation; it has no on-chain counterpart.
    #[error("integrity failure: {reason}")]
    Integrity {
        /// Underlying diagnostic.
        reason: String,
    },
}

/// Context-free discriminant of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`RegistryError::NotAuthorized`].
    NotAuthorized,
    /// See [`RegistryError::AlreadyRegistered`].
    AlreadyRegistered,
    /// See [`RegistryError::NotRegistered`].
    NotRegistered,
    /// See [`RegistryError::InvalidProof`].
    InvalidProof,
    /// See [`RegistryError::AlreadyVerified`].
    AlreadyVerified,
    /// See [`RegistryError::Paused`].
    Paused,
    /// See [`RegistryError::ZeroAddress`].
    ZeroAddress,
    /// See [`RegistryError::InvalidName`].
    InvalidName,
    /// See [`RegistryError::InvalidUrl`].
    InvalidUrl,
    /// See [`RegistryError::InvalidPublicKey`].
    InvalidPublicKey,
    /// See [`RegistryError::NotVerified`].
    NotVerified,
    /// See [`RegistryError::AlreadyAdmin`].
    AlreadyAdmin,
    /// See [`RegistryError::NotAdmin`].
    NotAdmin,
    /// See [`RegistryError::Integrity`].
    Integrity,
}

impl ErrorKind {
    /// Stable numeric code. 100 through 112 match the on-chain error
    /// constants.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotAuthorized => 100,
            Self::AlreadyRegistered => 101,
            Self::NotRegistered => 102,
            Self::InvalidProof => 103,
            Self::AlreadyVerified => 104,
            Self::Paused => 105,
            Self::ZeroAddress => 106,
            Self::InvalidName => 107,
            Self::InvalidUrl => 108,
            Self::InvalidPublicKey => 109,
            Self::NotVerified => 110,
            Self::AlreadyAdmin => 111,
            Self::NotAdmin => 112,
            Self::Integrity => 113,
        }
    }

    /// Return the kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAuthorized => "NotAuthorized",
            Self::AlreadyRegistered => "AlreadyRegistered",
            Self::NotRegistered => "NotRegistered",
            Self::InvalidProof => "InvalidProof",
            Self::AlreadyVerified => "AlreadyVerified",
            Self::Paused => "Paused",
            Self::ZeroAddress => "ZeroAddress",
            Self::InvalidName => "InvalidName",
            Self::InvalidUrl => "InvalidUrl",
            Self::InvalidPublicKey => "InvalidPublicKey",
            Self::NotVerified => "NotVerified",
            Self::AlreadyAdmin => "AlreadyAdmin",
            Self::NotAdmin => "NotAdmin",
            Self::Integrity => "Integrity",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RegistryError {
    /// The context-free discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            Self::AlreadyRegistered { .. } => ErrorKind::AlreadyRegistered,
            Self::NotRegistered { .. } => ErrorKind::NotRegistered,
            Self::InvalidProof { .. } => ErrorKind::InvalidProof,
            Self::AlreadyVerified { .. } => ErrorKind::AlreadyVerified,
            Self::Paused => ErrorKind::Paused,
            Self::ZeroAddress => ErrorKind::ZeroAddress,
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::InvalidPublicKey { .. } => ErrorKind::InvalidPublicKey,
            Self::NotVerified { .. } => ErrorKind::NotVerified,
            Self::AlreadyAdmin { .. } => ErrorKind::AlreadyAdmin,
            Self::NotAdmin { .. } => ErrorKind::NotAdmin,
            Self::Integrity { .. } => ErrorKind::Integrity,
        }
    }

    /// Stable numeric code of this error.
    pub fn code(&self) -> u32 {
        self.kind().code()
    }
}

/// Validation errors for domain primitive newtypes.
///
/// These errors carry the invalid input and the expected format so that
/// operators can diagnose misconfiguration without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Principal string is empty, too long, or contains whitespace.
    #[error("invalid principal: \"{0}\" (expected 1-128 non-whitespace characters)")]
    InvalidPrincipal(String),

    /// Timestamp string is not valid UTC ISO 8601.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Hex payload could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}
