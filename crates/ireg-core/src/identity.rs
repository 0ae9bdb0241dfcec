//! # Principal Identity
//!
//! A [`Principal`] is the opaque caller handle every registry operation is
//! attributed to. It is validated at construction and serializes as a plain
//! string.
//!
//! ## Null Principal
//!
//! One well-known value, [`Principal::null()`], is reserved. It may never be
//! assigned as owner or admin; role-granting operations reject it with
//! `ZeroAddress`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Reserved null principal (the all-zero standard address).
const NULL_PRINCIPAL: &str = "SP000000000000000000002Q6VF78";

/// Maximum principal length in characters.
const MAX_PRINCIPAL_LEN: usize = 128;

/// An opaque, globally unique caller identity.
///
/// # Validation
///
/// - Must be non-empty
/// - At most 128 characters
/// - No whitespace
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a validated principal.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.is_empty()
            || s.chars().count() > MAX_PRINCIPAL_LEN
            || s.chars().any(char::is_whitespace)
        {
            return Err(ValidationError::InvalidPrincipal(s));
        }
        Ok(Self(s))
    }

    /// The reserved null principal.
    pub fn null() -> Self {
        Self(NULL_PRINCIPAL.to_string())
    }

    /// Whether this is the reserved null principal.
    pub fn is_null(&self) -> bool {
        self.0 == NULL_PRINCIPAL
    }

    /// Access the principal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Principal {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

impl std::str::FromStr for Principal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_principal() {
        let p = Principal::new("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7").unwrap();
        assert_eq!(p.as_str(), "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7");
        assert!(!p.is_null());
    }

    #[test]
    fn contract_style_principal_accepted() {
        assert!(Principal::new("SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7.registry").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(Principal::new("").is_err());
    }

    #[test]
    fn rejects_whitespace() {
        assert!(Principal::new("SP2J6 ZY48").is_err());
        assert!(Principal::new("SP2J6ZY48\n").is_err());
    }

    #[test]
    fn rejects_too_long() {
        assert!(Principal::new("a".repeat(128)).is_ok());
        assert!(Principal::new("a".repeat(129)).is_err());
    }

    #[test]
    fn null_principal_is_recognised() {
        let null = Principal::null();
        assert!(null.is_null());
        assert_eq!(Principal::new(NULL_PRINCIPAL).unwrap(), null);
    }

    #[test]
    fn serde_as_plain_string() {
        let p = Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM\"");
        let back: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn serde_rejects_invalid() {
        let result: Result<Principal, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn from_str_parses() {
        let p: Principal = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".parse().unwrap();
        assert_eq!(p.to_string(), "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
    }
}
