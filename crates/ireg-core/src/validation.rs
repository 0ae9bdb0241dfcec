//! # Field Validation
//!
//! Stateless constraint checks for institution fields. Every check has the
//! form `0 < length <= max`, with lengths counted in characters.
//!
//! [`validate_fields`] applies the checks in the fixed order name, url,
//! public key and returns the first failure.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Default maximum institution name length.
pub const DEFAULT_NAME_MAX: usize = 100;
/// Default maximum institution URL length.
pub const DEFAULT_URL_MAX: usize = 200;
/// Default maximum public key length (33 bytes, hex encoded).
pub const DEFAULT_PUBLIC_KEY_MAX: usize = 66;

/// Upper bounds for institution fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLimits {
    /// Maximum name length.
    pub name_max: usize,
    /// Maximum URL length.
    pub url_max: usize,
    /// Maximum public key length.
    pub public_key_max: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            name_max: DEFAULT_NAME_MAX,
            url_max: DEFAULT_URL_MAX,
            public_key_max: DEFAULT_PUBLIC_KEY_MAX,
        }
    }
}

fn within(value: &str, max: usize) -> Result<(), usize> {
    let len = value.chars().count();
    if len == 0 || len > max {
        Err(len)
    } else {
        Ok(())
    }
}

/// Check an institution name.
pub fn validate_name(name: &str, limits: &FieldLimits) -> Result<(), RegistryError> {
    within(name, limits.name_max).map_err(|len| RegistryError::InvalidName {
        len,
        max: limits.name_max,
    })
}

/// Check an institution URL.
pub fn validate_url(url: &str, limits: &FieldLimits) -> Result<(), RegistryError> {
    within(url, limits.url_max).map_err(|len| RegistryError::InvalidUrl {
        len,
        max: limits.url_max,
    })
}

/// Check an institution public key.
pub fn validate_public_key(public_key: &str, limits: &FieldLimits) -> Result<(), RegistryError> {
    within(public_key, limits.public_key_max).map_err(|len| RegistryError::InvalidPublicKey {
        len,
        max: limits.public_key_max,
    })
}

/// Check all profile fields; the first failing field determines the error.
pub fn validate_fields(
    name: &str,
    url: &str,
    public_key: &str,
    limits: &FieldLimits,
) -> Result<(), RegistryError> {
    validate_name(name, limits)?;
    validate_url(url, limits)?;
    validate_public_key(public_key, limits)
}

/// Whether a proof payload is structurally present.
///
/// This is the baseline proof check; cryptographic validation belongs to
/// the injected proof verifier.
pub fn is_proof_present(proof: &[u8]) -> bool {
    !proof.is_empty()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A name is valid exactly when its character count is in 1..=max.
        #[test]
        fn name_validity_tracks_length(name in "\\PC{0,150}") {
            let len = name.chars().count();
            let ok = validate_name(&name, &FieldLimits::default()).is_ok();
            prop_assert_eq!(ok, len >= 1 && len <= 100);
        }

        /// URL validity tracks length under arbitrary limits.
        #[test]
        fn url_validity_tracks_limit(url in "[a-z:/.]{0,64}", max in 1usize..64) {
            let limits = FieldLimits { url_max: max, ..FieldLimits::default() };
            let len = url.chars().count();
            prop_assert_eq!(validate_url(&url, &limits).is_ok(), len >= 1 && len <= max);
        }
    }
}
