//! # Content Digests
//!
//! SHA-256 digests used to chain audit events. A [`ContentDigest`]
//! serializes as a 64-character lowercase hex string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// The all-zero digest that anchors a digest chain.
    pub fn genesis() -> Self {
        Self([0u8; 32])
    }

    /// Create a digest from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        let bytes = hex_to_bytes(hex.trim())?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            ValidationError::InvalidHex(format!("digest must be 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentDigest({})", &self.to_hex()[..16])
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Compute the SHA-256 digest of `data`.
pub fn sha256_digest(data: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    ContentDigest(hasher.finalize().into())
}

/// Decode a hex string, accepting an optional `0x` prefix and either case.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, ValidationError> {
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);
    if hex.len() % 2 != 0 {
        return Err(ValidationError::InvalidHex(
            "hex string must have even length".to_string(),
        ));
    }
    if !hex.is_ascii() {
        return Err(ValidationError::InvalidHex(
            "hex string must be ASCII".to_string(),
        ));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| ValidationError::InvalidHex(format!("position {i}: {e}")))
        })
        .collect()
}
