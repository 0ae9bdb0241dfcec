//! # Canonical Serialization
//!
//! [`CanonicalBytes`] is the only input accepted for digest computation.
//! Values are converted to a JSON tree, checked for floats, and written as
//! RFC 8785 (JCS) canonical JSON with `serde_jcs`: sorted keys, compact
//! separators, one byte sequence per logical value.
//!
//! Field boundaries are carried by JSON string quoting, so no principal or
//! name, whatever characters it contains, can shift bytes from one field
//! into another.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors producing canonical bytes.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Floats have no single canonical rendering and are refused.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// The value could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Bytes produced by JCS canonicalization.
///
/// The inner buffer is private; [`CanonicalBytes::new`] is the only
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        Ok(Self(serde_jcs::to_string(&value)?.into_bytes()))
    }

    /// The canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) if !n.is_i64() && !n.is_u64() => Err(
            CanonicalizationError::FloatRejected(n.as_f64().unwrap_or(f64::NAN)),
        ),
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
        _ => Ok(()),
    }
}
