//! # Registration Proof Verification
//!
//! The workflow depends on a [`ProofVerifier`] capability but does not
//! implement proof checking itself. Deployments inject the verifier that
//! matches their proofing scheme; tests inject always-accept or
//! always-reject fakes.
//!
//! Shipped implementations:
//!
//! - [`NonEmptyProofVerifier`]: accepts any non-empty payload. This is the
//!   baseline structural check and the default.
//! - [`Ed25519ProofVerifier`]: the proof is a hex Ed25519 signature by the
//!   institution's public key over [`registration_message`].
//!
//! Verifiers are pure and terminating; they run inside the registry's
//! serialization point.

use std::sync::Arc;

use ed25519_dalek::Verifier;
use ireg_core::digest::hex_to_bytes;
use ireg_core::{validation, Principal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised by a verifier that could not evaluate a proof.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The proof payload is malformed.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    /// The institution's public key cannot be used for verification.
    #[error("unusable public key: {0}")]
    KeyMismatch(String),
}

/// Capability that decides whether a registration proof is acceptable.
pub trait ProofVerifier: Send + Sync + std::fmt::Debug {
    /// Verify `proof` for `applicant` registering `public_key`.
    ///
    /// `Ok(false)` and `Err(_)` both reject the registration.
    fn verify(
        &self,
        applicant: &Principal,
        public_key: &str,
        proof: &[u8],
    ) -> Result<bool, VerifyError>;
}

/// Accepts any non-empty proof payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonEmptyProofVerifier;

impl ProofVerifier for NonEmptyProofVerifier {
    fn verify(
        &self,
        _applicant: &Principal,
        _public_key: &str,
        proof: &[u8],
    ) -> Result<bool, VerifyError> {
        Ok(validation::is_proof_present(proof))
    }
}

/// The message an institution signs to prove control of its public key.
pub fn registration_message(applicant: &Principal) -> String {
    format!("ireg:registration:{applicant}")
}

/// Verifies Ed25519 signatures over [`registration_message`].
///
/// The public key must be 32 bytes hex encoded (an optional `0x` prefix is
/// accepted). The proof must be the 64-byte signature, hex encoded as text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519ProofVerifier;

impl ProofVerifier for Ed25519ProofVerifier {
    fn verify(
        &self,
        applicant: &Principal,
        public_key: &str,
        proof: &[u8],
    ) -> Result<bool, VerifyError> {
        let key_bytes =
            hex_to_bytes(public_key.trim()).map_err(|e| VerifyError::KeyMismatch(e.to_string()))?;
        let key_bytes: [u8; 32] = key_bytes.try_into().map_err(|v: Vec<u8>| {
            VerifyError::KeyMismatch(format!("expected 32-byte key, got {} bytes", v.len()))
        })?;
        let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| VerifyError::KeyMismatch(e.to_string()))?;

        let proof_text = std::str::from_utf8(proof)
            .map_err(|_| VerifyError::MalformedProof("proof is not hex text".to_string()))?;
        let sig_bytes = hex_to_bytes(proof_text.trim())
            .map_err(|e| VerifyError::MalformedProof(e.to_string()))?;
        let sig_bytes: [u8; 64] = sig_bytes.try_into().map_err(|v: Vec<u8>| {
            VerifyError::MalformedProof(format!("expected 64-byte signature, got {} bytes", v.len()))
        })?;
        let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);

        Ok(verifying_key
            .verify(registration_message(applicant).as_bytes(), &signature)
            .is_ok())
    }
}

/// Verifier selection for configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifierKind {
    /// [`NonEmptyProofVerifier`].
    #[default]
    NonEmpty,
    /// [`Ed25519ProofVerifier`].
    Ed25519,
}

impl VerifierKind {
    /// Instantiate the selected verifier.
    pub fn build(&self) -> Arc<dyn ProofVerifier> {
        match self {
            Self::NonEmpty => Arc::new(NonEmptyProofVerifier),
            Self::Ed25519 => Arc::new(Ed25519ProofVerifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Signer;

    fn applicant() -> Principal {
        Principal::new("SP3FBR2AGK5H9QBDH3EEN6DF8EK8JY7RX8QJ5SVTE").unwrap()
    }

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn signed_proof(seed: [u8; 32], who: &Principal) -> (String, Vec<u8>) {
        let key = ed25519_dalek::SigningKey::from_bytes(&seed);
        let sig = key.sign(registration_message(who).as_bytes());
        (
            format!("0x{}", hex(key.verifying_key().as_bytes())),
            hex(&sig.to_bytes()).into_bytes(),
        )
    }

    #[test]
    fn non_empty_accepts_payload() {
        let v = NonEmptyProofVerifier;
        assert_eq!(v.verify(&applicant(), "0x1234", b"proof-data"), Ok(true));
    }

    #[test]
    fn non_empty_rejects_empty() {
        let v = NonEmptyProofVerifier;
        assert_eq!(v.verify(&applicant(), "0x1234", b""), Ok(false));
    }

    #[test]
    fn ed25519_accepts_valid_signature() {
        let (pk, proof) = signed_proof([7u8; 32], &applicant());
        assert_eq!(pk.len(), 66);
        assert_eq!(Ed25519ProofVerifier.verify(&applicant(), &pk, &proof), Ok(true));
    }

    #[test]
    fn ed25519_rejects_signature_for_other_principal() {
        let other = Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM").unwrap();
        let (pk, proof) = signed_proof([7u8; 32], &other);
        assert_eq!(Ed25519ProofVerifier.verify(&applicant(), &pk, &proof), Ok(false));
    }

    #[test]
    fn ed25519_rejects_signature_from_other_key() {
        let (pk, _) = signed_proof([7u8; 32], &applicant());
        let (_, proof) = signed_proof([9u8; 32], &applicant());
        assert_eq!(Ed25519ProofVerifier.verify(&applicant(), &pk, &proof), Ok(false));
    }

    #[test]
    fn ed25519_rejects_short_key() {
        let (_, proof) = signed_proof([7u8; 32], &applicant());
        let result = Ed25519ProofVerifier.verify(&applicant(), "0x1234", &proof);
        assert!(matches!(result, Err(VerifyError::KeyMismatch(_))));
    }

    #[test]
    fn ed25519_rejects_malformed_proof() {
        let (pk, _) = signed_proof([7u8; 32], &applicant());
        let result = Ed25519ProofVerifier.verify(&applicant(), &pk, b"proof-data");
        assert!(matches!(result, Err(VerifyError::MalformedProof(_))));

        let result = Ed25519ProofVerifier.verify(&applicant(), &pk, &[0xff, 0xfe]);
        assert!(matches!(result, Err(VerifyError::MalformedProof(_))));
    }

    #[test]
    fn verifier_kind_parses_from_config_names() {
        let kind: VerifierKind = serde_json::from_str("\"ed25519\"").unwrap();
        assert_eq!(kind, VerifierKind::Ed25519);
        let kind: VerifierKind = serde_json::from_str("\"non_empty\"").unwrap();
        assert_eq!(kind, VerifierKind::NonEmpty);
        assert_eq!(VerifierKind::default(), VerifierKind::NonEmpty);
    }

    #[test]
    fn verifier_kind_builds_working_verifier() {
        let v = VerifierKind::NonEmpty.build();
        assert_eq!(v.verify(&applicant(), "k", b"x"), Ok(true));
    }
}
