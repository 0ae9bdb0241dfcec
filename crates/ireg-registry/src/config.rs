//! # Registry Configuration
//!
//! Genesis parameters and collaborator selection for a registry, read from
//! a YAML (or JSON) file:
//!
//! ```yaml
//! owner: SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7
//! admins: []
//! paused: false
//! limits:
//!   name_max: 100
//!   url_max: 200
//!   public_key_max: 66
//! verifier: non_empty
//! ```
//!
//! Only `owner` is required.

use std::path::{Path, PathBuf};

use ireg_core::{FieldLimits, Principal, RegistryError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{Registry, RegistryBuilder};
use crate::state::StateError;
use crate::verifier::VerifierKind;

/// Errors loading or validating a registry configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid YAML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field limit is zero.
    #[error("field limit {field} must be greater than zero")]
    InvalidLimit {
        /// Name of the offending limit.
        field: &'static str,
    },

    /// The genesis roles are invalid (null owner or admin).
    #[error("invalid genesis roles: {0}")]
    Registry(#[from] RegistryError),

    /// The genesis state failed its invariant check.
    #[error("invalid genesis state: {0}")]
    State(#[from] StateError),
}

/// The collaborator settings of a registry: everything in a
/// [`RegistryConfig`] except the genesis state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySettings {
    /// Profile field limits.
    #[serde(default)]
    pub limits: FieldLimits,
    /// Proof verifier selection.
    #[serde(default)]
    pub verifier: VerifierKind,
}

/// Registry genesis and wiring configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Initial owner.
    pub owner: Principal,
    /// Extra initial admin set members.
    #[serde(default)]
    pub admins: Vec<Principal>,
    /// Initial pause flag.
    #[serde(default)]
    pub paused: bool,
    /// Profile field limits.
    #[serde(default)]
    pub limits: FieldLimits,
    /// Proof verifier selection.
    #[serde(default)]
    pub verifier: VerifierKind,
}

impl RegistryConfig {
    /// Defaults for everything but the owner.
    pub fn for_owner(owner: Principal) -> Self {
        Self {
            owner,
            admins: Vec::new(),
            paused: false,
            limits: FieldLimits::default(),
            verifier: VerifierKind::default(),
        }
    }

    /// Limits and verifier, without the genesis fields.
    pub fn settings(&self) -> RegistrySettings {
        RegistrySettings {
            limits: self.limits,
            verifier: self.verifier,
        }
    }

    /// Parse and validate a configuration document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content)?;
        tracing::debug!(path = %path.display(), owner = %config.owner, "loaded registry config");
        Ok(config)
    }

    /// Reject null roles and zero limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_null() || self.admins.iter().any(Principal::is_null) {
            return Err(RegistryError::ZeroAddress.into());
        }
        let limits = [
            ("name_max", self.limits.name_max),
            ("url_max", self.limits.url_max),
            ("public_key_max", self.limits.public_key_max),
        ];
        if let Some((field, _)) = limits.into_iter().find(|(_, max)| *max == 0) {
            return Err(ConfigError::InvalidLimit { field });
        }
        Ok(())
    }

    /// Builder for a fresh registry described by this configuration.
    pub fn builder(&self) -> Result<RegistryBuilder, ConfigError> {
        self.validate()?;
        Ok(RegistryBuilder::from_config(self)?)
    }

    /// A fresh registry described by this configuration.
    pub fn into_registry(self) -> Result<Registry, ConfigError> {
        Ok(self.builder()?.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const OWNER: &str = "SP2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKNRV9EJ7";

    #[test]
    fn minimal_config_uses_defaults() {
        let config = RegistryConfig::from_yaml_str(&format!("owner: {OWNER}\n")).unwrap();
        assert_eq!(config, RegistryConfig::for_owner(Principal::new(OWNER).unwrap()));
        assert_eq!(config.limits.name_max, 100);
        assert_eq!(config.limits.url_max, 200);
        assert_eq!(config.limits.public_key_max, 66);
    }

    #[test]
    fn full_config_parses() {
        let yaml = format!(
            "owner: {OWNER}\nadmins: [SP1ADMIN]\npaused: true\nlimits:\n  name_max: 10\n  url_max: 20\n  public_key_max: 30\nverifier: ed25519\n"
        );
        let config = RegistryConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config.admins, vec![Principal::new("SP1ADMIN").unwrap()]);
        assert!(config.paused);
        assert_eq!(config.limits.url_max, 20);
        assert_eq!(config.verifier, VerifierKind::Ed25519);
    }

    #[test]
    fn json_is_accepted() {
        let json = format!("{{\"owner\": \"{OWNER}\", \"paused\": true}}");
        let config = RegistryConfig::from_yaml_str(&json).unwrap();
        assert!(config.paused);
    }

    #[test]
    fn missing_owner_is_parse_error() {
        let err = RegistryConfig::from_yaml_str("paused: true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_field_is_parse_error() {
        let err = RegistryConfig::from_yaml_str(&format!("owner: {OWNER}\nowners: []\n"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn null_owner_rejected() {
        let yaml = format!("owner: {}\n", Principal::null());
        let err = RegistryConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Registry(RegistryError::ZeroAddress)));
    }

    #[test]
    fn null_admin_rejected() {
        let yaml = format!("owner: {OWNER}\nadmins: [{}]\n", Principal::null());
        let err = RegistryConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Registry(RegistryError::ZeroAddress)));
    }

    #[test]
    fn zero_limit_rejected() {
        let yaml = format!("owner: {OWNER}\nlimits:\n  url_max: 0\n");
        let err = RegistryConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLimit { field: "url_max" }));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "owner: {OWNER}").unwrap();
        writeln!(file, "admins: [SP1ADMIN]").unwrap();
        let config = RegistryConfig::load(file.path()).unwrap();
        assert_eq!(config.admins.len(), 1);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegistryConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn into_registry_applies_genesis() {
        let mut config = RegistryConfig::for_owner(Principal::new(OWNER).unwrap());
        config.admins.push(Principal::new("SP1ADMIN").unwrap());
        config.paused = true;
        let registry = config.into_registry().unwrap();
        assert!(registry.get_paused());
        assert!(registry.get_is_admin(&Principal::new(OWNER).unwrap()));
        assert!(registry.get_is_admin(&Principal::new("SP1ADMIN").unwrap()));
        assert_eq!(registry.version(), 0);
    }

    #[test]
    fn settings_drop_genesis_fields() {
        let yaml =
            format!("owner: {OWNER}\npaused: true\nlimits:\n  url_max: 20\nverifier: ed25519\n");
        let settings = RegistryConfig::from_yaml_str(&yaml).unwrap().settings();
        assert_eq!(settings.verifier, VerifierKind::Ed25519);
        assert_eq!(settings.limits.url_max, 20);
        assert_eq!(settings.limits.name_max, 100);
        assert_ne!(settings, RegistrySettings::default());
    }

    #[test]
    fn configured_limits_are_enforced() {
        let mut config = RegistryConfig::for_owner(Principal::new(OWNER).unwrap());
        config.limits.name_max = 3;
        let registry = config.into_registry().unwrap();
        let uni = Principal::new("SP1UNI").unwrap();
        let err = registry
            .submit_registration(&uni, "Four", "https://u.edu", "0x01", b"p")
            .unwrap_err();
        assert_eq!(err, RegistryError::InvalidName { len: 4, max: 3 });
    }
}
