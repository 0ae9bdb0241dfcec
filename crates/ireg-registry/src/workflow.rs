//! # Registration Workflow
//!
//! The per-principal state machine:
//!
//! ```text
//! Unregistered ──submit──▶ Pending ──approve──▶ Verified ──unverify──▶ Unverified
//!       ▲                     │
//!       └──────reject─────────┘
//! ```
//!
//! Each operation evaluates its checks in a fixed order (authorization,
//! pause, existence, domain validity), returns the first failure, and only
//! mutates state once every check has passed.
//!
//! A principal that has a profile, verified or not, can never submit
//! again: `submit_registration` rejects it with `AlreadyRegistered`.

use ireg_core::{validation, Principal, RegistryError};

use crate::events::{EventRecord, RegistryEvent};
use crate::state::{
    InstitutionProfile, InstitutionStatus, OperationContext, PendingRegistration, RegistryState,
};

impl RegistryState {
    /// Submit a registration for `caller`.
    ///
    /// Errors: `Paused`, `AlreadyRegistered`, `InvalidName`, `InvalidUrl`,
    /// `InvalidPublicKey`.
    pub fn submit_registration(
        &mut self,
        ctx: &OperationContext<'_>,
        caller: &Principal,
        name: &str,
        url: &str,
        public_key: &str,
        proof: &[u8],
    ) -> Result<EventRecord, RegistryError> {
        self.require_unpaused()?;
        if self.pending.contains(caller) || self.profiles.contains(caller) {
            return Err(RegistryError::AlreadyRegistered {
                principal: caller.clone(),
            });
        }
        validation::validate_fields(name, url, public_key, ctx.limits)?;

        let record = self.seal(
            caller,
            RegistryEvent::RegistrationSubmitted {
                institution: caller.clone(),
            },
            ctx.now,
        )?;
        self.pending.insert(
            caller.clone(),
            PendingRegistration {
                name: name.to_string(),
                url: url.to_string(),
                public_key: public_key.to_string(),
                proof: proof.to_vec(),
                submitted_at: ctx.now,
            },
        );
        Ok(self.commit(record))
    }

    /// Approve `institution`'s pending registration into a verified profile.
    ///
    /// Errors: `NotAuthorized`, `Paused`, `NotRegistered`, `InvalidProof`.
    pub fn approve_registration(
        &mut self,
        ctx: &OperationContext<'_>,
        caller: &Principal,
        institution: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.require_admin(caller)?;
        self.require_unpaused()?;
        let pending = self
            .pending
            .get(institution)
            .ok_or_else(|| RegistryError::NotRegistered {
                principal: institution.clone(),
            })?;

        match ctx
            .verifier
            .verify(institution, &pending.public_key, &pending.proof)
        {
            Ok(true) => {}
            Ok(false) => {
                return Err(RegistryError::InvalidProof {
                    reason: "verifier rejected the proof".to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(institution = %institution, error = %e, "proof verification failed");
                return Err(RegistryError::InvalidProof {
                    reason: e.to_string(),
                });
            }
        }

        let record = self.seal(
            caller,
            RegistryEvent::RegistrationApproved {
                institution: institution.clone(),
            },
            ctx.now,
        )?;
        let Some(pending) = self.pending.remove(institution) else {
            return Err(RegistryError::NotRegistered {
                principal: institution.clone(),
            });
        };
        self.profiles.insert(
            institution.clone(),
            InstitutionProfile {
                name: pending.name,
                url: pending.url,
                public_key: pending.public_key,
                verified: true,
                registration_time: ctx.now,
                verification_time: Some(ctx.now),
            },
        );
        Ok(self.commit(record))
    }

    /// Discard `institution`'s pending registration.
    ///
    /// Errors: `NotAuthorized`, `Paused`, `NotRegistered`.
    pub fn reject_registration(
        &mut self,
        ctx: &OperationContext<'_>,
        caller: &Principal,
        institution: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.require_admin(caller)?;
        self.require_unpaused()?;
        if !self.pending.contains(institution) {
            return Err(RegistryError::NotRegistered {
                principal: institution.clone(),
            });
        }

        let record = self.seal(
            caller,
            RegistryEvent::RegistrationRejected {
                institution: institution.clone(),
            },
            ctx.now,
        )?;
        self.pending.remove(institution);
        Ok(self.commit(record))
    }

    /// Replace the caller's profile fields. Verification state and
    /// timestamps are left untouched.
    ///
    /// Errors: `Paused`, `NotRegistered`, `NotVerified`, `InvalidName`,
    /// `InvalidUrl`, `InvalidPublicKey`.
    pub fn update_profile(
        &mut self,
        ctx: &OperationContext<'_>,
        caller: &Principal,
        name: &str,
        url: &str,
        public_key: &str,
    ) -> Result<EventRecord, RegistryError> {
        self.require_unpaused()?;
        self.require_verified(caller)?;
        validation::validate_fields(name, url, public_key, ctx.limits)?;

        let record = self.seal(
            caller,
            RegistryEvent::ProfileUpdated {
                institution: caller.clone(),
            },
            ctx.now,
        )?;
        if let Some(profile) = self.profiles.get_mut(caller) {
            profile.name = name.to_string();
            profile.url = url.to_string();
            profile.public_key = public_key.to_string();
        }
        Ok(self.commit(record))
    }

    /// Withdraw `institution`'s verification. Not idempotent.
    ///
    /// Errors: `NotAuthorized`, `Paused`, `NotRegistered`, `NotVerified`.
    pub fn unverify_institution(
        &mut self,
        ctx: &OperationContext<'_>,
        caller: &Principal,
        institution: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.require_admin(caller)?;
        self.require_unpaused()?;
        self.require_verified(institution)?;

        let record = self.seal(
            caller,
            RegistryEvent::InstitutionUnverified {
                institution: institution.clone(),
            },
            ctx.now,
        )?;
        if let Some(profile) = self.profiles.get_mut(institution) {
            profile.verified = false;
            profile.verification_time = None;
        }
        Ok(self.commit(record))
    }

    /// `NotRegistered` without a profile, `NotVerified` with an unverified one.
    fn require_verified(&self, institution: &Principal) -> Result<(), RegistryError> {
        match self.profiles.get(institution) {
            None => Err(RegistryError::NotRegistered {
                principal: institution.clone(),
            }),
            Some(profile) if !profile.verified => Err(RegistryError::NotVerified {
                principal: institution.clone(),
            }),
            Some(_) => Ok(()),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The profile for `institution`, if one exists.
    pub fn institution_profile(&self, institution: &Principal) -> Option<&InstitutionProfile> {
        self.profiles.get(institution)
    }

    /// The pending registration for `institution`, if one exists.
    pub fn pending_registration(&self, institution: &Principal) -> Option<&PendingRegistration> {
        self.pending.get(institution)
    }

    /// Whether `institution` has a verified profile. False when unknown.
    pub fn is_institution_verified(&self, institution: &Principal) -> bool {
        self.profiles
            .get(institution)
            .is_some_and(|profile| profile.verified)
    }

    /// Lifecycle position of `institution`.
    pub fn institution_status(&self, institution: &Principal) -> InstitutionStatus {
        match (self.pending.get(institution), self.profiles.get(institution)) {
            (_, Some(profile)) if profile.verified => InstitutionStatus::Verified,
            (_, Some(_)) => InstitutionStatus::Unverified,
            (Some(_), None) => InstitutionStatus::Pending,
            (None, None) => InstitutionStatus::Unregistered,
        }
    }

    /// Verified institutions in principal order.
    pub fn verified_institutions(&self) -> Vec<&Principal> {
        self.profiles
            .iter()
            .filter(|(_, profile)| profile.verified)
            .map(|(principal, _)| principal)
            .collect()
    }
}
