//! # Access Control
//!
//! Owner singleton, admin set, ownership transfer, admin membership, and
//! the pause flag.
//!
//! The owner is implicitly an admin: admin-gated checks pass for
//! `is_owner(x) || is_admin(x)` whether or not the owner appears in the
//! admin set.
//!
//! Checks run in a fixed order (authorization, pause, argument, membership)
//! and the first failure is returned with no state change. `set_paused` is
//! the only mutation exempt from the pause gate.

use ireg_core::{Principal, RegistryError};

use crate::events::{EventRecord, RegistryEvent};
use crate::state::{OperationContext, RegistryState};

impl RegistryState {
    /// The current owner.
    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Whether `caller` is the owner.
    pub fn is_owner(&self, caller: &Principal) -> bool {
        &self.owner == caller
    }

    /// Whether `caller` is an explicit member of the admin set.
    pub fn is_admin(&self, caller: &Principal) -> bool {
        self.admins.contains(caller)
    }

    /// Whether `caller` may invoke admin-gated operations.
    pub fn has_admin_rights(&self, caller: &Principal) -> bool {
        self.is_owner(caller) || self.is_admin(caller)
    }

    /// Admin set members in principal order.
    pub fn admins(&self) -> impl Iterator<Item = &Principal> {
        self.admins.iter()
    }

    pub(crate) fn require_owner(&self, caller: &Principal) -> Result<(), RegistryError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(RegistryError::NotAuthorized {
                caller: caller.clone(),
            })
        }
    }

    pub(crate) fn require_admin(&self, caller: &Principal) -> Result<(), RegistryError> {
        if self.has_admin_rights(caller) {
            Ok(())
        } else {
            Err(RegistryError::NotAuthorized {
                caller: caller.clone(),
            })
        }
    }

    pub(crate) fn require_unpaused(&self) -> Result<(), RegistryError> {
        if self.paused {
            Err(RegistryError::Paused)
        } else {
            Ok(())
        }
    }

    /// Replace the owner. The new owner is also inserted into the admin set.
    ///
    /// Errors: `NotAuthorized` (caller is not the owner), `Paused`,
    /// `ZeroAddress`.
    pub fn transfer_ownership(
        &mut self,
        ctx: &OperationContext<'_>,
        caller: &Principal,
        new_owner: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.require_owner(caller)?;
        self.require_unpaused()?;
        if new_owner.is_null() {
            return Err(RegistryError::ZeroAddress);
        }

        let record = self.seal(
            caller,
            RegistryEvent::OwnershipTransferred {
                previous_owner: self.owner.clone(),
                new_owner: new_owner.clone(),
            },
            ctx.now,
        )?;
        self.owner = new_owner.clone();
        self.admins.insert(new_owner.clone());
        Ok(self.commit(record))
    }

    /// Add `candidate` to the admin set.
    ///
    /// Errors: `NotAuthorized`, `Paused`, `ZeroAddress`, `AlreadyAdmin`.
    pub fn add_admin(
        &mut self,
        ctx: &OperationContext<'_>,
        caller: &Principal,
        candidate: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.require_admin(caller)?;
        self.require_unpaused()?;
        if candidate.is_null() {
            return Err(RegistryError::ZeroAddress);
        }
        if self.admins.contains(candidate) {
            return Err(RegistryError::AlreadyAdmin {
                principal: candidate.clone(),
            });
        }

        let record = self.seal(
            caller,
            RegistryEvent::AdminAdded {
                admin: candidate.clone(),
            },
            ctx.now,
        )?;
        self.admins.insert(candidate.clone());
        Ok(self.commit(record))
    }

    /// Remove `target` from the admin set.
    ///
    /// Removing the last admin, or the owner's explicit membership, is
    /// allowed; the owner keeps its implicit rights.
    ///
    /// Errors: `NotAuthorized`, `Paused`, `NotAdmin`.
    pub fn remove_admin(
        &mut self,
        ctx: &OperationContext<'_>,
        caller: &Principal,
        target: &Principal,
    ) -> Result<EventRecord, RegistryError> {
        self.require_admin(caller)?;
        self.require_unpaused()?;
        if !self.admins.contains(target) {
            return Err(RegistryError::NotAdmin {
                principal: target.clone(),
            });
        }

        let record = self.seal(
            caller,
            RegistryEvent::AdminRemoved {
                admin: target.clone(),
            },
            ctx.now,
        )?;
        self.admins.remove(target);
        Ok(self.commit(record))
    }

    /// Set the pause flag. Allowed while paused.
    ///
    /// Errors: `NotAuthorized`.
    pub fn set_paused(
        &mut self,
        ctx: &OperationContext<'_>,
        caller: &Principal,
        value: bool,
    ) -> Result<EventRecord, RegistryError> {
        self.require_admin(caller)?;
        let record = self.seal(caller, RegistryEvent::PauseSet { paused: value }, ctx.now)?;
        self.paused = value;
        Ok(self.commit(record))
    }
}
