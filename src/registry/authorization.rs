// src/registry/authorization.rs
//! Issuer allow-list and delegated issuance authority.
//!
//! Two independent sources of authority exist: direct membership in the
//! issuer allow-list (managed solely by the registry owner) and a delegation
//! from a current allow-list member. Delegation validity is always
//! re-derived live from both the delegation record and the delegator's
//! current allow-list status; nothing is snapshotted at delegation time.

use log::{debug, info};

use crate::models::credential::Identity;
use crate::models::delegation::Delegation;
use crate::registry::{CertificationRegistry, RegistryError, RegistryResult};

impl CertificationRegistry {
    /// Adds an identity to the issuer allow-list.
    ///
    /// # Errors
    /// [`RegistryError::NotAuthorized`] if the caller is not the owner.
    pub fn add_issuer(&mut self, caller: &Identity, identity: Identity) -> RegistryResult<()> {
        if caller != &self.owner {
            return Err(RegistryError::NotAuthorized);
        }
        info!("issuer {} authorized", identity);
        self.issuers.insert(identity, true);
        Ok(())
    }

    /// Removes an identity from the issuer allow-list.
    ///
    /// Also silently invalidates every delegation the identity has granted,
    /// since delegation checks consult the allow-list live.
    ///
    /// # Errors
    /// [`RegistryError::NotAuthorized`] if the caller is not the owner.
    pub fn remove_issuer(&mut self, caller: &Identity, identity: Identity) -> RegistryResult<()> {
        if caller != &self.owner {
            return Err(RegistryError::NotAuthorized);
        }
        info!("issuer {} deauthorized", identity);
        self.issuers.insert(identity, false);
        Ok(())
    }

    /// Whether an identity is currently on the issuer allow-list.
    ///
    /// Absence means not authorized.
    pub fn is_authorized_issuer(&self, identity: &Identity) -> bool {
        self.issuers.get(identity).copied().unwrap_or(false)
    }

    /// Grants the delegate time-boxed issuance authority from the caller.
    ///
    /// Overwrites any prior delegation to the same delegate. The delegation
    /// lapses once the time counter reaches `now + expiry_offset`, and is
    /// honored only while the caller remains an authorized issuer. Delegates
    /// cannot re-delegate: only allow-list members pass this gate.
    ///
    /// # Errors
    /// [`RegistryError::NotAuthorized`] if the caller is not a currently
    /// authorized issuer.
    pub fn delegate_authority(
        &mut self,
        caller: &Identity,
        delegate: Identity,
        expiry_offset: u64,
        now: u64,
    ) -> RegistryResult<()> {
        if !self.is_authorized_issuer(caller) {
            return Err(RegistryError::NotAuthorized);
        }
        debug!("{} delegated issuance authority to {}", caller, delegate);
        self.delegations.insert(
            delegate,
            Delegation {
                delegator: caller.clone(),
                expiry: now.saturating_add(expiry_offset),
                active: true,
            },
        );
        Ok(())
    }

    /// Deactivates a delegation previously granted by the caller.
    ///
    /// # Errors
    /// [`RegistryError::NotAuthorized`] if no delegation exists for the
    /// delegate or the caller is not its delegator.
    pub fn revoke_delegation(
        &mut self,
        caller: &Identity,
        delegate: &Identity,
    ) -> RegistryResult<()> {
        match self.delegations.get_mut(delegate) {
            Some(delegation) if &delegation.delegator == caller => {
                delegation.active = false;
                debug!("{} revoked delegation to {}", caller, delegate);
                Ok(())
            }
            _ => Err(RegistryError::NotAuthorized),
        }
    }

    /// Whether an identity currently holds a usable delegation.
    ///
    /// True iff a delegation is stored for the identity, it has not been
    /// revoked, the time counter has not reached its expiry, and its
    /// delegator is an authorized issuer *right now*.
    pub fn is_valid_delegate(&self, identity: &Identity, now: u64) -> bool {
        self.delegations.get(identity).is_some_and(|delegation| {
            delegation.active
                && now < delegation.expiry
                && self.is_authorized_issuer(&delegation.delegator)
        })
    }
}
