// src/services/registry_service.rs
//! Serialized access to the certification registry.
//!
//! Wraps the whole [`CertificationRegistry`] in a single mutex: every
//! operation locks the entire record set for its duration, so each call runs
//! as one atomic step and cross-key reads (upgrade paths referencing two
//! certifications, token vs. record recipient) always observe a consistent
//! snapshot. The lock is registry-wide, not per-key.
//!
//! The service also supplies the time counter: seconds since the Unix
//! epoch, read once at the start of each time-dependent call.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::auxiliary::{
    Achievement, CategoryTags, Endorsement, NotificationSettings, Rating, UpgradePath,
    VerificationStats,
};
use crate::models::credential::{Credential, CredentialId, Identity};
use crate::models::dispute::Dispute;
use crate::registry::{CertificationRegistry, RegistryResult};

/// Thread-safe handle to the shared certification registry.
///
/// Cloning the service clones the handle, not the registry: all clones
/// operate on the same record set.
#[derive(Clone)]
pub struct RegistryService {
    registry: Arc<Mutex<CertificationRegistry>>,
}

impl RegistryService {
    /// Creates a service around a fresh registry administered by `owner`.
    pub fn new(owner: Identity, strict_delegate_renewal: bool) -> Self {
        let registry =
            CertificationRegistry::new(owner).with_strict_delegate_renewal(strict_delegate_renewal);
        RegistryService {
            registry: Arc::new(Mutex::new(registry)),
        }
    }

    /// Current time-counter value: seconds since the Unix epoch.
    fn now() -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }

    fn lock(&self) -> MutexGuard<'_, CertificationRegistry> {
        self.registry.lock().unwrap()
    }

    // =====================
    // Authorization
    // =====================

    pub fn add_issuer(&self, caller: &Identity, identity: Identity) -> RegistryResult<()> {
        self.lock().add_issuer(caller, identity)
    }

    pub fn remove_issuer(&self, caller: &Identity, identity: Identity) -> RegistryResult<()> {
        self.lock().remove_issuer(caller, identity)
    }

    pub fn is_authorized_issuer(&self, identity: &Identity) -> bool {
        self.lock().is_authorized_issuer(identity)
    }

    pub fn delegate_authority(
        &self,
        caller: &Identity,
        delegate: Identity,
        expiry_offset: u64,
    ) -> RegistryResult<()> {
        self.lock()
            .delegate_authority(caller, delegate, expiry_offset, Self::now())
    }

    pub fn revoke_delegation(&self, caller: &Identity, delegate: &Identity) -> RegistryResult<()> {
        self.lock().revoke_delegation(caller, delegate)
    }

    pub fn is_valid_delegate(&self, identity: &Identity) -> bool {
        self.lock().is_valid_delegate(identity, Self::now())
    }

    // =====================
    // Certification lifecycle
    // =====================

    pub fn issue(
        &self,
        caller: &Identity,
        recipient: Identity,
        skill: String,
        expiry_time: u64,
        metadata: String,
    ) -> RegistryResult<CredentialId> {
        self.lock()
            .issue(caller, recipient, skill, expiry_time, metadata, Self::now())
    }

    pub fn issue_as_delegate(
        &self,
        caller: &Identity,
        recipient: Identity,
        skill: String,
        expiry_time: u64,
        metadata: String,
    ) -> RegistryResult<CredentialId> {
        self.lock()
            .issue_as_delegate(caller, recipient, skill, expiry_time, metadata, Self::now())
    }

    pub fn revoke(&self, caller: &Identity, id: CredentialId) -> RegistryResult<()> {
        self.lock().revoke(caller, id)
    }

    pub fn renew(&self, caller: &Identity, id: CredentialId, new_expiry: u64) -> RegistryResult<()> {
        self.lock().renew(caller, id, new_expiry)
    }

    pub fn renew_as_delegate(
        &self,
        caller: &Identity,
        id: CredentialId,
        new_expiry: u64,
    ) -> RegistryResult<()> {
        self.lock()
            .renew_as_delegate(caller, id, new_expiry, Self::now())
    }

    pub fn transfer(
        &self,
        caller: &Identity,
        id: CredentialId,
        new_recipient: Identity,
    ) -> RegistryResult<()> {
        self.lock().transfer(caller, id, new_recipient)
    }

    pub fn update_level(
        &self,
        caller: &Identity,
        id: CredentialId,
        new_level: u32,
    ) -> RegistryResult<()> {
        self.lock().update_level(caller, id, new_level)
    }

    // =====================
    // Verification
    // =====================

    pub fn verify(&self, id: CredentialId) -> RegistryResult<Credential> {
        self.lock().verify(id, Self::now()).cloned()
    }

    pub fn verify_and_log(&self, caller: &Identity, id: CredentialId) -> RegistryResult<Credential> {
        self.lock().verify_and_log(caller, id, Self::now())
    }

    // =====================
    // Disputes
    // =====================

    pub fn file_dispute(
        &self,
        caller: &Identity,
        id: CredentialId,
        reason: String,
    ) -> RegistryResult<()> {
        self.lock().file_dispute(caller, id, reason, Self::now())
    }

    pub fn respond_to_dispute(
        &self,
        caller: &Identity,
        id: CredentialId,
        response: String,
        new_status: String,
    ) -> RegistryResult<()> {
        self.lock().respond_to_dispute(caller, id, response, new_status)
    }

    // =====================
    // Auxiliary registries
    // =====================

    pub fn rate(
        &self,
        caller: &Identity,
        id: CredentialId,
        score: u32,
        comment: String,
    ) -> RegistryResult<()> {
        self.lock().rate(caller, id, score, comment, Self::now())
    }

    pub fn add_achievement(
        &self,
        caller: &Identity,
        id: CredentialId,
        title: String,
        description: String,
    ) -> RegistryResult<u64> {
        self.lock()
            .add_achievement(caller, id, title, description, Self::now())
    }

    pub fn set_category(
        &self,
        caller: &Identity,
        id: CredentialId,
        category: String,
        tags: Vec<String>,
    ) -> RegistryResult<()> {
        self.lock().set_category(caller, id, category, tags)
    }

    pub fn set_prerequisites(
        &self,
        caller: &Identity,
        id: CredentialId,
        prerequisite_ids: Vec<CredentialId>,
    ) -> RegistryResult<()> {
        self.lock().set_prerequisites(caller, id, prerequisite_ids)
    }

    pub fn set_upgrade_path(
        &self,
        caller: &Identity,
        source_id: CredentialId,
        target_id: CredentialId,
    ) -> RegistryResult<()> {
        self.lock()
            .set_upgrade_path(caller, source_id, target_id, Self::now())
    }

    pub fn upgrade(
        &self,
        caller: &Identity,
        source_id: CredentialId,
        target_id: CredentialId,
    ) -> RegistryResult<()> {
        self.lock().upgrade(caller, source_id, target_id)
    }

    pub fn endorse(&self, caller: &Identity, id: CredentialId) -> RegistryResult<()> {
        self.lock().endorse(caller, id, Self::now())
    }

    pub fn set_notification_settings(
        &self,
        caller: &Identity,
        id: CredentialId,
        settings: NotificationSettings,
    ) -> RegistryResult<()> {
        self.lock().set_notification_settings(caller, id, settings)
    }

    // =====================
    // Read-only queries
    // =====================
    //
    // Lookups return clones so no lock is held after the call returns.

    pub fn certification_details(&self, id: CredentialId) -> Option<Credential> {
        self.lock().certification_details(id).cloned()
    }

    pub fn token_holder(&self, id: CredentialId) -> Option<Identity> {
        self.lock().token_holder(id).cloned()
    }

    pub fn certification_dispute(&self, id: CredentialId) -> Option<Dispute> {
        self.lock().certification_dispute(id).cloned()
    }

    pub fn rating(&self, id: CredentialId, rater: &Identity) -> Option<Rating> {
        self.lock().rating(id, rater).cloned()
    }

    pub fn achievement(&self, achievement_id: u64) -> Option<Achievement> {
        self.lock().achievement(achievement_id).cloned()
    }

    pub fn category(&self, id: CredentialId) -> Option<CategoryTags> {
        self.lock().category(id).cloned()
    }

    pub fn prerequisites(&self, id: CredentialId) -> Option<Vec<CredentialId>> {
        self.lock().prerequisites(id).map(<[CredentialId]>::to_vec)
    }

    pub fn upgrade_path(&self, id: CredentialId) -> Option<UpgradePath> {
        self.lock().upgrade_path(id).cloned()
    }

    pub fn endorsement(&self, id: CredentialId, endorser: &Identity) -> Option<Endorsement> {
        self.lock().endorsement(id, endorser).cloned()
    }

    pub fn verification_stats(
        &self,
        id: CredentialId,
        verifier: &Identity,
    ) -> Option<VerificationStats> {
        self.lock().verification_stats(id, verifier).cloned()
    }

    pub fn notification_settings(&self, id: CredentialId) -> Option<NotificationSettings> {
        self.lock().notification_settings(id).cloned()
    }
}
