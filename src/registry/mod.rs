// src/registry/mod.rs
//! The certification registry core.
//!
//! [`CertificationRegistry`] owns every keyed map in the system and exposes
//! synchronous, call-style operations over them. Each operation addresses
//! exactly one record (or one composite key), re-derives the caller's
//! authorization from scratch, and either completes fully or returns an
//! error before the first write. There is no way to enumerate records:
//! callers that need listings must maintain their own index from the point
//! lookups exposed here.
//!
//! Operations are grouped by concern across the submodules:
//! - [`authorization`]: issuer allow-list and delegations
//! - [`credentials`]: issuance and lifecycle mutations
//! - [`verification`]: validity checks and verification logging
//! - [`disputes`]: dispute filing and issuer responses
//! - [`auxiliary`]: ratings, achievements, and other attached metadata

mod authorization;
mod auxiliary;
mod credentials;
mod disputes;
mod error;
mod verification;

pub use error::{RegistryError, RegistryResult};

use std::collections::HashMap;

use crate::models::auxiliary::{
    Achievement, CategoryTags, Endorsement, NotificationSettings, Rating, UpgradePath,
    VerificationStats,
};
use crate::models::credential::{Credential, CredentialId, Identity};
use crate::models::delegation::Delegation;
use crate::models::dispute::Dispute;

/// In-memory certification registry.
///
/// All state lives in keyed maps plus two monotonic counters; the host is
/// responsible for persistence and for serializing calls (see
/// `services::RegistryService`, which wraps the whole registry in a single
/// mutex so cross-key reads observe a consistent snapshot).
pub struct CertificationRegistry {
    /// Fixed administrator identity, set at construction; only the owner may
    /// manage the issuer allow-list. The registry provides no owner transfer.
    owner: Identity,

    /// When set, delegate renewals additionally require the delegate's
    /// delegator to match the certification's issuer of record.
    strict_delegate_renewal: bool,

    /// Issuer allow-list; absence means not authorized
    issuers: HashMap<Identity, bool>,

    /// Delegations keyed by delegate identity
    delegations: HashMap<Identity, Delegation>,

    /// Authoritative certification records
    records: HashMap<CredentialId, Credential>,

    /// Ownership token holder per certification; always equals the record's
    /// recipient
    tokens: HashMap<CredentialId, Identity>,

    /// Next certification id; strictly incrementing from 0
    next_id: CredentialId,

    /// At most one dispute per certification, kept forever
    disputes: HashMap<CredentialId, Dispute>,

    /// Ratings keyed by (certification, rater)
    ratings: HashMap<(CredentialId, Identity), Rating>,

    /// Achievements by their own monotonic id
    achievements: HashMap<u64, Achievement>,

    /// Next achievement id; strictly incrementing from 0
    next_achievement_id: u64,

    /// Category and tags per certification
    categories: HashMap<CredentialId, CategoryTags>,

    /// Prerequisite certification ids per certification
    prerequisites: HashMap<CredentialId, Vec<CredentialId>>,

    /// Declared upgrade paths keyed by source certification
    upgrade_paths: HashMap<CredentialId, UpgradePath>,

    /// Endorsements keyed by (certification, endorser)
    endorsements: HashMap<(CredentialId, Identity), Endorsement>,

    /// Logged-verification history keyed by (certification, verifier)
    verification_stats: HashMap<(CredentialId, Identity), VerificationStats>,

    /// Notification preferences per certification
    notification_settings: HashMap<CredentialId, NotificationSettings>,
}

impl CertificationRegistry {
    /// Creates an empty registry administered by `owner`.
    pub fn new(owner: Identity) -> Self {
        CertificationRegistry {
            owner,
            strict_delegate_renewal: false,
            issuers: HashMap::new(),
            delegations: HashMap::new(),
            records: HashMap::new(),
            tokens: HashMap::new(),
            next_id: 0,
            disputes: HashMap::new(),
            ratings: HashMap::new(),
            achievements: HashMap::new(),
            next_achievement_id: 0,
            categories: HashMap::new(),
            prerequisites: HashMap::new(),
            upgrade_paths: HashMap::new(),
            endorsements: HashMap::new(),
            verification_stats: HashMap::new(),
            notification_settings: HashMap::new(),
        }
    }

    /// Enables or disables the stricter delegate-renewal check.
    pub fn with_strict_delegate_renewal(mut self, strict: bool) -> Self {
        self.strict_delegate_renewal = strict;
        self
    }

    // =====================
    // Read-only point lookups
    // =====================

    /// Full record for a certification, regardless of validity.
    pub fn certification_details(&self, id: CredentialId) -> Option<&Credential> {
        self.records.get(&id)
    }

    /// Current holder of a certification's ownership token.
    pub fn token_holder(&self, id: CredentialId) -> Option<&Identity> {
        self.tokens.get(&id)
    }

    /// The dispute on file for a certification, if any.
    pub fn certification_dispute(&self, id: CredentialId) -> Option<&Dispute> {
        self.disputes.get(&id)
    }

    /// A specific rater's rating of a certification.
    pub fn rating(&self, id: CredentialId, rater: &Identity) -> Option<&Rating> {
        self.ratings.get(&(id, rater.clone()))
    }

    /// An achievement by its own id.
    pub fn achievement(&self, achievement_id: u64) -> Option<&Achievement> {
        self.achievements.get(&achievement_id)
    }

    /// Category and tags assigned to a certification.
    pub fn category(&self, id: CredentialId) -> Option<&CategoryTags> {
        self.categories.get(&id)
    }

    /// Prerequisite certification ids declared for a certification.
    pub fn prerequisites(&self, id: CredentialId) -> Option<&[CredentialId]> {
        self.prerequisites.get(&id).map(Vec::as_slice)
    }

    /// Declared upgrade path out of a certification.
    pub fn upgrade_path(&self, id: CredentialId) -> Option<&UpgradePath> {
        self.upgrade_paths.get(&id)
    }

    /// A specific endorser's endorsement of a certification.
    pub fn endorsement(&self, id: CredentialId, endorser: &Identity) -> Option<&Endorsement> {
        self.endorsements.get(&(id, endorser.clone()))
    }

    /// Logged-verification history for a (certification, verifier) pair.
    pub fn verification_stats(
        &self,
        id: CredentialId,
        verifier: &Identity,
    ) -> Option<&VerificationStats> {
        self.verification_stats.get(&(id, verifier.clone()))
    }

    /// Notification preferences recorded for a certification.
    pub fn notification_settings(&self, id: CredentialId) -> Option<&NotificationSettings> {
        self.notification_settings.get(&id)
    }

    /// Looks up a record, mapping absence to [`RegistryError::InvalidCredential`].
    fn record(&self, id: CredentialId) -> RegistryResult<&Credential> {
        self.records
            .get(&id)
            .ok_or(RegistryError::InvalidCredential(id))
    }
}
