// src/models/auxiliary.rs
//! Auxiliary metadata attached to certifications.
//!
//! These records reference certifications but never gate the registry's own
//! validity logic: ratings, achievements, categories, prerequisites, upgrade
//! paths, endorsements, verification history, and notification preferences
//! all live in their own keyed maps alongside the authoritative store.

use serde::{Deserialize, Serialize};

use crate::models::credential::CredentialId;

/// Highest score a rater may assign.
pub const MAX_RATING: u32 = 5;

/// A caller's rating of a certification, keyed by (certification, rater).
///
/// Any caller may rate, including the recipient or issuer, and ratings may
/// reference certifications that were never issued. A rater's newer rating
/// overwrites their older one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    /// Score in `0..=5`
    pub score: u32,

    /// Free-form comment
    pub comment: String,

    /// Time-counter value when the rating was recorded
    pub rated_at: u64,
}

/// An issuer-awarded achievement linked to a certification.
///
/// Achievements carry their own monotonic identifier, allocated
/// independently of certification ids.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    /// Certification the achievement is attached to
    pub credential_id: CredentialId,

    /// Short achievement title
    pub title: String,

    /// Longer description
    pub description: String,

    /// Time-counter value when awarded
    pub awarded_at: u64,
}

/// Issuer-assigned category and tags for a certification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryTags {
    pub category: String,
    pub tags: Vec<String>,
}

/// An issuer-declared upgrade path from one certification to another.
///
/// Purely informational: the upgrade operation validates against this record
/// but records no state change of its own.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpgradePath {
    /// Certification the source can be upgraded to
    pub target_id: CredentialId,

    /// Time-counter value when the path was declared
    pub set_at: u64,
}

/// An endorsement of a certification by an authorized issuer.
///
/// Keyed by (certification, endorser); any currently authorized issuer may
/// endorse, not just the certification's own issuer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Endorsement {
    /// Time-counter value when the endorsement was recorded
    pub endorsed_at: u64,
}

/// Per-(certification, verifier) history of successful logged verifications.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationStats {
    /// Number of successful logged verifications; never reset
    pub count: u64,

    /// Time-counter value of the most recent successful verification
    pub last_verified: u64,
}

/// Recipient-managed notification preferences for a certification.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationSettings {
    pub expiry_reminders: bool,
    pub dispute_alerts: bool,
    pub endorsement_alerts: bool,
}
