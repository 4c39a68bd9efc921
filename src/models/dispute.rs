// src/models/dispute.rs
//! Dispute record data model.

use serde::{Deserialize, Serialize};

use crate::models::credential::Identity;

/// Status assigned to a newly filed dispute.
pub const STATUS_PENDING: &str = "pending";

/// Conventional status for a dispute the issuer accepted.
pub const STATUS_RESOLVED: &str = "resolved";

/// Conventional status for a dispute the issuer turned down.
pub const STATUS_REJECTED: &str = "rejected";

/// A recipient-filed dispute against a certification.
///
/// At most one dispute ever exists per certification: once filed, the record
/// is never deleted and re-filing is rejected even after the issuer has
/// responded. The issuer's response overwrites `issuer_response` and
/// `status` in place.
///
/// `status` is free text. [`STATUS_PENDING`], [`STATUS_RESOLVED`], and
/// [`STATUS_REJECTED`] are the conventional values but the registry does not
/// validate against them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Dispute {
    /// Recipient-supplied grounds for the dispute
    pub reason: String,

    /// Identity that filed the dispute (the recipient at filing time)
    pub disputant: Identity,

    /// Issuer's response text; empty until the issuer responds
    pub issuer_response: String,

    /// Current status, seeded with [`STATUS_PENDING`]
    pub status: String,

    /// Time-counter value at filing
    pub filed_at: u64,
}
