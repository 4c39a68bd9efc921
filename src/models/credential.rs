// src/models/credential.rs
//! Certification record data model.
//!
//! Defines the authoritative record stored per issued certification, together
//! with the identity type used for issuers, recipients, and every other
//! caller role in the system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of the `skill` field, in characters.
pub const MAX_SKILL_LEN: usize = 64;

/// Maximum length of the `metadata` field, in characters.
pub const MAX_METADATA_LEN: usize = 256;

/// Highest certification level an issuer may assign.
pub const MAX_LEVEL: u32 = 3;

/// Level assigned to every newly issued certification.
pub const DEFAULT_LEVEL: u32 = 1;

/// Unique identifier of a certification record.
///
/// Allocated from a strictly incrementing counter starting at 0 and never
/// reused, even for revoked records.
pub type CredentialId = u64;

/// An opaque caller/account reference.
///
/// Identities are supplied by the host with each call and are only ever
/// compared for equality; the registry attaches no further meaning to their
/// contents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a raw identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Identity(id.into())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single certification record.
///
/// Created exclusively by an authorized issuance path and never deleted.
/// Validity is not stored on the record: it is derived at verification time
/// from the `revoked` flag and `expiry_time` against the current time
/// counter.
///
/// # Fields
/// - `issuer` is the *authoritative* issuer of record. Under delegated
///   issuance this is the delegator, not the delegate who made the call, so
///   revocation and renewal rights stay with the delegator.
/// - `expiry_time` is caller-supplied and not checked against `issue_time`.
/// - `revoked` only ever transitions from `false` to `true`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Monotonically assigned unique identifier
    pub id: CredentialId,

    /// Current holder of the certification (tracks the ownership token)
    pub recipient: Identity,

    /// Issuer of record; holds revocation and renewal rights
    pub issuer: Identity,

    /// Certified skill, at most [`MAX_SKILL_LEN`] characters
    pub skill: String,

    /// Time-counter value at issuance
    pub issue_time: u64,

    /// Time-counter value after which the certification no longer verifies
    pub expiry_time: u64,

    /// Revocation flag; monotonic false to true
    pub revoked: bool,

    /// Free-form issuer metadata, at most [`MAX_METADATA_LEN`] characters
    pub metadata: String,

    /// Certification level in `1..=3`, defaults to [`DEFAULT_LEVEL`]
    pub level: u32,
}
