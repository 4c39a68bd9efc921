// src/models/delegation.rs
//! Delegated issuance authority data model.

use serde::{Deserialize, Serialize};

use crate::models::credential::Identity;

/// A grant of time-boxed issuance authority from a delegator to a delegate.
///
/// A stored delegation is only *potentially* valid: whether it currently
/// authorizes the delegate is re-derived on every check from this record
/// plus the delegator's live authorization status. Revoking the delegator's
/// own authorization therefore silently invalidates all of their delegations
/// without touching these records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    /// Issuer who granted the delegation; must still be authorized for the
    /// delegation to be honored
    pub delegator: Identity,

    /// Time-counter value at which the delegation lapses
    pub expiry: u64,

    /// Cleared when the delegator explicitly revokes the delegation
    pub active: bool,
}
