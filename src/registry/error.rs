// src/registry/error.rs
//! Error type for registry operations.
//!
//! Every failure a caller can observe maps to exactly one variant, and every
//! failure is a deterministic function of registry state and call input:
//! replaying an identical call against identical state fails identically.
//! A failed operation leaves the registry untouched.

use thiserror::Error;

use crate::models::credential::CredentialId;

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Caller-visible failure of a registry operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Caller lacks the role or delegation the operation requires.
    #[error("caller is not authorized to perform this operation")]
    NotAuthorized,

    /// The referenced certification id is unknown, either in the store or as
    /// an upgrade target.
    #[error("unknown certification {0}")]
    InvalidCredential(CredentialId),

    /// The certification has been revoked by its issuer.
    #[error("certification {0} has been revoked")]
    CredentialRevoked(CredentialId),

    /// The certification's expiry time has passed.
    #[error("certification {0} has expired")]
    CredentialExpired(CredentialId),

    /// Rating score above the allowed maximum.
    #[error("rating {0} exceeds the maximum of 5")]
    InvalidRating(u32),

    /// Certification level above the allowed maximum.
    #[error("level {0} exceeds the maximum of 3")]
    InvalidLevel(u32),

    /// A dispute already exists for this certification; disputes are
    /// single-use per certification, even after resolution.
    #[error("certification {0} already has a dispute on file")]
    AlreadyDisputed(CredentialId),

    /// Only the current recipient may file a dispute.
    #[error("caller is not the recipient of the certification")]
    NotRecipient,

    /// No dispute exists for the certification.
    #[error("certification {0} has no dispute on file")]
    NoDispute(CredentialId),
}

impl RegistryError {
    /// Stable machine-readable code for this failure, used verbatim in API
    /// error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::NotAuthorized => "NotAuthorized",
            RegistryError::InvalidCredential(_) => "InvalidCredential",
            RegistryError::CredentialRevoked(_) => "CredentialRevoked",
            RegistryError::CredentialExpired(_) => "CredentialExpired",
            RegistryError::InvalidRating(_) => "InvalidRating",
            RegistryError::InvalidLevel(_) => "InvalidLevel",
            RegistryError::AlreadyDisputed(_) => "AlreadyDisputed",
            RegistryError::NotRecipient => "NotRecipient",
            RegistryError::NoDispute(_) => "NoDispute",
        }
    }
}
