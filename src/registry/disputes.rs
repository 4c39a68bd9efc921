// src/registry/disputes.rs
//! Dispute filing and issuer responses.
//!
//! Disputes attach to certifications without touching the authoritative
//! record: filing or resolving a dispute never changes the revocation flag
//! or the expiry time. Each certification can be disputed at most once,
//! ever; the record is kept forever and only its response and status fields
//! are overwritten by the issuer.

use log::info;

use crate::models::credential::{CredentialId, Identity};
use crate::models::dispute::{Dispute, STATUS_PENDING};
use crate::registry::{CertificationRegistry, RegistryError, RegistryResult};

impl CertificationRegistry {
    /// Files a dispute against a certification.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotRecipient`] if the caller is not the current
    /// recipient; [`RegistryError::AlreadyDisputed`] if a dispute was ever
    /// filed for this certification, including resolved ones.
    pub fn file_dispute(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        reason: String,
        now: u64,
    ) -> RegistryResult<()> {
        let record = self.record(id)?;
        if caller != &record.recipient {
            return Err(RegistryError::NotRecipient);
        }
        if self.disputes.contains_key(&id) {
            return Err(RegistryError::AlreadyDisputed(id));
        }
        info!("dispute filed against certification {} by {}", id, caller);
        self.disputes.insert(
            id,
            Dispute {
                reason,
                disputant: caller.clone(),
                issuer_response: String::new(),
                status: STATUS_PENDING.to_string(),
                filed_at: now,
            },
        );
        Ok(())
    }

    /// Records the issuer's response to a dispute.
    ///
    /// Overwrites the response and status fields with the supplied text.
    /// `new_status` is free text; the conventional values are the status
    /// constants in `models::dispute` but nothing is validated against them.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the issuer of
    /// record; [`RegistryError::NoDispute`] if no dispute is on file.
    pub fn respond_to_dispute(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        response: String,
        new_status: String,
    ) -> RegistryResult<()> {
        let issuer = self.record(id)?.issuer.clone();
        if caller != &issuer {
            return Err(RegistryError::NotAuthorized);
        }
        let dispute = self
            .disputes
            .get_mut(&id)
            .ok_or(RegistryError::NoDispute(id))?;
        info!("issuer {} responded to dispute on certification {}", caller, id);
        dispute.issuer_response = response;
        dispute.status = new_status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dispute::{STATUS_REJECTED, STATUS_RESOLVED};
    use crate::registry::testing::{issue_sample, registry_with_issuer};

    #[test]
    fn only_the_recipient_may_file() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        assert_eq!(
            registry.file_dispute(&issuer, id, "wrong level".to_string(), 20),
            Err(RegistryError::NotRecipient)
        );
        assert_eq!(
            registry.file_dispute(&Identity::new("recipient-1"), 99, "x".to_string(), 20),
            Err(RegistryError::InvalidCredential(99))
        );

        registry
            .file_dispute(
                &Identity::new("recipient-1"),
                id,
                "wrong level".to_string(),
                20,
            )
            .unwrap();

        let dispute = registry.certification_dispute(id).unwrap();
        assert_eq!(dispute.status, STATUS_PENDING);
        assert_eq!(dispute.disputant, Identity::new("recipient-1"));
        assert_eq!(dispute.reason, "wrong level");
        assert_eq!(dispute.issuer_response, "");
        assert_eq!(dispute.filed_at, 20);
    }

    #[test]
    fn disputes_are_single_use_even_after_resolution() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);
        let recipient = Identity::new("recipient-1");

        registry
            .file_dispute(&recipient, id, "wrong level".to_string(), 20)
            .unwrap();
        registry
            .respond_to_dispute(
                &issuer,
                id,
                "level corrected".to_string(),
                STATUS_RESOLVED.to_string(),
            )
            .unwrap();

        assert_eq!(
            registry.file_dispute(&recipient, id, "still wrong".to_string(), 30),
            Err(RegistryError::AlreadyDisputed(id))
        );
    }

    #[test]
    fn response_requires_issuer_and_existing_dispute() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        assert_eq!(
            registry.respond_to_dispute(&issuer, id, "ok".to_string(), "done".to_string()),
            Err(RegistryError::NoDispute(id))
        );

        registry
            .file_dispute(&Identity::new("recipient-1"), id, "reason".to_string(), 20)
            .unwrap();

        assert_eq!(
            registry.respond_to_dispute(
                &Identity::new("recipient-1"),
                id,
                "ok".to_string(),
                "done".to_string()
            ),
            Err(RegistryError::NotAuthorized)
        );

        // Status is free text; any value is accepted.
        registry
            .respond_to_dispute(&issuer, id, "see appendix".to_string(), "escalated".to_string())
            .unwrap();
        let dispute = registry.certification_dispute(id).unwrap();
        assert_eq!(dispute.status, "escalated");
        assert_eq!(dispute.issuer_response, "see appendix");
    }

    #[test]
    fn disputes_never_touch_the_authoritative_record() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);
        let before = registry.certification_details(id).unwrap().clone();

        registry
            .file_dispute(&Identity::new("recipient-1"), id, "reason".to_string(), 20)
            .unwrap();
        registry
            .respond_to_dispute(
                &issuer,
                id,
                "response".to_string(),
                STATUS_REJECTED.to_string(),
            )
            .unwrap();

        assert_eq!(registry.certification_details(id).unwrap(), &before);
    }
}
