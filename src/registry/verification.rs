// src/registry/verification.rs
//! Certification validity checks.
//!
//! Validity is never stored: it is computed on demand from the revocation
//! flag and the expiry time against the host-supplied time counter. The
//! check order is fixed at existence, then revocation, then expiry, so a
//! certification that is both revoked and expired reports revocation.

use log::debug;

use crate::models::auxiliary::VerificationStats;
use crate::models::credential::{Credential, CredentialId, Identity};
use crate::registry::{CertificationRegistry, RegistryError, RegistryResult};

impl CertificationRegistry {
    /// Checks a certification's current validity and returns the record.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::CredentialRevoked`] if revoked;
    /// [`RegistryError::CredentialExpired`] once the time counter has
    /// reached the expiry time.
    pub fn verify(&self, id: CredentialId, now: u64) -> RegistryResult<&Credential> {
        let record = self.record(id)?;
        if record.revoked {
            return Err(RegistryError::CredentialRevoked(id));
        }
        if now >= record.expiry_time {
            return Err(RegistryError::CredentialExpired(id));
        }
        Ok(record)
    }

    /// Like [`verify`](Self::verify), but records the successful check.
    ///
    /// On success the caller's verification counter for this certification
    /// is incremented and the verification timestamp updated; the counter is
    /// never reset. Failed checks leave the history untouched.
    pub fn verify_and_log(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        now: u64,
    ) -> RegistryResult<Credential> {
        let record = self.verify(id, now)?.clone();
        let stats = self
            .verification_stats
            .entry((id, caller.clone()))
            .or_insert_with(VerificationStats::default);
        stats.count += 1;
        stats.last_verified = now;
        debug!(
            "certification {} verified by {} ({} checks so far)",
            id, caller, stats.count
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::{issue_sample, registry, registry_with_issuer};

    #[test]
    fn unknown_id_fails_verification() {
        let registry = registry();
        assert_eq!(registry.verify(0, 10), Err(RegistryError::InvalidCredential(0)));
    }

    #[test]
    fn valid_certification_verifies_for_anyone() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        let record = registry.verify(id, 50).unwrap();
        assert!(!record.revoked);
        assert_eq!(record.skill, "Full Stack Development");
    }

    #[test]
    fn expiry_is_inclusive_of_the_boundary() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer); // expiry 100

        assert!(registry.verify(id, 99).is_ok());
        assert_eq!(registry.verify(id, 100), Err(RegistryError::CredentialExpired(id)));
        assert_eq!(registry.verify(id, 101), Err(RegistryError::CredentialExpired(id)));
    }

    #[test]
    fn revocation_dominates_expiry() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);
        registry.revoke(&issuer, id).unwrap();

        // Revoked but not expired.
        assert_eq!(registry.verify(id, 50), Err(RegistryError::CredentialRevoked(id)));
        // Revoked and expired: still reports revocation.
        assert_eq!(registry.verify(id, 500), Err(RegistryError::CredentialRevoked(id)));
    }

    #[test]
    fn renewal_does_not_clear_revocation() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);
        registry.revoke(&issuer, id).unwrap();
        registry.renew(&issuer, id, 200).unwrap();

        assert_eq!(registry.verify(id, 50), Err(RegistryError::CredentialRevoked(id)));
    }

    #[test]
    fn logged_verification_accumulates_per_caller() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");

        registry.verify_and_log(&alice, id, 20).unwrap();
        registry.verify_and_log(&alice, id, 30).unwrap();
        registry.verify_and_log(&bob, id, 40).unwrap();

        let alice_stats = registry.verification_stats(id, &alice).unwrap();
        assert_eq!(alice_stats.count, 2);
        assert_eq!(alice_stats.last_verified, 30);

        let bob_stats = registry.verification_stats(id, &bob).unwrap();
        assert_eq!(bob_stats.count, 1);
        assert_eq!(bob_stats.last_verified, 40);
    }

    #[test]
    fn failed_checks_are_not_logged() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);
        let alice = Identity::new("alice");

        // Expired at 100.
        assert!(registry.verify_and_log(&alice, id, 100).is_err());
        assert!(registry.verification_stats(id, &alice).is_none());

        registry.verify_and_log(&alice, id, 50).unwrap();
        registry.revoke(&issuer, id).unwrap();
        assert!(registry.verify_and_log(&alice, id, 60).is_err());

        let stats = registry.verification_stats(id, &alice).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.last_verified, 50);
    }
}
