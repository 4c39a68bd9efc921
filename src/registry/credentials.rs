// src/registry/credentials.rs
//! Certification issuance and lifecycle mutations.
//!
//! Every mutating operation re-derives the caller's authorization before
//! touching any map, so a failed call leaves the store exactly as it was.
//! The id counter, the record map, and the ownership token map are only ever
//! written together, inside a single call, after all checks have passed.

use log::info;

use crate::models::credential::{
    Credential, CredentialId, Identity, DEFAULT_LEVEL, MAX_LEVEL,
};
use crate::registry::{CertificationRegistry, RegistryError, RegistryResult};

impl CertificationRegistry {
    /// Issues a new certification as a directly authorized issuer.
    ///
    /// Allocates the next certification id, mints the ownership token to the
    /// recipient, and stores the record with the caller as issuer of record.
    ///
    /// # Arguments
    /// * `recipient` - identity the certification (and its token) is issued to
    /// * `skill` - certified skill text
    /// * `expiry_time` - time-counter value after which verification fails;
    ///   taken as supplied, not checked against `now`
    /// * `metadata` - free-form issuer metadata
    /// * `now` - current time counter, recorded as the issue time
    ///
    /// # Errors
    /// [`RegistryError::NotAuthorized`] if the caller is not on the issuer
    /// allow-list.
    pub fn issue(
        &mut self,
        caller: &Identity,
        recipient: Identity,
        skill: String,
        expiry_time: u64,
        metadata: String,
        now: u64,
    ) -> RegistryResult<CredentialId> {
        if !self.is_authorized_issuer(caller) {
            return Err(RegistryError::NotAuthorized);
        }
        Ok(self.store_new_certification(caller.clone(), recipient, skill, expiry_time, metadata, now))
    }

    /// Issues a new certification on behalf of the caller's delegator.
    ///
    /// The stored issuer of record is the *delegator*, not the calling
    /// delegate, so revocation and renewal rights belong to the delegator.
    ///
    /// # Errors
    /// [`RegistryError::NotAuthorized`] if the caller does not hold a
    /// currently valid delegation.
    pub fn issue_as_delegate(
        &mut self,
        caller: &Identity,
        recipient: Identity,
        skill: String,
        expiry_time: u64,
        metadata: String,
        now: u64,
    ) -> RegistryResult<CredentialId> {
        if !self.is_valid_delegate(caller, now) {
            return Err(RegistryError::NotAuthorized);
        }
        // is_valid_delegate just confirmed the entry exists
        let issuer = self.delegations[caller].delegator.clone();
        Ok(self.store_new_certification(issuer, recipient, skill, expiry_time, metadata, now))
    }

    /// Writes a new record, its token, and the bumped counter in one step.
    fn store_new_certification(
        &mut self,
        issuer: Identity,
        recipient: Identity,
        skill: String,
        expiry_time: u64,
        metadata: String,
        now: u64,
    ) -> CredentialId {
        let id = self.next_id;
        info!("issuing certification {} ({}) by {}", id, skill, issuer);
        self.tokens.insert(id, recipient.clone());
        self.records.insert(
            id,
            Credential {
                id,
                recipient,
                issuer,
                skill,
                issue_time: now,
                expiry_time,
                revoked: false,
                metadata,
                level: DEFAULT_LEVEL,
            },
        );
        self.next_id += 1;
        id
    }

    /// Revokes a certification.
    ///
    /// Idempotent: revoking an already revoked certification is accepted and
    /// changes nothing. The flag never transitions back to false.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the issuer of
    /// record.
    pub fn revoke(&mut self, caller: &Identity, id: CredentialId) -> RegistryResult<()> {
        let issuer = self.record(id)?.issuer.clone();
        if caller != &issuer {
            return Err(RegistryError::NotAuthorized);
        }
        info!("certification {} revoked by {}", id, caller);
        // record(id) above proved the entry exists
        self.records.get_mut(&id).unwrap().revoked = true;
        Ok(())
    }

    /// Replaces a certification's expiry time.
    ///
    /// The new expiry is taken as supplied: no floor against the current
    /// time or the previous expiry, and no revocation check. Renewing a
    /// revoked certification succeeds but does not make it verify again.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the issuer of
    /// record.
    pub fn renew(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        new_expiry: u64,
    ) -> RegistryResult<()> {
        let issuer = self.record(id)?.issuer.clone();
        if caller != &issuer {
            return Err(RegistryError::NotAuthorized);
        }
        self.records.get_mut(&id).unwrap().expiry_time = new_expiry;
        Ok(())
    }

    /// Replaces a certification's expiry time on the strength of a
    /// delegation.
    ///
    /// By default any currently valid delegate may renew any certification;
    /// the delegate's delegator is not matched against the certification's
    /// issuer of record. With `strict_delegate_renewal` enabled the match is
    /// additionally required.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller holds no valid
    /// delegation, or (strict mode only) the caller's delegator is not the
    /// issuer of record.
    pub fn renew_as_delegate(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        new_expiry: u64,
        now: u64,
    ) -> RegistryResult<()> {
        let issuer = self.record(id)?.issuer.clone();
        if !self.is_valid_delegate(caller, now) {
            return Err(RegistryError::NotAuthorized);
        }
        if self.strict_delegate_renewal && self.delegations[caller].delegator != issuer {
            return Err(RegistryError::NotAuthorized);
        }
        self.records.get_mut(&id).unwrap().expiry_time = new_expiry;
        Ok(())
    }

    /// Transfers a certification (and its ownership token) to a new
    /// recipient.
    ///
    /// Only the recipient changes; issuer, skill, expiry, revocation state,
    /// metadata, and level are untouched. The token holder and the record's
    /// recipient are updated together and never diverge.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the current
    /// recipient.
    pub fn transfer(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        new_recipient: Identity,
    ) -> RegistryResult<()> {
        let recipient = self.record(id)?.recipient.clone();
        if caller != &recipient {
            return Err(RegistryError::NotAuthorized);
        }
        info!("certification {} transferred from {} to {}", id, caller, new_recipient);
        self.tokens.insert(id, new_recipient.clone());
        self.records.get_mut(&id).unwrap().recipient = new_recipient;
        Ok(())
    }

    /// Changes a certification's level.
    ///
    /// Levels above [`MAX_LEVEL`] are rejected; there is no lower bound, so
    /// level 0 is accepted.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the issuer of
    /// record; [`RegistryError::InvalidLevel`] if `new_level` exceeds
    /// [`MAX_LEVEL`].
    pub fn update_level(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        new_level: u32,
    ) -> RegistryResult<()> {
        let issuer = self.record(id)?.issuer.clone();
        if caller != &issuer {
            return Err(RegistryError::NotAuthorized);
        }
        if new_level > MAX_LEVEL {
            return Err(RegistryError::InvalidLevel(new_level));
        }
        self.records.get_mut(&id).unwrap().level = new_level;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::{issue_sample, owner, registry_with_issuer};

    #[test]
    fn issuance_assigns_contiguous_ids_from_zero() {
        let (mut registry, issuer) = registry_with_issuer();
        let first = issue_sample(&mut registry, &issuer);
        let second = issue_sample(&mut registry, &issuer);
        assert_eq!(first, 0);
        assert_eq!(second, 1);
    }

    #[test]
    fn issuance_requires_authorization() {
        let (mut registry, _issuer) = registry_with_issuer();
        let result = registry.issue(
            &Identity::new("stranger"),
            Identity::new("recipient-1"),
            "Welding".to_string(),
            100,
            String::new(),
            10,
        );
        assert_eq!(result, Err(RegistryError::NotAuthorized));
        // A rejected call must not consume an id.
        assert_eq!(issue_sample(&mut registry, &Identity::new("issuer-a")), 0);
    }

    #[test]
    fn issuance_populates_record_and_mints_token() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        let record = registry.certification_details(id).unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.issuer, issuer);
        assert_eq!(record.recipient, Identity::new("recipient-1"));
        assert_eq!(record.skill, "Full Stack Development");
        assert_eq!(record.issue_time, 10);
        assert_eq!(record.expiry_time, 100);
        assert!(!record.revoked);
        assert_eq!(record.level, DEFAULT_LEVEL);

        assert_eq!(registry.token_holder(id), Some(&record.recipient));
    }

    #[test]
    fn delegate_issuance_records_the_delegator_as_issuer() {
        let (mut registry, issuer) = registry_with_issuer();
        let delegate = Identity::new("delegate-d");
        registry
            .delegate_authority(&issuer, delegate.clone(), 100, 10)
            .unwrap();

        let id = registry
            .issue_as_delegate(
                &delegate,
                Identity::new("recipient-1"),
                "Data Engineering".to_string(),
                200,
                String::new(),
                20,
            )
            .unwrap();

        let record = registry.certification_details(id).unwrap();
        assert_eq!(record.issuer, issuer);
        assert_ne!(record.issuer, delegate);

        // Lifecycle rights followed the delegator, not the delegate.
        assert_eq!(registry.revoke(&delegate, id), Err(RegistryError::NotAuthorized));
        assert_eq!(registry.renew(&delegate, id, 300), Err(RegistryError::NotAuthorized));
        registry.renew(&issuer, id, 300).unwrap();
        registry.revoke(&issuer, id).unwrap();
    }

    #[test]
    fn expired_delegate_cannot_issue() {
        let (mut registry, issuer) = registry_with_issuer();
        let delegate = Identity::new("delegate-d");
        registry
            .delegate_authority(&issuer, delegate.clone(), 50, 10)
            .unwrap();

        let result = registry.issue_as_delegate(
            &delegate,
            Identity::new("recipient-1"),
            "Data Engineering".to_string(),
            200,
            String::new(),
            60,
        );
        assert_eq!(result, Err(RegistryError::NotAuthorized));
    }

    #[test]
    fn revoke_is_issuer_only_and_idempotent() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        assert_eq!(
            registry.revoke(&Identity::new("recipient-1"), id),
            Err(RegistryError::NotAuthorized)
        );
        assert_eq!(registry.revoke(&issuer, 99), Err(RegistryError::InvalidCredential(99)));

        registry.revoke(&issuer, id).unwrap();
        assert!(registry.certification_details(id).unwrap().revoked);

        // Second revocation is accepted with no observable change.
        registry.revoke(&issuer, id).unwrap();
        assert!(registry.certification_details(id).unwrap().revoked);
    }

    #[test]
    fn renew_replaces_expiry_unconditionally() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        // Shortening is allowed, even below the issue time.
        registry.renew(&issuer, id, 5).unwrap();
        assert_eq!(registry.certification_details(id).unwrap().expiry_time, 5);

        // So is renewing a revoked certification.
        registry.revoke(&issuer, id).unwrap();
        registry.renew(&issuer, id, 200).unwrap();
        assert_eq!(registry.certification_details(id).unwrap().expiry_time, 200);
        assert!(registry.certification_details(id).unwrap().revoked);
    }

    #[test]
    fn any_valid_delegate_may_renew_by_default() {
        let (mut registry, issuer_a) = registry_with_issuer();
        let issuer_b = Identity::new("issuer-b");
        registry.add_issuer(&owner(), issuer_b.clone()).unwrap();

        // Certification issued by issuer-a; delegate belongs to issuer-b.
        let id = issue_sample(&mut registry, &issuer_a);
        let delegate = Identity::new("delegate-of-b");
        registry
            .delegate_authority(&issuer_b, delegate.clone(), 100, 10)
            .unwrap();

        registry.renew_as_delegate(&delegate, id, 500, 20).unwrap();
        assert_eq!(registry.certification_details(id).unwrap().expiry_time, 500);
    }

    #[test]
    fn strict_mode_matches_delegator_against_issuer_of_record() {
        let (registry, issuer_a) = registry_with_issuer();
        let mut registry = registry.with_strict_delegate_renewal(true);
        let issuer_b = Identity::new("issuer-b");
        registry.add_issuer(&owner(), issuer_b.clone()).unwrap();

        let id = issue_sample(&mut registry, &issuer_a);
        let foreign_delegate = Identity::new("delegate-of-b");
        let own_delegate = Identity::new("delegate-of-a");
        registry
            .delegate_authority(&issuer_b, foreign_delegate.clone(), 100, 10)
            .unwrap();
        registry
            .delegate_authority(&issuer_a, own_delegate.clone(), 100, 10)
            .unwrap();

        assert_eq!(
            registry.renew_as_delegate(&foreign_delegate, id, 500, 20),
            Err(RegistryError::NotAuthorized)
        );
        registry.renew_as_delegate(&own_delegate, id, 500, 20).unwrap();
    }

    #[test]
    fn transfer_moves_token_and_recipient_only() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);
        let before = registry.certification_details(id).unwrap().clone();

        let old_recipient = Identity::new("recipient-1");
        let new_recipient = Identity::new("recipient-2");

        assert_eq!(
            registry.transfer(&issuer, id, new_recipient.clone()),
            Err(RegistryError::NotAuthorized)
        );
        registry
            .transfer(&old_recipient, id, new_recipient.clone())
            .unwrap();

        let after = registry.certification_details(id).unwrap();
        assert_eq!(after.recipient, new_recipient);
        assert_eq!(registry.token_holder(id), Some(&new_recipient));
        assert_eq!(after.issuer, before.issuer);
        assert_eq!(after.skill, before.skill);
        assert_eq!(after.expiry_time, before.expiry_time);
        assert_eq!(after.revoked, before.revoked);
        assert_eq!(after.level, before.level);

        // The old recipient lost transfer rights with the token.
        assert_eq!(
            registry.transfer(&old_recipient, id, Identity::new("recipient-3")),
            Err(RegistryError::NotAuthorized)
        );
    }

    #[test]
    fn level_updates_enforce_only_the_upper_bound() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        assert_eq!(
            registry.update_level(&issuer, id, 4),
            Err(RegistryError::InvalidLevel(4))
        );
        assert_eq!(
            registry.update_level(&Identity::new("recipient-1"), id, 2),
            Err(RegistryError::NotAuthorized)
        );

        registry.update_level(&issuer, id, 3).unwrap();
        assert_eq!(registry.certification_details(id).unwrap().level, 3);

        // No lower bound is enforced.
        registry.update_level(&issuer, id, 0).unwrap();
        assert_eq!(registry.certification_details(id).unwrap().level, 0);
    }
}
