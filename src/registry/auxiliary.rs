// src/registry/auxiliary.rs
//! Ratings, achievements, and other attached metadata.
//!
//! These operations write to their own keyed maps and never alter the
//! authoritative certification fields. Most are gated on the certification's
//! issuer of record; ratings are open to any caller, and endorsements to any
//! currently authorized issuer.

use log::{debug, info};

use crate::models::auxiliary::{
    Achievement, CategoryTags, Endorsement, NotificationSettings, Rating, UpgradePath, MAX_RATING,
};
use crate::models::credential::{CredentialId, Identity};
use crate::registry::{CertificationRegistry, RegistryError, RegistryResult};

impl CertificationRegistry {
    /// Records the caller's rating of a certification.
    ///
    /// The score bound is checked before anything else, so an out-of-range
    /// score is rejected even for certifications that were never issued.
    /// No existence or self-rating checks are performed, and a caller's new
    /// rating overwrites their previous one.
    ///
    /// # Errors
    /// [`RegistryError::InvalidRating`] if `score` exceeds [`MAX_RATING`].
    pub fn rate(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        score: u32,
        comment: String,
        now: u64,
    ) -> RegistryResult<()> {
        if score > MAX_RATING {
            return Err(RegistryError::InvalidRating(score));
        }
        self.ratings.insert(
            (id, caller.clone()),
            Rating {
                score,
                comment,
                rated_at: now,
            },
        );
        Ok(())
    }

    /// Awards an achievement linked to a certification.
    ///
    /// Achievement ids come from their own strictly incrementing counter,
    /// starting at 0.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the issuer of
    /// record.
    pub fn add_achievement(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        title: String,
        description: String,
        now: u64,
    ) -> RegistryResult<u64> {
        let issuer = self.record(id)?.issuer.clone();
        if caller != &issuer {
            return Err(RegistryError::NotAuthorized);
        }
        let achievement_id = self.next_achievement_id;
        info!("achievement {} ({}) awarded on certification {}", achievement_id, title, id);
        self.achievements.insert(
            achievement_id,
            Achievement {
                credential_id: id,
                title,
                description,
                awarded_at: now,
            },
        );
        self.next_achievement_id += 1;
        Ok(achievement_id)
    }

    /// Assigns a category and tags to a certification, overwriting any
    /// previous assignment.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the issuer of
    /// record.
    pub fn set_category(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        category: String,
        tags: Vec<String>,
    ) -> RegistryResult<()> {
        let issuer = self.record(id)?.issuer.clone();
        if caller != &issuer {
            return Err(RegistryError::NotAuthorized);
        }
        self.categories.insert(id, CategoryTags { category, tags });
        Ok(())
    }

    /// Declares the prerequisite certifications for a certification.
    ///
    /// The list is stored as given; prerequisite ids are not resolved
    /// against the store.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the issuer of
    /// record.
    pub fn set_prerequisites(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        prerequisite_ids: Vec<CredentialId>,
    ) -> RegistryResult<()> {
        let issuer = self.record(id)?.issuer.clone();
        if caller != &issuer {
            return Err(RegistryError::NotAuthorized);
        }
        self.prerequisites.insert(id, prerequisite_ids);
        Ok(())
    }

    /// Declares an upgrade path from one certification to another.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the source id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the source's
    /// issuer of record.
    pub fn set_upgrade_path(
        &mut self,
        caller: &Identity,
        source_id: CredentialId,
        target_id: CredentialId,
        now: u64,
    ) -> RegistryResult<()> {
        let issuer = self.record(source_id)?.issuer.clone();
        if caller != &issuer {
            return Err(RegistryError::NotAuthorized);
        }
        self.upgrade_paths
            .insert(source_id, UpgradePath { target_id, set_at: now });
        Ok(())
    }

    /// Validates an upgrade against the declared path.
    ///
    /// This checks that the source exists, that the caller is its issuer,
    /// and that a path to exactly `target_id` was declared. It records no
    /// state change on either certification.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] with the source id if the source
    /// is unknown, or with the target id if no matching path is declared;
    /// [`RegistryError::NotAuthorized`] if the caller is not the source's
    /// issuer of record.
    pub fn upgrade(
        &self,
        caller: &Identity,
        source_id: CredentialId,
        target_id: CredentialId,
    ) -> RegistryResult<()> {
        let issuer = &self.record(source_id)?.issuer;
        if caller != issuer {
            return Err(RegistryError::NotAuthorized);
        }
        match self.upgrade_paths.get(&source_id) {
            Some(path) if path.target_id == target_id => {
                debug!("upgrade {} -> {} validated", source_id, target_id);
                Ok(())
            }
            _ => Err(RegistryError::InvalidCredential(target_id)),
        }
    }

    /// Records an endorsement of a certification by the caller.
    ///
    /// Any currently authorized issuer may endorse, not just the
    /// certification's own issuer; re-endorsing refreshes the timestamp.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not an authorized
    /// issuer.
    pub fn endorse(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        now: u64,
    ) -> RegistryResult<()> {
        self.record(id)?;
        if !self.is_authorized_issuer(caller) {
            return Err(RegistryError::NotAuthorized);
        }
        self.endorsements
            .insert((id, caller.clone()), Endorsement { endorsed_at: now });
        Ok(())
    }

    /// Stores the recipient's notification preferences for a certification.
    ///
    /// # Errors
    /// [`RegistryError::InvalidCredential`] if the id is unknown;
    /// [`RegistryError::NotAuthorized`] if the caller is not the current
    /// recipient.
    pub fn set_notification_settings(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        settings: NotificationSettings,
    ) -> RegistryResult<()> {
        let recipient = self.record(id)?.recipient.clone();
        if caller != &recipient {
            return Err(RegistryError::NotAuthorized);
        }
        self.notification_settings.insert(id, settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::{issue_sample, owner, registry, registry_with_issuer};

    #[test]
    fn rating_bound_is_checked_before_existence() {
        let mut registry = registry();
        let rater = Identity::new("rater");

        // Nonexistent certification, out-of-range score: the score loses.
        assert_eq!(
            registry.rate(&rater, 999, 6, "great".to_string(), 10),
            Err(RegistryError::InvalidRating(6))
        );
        // Nonexistent certification, in-range score: accepted.
        registry.rate(&rater, 999, 5, "great".to_string(), 10).unwrap();
        assert_eq!(registry.rating(999, &rater).unwrap().score, 5);
    }

    #[test]
    fn raters_overwrite_their_own_rating_only() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");

        registry.rate(&alice, id, 2, "meh".to_string(), 10).unwrap();
        registry.rate(&bob, id, 5, "solid".to_string(), 11).unwrap();
        registry.rate(&alice, id, 4, "better now".to_string(), 12).unwrap();

        assert_eq!(registry.rating(id, &alice).unwrap().score, 4);
        assert_eq!(registry.rating(id, &alice).unwrap().comment, "better now");
        assert_eq!(registry.rating(id, &bob).unwrap().score, 5);
    }

    #[test]
    fn achievement_ids_are_contiguous_from_zero() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        let first = registry
            .add_achievement(&issuer, id, "Top Graduate".to_string(), String::new(), 20)
            .unwrap();
        let second = registry
            .add_achievement(&issuer, id, "Mentor".to_string(), String::new(), 21)
            .unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 1);

        let achievement = registry.achievement(first).unwrap();
        assert_eq!(achievement.credential_id, id);
        assert_eq!(achievement.title, "Top Graduate");
        assert_eq!(achievement.awarded_at, 20);
    }

    #[test]
    fn achievements_are_issuer_gated() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        assert_eq!(
            registry.add_achievement(
                &Identity::new("recipient-1"),
                id,
                "Self Award".to_string(),
                String::new(),
                20
            ),
            Err(RegistryError::NotAuthorized)
        );
        assert_eq!(
            registry.add_achievement(&issuer, 99, "Ghost".to_string(), String::new(), 20),
            Err(RegistryError::InvalidCredential(99))
        );
    }

    #[test]
    fn category_and_prerequisites_are_issuer_gated_overwrites() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);

        registry
            .set_category(&issuer, id, "Engineering".to_string(), vec!["web".to_string()])
            .unwrap();
        registry
            .set_category(&issuer, id, "Software".to_string(), vec!["backend".to_string()])
            .unwrap();
        assert_eq!(registry.category(id).unwrap().category, "Software");

        registry.set_prerequisites(&issuer, id, vec![3, 7]).unwrap();
        assert_eq!(registry.prerequisites(id).unwrap(), &[3, 7]);

        assert_eq!(
            registry.set_category(
                &Identity::new("recipient-1"),
                id,
                "X".to_string(),
                Vec::new()
            ),
            Err(RegistryError::NotAuthorized)
        );
        assert_eq!(
            registry.set_prerequisites(&Identity::new("recipient-1"), id, Vec::new()),
            Err(RegistryError::NotAuthorized)
        );
    }

    #[test]
    fn upgrade_validates_without_mutating() {
        let (mut registry, issuer) = registry_with_issuer();
        let source = issue_sample(&mut registry, &issuer);
        let target = issue_sample(&mut registry, &issuer);

        // No path declared yet.
        assert_eq!(
            registry.upgrade(&issuer, source, target),
            Err(RegistryError::InvalidCredential(target))
        );

        registry.set_upgrade_path(&issuer, source, target, 20).unwrap();
        assert_eq!(registry.upgrade_path(source).unwrap().target_id, target);

        // Wrong target does not match the declared path.
        assert_eq!(
            registry.upgrade(&issuer, source, 42),
            Err(RegistryError::InvalidCredential(42))
        );
        assert_eq!(
            registry.upgrade(&Identity::new("recipient-1"), source, target),
            Err(RegistryError::NotAuthorized)
        );

        let source_before = registry.certification_details(source).unwrap().clone();
        let target_before = registry.certification_details(target).unwrap().clone();
        registry.upgrade(&issuer, source, target).unwrap();
        assert_eq!(registry.certification_details(source).unwrap(), &source_before);
        assert_eq!(registry.certification_details(target).unwrap(), &target_before);
    }

    #[test]
    fn any_authorized_issuer_may_endorse() {
        let (mut registry, issuer) = registry_with_issuer();
        let other_issuer = Identity::new("issuer-b");
        registry.add_issuer(&owner(), other_issuer.clone()).unwrap();
        let id = issue_sample(&mut registry, &issuer);

        registry.endorse(&other_issuer, id, 30).unwrap();
        assert_eq!(registry.endorsement(id, &other_issuer).unwrap().endorsed_at, 30);

        // Re-endorsing refreshes the timestamp.
        registry.endorse(&other_issuer, id, 40).unwrap();
        assert_eq!(registry.endorsement(id, &other_issuer).unwrap().endorsed_at, 40);

        assert_eq!(
            registry.endorse(&Identity::new("recipient-1"), id, 30),
            Err(RegistryError::NotAuthorized)
        );
        assert_eq!(
            registry.endorse(&other_issuer, 99, 30),
            Err(RegistryError::InvalidCredential(99))
        );
    }

    #[test]
    fn notification_settings_are_recipient_gated() {
        let (mut registry, issuer) = registry_with_issuer();
        let id = issue_sample(&mut registry, &issuer);
        let settings = NotificationSettings {
            expiry_reminders: true,
            dispute_alerts: false,
            endorsement_alerts: true,
        };

        assert_eq!(
            registry.set_notification_settings(&issuer, id, settings.clone()),
            Err(RegistryError::NotAuthorized)
        );
        registry
            .set_notification_settings(&Identity::new("recipient-1"), id, settings.clone())
            .unwrap();
        assert_eq!(registry.notification_settings(id), Some(&settings));
    }
}
