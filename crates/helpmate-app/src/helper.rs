// Rust guideline compliant 2026-10-14

//! Helper profiles, moderation, ranking and earnings.

use crate::audit::{AuditEntry, AuditSink};
use crate::error::Result;
use crate::marketplace::Marketplace;
use crate::notify::Notifier;
use helpmate_core::earnings::summarize;
use helpmate_core::{
    filter_eligible, rank, BookingStatus, CandidateQuery, EarningsSummary, Entity, Error,
    HelperProfile, HelperStanding, Metadata, RankedCandidate, Store, VerificationStatus,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator decision on a helper profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelperModeration {
    /// Verify and activate the helper.
    Approve,
    /// Fail verification and deactivate the helper.
    Reject,
    /// Deactivate without touching verification.
    Suspend,
}

impl HelperModeration {
    /// Returns the action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HelperModeration::Approve => "approved",
            HelperModeration::Reject => "rejected",
            HelperModeration::Suspend => "suspended",
        }
    }

    /// Returns the profile fields the decision writes.
    pub fn standing(&self) -> HelperStanding {
        match self {
            HelperModeration::Approve => HelperStanding {
                verification: Some(VerificationStatus::Approved),
                is_active: true,
            },
            HelperModeration::Reject => HelperStanding {
                verification: Some(VerificationStatus::Rejected),
                is_active: false,
            },
            HelperModeration::Suspend => HelperStanding {
                verification: None,
                is_active: false,
            },
        }
    }
}

impl fmt::Display for HelperModeration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<S: Store, N: Notifier, A: AuditSink> Marketplace<S, N, A> {
    /// Builds a profile with the configured starting reliability score.
    pub fn new_helper_profile(&self, helper_id: &str) -> HelperProfile {
        HelperProfile::new(helper_id.to_string(), self.config.default_reliability_score)
    }

    /// Inserts or replaces a helper profile.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the profile is malformed.
    pub fn register_helper(&self, profile: &HelperProfile) -> Result<()> {
        self.store.upsert_helper(profile)?;
        tracing::debug!(helper_id = %profile.id, "Helper profile saved");
        Ok(())
    }

    /// Returns a helper profile.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the helper has no profile.
    pub fn get_helper(&self, helper_id: &str) -> Result<HelperProfile> {
        self.store
            .get_helper(helper_id)?
            .ok_or_else(|| Error::not_found(Entity::Helper, helper_id).into())
    }

    /// Applies an operator decision to a helper profile.
    ///
    /// # Arguments
    ///
    /// * `helper_id` - Helper to moderate
    /// * `admin_id` - Operator making the decision
    /// * `action` - Approve, reject or suspend
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the helper has no profile.
    pub fn moderate_helper(
        &self,
        helper_id: &str,
        admin_id: &str,
        action: HelperModeration,
    ) -> Result<HelperProfile> {
        let profile = self
            .store
            .set_helper_standing(helper_id, action.standing())?
            .ok_or_else(|| Error::not_found(Entity::Helper, helper_id))?;
        tracing::debug!(helper_id, %action, is_active = profile.is_active, "Helper moderated");

        self.audit(AuditEntry::helper(
            admin_id,
            &format!("helper.{}", action),
            helper_id,
            Metadata::new()
                .with("verification", profile.verification.as_str())
                .with("is_active", profile.is_active),
            self.now()?,
        ));
        Ok(profile)
    }

    /// Ranks stored helpers against a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the profiles cannot be read.
    pub fn rank_helpers(&self, query: &CandidateQuery) -> Result<Vec<RankedCandidate>> {
        let profiles = self.store.list_helpers()?;
        let candidates = filter_eligible(&profiles, query, self.config.default_distance_km);
        tracing::debug!(
            category_id = %query.category_id,
            profiles = profiles.len(),
            eligible = candidates.len(),
            "Ranking helpers"
        );
        Ok(rank(candidates, &query.preferences))
    }

    /// Summarises a helper's paid earnings as of `now`.
    ///
    /// Only payments on the helper's `completed` and `paid` bookings count.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or `now` is out of range.
    pub fn helper_earnings(&self, helper_id: &str, now: i64) -> Result<EarningsSummary> {
        let mut payments = Vec::new();
        for booking in self.store.list_bookings_for_user(helper_id)? {
            let finished = matches!(booking.status, BookingStatus::Completed | BookingStatus::Paid);
            if finished && booking.helper_id() == Some(helper_id) {
                payments.extend(self.store.list_payments(&booking.id)?);
            }
        }
        Ok(summarize(&payments, self.config.commission_percent, now)?)
    }
}
