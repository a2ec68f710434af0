// Rust guideline compliant 2026-10-14

//! Disputes raised against bookings.
//!
//! Either party to a booking can raise a dispute. Operators move it to
//! `investigating` and close it as `resolved` or `rejected`; a closed dispute
//! no longer changes. Disputes do not block escrow release.

use crate::audit::{AuditEntry, AuditSink};
use crate::error::Result;
use crate::marketplace::Marketplace;
use crate::notify::Notifier;
use helpmate_core::{
    CasResult, Dispute, DisputeDecision, DisputeStatus, Entity, Error, Metadata, Store,
};
use serde::{Deserialize, Serialize};

/// Input for raising a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDispute {
    /// Disputed booking.
    pub booking_id: String,
    /// Party raising the dispute.
    pub raised_by: String,
    /// Why the dispute is raised.
    pub reason: String,
    /// References to supporting material.
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl<S: Store, N: Notifier, A: AuditSink> Marketplace<S, N, A> {
    /// Raises a dispute on a booking.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the booking does not exist
    /// - `Forbidden` if the user is not a party to the booking
    /// - A validation error if the reason is empty
    pub fn raise_dispute(&self, input: NewDispute) -> Result<Dispute> {
        let booking = self.load_booking_for(&input.booking_id, &input.raised_by)?;

        let now = self.now()?;
        let dispute = Dispute::new(
            &booking.id,
            &input.raised_by,
            input.reason.trim().to_string(),
            input.evidence,
            now,
        );
        self.store.insert_dispute(&dispute)?;
        tracing::debug!(dispute_id = %dispute.id, booking_id = %booking.id, "Dispute raised");

        self.audit(AuditEntry::booking(
            &input.raised_by,
            "booking.dispute.raised",
            &booking.id,
            Metadata::new()
                .with("dispute_id", dispute.id.as_str())
                .with("reason", dispute.reason.as_str()),
            now,
        ));
        Ok(dispute)
    }

    /// Lists all disputes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list_disputes(&self) -> Result<Vec<Dispute>> {
        Ok(self.store.list_disputes()?)
    }

    /// Records an operator decision on a dispute.
    ///
    /// # Arguments
    ///
    /// * `dispute_id` - Dispute to update
    /// * `resolved_by` - Operator making the decision
    /// * `status` - `investigating`, `resolved` or `rejected`
    /// * `note` - Optional resolution note
    ///
    /// # Errors
    ///
    /// Returns:
    /// - A validation error if `status` is `open`
    /// - `NotFound` if the dispute does not exist
    /// - `Forbidden` if the dispute is already closed
    /// - `Conflict` if another decision landed concurrently
    pub fn resolve_dispute(
        &self,
        dispute_id: &str,
        resolved_by: &str,
        status: DisputeStatus,
        note: Option<&str>,
    ) -> Result<Dispute> {
        if status == DisputeStatus::Open {
            return Err(Error::Validation("A dispute cannot be reopened".to_string()).into());
        }
        let existing = self
            .store
            .get_dispute(dispute_id)?
            .ok_or_else(|| Error::not_found(Entity::Dispute, dispute_id))?;
        if existing.status.is_closed() {
            return Err(Error::Forbidden(format!(
                "Dispute {} is already {}",
                dispute_id, existing.status
            ))
            .into());
        }

        let now = self.now()?;
        let decision = DisputeDecision {
            dispute_id: dispute_id.to_string(),
            expected: existing.status,
            status,
            resolution_note: note.map(str::to_string),
            resolved_by: resolved_by.to_string(),
            now,
        };
        let updated = match self.store.conditional_set_dispute_status(&decision)? {
            CasResult::Applied(updated) => updated,
            CasResult::NotFound => return Err(Error::not_found(Entity::Dispute, dispute_id).into()),
            CasResult::Mismatch { current } => {
                return Err(Error::Conflict(format!(
                    "Dispute {} changed to {} while deciding",
                    dispute_id, current.status
                ))
                .into());
            }
        };
        tracing::debug!(dispute_id, from = %existing.status, to = %status, "Dispute decided");

        let mut payload = Metadata::new()
            .with("booking_id", updated.booking_id.as_str())
            .with("from", existing.status.as_str())
            .with("to", status.as_str());
        if let Some(note) = note {
            payload.insert("note", note);
        }
        self.audit(AuditEntry::dispute(
            resolved_by,
            &format!("dispute.{}", status),
            dispute_id,
            payload,
            now,
        ));
        Ok(updated)
    }
}
