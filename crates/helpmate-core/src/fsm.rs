// Rust guideline compliant 2026-10-12

//! Finite State Machine module for booking status transitions.
//!
//! This module is the single source of truth for lifecycle moves:
//!
//! - Requested → Accepted, Cancelled
//! - Accepted → Enroute, Cancelled
//! - Enroute → Started, Cancelled
//! - Started → Completed, Cancelled
//! - Completed → Paid
//! - Paid and Cancelled are terminal
//!
//! Re-applying the current status is always accepted.

use crate::{BookingStatus, Error, Result};

impl BookingStatus {
    /// Returns the statuses reachable in one step from this status.
    pub fn allowed_transitions(&self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Requested => &[BookingStatus::Accepted, BookingStatus::Cancelled],
            BookingStatus::Accepted => &[BookingStatus::Enroute, BookingStatus::Cancelled],
            BookingStatus::Enroute => &[BookingStatus::Started, BookingStatus::Cancelled],
            BookingStatus::Started => &[BookingStatus::Completed, BookingStatus::Cancelled],
            BookingStatus::Completed => &[BookingStatus::Paid],
            BookingStatus::Paid | BookingStatus::Cancelled => &[],
        }
    }

    /// Returns true if no transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Checks if a transition to the target status is valid.
    ///
    /// # Arguments
    ///
    /// * `target` - The target status to transition to
    ///
    /// # Returns
    ///
    /// Ok if the transition is valid or a no-op, Err otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` naming both statuses if the target is
    /// not in the allowed set.
    pub fn can_transition_to(&self, target: BookingStatus) -> Result<()> {
        if *self == target || self.allowed_transitions().contains(&target) {
            return Ok(());
        }

        Err(Error::InvalidTransition {
            from: *self,
            to: target,
        })
    }
}

/// Validates a proposed lifecycle move.
///
/// # Arguments
///
/// * `from` - Current status
/// * `to` - Requested status
///
/// # Errors
///
/// Returns `Error::InvalidTransition` if `to` is neither `from` nor one of its
/// allowed successors.
pub fn validate_transition(from: BookingStatus, to: BookingStatus) -> Result<()> {
    from.can_transition_to(to)
}
