// Rust guideline compliant 2026-10-12

//! Escrow payment guard.
//!
//! Legal escrow moves are `na → held → released` and `na | held → refunded`.
//! Released and refunded are terminal. Each applied action is recorded in the
//! payment metadata under `escrow_<action>` so the history of a payment can be
//! read back from the record alone.

use crate::{EscrowStatus, Error, MetaValue, Metadata, Payment, PaymentStatus, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata key holding the most recent escrow action.
pub const LAST_ACTION_KEY: &str = "escrow_action";

/// Escrow action requested against a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowAction {
    /// Place funds on hold.
    Hold,
    /// Release held funds to the helper.
    Release,
    /// Return funds to the customer.
    Refund,
}

impl EscrowAction {
    /// Returns the wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            EscrowAction::Hold => "hold",
            EscrowAction::Release => "release",
            EscrowAction::Refund => "refund",
        }
    }

    /// Returns the metadata key recording this action.
    pub fn history_key(&self) -> String {
        format!("escrow_{}", self.as_str())
    }

    /// Checks whether this action is legal from `current`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `EscrowAlreadyInitiated` for a hold on anything but `na`
    /// - `EscrowNotHeld` for a release on anything but `held`
    /// - `CannotRefundReleased` for a refund after release
    /// - `EscrowAlreadyRefunded` for a second refund
    pub fn check(&self, payment_id: &str, current: EscrowStatus) -> Result<EscrowStatus> {
        match (self, current) {
            (EscrowAction::Hold, EscrowStatus::Na) => Ok(EscrowStatus::Held),
            (EscrowAction::Hold, current) => Err(Error::EscrowAlreadyInitiated {
                payment_id: payment_id.to_string(),
                current,
            }),
            (EscrowAction::Release, EscrowStatus::Held) => Ok(EscrowStatus::Released),
            (EscrowAction::Release, current) => Err(Error::EscrowNotHeld {
                payment_id: payment_id.to_string(),
                current,
            }),
            (EscrowAction::Refund, EscrowStatus::Released) => {
                Err(Error::CannotRefundReleased(payment_id.to_string()))
            }
            (EscrowAction::Refund, EscrowStatus::Refunded) => {
                Err(Error::EscrowAlreadyRefunded(payment_id.to_string()))
            }
            (EscrowAction::Refund, EscrowStatus::Na | EscrowStatus::Held) => {
                Ok(EscrowStatus::Refunded)
            }
        }
    }
}

impl fmt::Display for EscrowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies an escrow action to a payment.
///
/// # Arguments
///
/// * `payment` - Payment as currently stored
/// * `action` - Requested action
/// * `note` - Optional operator note recorded with the action
/// * `now` - Timestamp of the action
///
/// # Returns
///
/// The updated payment. The input is not modified.
///
/// # Errors
///
/// Returns an escrow precondition error if the action is not legal from the
/// payment's current escrow status (see [`EscrowAction::check`]).
pub fn apply_escrow_action(
    payment: &Payment,
    action: EscrowAction,
    note: Option<&str>,
    now: i64,
) -> Result<Payment> {
    let next = action.check(&payment.id, payment.escrow_status)?;

    let mut updated = payment.clone();
    updated.escrow_status = next;
    updated.updated_at = now;
    match action {
        EscrowAction::Hold => updated.escrow_held_at = Some(now),
        EscrowAction::Release => updated.escrow_released_at = Some(now),
        EscrowAction::Refund => updated.status = PaymentStatus::Refunded,
    }

    let mut entry = Metadata::new()
        .with("at", now)
        .with("from", payment.escrow_status.to_string());
    if let Some(note) = note {
        entry.insert("note", note);
    }
    updated.metadata.merge(
        Metadata::new()
            .with(LAST_ACTION_KEY, action.as_str())
            .with(action.history_key(), MetaValue::Map(entry)),
    );

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaymentMethod;

    fn sample_payment() -> Payment {
        let mut payment = Payment::new(
            "bkg-0123456789".to_string(),
            PaymentMethod::Upi,
            PaymentStatus::Paid,
            450.0,
            1_000,
        );
        payment.metadata.insert("source", "app");
        payment
    }

    #[test]
    fn test_hold_then_release() {
        let payment = sample_payment();
        let held = apply_escrow_action(&payment, EscrowAction::Hold, Some("job booked"), 1_100).unwrap();
        assert_eq!(held.escrow_status, EscrowStatus::Held);
        assert_eq!(held.escrow_held_at, Some(1_100));

        let released = apply_escrow_action(&held, EscrowAction::Release, None, 1_200).unwrap();
        assert_eq!(released.escrow_status, EscrowStatus::Released);
        assert_eq!(released.escrow_released_at, Some(1_200));
        assert_eq!(released.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_history_survives_every_action() {
        let payment = sample_payment();
        let held = apply_escrow_action(&payment, EscrowAction::Hold, Some("hold it"), 1_100).unwrap();
        let refunded = apply_escrow_action(&held, EscrowAction::Refund, None, 1_300).unwrap();

        let meta = &refunded.metadata;
        assert_eq!(meta.get("source").and_then(MetaValue::as_str), Some("app"));
        assert_eq!(meta.get(LAST_ACTION_KEY).and_then(MetaValue::as_str), Some("refund"));

        let hold = meta.get("escrow_hold").and_then(MetaValue::as_map).unwrap();
        assert_eq!(hold.get("note").and_then(MetaValue::as_str), Some("hold it"));
        assert_eq!(hold.get("at").and_then(MetaValue::as_f64), Some(1_100.0));

        let refund = meta.get("escrow_refund").and_then(MetaValue::as_map).unwrap();
        assert_eq!(refund.get("from").and_then(MetaValue::as_str), Some("held"));
        assert!(!refund.contains_key("note"));
    }

    #[test]
    fn test_input_payment_is_untouched_on_error() {
        let payment = sample_payment();
        let result = apply_escrow_action(&payment, EscrowAction::Release, None, 1_100);
        assert!(matches!(result, Err(Error::EscrowNotHeld { .. })));
        assert_eq!(payment.escrow_status, EscrowStatus::Na);
    }
}
