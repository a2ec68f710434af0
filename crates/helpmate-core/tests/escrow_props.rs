// Rust guideline compliant 2026-10-12

//! Property-based tests for the escrow guard.

use helpmate_core::{
    apply_escrow_action, Error, EscrowAction, EscrowStatus, MetaValue, Payment, PaymentMethod,
    PaymentStatus,
};
use proptest::prelude::*;

fn arb_action() -> impl Strategy<Value = EscrowAction> {
    prop_oneof![
        Just(EscrowAction::Hold),
        Just(EscrowAction::Release),
        Just(EscrowAction::Refund),
    ]
}

fn arb_escrow() -> impl Strategy<Value = EscrowStatus> {
    prop_oneof![
        Just(EscrowStatus::Na),
        Just(EscrowStatus::Held),
        Just(EscrowStatus::Released),
        Just(EscrowStatus::Refunded),
    ]
}

fn payment_in(escrow: EscrowStatus) -> Payment {
    let mut payment = Payment::new(
        "bkg-00000000aa".to_string(),
        PaymentMethod::Gateway,
        PaymentStatus::Paid,
        600.0,
        1_000,
    );
    payment.escrow_status = escrow;
    payment
}

#[test]
fn test_guard_outcomes() {
    let na = payment_in(EscrowStatus::Na);
    let held = apply_escrow_action(&na, EscrowAction::Hold, None, 1).unwrap();
    assert_eq!(held.escrow_status, EscrowStatus::Held);

    assert!(matches!(
        apply_escrow_action(&held, EscrowAction::Hold, None, 2),
        Err(Error::EscrowAlreadyInitiated { current: EscrowStatus::Held, .. })
    ));
    assert!(matches!(
        apply_escrow_action(&na, EscrowAction::Release, None, 2),
        Err(Error::EscrowNotHeld { current: EscrowStatus::Na, .. })
    ));

    let released = apply_escrow_action(&held, EscrowAction::Release, None, 3).unwrap();
    assert!(matches!(
        apply_escrow_action(&released, EscrowAction::Refund, None, 4),
        Err(Error::CannotRefundReleased(_))
    ));

    let refunded = apply_escrow_action(&held, EscrowAction::Refund, None, 5).unwrap();
    assert_eq!(refunded.status, PaymentStatus::Refunded);
    assert_eq!(refunded.escrow_status, EscrowStatus::Refunded);
    assert!(matches!(
        apply_escrow_action(&refunded, EscrowAction::Refund, None, 6),
        Err(Error::EscrowAlreadyRefunded(_))
    ));
}

#[test]
fn test_refund_without_hold() {
    let refunded =
        apply_escrow_action(&payment_in(EscrowStatus::Na), EscrowAction::Refund, Some("no show"), 9)
            .unwrap();
    assert_eq!(refunded.escrow_status, EscrowStatus::Refunded);
    assert_eq!(refunded.escrow_held_at, None);
}

proptest! {
    /// Terminal escrow states accept no action.
    #[test]
    fn prop_terminal_states_reject_everything(action in arb_action()) {
        for terminal in [EscrowStatus::Released, EscrowStatus::Refunded] {
            prop_assert!(apply_escrow_action(&payment_in(terminal), action, None, 1).is_err());
        }
    }

    /// A successful action never drops unrelated metadata keys.
    #[test]
    fn prop_metadata_merge_is_additive(
        escrow in arb_escrow(),
        action in arb_action(),
        keys in prop::collection::btree_set("[a-d]{1,6}", 0..6),
        note in prop::option::of("[a-z ]{0,20}"),
    ) {
        let mut payment = payment_in(escrow);
        for key in &keys {
            payment.metadata.insert(key.clone(), key.as_str());
        }

        if let Ok(updated) = apply_escrow_action(&payment, action, note.as_deref(), 50) {
            for key in &keys {
                prop_assert!(updated.metadata.contains_key(key));
            }
            prop_assert_eq!(
                updated.metadata.get("escrow_action").and_then(MetaValue::as_str),
                Some(action.as_str())
            );
            let entry = updated.metadata.get(&action.history_key()).and_then(MetaValue::as_map);
            prop_assert!(entry.is_some());
            prop_assert_eq!(updated.id, payment.id);
        }
    }

    /// The guard's decision depends only on the current escrow status.
    #[test]
    fn prop_guard_matches_check(escrow in arb_escrow(), action in arb_action()) {
        let payment = payment_in(escrow);
        let checked = action.check(&payment.id, escrow);
        let applied = apply_escrow_action(&payment, action, None, 7);
        prop_assert_eq!(checked.is_ok(), applied.is_ok());
        if let (Ok(next), Ok(updated)) = (checked, applied) {
            prop_assert_eq!(next, updated.escrow_status);
        }
    }
}
