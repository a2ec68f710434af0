// Rust guideline compliant 2026-10-12

//! Property-based tests for the transition table and reliability rule.

use helpmate_core::reliability::{apply_delta, CANCEL_PENALTY, COMPLETION_REWARD};
use helpmate_core::{reliability_delta, validate_transition, BookingStatus, Error};
use proptest::prelude::*;

/// Generates arbitrary BookingStatus values.
fn arb_status() -> impl Strategy<Value = BookingStatus> {
    prop_oneof![
        Just(BookingStatus::Requested),
        Just(BookingStatus::Accepted),
        Just(BookingStatus::Enroute),
        Just(BookingStatus::Started),
        Just(BookingStatus::Completed),
        Just(BookingStatus::Paid),
        Just(BookingStatus::Cancelled),
    ]
}

proptest! {
    /// A move succeeds exactly when it is a no-op or listed in the table.
    #[test]
    fn prop_transition_matches_table(from in arb_status(), to in arb_status()) {
        let listed = from.allowed_transitions().contains(&to);
        let result = validate_transition(from, to);
        if from == to || listed {
            prop_assert!(result.is_ok());
        } else {
            let is_invalid_transition = matches!(
                result,
                Err(Error::InvalidTransition { from: f, to: t }) if f == from && t == to
            );
            prop_assert!(is_invalid_transition);
        }
    }

    /// Cancelled is reachable from every non-terminal state except completed.
    #[test]
    fn prop_cancel_reachability(from in arb_status()) {
        let expected = matches!(
            from,
            BookingStatus::Requested
                | BookingStatus::Accepted
                | BookingStatus::Enroute
                | BookingStatus::Started
                | BookingStatus::Cancelled
        );
        prop_assert_eq!(validate_transition(from, BookingStatus::Cancelled).is_ok(), expected);
    }

    /// Deltas are only ever zero, the penalty, or the reward.
    #[test]
    fn prop_delta_values(from in arb_status(), to in arb_status()) {
        let delta = reliability_delta(from, to);
        prop_assert!(delta == 0 || delta == CANCEL_PENALTY || delta == COMPLETION_REWARD);
        if from == to {
            prop_assert_eq!(delta, 0);
        }
    }

    /// Applying any delta keeps the score inside [0, 100].
    #[test]
    fn prop_apply_delta_stays_in_bounds(score in 0u8..=100, delta in -500i32..500) {
        let next = apply_delta(score, delta);
        prop_assert!(next <= 100);
        let unclamped = i32::from(score) + delta;
        if (0..=100).contains(&unclamped) {
            prop_assert_eq!(i32::from(next), unclamped);
        }
    }
}
