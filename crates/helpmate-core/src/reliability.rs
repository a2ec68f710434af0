// Rust guideline compliant 2026-10-12

//! Reliability score rule coupled to booking transitions.

use crate::BookingStatus;

/// Lower bound of the reliability score.
pub const MIN_SCORE: u8 = 0;
/// Upper bound of the reliability score.
pub const MAX_SCORE: u8 = 100;
/// Penalty for abandoning a booking after acceptance.
pub const CANCEL_PENALTY: i32 = -8;
/// Reward for completing a booking.
pub const COMPLETION_REWARD: i32 = 4;

/// Returns the reliability delta for a booking transition.
///
/// Leaving any state other than `requested` into `cancelled` costs
/// [`CANCEL_PENALTY`]; reaching `completed` earns [`COMPLETION_REWARD`].
/// Re-applying the current status is not a transition and yields zero.
pub fn reliability_delta(from: BookingStatus, to: BookingStatus) -> i32 {
    if from == to {
        return 0;
    }
    if from != BookingStatus::Requested && to == BookingStatus::Cancelled {
        return CANCEL_PENALTY;
    }
    if to == BookingStatus::Completed {
        return COMPLETION_REWARD;
    }
    0
}

/// Applies a delta to a stored score, clamping into `[0, 100]`.
///
/// Stores call this against the latest stored value inside their critical
/// section, so sequential deltas each see the previous clamped result.
pub fn apply_delta(current: u8, delta: i32) -> u8 {
    let next = i32::from(current).saturating_add(delta);
    next.clamp(i32::from(MIN_SCORE), i32::from(MAX_SCORE)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_deltas() {
        assert_eq!(reliability_delta(BookingStatus::Started, BookingStatus::Completed), 4);
        assert_eq!(reliability_delta(BookingStatus::Accepted, BookingStatus::Cancelled), -8);
        assert_eq!(reliability_delta(BookingStatus::Requested, BookingStatus::Cancelled), 0);
        assert_eq!(reliability_delta(BookingStatus::Enroute, BookingStatus::Started), 0);
    }

    #[test]
    fn test_no_op_has_no_delta() {
        assert_eq!(reliability_delta(BookingStatus::Completed, BookingStatus::Completed), 0);
        assert_eq!(reliability_delta(BookingStatus::Cancelled, BookingStatus::Cancelled), 0);
    }

    #[test]
    fn test_apply_delta_clamps() {
        assert_eq!(apply_delta(98, COMPLETION_REWARD), 100);
        assert_eq!(apply_delta(3, CANCEL_PENALTY), 0);
        assert_eq!(apply_delta(50, COMPLETION_REWARD), 54);
    }

    #[test]
    fn test_sequential_deltas_clamp_at_each_step() {
        let after_reward = apply_delta(98, COMPLETION_REWARD);
        let after_penalty = apply_delta(after_reward, CANCEL_PENALTY);
        assert_eq!(after_penalty, 92);
    }
}
