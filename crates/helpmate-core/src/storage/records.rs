// Rust guideline compliant 2026-10-12

//! Table operations shared by the store implementations.
//!
//! Each function works on plain vectors so that [`super::MemoryStore`] can run
//! it under its `RwLock` and [`super::JsonlStore`] between a locked load and
//! save.

use super::{CasResult, DisputeDecision, EscrowChange, HelperStanding, StatusChange};
use crate::escrow::apply_escrow_action;
use crate::reliability::apply_delta;
use crate::{
    Booking, BookingEvent, BookingStatus, Dispute, Error, HelperAssignment, HelperProfile,
    Message, Metadata, Payment, PaymentStatus, Result, Review,
};

/// Record with a unique string key.
pub(crate) trait Keyed {
    fn key(&self) -> &str;
}

macro_rules! keyed_by_id {
    ($($ty:ty),*) => {
        $(impl Keyed for $ty {
            fn key(&self) -> &str {
                &self.id
            }
        })*
    };
}

keyed_by_id!(Booking, BookingEvent, Dispute, HelperProfile, Message, Payment, Review);

pub(crate) fn find<'a, T: Keyed>(rows: &'a [T], id: &str) -> Option<&'a T> {
    rows.iter().find(|row| row.key() == id)
}

fn find_mut<'a, T: Keyed>(rows: &'a mut [T], id: &str) -> Option<&'a mut T> {
    rows.iter_mut().find(|row| row.key() == id)
}

pub(crate) fn insert_unique<T: Keyed + Clone>(rows: &mut Vec<T>, row: &T) -> Result<()> {
    if find(rows, row.key()).is_some() {
        return Err(Error::Conflict(format!("Duplicate record ID: {}", row.key())));
    }
    rows.push(row.clone());
    Ok(())
}

pub(crate) fn insert_booking(bookings: &mut Vec<Booking>, booking: &Booking) -> Result<()> {
    booking.validate()?;
    insert_unique(bookings, booking)
}

pub(crate) fn insert_payment(payments: &mut Vec<Payment>, payment: &Payment) -> Result<()> {
    payment.validate()?;
    insert_unique(payments, payment)
}

pub(crate) fn assign_helper(
    bookings: &mut [Booking],
    booking_id: &str,
    helper_id: &str,
    expected: BookingStatus,
    now: i64,
) -> CasResult<Booking> {
    let Some(booking) = find_mut(bookings, booking_id) else {
        return CasResult::NotFound;
    };
    if booking.status != expected || booking.helper != HelperAssignment::Unassigned {
        return CasResult::Mismatch {
            current: booking.clone(),
        };
    }
    booking.helper = HelperAssignment::AssignedTo(helper_id.to_string());
    booking.status = BookingStatus::Accepted;
    booking.version += 1;
    booking.updated_at = now;
    CasResult::Applied(booking.clone())
}

pub(crate) fn apply_status_change(
    bookings: &mut [Booking],
    helpers: &mut [HelperProfile],
    change: &StatusChange,
) -> CasResult<Booking> {
    let Some(booking) = find_mut(bookings, &change.booking_id) else {
        return CasResult::NotFound;
    };
    if booking.status != change.expected_status || booking.version != change.expected_version {
        return CasResult::Mismatch {
            current: booking.clone(),
        };
    }
    booking.status = change.next_status;
    booking.version += 1;
    booking.updated_at = change.now;

    if let Some(adjustment) = &change.reliability {
        if adjust_reliability(helpers, &adjustment.helper_id, adjustment.delta).is_none() {
            tracing::debug!(
                helper_id = %adjustment.helper_id,
                "No helper profile; reliability adjustment skipped"
            );
        }
    }
    CasResult::Applied(booking.clone())
}

pub(crate) fn adjust_reliability(
    helpers: &mut [HelperProfile],
    helper_id: &str,
    delta: i32,
) -> Option<u8> {
    let profile = find_mut(helpers, helper_id)?;
    profile.reliability_score = apply_delta(profile.reliability_score, delta);
    Some(profile.reliability_score)
}

pub(crate) fn insert_review(
    reviews: &mut Vec<Review>,
    helpers: &mut [HelperProfile],
    review: &Review,
) -> Result<()> {
    if reviews.iter().any(|r| r.booking_id == review.booking_id) {
        return Err(Error::Conflict(format!(
            "Booking {} already has a review",
            review.booking_id
        )));
    }
    insert_unique(reviews, review)?;
    if let Some(profile) = find_mut(helpers, &review.helper_id) {
        profile.record_rating(review.rating);
    }
    Ok(())
}

pub(crate) fn set_escrow(payments: &mut [Payment], change: &EscrowChange) -> Result<CasResult<Payment>> {
    let Some(payment) = find_mut(payments, &change.payment_id) else {
        return Ok(CasResult::NotFound);
    };
    if payment.escrow_status != change.expected {
        return Ok(CasResult::Mismatch {
            current: payment.clone(),
        });
    }
    *payment = apply_escrow_action(payment, change.action, change.note.as_deref(), change.now)?;
    Ok(CasResult::Applied(payment.clone()))
}

pub(crate) fn set_payment_status(
    payments: &mut [Payment],
    payment_id: &str,
    expected: PaymentStatus,
    status: PaymentStatus,
    metadata: &Metadata,
    now: i64,
) -> CasResult<Payment> {
    let Some(payment) = find_mut(payments, payment_id) else {
        return CasResult::NotFound;
    };
    if payment.status != expected {
        return CasResult::Mismatch {
            current: payment.clone(),
        };
    }
    payment.status = status;
    payment.metadata.merge(metadata.clone());
    payment.updated_at = now;
    CasResult::Applied(payment.clone())
}

pub(crate) fn upsert_helper(helpers: &mut Vec<HelperProfile>, profile: &HelperProfile) -> Result<()> {
    profile.validate()?;
    match find_mut(helpers, &profile.id) {
        Some(existing) => *existing = profile.clone(),
        None => helpers.push(profile.clone()),
    }
    Ok(())
}

pub(crate) fn set_helper_standing(
    helpers: &mut [HelperProfile],
    helper_id: &str,
    standing: HelperStanding,
) -> Option<HelperProfile> {
    let profile = find_mut(helpers, helper_id)?;
    if let Some(verification) = standing.verification {
        profile.verification = verification;
    }
    profile.is_active = standing.is_active;
    Some(profile.clone())
}

pub(crate) fn insert_dispute(disputes: &mut Vec<Dispute>, dispute: &Dispute) -> Result<()> {
    dispute.validate()?;
    insert_unique(disputes, dispute)
}

pub(crate) fn set_dispute_status(
    disputes: &mut [Dispute],
    decision: &DisputeDecision,
) -> CasResult<Dispute> {
    let Some(dispute) = find_mut(disputes, &decision.dispute_id) else {
        return CasResult::NotFound;
    };
    if dispute.status != decision.expected {
        return CasResult::Mismatch {
            current: dispute.clone(),
        };
    }
    dispute.status = decision.status;
    dispute.resolution_note = decision.resolution_note.clone();
    dispute.resolved_by = Some(decision.resolved_by.clone());
    dispute.updated_at = decision.now;
    CasResult::Applied(dispute.clone())
}

pub(crate) fn disputes_newest_first(disputes: &[Dispute]) -> Vec<Dispute> {
    let mut listed: Vec<Dispute> = disputes.iter().rev().cloned().collect();
    listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    listed
}

pub(crate) fn bookings_for_user(bookings: &[Booking], user_id: &str) -> Vec<Booking> {
    let mut matching: Vec<Booking> = bookings
        .iter()
        .rev()
        .filter(|b| b.is_party(user_id))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matching
}

pub(crate) fn for_booking<T: Clone>(rows: &[T], booking_id: &str, key: impl Fn(&T) -> &str) -> Vec<T> {
    rows.iter()
        .filter(|row| key(row) == booking_id)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ReliabilityAdjustment;

    fn booking() -> Booking {
        Booking::new(
            "cust-1".to_string(),
            "cat-1".to_string(),
            "addr-1".to_string(),
            100,
        )
    }

    #[test]
    fn test_assign_helper_once() {
        let mut bookings = vec![booking()];
        let id = bookings[0].id.clone();

        let first = assign_helper(&mut bookings, &id, "h-1", BookingStatus::Requested, 110);
        assert!(first.is_applied());
        let second = assign_helper(&mut bookings, &id, "h-2", BookingStatus::Requested, 111);
        match second {
            CasResult::Mismatch { current } => {
                assert_eq!(current.helper_id(), Some("h-1"));
                assert_eq!(current.version, 1);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_status_change_checks_version() {
        let mut bookings = vec![booking()];
        let id = bookings[0].id.clone();
        assign_helper(&mut bookings, &id, "h-1", BookingStatus::Requested, 110);

        let mut helpers = vec![HelperProfile::new("h-1".to_string(), 50)];
        let stale = StatusChange {
            booking_id: id.clone(),
            expected_status: BookingStatus::Accepted,
            expected_version: 0,
            next_status: BookingStatus::Cancelled,
            reliability: Some(ReliabilityAdjustment {
                helper_id: "h-1".to_string(),
                delta: -8,
            }),
            now: 120,
        };
        assert!(matches!(
            apply_status_change(&mut bookings, &mut helpers, &stale),
            CasResult::Mismatch { .. }
        ));
        assert_eq!(helpers[0].reliability_score, 50);

        let fresh = StatusChange {
            expected_version: 1,
            ..stale
        };
        assert!(apply_status_change(&mut bookings, &mut helpers, &fresh).is_applied());
        assert_eq!(helpers[0].reliability_score, 42);
        assert_eq!(bookings[0].version, 2);
    }

    #[test]
    fn test_second_review_rejected() {
        let mut reviews = Vec::new();
        let mut helpers = vec![HelperProfile::new("h-1".to_string(), 50)];
        let first = Review::new("bkg-0000000001", "cust-1", "h-1", 5, None, 10);
        let second = Review::new("bkg-0000000001", "cust-1", "h-1", 1, None, 11);

        insert_review(&mut reviews, &mut helpers, &first).unwrap();
        assert!(matches!(
            insert_review(&mut reviews, &mut helpers, &second),
            Err(Error::Conflict(_))
        ));
        assert_eq!(helpers[0].rating_count, 1);
        assert_eq!(helpers[0].rating_avg, 5.0);
    }

    #[test]
    fn test_escrow_change_keeps_concurrent_payment_update() {
        let mut payment = Payment::new(
            "bkg-0000000001".to_string(),
            crate::PaymentMethod::Gateway,
            PaymentStatus::Pending,
            400.0,
            1,
        );
        payment.metadata.insert("source", "gateway");
        let mut payments = vec![payment.clone()];

        assert!(set_payment_status(
            &mut payments,
            &payment.id,
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            &Metadata::new().with("gateway_payment_id", "cf-9"),
            2,
        )
        .is_applied());

        let change = EscrowChange {
            payment_id: payment.id.clone(),
            expected: crate::EscrowStatus::Na,
            action: crate::EscrowAction::Hold,
            note: None,
            now: 3,
        };
        let held = match set_escrow(&mut payments, &change).unwrap() {
            CasResult::Applied(held) => held,
            other => panic!("expected applied, got {:?}", other),
        };
        assert_eq!(held.status, PaymentStatus::Paid);
        assert_eq!(held.escrow_status, crate::EscrowStatus::Held);
        for key in ["source", "gateway_payment_id", "escrow_hold"] {
            assert!(held.metadata.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn test_dispute_decision_requires_expected_status() {
        let dispute = Dispute::new("bkg-0000000001", "cust-1", "no show".to_string(), Vec::new(), 5);
        let mut disputes = Vec::new();
        insert_dispute(&mut disputes, &dispute).unwrap();

        let decision = DisputeDecision {
            dispute_id: dispute.id.clone(),
            expected: crate::DisputeStatus::Open,
            status: crate::DisputeStatus::Resolved,
            resolution_note: Some("refunded".to_string()),
            resolved_by: "admin-1".to_string(),
            now: 6,
        };
        assert!(set_dispute_status(&mut disputes, &decision).is_applied());
        assert_eq!(disputes[0].resolved_by.as_deref(), Some("admin-1"));
        assert!(matches!(
            set_dispute_status(&mut disputes, &decision),
            CasResult::Mismatch { .. }
        ));
    }

    #[test]
    fn test_bookings_for_user_newest_first() {
        let older = booking();
        let mut newer = booking();
        newer.created_at = 200;
        let rows = vec![older.clone(), newer.clone()];
        let listed = bookings_for_user(&rows, "cust-1");
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
        assert!(bookings_for_user(&rows, "someone-else").is_empty());
    }
}
