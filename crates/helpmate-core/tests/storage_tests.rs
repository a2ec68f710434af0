// Rust guideline compliant 2026-10-12

//! Integration tests for the store implementations.

use helpmate_core::storage::{BOOKINGS_FILE, HELPERS_FILE};
use helpmate_core::{
    Booking, BookingEvent, BookingStatus, CasResult, Dispute, DisputeDecision, DisputeStatus,
    EscrowAction, EscrowChange, EscrowStatus, EventKind, HelperProfile, HelperStanding,
    JsonlStore, MemoryStore, Metadata, Payment, PaymentMethod, PaymentStatus,
    ReliabilityAdjustment, StatusChange, Store, VerificationStatus,
};
use std::fs;
use tempfile::TempDir;

fn test_booking(customer: &str, now: i64) -> Booking {
    Booking::new(
        customer.to_string(),
        "cat-cleaning".to_string(),
        "addr-1".to_string(),
        now,
    )
}

fn jsonl_store() -> (TempDir, JsonlStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = JsonlStore::open(temp_dir.path().to_path_buf()).expect("Failed to open store");
    (temp_dir, store)
}

/// Exactly one of many concurrent acceptors wins.
fn assert_single_acceptor<S: Store>(store: &S) {
    let booking = test_booking("cust-race", 1_000);
    store.insert_booking(&booking).unwrap();

    let outcomes: Vec<CasResult<Booking>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let booking_id = booking.id.clone();
                scope.spawn(move || {
                    store
                        .conditional_assign_helper(
                            &booking_id,
                            &format!("helper-{i}"),
                            BookingStatus::Requested,
                            1_001,
                        )
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<_> = outcomes
        .iter()
        .filter_map(|o| match o {
            CasResult::Applied(b) => b.helper_id().map(str::to_string),
            _ => None,
        })
        .collect();
    assert_eq!(winners.len(), 1, "exactly one acceptor should win");

    let stored = store.get_booking(&booking.id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Accepted);
    assert_eq!(stored.helper_id(), Some(winners[0].as_str()));
    assert_eq!(stored.version, 1);
}

#[test]
fn test_concurrent_accept_memory_store() {
    assert_single_acceptor(&MemoryStore::new());
}

#[test]
fn test_concurrent_accept_jsonl_store() {
    let (_dir, store) = jsonl_store();
    assert_single_acceptor(&store);
}

#[test]
fn test_open_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    assert!(JsonlStore::open(temp_dir.path().join("missing")).is_err());
}

#[test]
fn test_jsonl_round_trip_survives_reopen() {
    let (dir, store) = jsonl_store();
    let booking = test_booking("cust-1", 500);
    store.insert_booking(&booking).unwrap();
    store
        .append_event(&BookingEvent::new(
            &booking.id,
            "cust-1",
            EventKind::Created,
            None,
            Some(BookingStatus::Requested),
            Metadata::new(),
            500,
        ))
        .unwrap();

    let reopened = JsonlStore::open(dir.path().to_path_buf()).unwrap();
    assert_eq!(reopened.get_booking(&booking.id).unwrap(), Some(booking.clone()));
    assert_eq!(reopened.list_events(&booking.id).unwrap().len(), 1);
    assert!(reopened.get_booking("bkg-ffffffffff").unwrap().is_none());
}

#[test]
fn test_malformed_lines_are_skipped() {
    let (dir, store) = jsonl_store();
    let booking = test_booking("cust-1", 700);
    store.insert_booking(&booking).unwrap();

    let path = dir.path().join(BOOKINGS_FILE);
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("{not json\n\n");
    fs::write(&path, content).unwrap();

    let listed = store.list_bookings_for_user("cust-1").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, booking.id);
}

#[test]
fn test_duplicate_insert_rejected() {
    let store = MemoryStore::new();
    let booking = test_booking("cust-1", 1);
    store.insert_booking(&booking).unwrap();
    assert!(store.insert_booking(&booking).is_err());
}

#[test]
fn test_status_change_applies_reliability_atomically() {
    let (_dir, store) = jsonl_store();
    store
        .upsert_helper(&HelperProfile::new("helper-1".to_string(), 98))
        .unwrap();
    let booking = test_booking("cust-1", 10);
    store.insert_booking(&booking).unwrap();
    store
        .conditional_assign_helper(&booking.id, "helper-1", BookingStatus::Requested, 11)
        .unwrap();

    let mut expected_status = BookingStatus::Accepted;
    let mut version = 1;
    for (next, delta) in [
        (BookingStatus::Enroute, 0),
        (BookingStatus::Started, 0),
        (BookingStatus::Completed, 4),
    ] {
        let change = StatusChange {
            booking_id: booking.id.clone(),
            expected_status,
            expected_version: version,
            next_status: next,
            reliability: Some(ReliabilityAdjustment {
                helper_id: "helper-1".to_string(),
                delta,
            }),
            now: 20,
        };
        let result = store.set_booking_status(&change).unwrap();
        assert!(result.is_applied());
        expected_status = next;
        version += 1;
    }

    let helper = store.get_helper("helper-1").unwrap().unwrap();
    assert_eq!(helper.reliability_score, 100);

    let stale = StatusChange {
        booking_id: booking.id.clone(),
        expected_status: BookingStatus::Started,
        expected_version: 3,
        next_status: BookingStatus::Cancelled,
        reliability: Some(ReliabilityAdjustment {
            helper_id: "helper-1".to_string(),
            delta: -8,
        }),
        now: 30,
    };
    match store.set_booking_status(&stale).unwrap() {
        CasResult::Mismatch { current } => assert_eq!(current.status, BookingStatus::Completed),
        other => panic!("expected mismatch, got {:?}", other),
    }
    assert_eq!(store.get_helper("helper-1").unwrap().unwrap().reliability_score, 100);
}

fn assert_reliability_clamps(store: &dyn Store) {
    store
        .upsert_helper(&HelperProfile::new("helper-high".to_string(), 98))
        .unwrap();
    store
        .upsert_helper(&HelperProfile::new("helper-low".to_string(), 3))
        .unwrap();

    assert_eq!(store.update_reliability_score("helper-high", 4).unwrap(), Some(100));
    assert_eq!(store.update_reliability_score("helper-low", -8).unwrap(), Some(0));
    assert_eq!(store.update_reliability_score("nobody", 4).unwrap(), None);

    assert_eq!(store.get_helper("helper-high").unwrap().unwrap().reliability_score, 100);
    assert_eq!(store.get_helper("helper-low").unwrap().unwrap().reliability_score, 0);
    assert!(store.get_helper("nobody").unwrap().is_none());
}

#[test]
fn test_update_reliability_score_clamps() {
    assert_reliability_clamps(&MemoryStore::new());
    let (_dir, store) = jsonl_store();
    assert_reliability_clamps(&store);
}

fn hold(payment_id: &str, expected: EscrowStatus) -> EscrowChange {
    EscrowChange {
        payment_id: payment_id.to_string(),
        expected,
        action: EscrowAction::Hold,
        note: Some("job booked".to_string()),
        now: 5,
    }
}

fn assert_escrow_cas(store: &dyn Store) {
    let payment = Payment::new(
        "bkg-0000000001".to_string(),
        PaymentMethod::Upi,
        PaymentStatus::Paid,
        250.0,
        1,
    );
    store.insert_payment(&payment).unwrap();

    match store.conditional_set_escrow(&hold(&payment.id, EscrowStatus::Na)).unwrap() {
        CasResult::Applied(held) => {
            assert_eq!(held.escrow_status, EscrowStatus::Held);
            assert_eq!(held.escrow_held_at, Some(5));
        }
        other => panic!("expected applied, got {:?}", other),
    }

    match store
        .conditional_set_escrow(&hold(&payment.id, EscrowStatus::Na))
        .unwrap()
    {
        CasResult::Mismatch { current } => assert_eq!(current.escrow_status, EscrowStatus::Held),
        other => panic!("expected mismatch, got {:?}", other),
    }

    // Expected status matches but the guard refuses a second hold.
    assert!(store
        .conditional_set_escrow(&hold(&payment.id, EscrowStatus::Held))
        .is_err());

    assert!(matches!(
        store
            .conditional_set_escrow(&hold("pay-ffffffffff", EscrowStatus::Na))
            .unwrap(),
        CasResult::NotFound
    ));
}

#[test]
fn test_conditional_escrow_write() {
    assert_escrow_cas(&MemoryStore::new());
    let (_dir, store) = jsonl_store();
    assert_escrow_cas(&store);
}

#[test]
fn test_payment_status_and_provider_ref() {
    let store = MemoryStore::new();
    let mut payment = Payment::new(
        "bkg-0000000001".to_string(),
        PaymentMethod::Gateway,
        PaymentStatus::Pending,
        900.0,
        1,
    );
    payment.provider_ref = Some("order_42".to_string());
    payment.metadata.insert("source", "checkout");
    store.insert_payment(&payment).unwrap();

    let found = store.get_payment_by_provider_ref("order_42").unwrap().unwrap();
    assert_eq!(found.id, payment.id);

    let updated = store
        .conditional_set_payment_status(
            &payment.id,
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            &Metadata::new().with("raw_status", "SUCCESS"),
            2,
        )
        .unwrap();
    match updated {
        CasResult::Applied(p) => {
            assert_eq!(p.status, PaymentStatus::Paid);
            assert!(p.metadata.contains_key("source"));
            assert!(p.metadata.contains_key("raw_status"));
        }
        other => panic!("expected applied, got {:?}", other),
    }
}

fn assert_escrow_keeps_gateway_update(store: &dyn Store) {
    let mut payment = Payment::new(
        "bkg-0000000002".to_string(),
        PaymentMethod::Gateway,
        PaymentStatus::Pending,
        600.0,
        1,
    );
    payment.provider_ref = Some("order_7".to_string());
    store.insert_payment(&payment).unwrap();

    // An operator reads the payment, then the gateway confirms it.
    let observed = store.get_payment(&payment.id).unwrap().unwrap();
    assert!(store
        .conditional_set_payment_status(
            &payment.id,
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            &Metadata::new().with("gateway_payment_id", "cf-77"),
            2,
        )
        .unwrap()
        .is_applied());

    let change = hold(&observed.id, observed.escrow_status);
    assert!(store.conditional_set_escrow(&change).unwrap().is_applied());

    let stored = store.get_payment(&payment.id).unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Paid);
    assert_eq!(stored.escrow_status, EscrowStatus::Held);
    assert!(stored.metadata.contains_key("gateway_payment_id"));
}

#[test]
fn test_escrow_action_keeps_concurrent_status_update() {
    assert_escrow_keeps_gateway_update(&MemoryStore::new());
    let (_dir, store) = jsonl_store();
    assert_escrow_keeps_gateway_update(&store);
}

fn assert_dispute_lifecycle(store: &dyn Store) {
    let first = Dispute::new("bkg-0000000001", "cust-1", "late".to_string(), Vec::new(), 10);
    let second = Dispute::new(
        "bkg-0000000002",
        "helper-1",
        "unpaid".to_string(),
        vec!["photo-1".to_string()],
        20,
    );
    store.insert_dispute(&first).unwrap();
    store.insert_dispute(&second).unwrap();
    assert!(store.insert_dispute(&first).is_err());

    let listed: Vec<String> = store
        .list_disputes()
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(listed, vec![second.id.clone(), first.id.clone()]);

    let decision = DisputeDecision {
        dispute_id: first.id.clone(),
        expected: DisputeStatus::Open,
        status: DisputeStatus::Investigating,
        resolution_note: None,
        resolved_by: "admin-1".to_string(),
        now: 30,
    };
    assert!(store
        .conditional_set_dispute_status(&decision)
        .unwrap()
        .is_applied());
    match store.conditional_set_dispute_status(&decision).unwrap() {
        CasResult::Mismatch { current } => assert_eq!(current.status, DisputeStatus::Investigating),
        other => panic!("expected mismatch, got {:?}", other),
    }

    let stored = store.get_dispute(&first.id).unwrap().unwrap();
    assert_eq!(stored.resolved_by.as_deref(), Some("admin-1"));
    assert_eq!(stored.updated_at, 30);
    assert!(store.get_dispute("dsp-ffffffffff").unwrap().is_none());
}

#[test]
fn test_dispute_lifecycle() {
    assert_dispute_lifecycle(&MemoryStore::new());
    let (_dir, store) = jsonl_store();
    assert_dispute_lifecycle(&store);
}

fn assert_helper_standing(store: &dyn Store) {
    store
        .upsert_helper(&HelperProfile::new("helper-1".to_string(), 70))
        .unwrap();

    let approved = store
        .set_helper_standing(
            "helper-1",
            HelperStanding {
                verification: Some(VerificationStatus::Approved),
                is_active: true,
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(approved.verification, VerificationStatus::Approved);
    assert!(approved.is_active);

    let suspended = store
        .set_helper_standing(
            "helper-1",
            HelperStanding {
                verification: None,
                is_active: false,
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(suspended.verification, VerificationStatus::Approved);
    assert!(!suspended.is_active);
    assert_eq!(store.get_helper("helper-1").unwrap().unwrap(), suspended);

    assert!(store
        .set_helper_standing(
            "nobody",
            HelperStanding {
                verification: None,
                is_active: true,
            },
        )
        .unwrap()
        .is_none());
}

#[test]
fn test_helper_standing() {
    assert_helper_standing(&MemoryStore::new());
    let (_dir, store) = jsonl_store();
    assert_helper_standing(&store);
}

#[test]
fn test_malformed_lines_survive_rewrite() {
    let (dir, store) = jsonl_store();
    let first = test_booking("cust-1", 700);
    store.insert_booking(&first).unwrap();

    let path = dir.path().join(BOOKINGS_FILE);
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("{\"id\":\"bkg-broken\"\n");
    fs::write(&path, content).unwrap();

    let second = test_booking("cust-2", 800);
    store.insert_booking(&second).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.lines().any(|line| line == "{\"id\":\"bkg-broken\""));
    assert!(store.get_booking(&first.id).unwrap().is_some());
    assert!(store.get_booking(&second.id).unwrap().is_some());
}

#[test]
fn test_failed_staging_leaves_both_tables_unchanged() {
    let (dir, store) = jsonl_store();
    store
        .upsert_helper(&HelperProfile::new("helper-1".to_string(), 80))
        .unwrap();
    let booking = test_booking("cust-1", 10);
    store.insert_booking(&booking).unwrap();
    store
        .conditional_assign_helper(&booking.id, "helper-1", BookingStatus::Requested, 11)
        .unwrap();

    // A directory where the helpers temp file belongs makes staging fail.
    let blocker = dir.path().join(HELPERS_FILE).with_extension("jsonl.tmp");
    fs::create_dir(&blocker).unwrap();

    let change = StatusChange {
        booking_id: booking.id.clone(),
        expected_status: BookingStatus::Accepted,
        expected_version: 1,
        next_status: BookingStatus::Cancelled,
        reliability: Some(ReliabilityAdjustment {
            helper_id: "helper-1".to_string(),
            delta: -8,
        }),
        now: 12,
    };
    assert!(store.set_booking_status(&change).is_err());

    let stored = store.get_booking(&booking.id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Accepted);
    assert_eq!(stored.version, 1);
    assert_eq!(store.get_helper("helper-1").unwrap().unwrap().reliability_score, 80);
    assert!(!dir.path().join(BOOKINGS_FILE).with_extension("jsonl.tmp").exists());

    fs::remove_dir(&blocker).unwrap();
    assert!(store.set_booking_status(&change).unwrap().is_applied());
    assert_eq!(store.get_helper("helper-1").unwrap().unwrap().reliability_score, 72);
}
