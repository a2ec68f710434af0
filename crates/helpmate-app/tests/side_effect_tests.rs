// Rust guideline compliant 2026-10-14

//! Notification and audit behavior around committed operations.

use helpmate_app::notify::PREVIEW_LEN;
use helpmate_app::{
    AppError, AuditEntry, AuditSink, DataDir, HelperModeration, Marketplace, NewBooking,
    NewDispute, Notification, Notifier, NullNotifier, Result,
};
use helpmate_core::{
    BookingStatus, Config, DisputeStatus, EscrowAction, MemoryStore, Metadata, Store,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type Sent = Arc<Mutex<Vec<(BTreeSet<String>, Notification)>>>;

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Sent,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, recipients: &BTreeSet<String>, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipients.clone(), notification.clone()));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingAudit {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl AuditSink for RecordingAudit {
    fn record(&self, entry: &AuditEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _recipients: &BTreeSet<String>, _notification: &Notification) -> Result<()> {
        Err(AppError::InvalidInput("push service down".to_string()))
    }
}

struct FailingAudit;

impl AuditSink for FailingAudit {
    fn record(&self, _entry: &AuditEntry) -> Result<()> {
        Err(AppError::Io(std::io::Error::other("disk full")))
    }
}

fn new_booking() -> NewBooking {
    NewBooking {
        customer_id: "cust-1".to_string(),
        category_id: "cat-cooking".to_string(),
        address_id: "addr-9".to_string(),
        ..NewBooking::default()
    }
}

fn recipients(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn test_notifications_reach_parties() {
    let notifier = RecordingNotifier::default();
    let market = Marketplace::new(
        MemoryStore::new(),
        notifier.clone(),
        RecordingAudit::default(),
        Config::default(),
    );

    let booking = market.create_booking(new_booking()).unwrap();
    market.accept_booking(&booking.id, "helper-1").unwrap();
    market
        .update_status(&booking.id, "helper-1", BookingStatus::Enroute, Metadata::new())
        .unwrap();

    let sent = notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].0, recipients(&["cust-1"]));
    assert_eq!(sent[0].1.title, "Booking requested");
    assert_eq!(sent[1].0, recipients(&["cust-1", "helper-1"]));
    assert_eq!(sent[1].1.title, "Booking accepted");
    assert_eq!(sent[2].1.body, "Booking moved to enroute.");
    assert_eq!(
        sent[2].1.data.get("booking_id").and_then(|v| v.as_str()),
        Some(booking.id.as_str())
    );
}

#[test]
fn test_message_notifies_other_party_with_preview() {
    let notifier = RecordingNotifier::default();
    let market = Marketplace::new(
        MemoryStore::new(),
        notifier.clone(),
        RecordingAudit::default(),
        Config::default(),
    );
    let booking = market.create_booking(new_booking()).unwrap();
    market.accept_booking(&booking.id, "helper-1").unwrap();

    let body = "é".repeat(PREVIEW_LEN + 30);
    market.add_message(&booking.id, "cust-1", &body).unwrap();

    let sent = notifier.sent.lock().unwrap().clone();
    let (to, notification) = sent.last().unwrap();
    assert_eq!(*to, recipients(&["helper-1"]));
    assert_eq!(notification.title, "New message");
    assert_eq!(notification.body.chars().count(), PREVIEW_LEN);
}

#[test]
fn test_disabled_notifications_are_skipped() {
    let notifier = RecordingNotifier::default();
    let config = Config {
        notifications_enabled: false,
        ..Config::default()
    };
    let market = Marketplace::new(
        MemoryStore::new(),
        notifier.clone(),
        RecordingAudit::default(),
        config,
    );
    let booking = market.create_booking(new_booking()).unwrap();
    market.accept_booking(&booking.id, "helper-1").unwrap();

    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[test]
fn test_failing_collaborators_do_not_fail_operations() {
    let market = Marketplace::new(
        MemoryStore::new(),
        FailingNotifier,
        FailingAudit,
        Config::default(),
    );

    let booking = market.create_booking(new_booking()).unwrap();
    let accepted = market.accept_booking(&booking.id, "helper-1").unwrap();
    assert_eq!(accepted.status, BookingStatus::Accepted);

    let cancelled = market.cancel_booking(&booking.id, "cust-1").unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let stored = market.store().get_booking(&booking.id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
}

#[test]
fn test_audit_actions() {
    let audit = RecordingAudit::default();
    let market = Marketplace::new(
        MemoryStore::new(),
        NullNotifier,
        audit.clone(),
        Config::default(),
    );

    let booking = market.create_booking(new_booking()).unwrap();
    market.accept_booking(&booking.id, "helper-1").unwrap();
    market
        .decline_booking(&booking.id, "helper-2", None)
        .unwrap_err();
    market.cancel_booking(&booking.id, "helper-1").unwrap();

    let entries = audit.entries.lock().unwrap().clone();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(
        actions,
        vec!["booking.created", "booking.accepted", "booking.status.updated"]
    );
    let update = &entries[2];
    assert_eq!(update.actor_id, "helper-1");
    assert_eq!(update.entity_id, booking.id);
    assert_eq!(
        update.payload.get("to").and_then(|v| v.as_str()),
        Some("cancelled")
    );
}

#[test]
fn test_payment_audited_after_status_write() {
    let audit = RecordingAudit::default();
    let market = Marketplace::new(
        MemoryStore::new(),
        NullNotifier,
        audit.clone(),
        Config::default(),
    );
    let booking = market.create_booking(new_booking()).unwrap();
    market.accept_booking(&booking.id, "helper-1").unwrap();
    for status in [
        BookingStatus::Enroute,
        BookingStatus::Started,
        BookingStatus::Completed,
    ] {
        market
            .update_status(&booking.id, "helper-1", status, Metadata::new())
            .unwrap();
    }
    audit.entries.lock().unwrap().clear();

    market
        .record_payment(helpmate_app::NewPayment {
            booking_id: booking.id.clone(),
            actor_id: "cust-1".to_string(),
            method: helpmate_core::PaymentMethod::Cash,
            amount: 400.0,
            provider_ref: None,
            metadata: Metadata::new(),
        })
        .unwrap();

    let entries = audit.entries.lock().unwrap().clone();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["booking.status.updated", "booking.payment.recorded"]);
    assert_eq!(entries[0].payload.get("to").and_then(|v| v.as_str()), Some("paid"));
}

#[test]
fn test_operator_actions_are_audited() {
    let audit = RecordingAudit::default();
    let market = Marketplace::new(
        MemoryStore::new(),
        NullNotifier,
        audit.clone(),
        Config::default(),
    );
    market
        .register_helper(&market.new_helper_profile("helper-1"))
        .unwrap();
    let booking = market.create_booking(new_booking()).unwrap();
    audit.entries.lock().unwrap().clear();

    market
        .moderate_helper("helper-1", "admin-1", HelperModeration::Approve)
        .unwrap();
    let dispute = market
        .raise_dispute(NewDispute {
            booking_id: booking.id.clone(),
            raised_by: "cust-1".to_string(),
            reason: "Helper never arrived".to_string(),
            evidence: Vec::new(),
        })
        .unwrap();
    market
        .resolve_dispute(&dispute.id, "admin-1", DisputeStatus::Rejected, Some("no evidence"))
        .unwrap();

    let entries = audit.entries.lock().unwrap().clone();
    let summary: Vec<(&str, &str, &str)> = entries
        .iter()
        .map(|e| (e.action.as_str(), e.entity_type.as_str(), e.actor_id.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("helper.approved", "helper", "admin-1"),
            ("booking.dispute.raised", "booking", "cust-1"),
            ("dispute.rejected", "dispute", "admin-1"),
        ]
    );
    assert_eq!(entries[2].entity_id, dispute.id);
    assert_eq!(
        entries[2].payload.get("note").and_then(|v| v.as_str()),
        Some("no evidence")
    );
}

#[test]
fn test_jsonl_audit_log_through_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let (data_dir, _) = DataDir::init(temp_dir.path()).unwrap();
    let market = Marketplace::new(
        data_dir.open_store().unwrap(),
        NullNotifier,
        data_dir.audit_log(),
        data_dir.load_config().unwrap(),
    );

    let booking = market.create_booking(new_booking()).unwrap();
    market.accept_booking(&booking.id, "helper-1").unwrap();
    for status in [
        BookingStatus::Enroute,
        BookingStatus::Started,
        BookingStatus::Completed,
    ] {
        market
            .update_status(&booking.id, "helper-1", status, Metadata::new())
            .unwrap();
    }
    let receipt = market
        .record_payment(helpmate_app::NewPayment {
            booking_id: booking.id.clone(),
            actor_id: "cust-1".to_string(),
            method: helpmate_core::PaymentMethod::Upi,
            amount: 650.0,
            provider_ref: None,
            metadata: Metadata::new(),
        })
        .unwrap();
    market
        .apply_escrow_action(&receipt.payment.id, "admin-1", EscrowAction::Hold, None)
        .unwrap();

    let entries = data_dir.audit_log().read_all().unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions.first(), Some(&"booking.created"));
    let n = actions.len();
    assert_eq!(
        &actions[n - 3..],
        &["booking.status.updated", "booking.payment.recorded", "payment.escrow.hold"]
    );

    let reopened = data_dir.open_store().unwrap();
    let stored = reopened.get_booking(&booking.id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Paid);
}
