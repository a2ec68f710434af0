// Rust guideline compliant 2026-10-14

//! Application services for Helpmate.
//!
//! This crate drives the core decision components against a store: the
//! booking lifecycle, payments and escrow, gateway webhooks, disputes, helper
//! moderation, ranking and earnings. It also provides notification and audit collaborators, data directory
//! discovery, input parsing and standardized response envelopes.

pub mod audit;
pub mod booking;
pub mod dispute;
pub mod error;
pub mod helper;
pub mod marketplace;
pub mod notify;
pub mod parse;
pub mod payment;
pub mod repo;
pub mod response;
pub mod time;
pub mod webhook;

pub use audit::{AuditEntry, AuditSink, JsonlAuditLog, TracingAuditSink};
pub use booking::{
    authorize_status_change, role_of, BookingTimeline, DeclineReceipt, NewBooking, NewReview,
    Role,
};
pub use dispute::NewDispute;
pub use error::{AppError, ErrorCode, Result};
pub use helper::HelperModeration;
pub use marketplace::Marketplace;
pub use notify::{LogNotifier, Notification, Notifier, NullNotifier};
pub use parse::{
    parse_dispute_status, parse_escrow_action, parse_metadata, parse_method, parse_status,
};
pub use payment::{GatewayOutcome, NewPayment, PaymentReceipt, Reconciliation};
pub use repo::DataDir;
pub use response::{ErrorEnvelope, SuccessEnvelope};
pub use time::unix_timestamp;
pub use webhook::{sign_webhook_body, verify_webhook_signature};
