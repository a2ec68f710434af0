// Rust guideline compliant 2026-10-12

//! Core data models for Helpmate.

use crate::identity::{
    self, BOOKING_PREFIX, DISPUTE_PREFIX, EVENT_PREFIX, MESSAGE_PREFIX, PAYMENT_PREFIX,
    REVIEW_PREFIX,
};
use crate::{Error, Metadata, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a booking in the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Customer created the request; no helper yet.
    Requested,
    /// A helper claimed the booking.
    Accepted,
    /// Helper is travelling to the address.
    Enroute,
    /// Work has begun.
    Started,
    /// Work is done, awaiting payment.
    Completed,
    /// Payment recorded. Terminal.
    Paid,
    /// Booking abandoned. Terminal.
    Cancelled,
}

impl BookingStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [BookingStatus; 7] = [
        BookingStatus::Requested,
        BookingStatus::Accepted,
        BookingStatus::Enroute,
        BookingStatus::Started,
        BookingStatus::Completed,
        BookingStatus::Paid,
        BookingStatus::Cancelled,
    ];

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Requested => "requested",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Enroute => "enroute",
            BookingStatus::Started => "started",
            BookingStatus::Completed => "completed",
            BookingStatus::Paid => "paid",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true if a booking in this status must have a helper attached.
    pub fn requires_helper(&self) -> bool {
        !matches!(self, BookingStatus::Requested | BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Helper assignment of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "helper_id", rename_all = "snake_case")]
pub enum HelperAssignment {
    /// No helper has claimed the booking.
    #[default]
    Unassigned,
    /// The booking is claimed by this helper.
    AssignedTo(String),
}

impl HelperAssignment {
    /// Returns the assigned helper, if any.
    pub fn helper_id(&self) -> Option<&str> {
        match self {
            HelperAssignment::Unassigned => None,
            HelperAssignment::AssignedTo(id) => Some(id),
        }
    }
}

/// Customer's price estimate for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lower bound of the estimate.
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound of the estimate.
    #[serde(default)]
    pub max: Option<f64>,
}

impl PriceRange {
    /// Validates that bounds are non-negative and ordered.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a bound is negative or not finite, or if
    /// `min > max`.
    pub fn validate(&self) -> Result<()> {
        for bound in [self.min, self.max].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err(Error::Validation(format!(
                    "Price estimate must be a non-negative number, got {}",
                    bound
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(Error::Validation(format!(
                    "Price estimate minimum {} exceeds maximum {}",
                    min, max
                )));
            }
        }
        Ok(())
    }
}

/// One customer service request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique hash-based identifier (format: bkg-XXXXXXXXXX).
    pub id: String,
    /// Customer who created the request.
    pub customer_id: String,
    /// Helper assignment.
    #[serde(default)]
    pub helper: HelperAssignment,
    /// Service category requested.
    pub category_id: String,
    /// Address where the work happens.
    pub address_id: String,
    /// Current lifecycle status.
    pub status: BookingStatus,
    /// Optional scheduled start (Unix timestamp).
    #[serde(default)]
    pub scheduled_at: Option<i64>,
    /// Free-text notes from the customer.
    #[serde(default)]
    pub notes: Option<String>,
    /// Customer's price estimate.
    #[serde(default)]
    pub price_estimate: PriceRange,
    /// Optimistic-concurrency token, bumped on every stored mutation.
    #[serde(default)]
    pub version: u64,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Booking {
    /// Creates a new booking in `requested` state.
    ///
    /// # Arguments
    ///
    /// * `customer_id` - Customer creating the request
    /// * `category_id` - Requested service category
    /// * `address_id` - Address of the job
    /// * `now` - Creation timestamp
    pub fn new(customer_id: String, category_id: String, address_id: String, now: i64) -> Self {
        let id = identity::next_id(BOOKING_PREFIX, &customer_id, now);
        Self {
            id,
            customer_id,
            helper: HelperAssignment::Unassigned,
            category_id,
            address_id,
            status: BookingStatus::Requested,
            scheduled_at: None,
            notes: None,
            price_estimate: PriceRange::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the assigned helper, if any.
    pub fn helper_id(&self) -> Option<&str> {
        self.helper.helper_id()
    }

    /// Returns true if `user_id` is the customer or the assigned helper.
    pub fn is_party(&self, user_id: &str) -> bool {
        self.customer_id == user_id || self.helper_id() == Some(user_id)
    }

    /// Validates the booking data and the helper/status invariant.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An identifier is empty or malformed
    /// - A helper is attached while `requested`
    /// - No helper is attached past acceptance
    /// - The price estimate is invalid
    pub fn validate(&self) -> Result<()> {
        identity::validate_id_format(&self.id)?;

        if self.customer_id.trim().is_empty() {
            return Err(Error::Validation("Customer ID cannot be empty".to_string()));
        }
        if self.category_id.trim().is_empty() {
            return Err(Error::Validation("Category ID cannot be empty".to_string()));
        }
        if self.address_id.trim().is_empty() {
            return Err(Error::Validation("Address ID cannot be empty".to_string()));
        }

        match (&self.helper, self.status) {
            (HelperAssignment::AssignedTo(_), BookingStatus::Requested) => {
                return Err(Error::Validation(format!(
                    "Booking {} is requested but has a helper attached",
                    self.id
                )));
            }
            (HelperAssignment::Unassigned, status) if status.requires_helper() => {
                return Err(Error::Validation(format!(
                    "Booking {} is {} but has no helper attached",
                    self.id, status
                )));
            }
            _ => {}
        }

        self.price_estimate.validate()
    }
}

/// Helper verification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Documents submitted, not yet reviewed.
    #[default]
    Pending,
    /// Verified; eligible for matching.
    Approved,
    /// Verification failed.
    Rejected,
}

impl VerificationStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

/// Geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Stored helper profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperProfile {
    /// Helper's user identifier.
    pub id: String,
    /// Whether the helper is accepting work at all.
    #[serde(default)]
    pub is_active: bool,
    /// Verification status.
    #[serde(default)]
    pub verification: VerificationStatus,
    /// Service category identifiers offered.
    #[serde(default)]
    pub services: Vec<String>,
    /// Zone identifiers served.
    #[serde(default)]
    pub service_areas: Vec<String>,
    /// Base price for a job.
    #[serde(default)]
    pub base_price: f64,
    /// Running average of review ratings.
    #[serde(default)]
    pub rating_avg: f64,
    /// Number of reviews folded into the average.
    #[serde(default)]
    pub rating_count: u32,
    /// Reliability score in [0, 100].
    pub reliability_score: u8,
    /// Whether the helper is currently available.
    #[serde(default = "default_available")]
    pub is_available: bool,
    /// Last known location.
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

fn default_available() -> bool {
    true
}

impl HelperProfile {
    /// Creates an inactive, unverified profile with the given starting score.
    pub fn new(id: String, reliability_score: u8) -> Self {
        Self {
            id,
            is_active: false,
            verification: VerificationStatus::Pending,
            services: Vec::new(),
            service_areas: Vec::new(),
            base_price: 0.0,
            rating_avg: 0.0,
            rating_count: 0,
            reliability_score: reliability_score.min(100),
            is_available: true,
            location: None,
        }
    }

    /// Folds one review rating into the running average.
    pub fn record_rating(&mut self, rating: u8) {
        let total = self.rating_avg * f64::from(self.rating_count) + f64::from(rating);
        self.rating_count = self.rating_count.saturating_add(1);
        self.rating_avg = total / f64::from(self.rating_count);
    }

    /// Validates the profile data.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty, the score exceeds 100, or the base
    /// price is negative.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation("Helper ID cannot be empty".to_string()));
        }
        if self.reliability_score > 100 {
            return Err(Error::Validation(format!(
                "Reliability score must be 0-100, got {}",
                self.reliability_score
            )));
        }
        if !self.base_price.is_finite() || self.base_price < 0.0 {
            return Err(Error::Validation(format!(
                "Base price must be a non-negative number, got {}",
                self.base_price
            )));
        }
        Ok(())
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash handed to the helper.
    Cash,
    /// UPI transfer.
    Upi,
    /// Hosted payment gateway order.
    Gateway,
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting confirmation.
    Pending,
    /// Funds received.
    Paid,
    /// Payment attempt failed.
    Failed,
    /// Funds returned to the customer.
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        };
        f.write_str(name)
    }
}

/// Escrow status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    /// Escrow not used.
    #[default]
    Na,
    /// Funds held.
    Held,
    /// Funds released to the helper. Terminal.
    Released,
    /// Funds refunded to the customer. Terminal.
    Refunded,
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EscrowStatus::Na => "na",
            EscrowStatus::Held => "held",
            EscrowStatus::Released => "released",
            EscrowStatus::Refunded => "refunded",
        };
        f.write_str(name)
    }
}

/// One monetary transaction tied to a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique hash-based identifier (format: pay-XXXXXXXXXX).
    pub id: String,
    /// Booking the payment belongs to.
    pub booking_id: String,
    /// Payment method.
    pub method: PaymentMethod,
    /// Payment status.
    pub status: PaymentStatus,
    /// Escrow status.
    #[serde(default)]
    pub escrow_status: EscrowStatus,
    /// Amount paid.
    pub amount: f64,
    /// Gateway reference, if any.
    #[serde(default)]
    pub provider_ref: Option<String>,
    /// Additive metadata bag.
    #[serde(default)]
    pub metadata: Metadata,
    /// When escrow was placed on hold.
    #[serde(default)]
    pub escrow_held_at: Option<i64>,
    /// When escrow was released.
    #[serde(default)]
    pub escrow_released_at: Option<i64>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Payment {
    /// Creates a new payment with escrow status `na`.
    pub fn new(
        booking_id: String,
        method: PaymentMethod,
        status: PaymentStatus,
        amount: f64,
        now: i64,
    ) -> Self {
        let id = identity::next_id(PAYMENT_PREFIX, &booking_id, now);
        Self {
            id,
            booking_id,
            method,
            status,
            escrow_status: EscrowStatus::Na,
            amount,
            provider_ref: None,
            metadata: Metadata::new(),
            escrow_held_at: None,
            escrow_released_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validates the payment data.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is malformed, the booking ID is empty, or the
    /// amount is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        identity::validate_id_format(&self.id)?;
        if self.booking_id.trim().is_empty() {
            return Err(Error::Validation("Booking ID cannot be empty".to_string()));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::Validation(format!(
                "Amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Kind of lifecycle event recorded on a booking timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Booking created.
    Created,
    /// Helper accepted.
    Accepted,
    /// Helper declined; status unchanged.
    Declined,
    /// Status moved.
    StatusChanged,
}

impl EventKind {
    /// Returns the dotted event name used in audit entries.
    pub fn action(&self) -> &'static str {
        match self {
            EventKind::Created => "booking.created",
            EventKind::Accepted => "booking.accepted",
            EventKind::Declined => "booking.declined",
            EventKind::StatusChanged => "booking.status.changed",
        }
    }
}

/// Lifecycle event on a booking timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingEvent {
    /// Unique hash-based identifier (format: evt-XXXXXXXXXX).
    pub id: String,
    /// Booking the event belongs to.
    pub booking_id: String,
    /// Who caused the event.
    pub actor_id: String,
    /// Event kind.
    pub kind: EventKind,
    /// Status before the event.
    #[serde(default)]
    pub from_status: Option<BookingStatus>,
    /// Status after the event.
    #[serde(default)]
    pub to_status: Option<BookingStatus>,
    /// Event payload.
    #[serde(default)]
    pub payload: Metadata,
    /// Unix timestamp of the event.
    pub created_at: i64,
}

impl BookingEvent {
    /// Creates a new event record.
    pub fn new(
        booking_id: &str,
        actor_id: &str,
        kind: EventKind,
        from_status: Option<BookingStatus>,
        to_status: Option<BookingStatus>,
        payload: Metadata,
        now: i64,
    ) -> Self {
        Self {
            id: identity::next_id(EVENT_PREFIX, booking_id, now),
            booking_id: booking_id.to_string(),
            actor_id: actor_id.to_string(),
            kind,
            from_status,
            to_status,
            payload,
            created_at: now,
        }
    }
}

/// Chat message on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique hash-based identifier (format: msg-XXXXXXXXXX).
    pub id: String,
    /// Booking the message belongs to.
    pub booking_id: String,
    /// Sender's user identifier.
    pub sender_id: String,
    /// Message text.
    pub body: String,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl Message {
    /// Creates a new message.
    pub fn new(booking_id: &str, sender_id: &str, body: String, now: i64) -> Self {
        Self {
            id: identity::next_id(MESSAGE_PREFIX, booking_id, now),
            booking_id: booking_id.to_string(),
            sender_id: sender_id.to_string(),
            body,
            created_at: now,
        }
    }
}

/// Customer review of a completed, paid booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Unique hash-based identifier (format: rev-XXXXXXXXXX).
    pub id: String,
    /// Reviewed booking.
    pub booking_id: String,
    /// Reviewing customer.
    pub customer_id: String,
    /// Reviewed helper.
    pub helper_id: String,
    /// Rating from 1 to 5.
    pub rating: u8,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl Review {
    /// Creates a new review.
    pub fn new(
        booking_id: &str,
        customer_id: &str,
        helper_id: &str,
        rating: u8,
        comment: Option<String>,
        now: i64,
    ) -> Self {
        Self {
            id: identity::next_id(REVIEW_PREFIX, booking_id, now),
            booking_id: booking_id.to_string(),
            customer_id: customer_id.to_string(),
            helper_id: helper_id.to_string(),
            rating,
            comment,
            created_at: now,
        }
    }
}

/// Status of a dispute raised on a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    /// Raised, not yet looked at.
    #[default]
    Open,
    /// Under review by an operator.
    Investigating,
    /// Closed in favour of the party who raised it.
    Resolved,
    /// Closed without action.
    Rejected,
}

impl DisputeStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeStatus::Open => "open",
            DisputeStatus::Investigating => "investigating",
            DisputeStatus::Resolved => "resolved",
            DisputeStatus::Rejected => "rejected",
        }
    }

    /// Returns true once the dispute can no longer change.
    pub fn is_closed(&self) -> bool {
        matches!(self, DisputeStatus::Resolved | DisputeStatus::Rejected)
    }
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispute raised by a party to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// Unique hash-based identifier (format: dsp-XXXXXXXXXX).
    pub id: String,
    /// Disputed booking.
    pub booking_id: String,
    /// Party who raised the dispute.
    pub raised_by: String,
    /// Why the dispute was raised.
    pub reason: String,
    /// References to supporting material.
    #[serde(default)]
    pub evidence: Vec<String>,
    /// Current status.
    #[serde(default)]
    pub status: DisputeStatus,
    /// Operator note recorded with the latest decision.
    #[serde(default)]
    pub resolution_note: Option<String>,
    /// Operator who made the latest decision.
    #[serde(default)]
    pub resolved_by: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of the last change.
    pub updated_at: i64,
}

impl Dispute {
    /// Creates an open dispute.
    pub fn new(
        booking_id: &str,
        raised_by: &str,
        reason: String,
        evidence: Vec<String>,
        now: i64,
    ) -> Self {
        Self {
            id: identity::next_id(DISPUTE_PREFIX, booking_id, now),
            booking_id: booking_id.to_string(),
            raised_by: raised_by.to_string(),
            reason,
            evidence,
            status: DisputeStatus::Open,
            resolution_note: None,
            resolved_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validates the dispute data.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is malformed or the reason is empty.
    pub fn validate(&self) -> Result<()> {
        identity::validate_id_format(&self.id)?;
        if self.reason.trim().is_empty() {
            return Err(Error::Validation("Dispute reason cannot be empty".to_string()));
        }
        Ok(())
    }
}
