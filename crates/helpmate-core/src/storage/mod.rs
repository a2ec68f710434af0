// Rust guideline compliant 2026-10-12

//! Storage contract for marketplace records.
//!
//! Every mutation that can race is a compare-and-swap: the caller names the
//! state it observed and the store applies the write only if the row still
//! matches. Two implementations are provided:
//!
//! - [`MemoryStore`]: `RwLock`-guarded tables for tests and embedding
//! - [`JsonlStore`]: one JSONL file per table under a data directory, with an
//!   exclusive file lock around every load-modify-save

mod jsonl;
mod memory;
mod records;

pub use jsonl::{
    JsonlStore, BOOKINGS_FILE, DISPUTES_FILE, EVENTS_FILE, HELPERS_FILE, MESSAGES_FILE,
    PAYMENTS_FILE, REVIEWS_FILE,
};
pub use memory::MemoryStore;

use crate::{
    Booking, BookingEvent, BookingStatus, Dispute, DisputeStatus, EscrowAction, EscrowStatus,
    HelperProfile, Message, Metadata, Payment, PaymentStatus, Result, Review, VerificationStatus,
};

/// Outcome of a conditional write.
#[derive(Debug, Clone, PartialEq)]
pub enum CasResult<T> {
    /// The write was applied; carries the stored row.
    Applied(T),
    /// No row with the given identifier exists.
    NotFound,
    /// The row did not match the expected state; carries the current row.
    Mismatch {
        /// Row as currently stored.
        current: T,
    },
}

impl<T> CasResult<T> {
    /// Returns true if the write was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, CasResult::Applied(_))
    }
}

/// Reliability adjustment applied together with a status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReliabilityAdjustment {
    /// Helper whose score changes.
    pub helper_id: String,
    /// Signed delta, clamped into `[0, 100]` against the stored score.
    pub delta: i32,
}

/// Conditional booking status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Booking to update.
    pub booking_id: String,
    /// Status the caller observed.
    pub expected_status: BookingStatus,
    /// Version the caller observed.
    pub expected_version: u64,
    /// Status to write.
    pub next_status: BookingStatus,
    /// Optional reliability adjustment applied in the same critical section.
    pub reliability: Option<ReliabilityAdjustment>,
    /// Timestamp of the write.
    pub now: i64,
}

/// Conditional escrow action.
///
/// The store runs the escrow guard against the row it holds, so only the
/// escrow fields, the refund status and the escrow history keys change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowChange {
    /// Payment to update.
    pub payment_id: String,
    /// Escrow status the caller observed.
    pub expected: EscrowStatus,
    /// Action to apply.
    pub action: EscrowAction,
    /// Optional operator note.
    pub note: Option<String>,
    /// Timestamp of the action.
    pub now: i64,
}

/// Conditional dispute status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisputeDecision {
    /// Dispute to update.
    pub dispute_id: String,
    /// Status the caller observed.
    pub expected: DisputeStatus,
    /// Status to write.
    pub status: DisputeStatus,
    /// Operator note.
    pub resolution_note: Option<String>,
    /// Operator making the decision.
    pub resolved_by: String,
    /// Timestamp of the write.
    pub now: i64,
}

/// Moderation fields of a helper profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelperStanding {
    /// New verification status; `None` keeps the stored one.
    pub verification: Option<VerificationStatus>,
    /// Whether the profile is active.
    pub is_active: bool,
}

/// Persistence for bookings, payments, helper profiles and booking timelines.
///
/// Implementations are shared across threads. Conditional methods return
/// [`CasResult`] rather than an error on a state mismatch so callers can
/// decide how to report it.
pub trait Store: Send + Sync {
    // --- Bookings ---

    /// Gets a booking by ID.
    fn get_booking(&self, id: &str) -> Result<Option<Booking>>;

    /// Inserts a new booking.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the ID is taken, or a validation error if the
    /// booking is malformed.
    fn insert_booking(&self, booking: &Booking) -> Result<()>;

    /// Attaches a helper and moves the booking to `accepted`, only if its
    /// status is still `expected` and no helper is attached.
    fn conditional_assign_helper(
        &self,
        booking_id: &str,
        helper_id: &str,
        expected: BookingStatus,
        now: i64,
    ) -> Result<CasResult<Booking>>;

    /// Writes a new status if the booking still has the expected status and
    /// version, applying the reliability adjustment atomically with it.
    fn set_booking_status(&self, change: &StatusChange) -> Result<CasResult<Booking>>;

    /// Lists bookings where the user is the customer or the helper, newest first.
    fn list_bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>>;

    // --- Timeline ---

    /// Appends a lifecycle event.
    fn append_event(&self, event: &BookingEvent) -> Result<()>;

    /// Lists events of a booking in creation order.
    fn list_events(&self, booking_id: &str) -> Result<Vec<BookingEvent>>;

    /// Stores a chat message.
    fn insert_message(&self, message: &Message) -> Result<()>;

    /// Lists messages of a booking in creation order.
    fn list_messages(&self, booking_id: &str) -> Result<Vec<Message>>;

    /// Stores a review and folds its rating into the helper's average.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the booking already has a review.
    fn insert_review(&self, review: &Review) -> Result<()>;

    // --- Payments ---

    /// Inserts a new payment.
    fn insert_payment(&self, payment: &Payment) -> Result<()>;

    /// Gets a payment by ID.
    fn get_payment(&self, id: &str) -> Result<Option<Payment>>;

    /// Gets a payment by its gateway reference.
    fn get_payment_by_provider_ref(&self, provider_ref: &str) -> Result<Option<Payment>>;

    /// Lists payments of a booking in creation order.
    fn list_payments(&self, booking_id: &str) -> Result<Vec<Payment>>;

    /// Applies an escrow action to the stored payment if its escrow status is
    /// still `expected`.
    ///
    /// # Errors
    ///
    /// Returns the escrow precondition error if the action is illegal from
    /// the expected status.
    fn conditional_set_escrow(&self, change: &EscrowChange) -> Result<CasResult<Payment>>;

    /// Sets a payment's status and merges metadata if its status is still
    /// `expected`.
    fn conditional_set_payment_status(
        &self,
        payment_id: &str,
        expected: PaymentStatus,
        status: PaymentStatus,
        metadata: &Metadata,
        now: i64,
    ) -> Result<CasResult<Payment>>;

    // --- Helpers ---

    /// Gets a helper profile by ID.
    fn get_helper(&self, id: &str) -> Result<Option<HelperProfile>>;

    /// Inserts or replaces a helper profile.
    fn upsert_helper(&self, profile: &HelperProfile) -> Result<()>;

    /// Lists all helper profiles.
    fn list_helpers(&self) -> Result<Vec<HelperProfile>>;

    /// Applies a clamped delta to a helper's reliability score.
    ///
    /// # Returns
    ///
    /// The new score, or `None` if the helper has no profile.
    fn update_reliability_score(&self, helper_id: &str, delta: i32) -> Result<Option<u8>>;

    /// Sets the moderation fields of a helper profile, leaving the rest of
    /// the profile as stored.
    ///
    /// # Returns
    ///
    /// The updated profile, or `None` if the helper has no profile.
    fn set_helper_standing(
        &self,
        helper_id: &str,
        standing: HelperStanding,
    ) -> Result<Option<HelperProfile>>;

    // --- Disputes ---

    /// Stores a new dispute.
    fn insert_dispute(&self, dispute: &Dispute) -> Result<()>;

    /// Gets a dispute by ID.
    fn get_dispute(&self, id: &str) -> Result<Option<Dispute>>;

    /// Lists all disputes, newest first.
    fn list_disputes(&self) -> Result<Vec<Dispute>>;

    /// Writes a dispute decision if the dispute still has the expected status.
    fn conditional_set_dispute_status(
        &self,
        decision: &DisputeDecision,
    ) -> Result<CasResult<Dispute>>;
}
