// Rust guideline compliant 2026-10-14

//! Booking lifecycle operations.

use crate::audit::{AuditEntry, AuditSink};
use crate::error::Result;
use crate::marketplace::{parties, Marketplace};
use crate::notify::{preview, Notification, Notifier};
use helpmate_core::{
    reliability_delta, validate_transition, Booking, BookingEvent, BookingStatus, CasResult, Entity, Error, EventKind,
    Message, Metadata, Payment, PriceRange, ReliabilityAdjustment, Review, StatusChange, Store,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Role a caller acts in when requesting a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The customer who created the booking.
    Customer,
    /// A helper.
    Helper,
}

/// Returns the role a user holds on a booking, if any.
///
/// The customer is checked first, so a user who is both customer and
/// assigned helper acts as the customer.
pub fn role_of(booking: &Booking, user_id: &str) -> Option<Role> {
    if booking.customer_id == user_id {
        Some(Role::Customer)
    } else if booking.helper_id() == Some(user_id) {
        Some(Role::Helper)
    } else {
        None
    }
}

/// Checks the role rule for status changes.
///
/// A customer may only mark a booking `paid`; helpers may request any status.
/// The transition table is checked separately.
///
/// # Errors
///
/// Returns `Forbidden` if a customer requests anything but `paid`.
pub fn authorize_status_change(role: Role, to: BookingStatus) -> Result<()> {
    if role == Role::Customer && to != BookingStatus::Paid {
        return Err(Error::Forbidden(format!("Customers cannot set booking status to {}", to)).into());
    }
    Ok(())
}

/// Input for creating a booking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    /// Customer creating the request.
    pub customer_id: String,
    /// Requested service category.
    pub category_id: String,
    /// Address of the job.
    pub address_id: String,
    /// Optional scheduled start.
    #[serde(default)]
    pub scheduled_at: Option<i64>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Price estimate.
    #[serde(default)]
    pub price_estimate: PriceRange,
}

/// Result of declining a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineReceipt {
    /// Declined booking.
    pub booking_id: String,
    /// Declining helper.
    pub helper_id: String,
    /// Always true.
    pub declined: bool,
}

/// Input for reviewing a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    /// Reviewed booking.
    pub booking_id: String,
    /// Reviewing customer.
    pub customer_id: String,
    /// Rating from 1 to 5.
    pub rating: u8,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Everything recorded against a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingTimeline {
    /// The booking.
    pub booking: Booking,
    /// Lifecycle events in creation order.
    pub events: Vec<BookingEvent>,
    /// Messages in creation order.
    pub messages: Vec<Message>,
    /// Payments in creation order.
    pub payments: Vec<Payment>,
}

fn booking_data(booking_id: &str, status: BookingStatus) -> Metadata {
    Metadata::new()
        .with("booking_id", booking_id)
        .with("status", status.as_str())
}

impl<S: Store, N: Notifier, A: AuditSink> Marketplace<S, N, A> {
    /// Creates a booking in `requested` state.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a field is empty or the price estimate
    /// is negative or inverted.
    pub fn create_booking(&self, input: NewBooking) -> Result<Booking> {
        let now = self.now()?;
        let mut booking = Booking::new(input.customer_id, input.category_id, input.address_id, now);
        booking.scheduled_at = input.scheduled_at;
        booking.notes = input.notes;
        booking.price_estimate = input.price_estimate;
        booking.validate()?;

        self.store.insert_booking(&booking)?;
        tracing::debug!(booking_id = %booking.id, "Booking created");

        self.record_event(&BookingEvent::new(
            &booking.id,
            &booking.customer_id,
            EventKind::Created,
            None,
            Some(BookingStatus::Requested),
            Metadata::new(),
            now,
        ));
        self.send(
            BTreeSet::from([booking.customer_id.clone()]),
            Notification::new(
                "Booking requested",
                "Your request has been created.",
                booking_data(&booking.id, booking.status),
            ),
        );
        self.audit(AuditEntry::booking(
            &booking.customer_id,
            EventKind::Created.action(),
            &booking.id,
            Metadata::new().with("category_id", booking.category_id.as_str()),
            now,
        ));
        Ok(booking)
    }

    /// Claims a requested booking for a helper.
    ///
    /// At most one helper wins; every other concurrent caller gets
    /// `BookingUnavailable`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the booking does not exist
    /// - `Forbidden` if the helper is the booking's customer
    /// - `BookingUnavailable` if the booking is no longer `requested`
    pub fn accept_booking(&self, booking_id: &str, helper_id: &str) -> Result<Booking> {
        let booking = self.load_booking(booking_id)?;
        if booking.customer_id == helper_id {
            return Err(Error::Forbidden("Customers cannot accept their own booking".to_string()).into());
        }

        let now = self.now()?;
        let accepted = match self.store.conditional_assign_helper(
            booking_id,
            helper_id,
            BookingStatus::Requested,
            now,
        )? {
            CasResult::Applied(booking) => booking,
            CasResult::NotFound => return Err(Error::not_found(Entity::Booking, booking_id).into()),
            CasResult::Mismatch { current } => {
                tracing::debug!(
                    booking_id,
                    helper_id,
                    status = %current.status,
                    "Booking already taken"
                );
                return Err(Error::BookingUnavailable(booking_id.to_string()).into());
            }
        };

        self.record_event(&BookingEvent::new(
            booking_id,
            helper_id,
            EventKind::Accepted,
            Some(BookingStatus::Requested),
            Some(BookingStatus::Accepted),
            Metadata::new(),
            now,
        ));
        self.send(
            parties(&accepted),
            Notification::new(
                "Booking accepted",
                "Helper has accepted the booking.",
                booking_data(booking_id, accepted.status),
            ),
        );
        self.audit(AuditEntry::booking(
            helper_id,
            EventKind::Accepted.action(),
            booking_id,
            Metadata::new(),
            now,
        ));
        Ok(accepted)
    }

    /// Records that a helper passed on a requested booking.
    ///
    /// The booking itself is not changed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the booking does not exist, or `Forbidden` if it
    /// is no longer `requested`.
    pub fn decline_booking(
        &self,
        booking_id: &str,
        helper_id: &str,
        reason: Option<&str>,
    ) -> Result<DeclineReceipt> {
        let booking = self.load_booking(booking_id)?;
        if booking.status != BookingStatus::Requested {
            return Err(Error::Forbidden("Only requested bookings can be declined".to_string()).into());
        }

        let now = self.now()?;
        let mut payload = Metadata::new();
        if let Some(reason) = reason {
            payload.insert("reason", reason);
        }
        self.record_event(&BookingEvent::new(
            booking_id,
            helper_id,
            EventKind::Declined,
            Some(booking.status),
            Some(booking.status),
            payload.clone(),
            now,
        ));
        self.audit(AuditEntry::booking(
            helper_id,
            EventKind::Declined.action(),
            booking_id,
            payload,
            now,
        ));

        Ok(DeclineReceipt {
            booking_id: booking_id.to_string(),
            helper_id: helper_id.to_string(),
            declined: true,
        })
    }

    /// Moves a booking to a new status.
    ///
    /// Requesting the current status returns the booking unchanged with no
    /// side effects. Otherwise the status and any reliability adjustment are
    /// written together, conditional on the status and version read here.
    ///
    /// # Arguments
    ///
    /// * `booking_id` - Booking to update
    /// * `actor_id` - Customer or assigned helper making the change
    /// * `to` - Requested status
    /// * `metadata` - Payload recorded on the timeline event
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the booking does not exist
    /// - `Forbidden` if the actor is not a party to the booking
    /// - `InvalidTransition` if the move is not allowed
    /// - `Conflict` if the booking changed concurrently
    pub fn update_status(
        &self,
        booking_id: &str,
        actor_id: &str,
        to: BookingStatus,
        metadata: Metadata,
    ) -> Result<Booking> {
        let booking = self.load_booking_for(booking_id, actor_id)?;
        let from = booking.status;
        validate_transition(from, to)?;
        if from == to {
            return Ok(booking);
        }

        let reliability = booking.helper_id().and_then(|helper_id| {
            let delta = reliability_delta(from, to);
            (delta != 0).then(|| ReliabilityAdjustment {
                helper_id: helper_id.to_string(),
                delta,
            })
        });

        let now = self.now()?;
        let change = StatusChange {
            booking_id: booking_id.to_string(),
            expected_status: from,
            expected_version: booking.version,
            next_status: to,
            reliability,
            now,
        };
        let updated = match self.store.set_booking_status(&change)? {
            CasResult::Applied(updated) => updated,
            CasResult::NotFound => return Err(Error::not_found(Entity::Booking, booking_id).into()),
            CasResult::Mismatch { current } if current.status == to => return Ok(current),
            CasResult::Mismatch { current } => {
                return Err(Error::Conflict(format!(
                    "Booking {} changed from {} to {} while updating",
                    booking_id, from, current.status
                ))
                .into());
            }
        };
        tracing::debug!(booking_id, %from, %to, "Booking status updated");

        self.record_event(&BookingEvent::new(
            booking_id,
            actor_id,
            EventKind::StatusChanged,
            Some(from),
            Some(to),
            metadata.clone(),
            now,
        ));
        self.send(
            parties(&updated),
            Notification::new(
                "Booking status updated",
                format!("Booking moved to {}.", to),
                booking_data(booking_id, to),
            ),
        );
        self.audit(AuditEntry::booking(
            actor_id,
            "booking.status.updated",
            booking_id,
            metadata
                .with("from", from.as_str())
                .with("to", to.as_str()),
            now,
        ));
        Ok(updated)
    }

    /// Changes a booking's status on behalf of one of its parties.
    ///
    /// The caller's role comes from the booking itself: the customer may only
    /// mark it `paid` and the assigned helper may request any move the
    /// transition table allows.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the booking does not exist
    /// - `Forbidden` if the actor is not a party or the role rule refuses
    /// - Any error from [`Marketplace::update_status`]
    pub fn request_status_change(
        &self,
        booking_id: &str,
        actor_id: &str,
        to: BookingStatus,
        metadata: Metadata,
    ) -> Result<Booking> {
        let booking = self.load_booking_for(booking_id, actor_id)?;
        let role = role_of(&booking, actor_id).ok_or_else(|| {
            Error::Forbidden(format!("User {} cannot access booking {}", actor_id, booking_id))
        })?;
        authorize_status_change(role, to)?;
        self.update_status(booking_id, actor_id, to, metadata)
    }

    /// Cancels a booking.
    ///
    /// # Errors
    ///
    /// Same as [`Marketplace::update_status`].
    pub fn cancel_booking(&self, booking_id: &str, actor_id: &str) -> Result<Booking> {
        self.update_status(booking_id, actor_id, BookingStatus::Cancelled, Metadata::new())
    }

    /// Posts a chat message on a booking.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the booking does not exist
    /// - `Forbidden` if the sender is not a party or the booking is cancelled
    /// - A validation error if the body is empty or too long
    pub fn add_message(&self, booking_id: &str, sender_id: &str, body: &str) -> Result<Message> {
        let booking = self.load_booking_for(booking_id, sender_id)?;
        if booking.status == BookingStatus::Cancelled {
            return Err(Error::Forbidden("Cannot message on cancelled booking".to_string()).into());
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(Error::Validation("Message body cannot be empty".to_string()).into());
        }
        let length = body.chars().count();
        if length > self.config.max_message_len {
            return Err(Error::Validation(format!(
                "Message body is {} characters; the limit is {}",
                length, self.config.max_message_len
            ))
            .into());
        }

        let message = Message::new(booking_id, sender_id, body.to_string(), self.now()?);
        self.store.insert_message(&message)?;

        let mut recipients = parties(&booking);
        recipients.remove(sender_id);
        self.send(
            recipients,
            Notification::new(
                "New message",
                preview(body),
                Metadata::new().with("booking_id", booking_id),
            ),
        );
        Ok(message)
    }

    /// Reviews the helper of a paid booking.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the booking does not exist
    /// - `Forbidden` if the caller is not the customer, the booking is not
    ///   `paid`, or it has no helper
    /// - A validation error if the rating is outside 1-5
    /// - `Conflict` if the booking was already reviewed
    pub fn add_review(&self, input: NewReview) -> Result<Review> {
        let booking = self.load_booking(&input.booking_id)?;
        if booking.customer_id != input.customer_id {
            return Err(Error::Forbidden("Only the customer can review".to_string()).into());
        }
        if booking.status != BookingStatus::Paid {
            return Err(Error::Forbidden("Review allowed only after payment".to_string()).into());
        }
        let Some(helper_id) = booking.helper_id() else {
            return Err(Error::Forbidden("Booking has no helper".to_string()).into());
        };
        if !(1..=5).contains(&input.rating) {
            return Err(Error::Validation(format!(
                "Rating must be 1-5, got {}",
                input.rating
            ))
            .into());
        }

        let now = self.now()?;
        let review = Review::new(
            &booking.id,
            &input.customer_id,
            helper_id,
            input.rating,
            input.comment,
            now,
        );
        self.store.insert_review(&review)?;

        self.send(
            BTreeSet::from([helper_id.to_string()]),
            Notification::new(
                "New review",
                format!("You received a {}-star review.", review.rating),
                Metadata::new().with("booking_id", booking.id.as_str()),
            ),
        );
        self.audit(AuditEntry::booking(
            &input.customer_id,
            "booking.review.created",
            &booking.id,
            Metadata::new().with("rating", i64::from(review.rating)),
            now,
        ));
        Ok(review)
    }

    /// Returns a booking the user is a party to.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Forbidden`.
    pub fn get_booking(&self, booking_id: &str, user_id: &str) -> Result<Booking> {
        self.load_booking_for(booking_id, user_id)
    }

    /// Returns the booking with its events, messages and payments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Forbidden`.
    pub fn booking_timeline(&self, booking_id: &str, user_id: &str) -> Result<BookingTimeline> {
        let booking = self.load_booking_for(booking_id, user_id)?;
        Ok(BookingTimeline {
            events: self.store.list_events(booking_id)?,
            messages: self.store.list_messages(booking_id)?,
            payments: self.store.list_payments(booking_id)?,
            booking,
        })
    }

    /// Lists bookings where the user is customer or helper, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list_bookings(&self, user_id: &str) -> Result<Vec<Booking>> {
        Ok(self.store.list_bookings_for_user(user_id)?)
    }
}
