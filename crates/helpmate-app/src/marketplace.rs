// Rust guideline compliant 2026-10-14

//! The marketplace service.
//!
//! [`Marketplace`] ties a [`Store`] to a [`Notifier`] and an [`AuditSink`].
//! Its operations are split by surface across `booking`, `payment`,
//! `webhook`, `dispute` and `helper`; this module holds the shared plumbing. Notifications, audit
//! entries and timeline events are recorded after the state change is
//! committed, and a failure in any of them is logged and swallowed.

use crate::audit::{AuditEntry, AuditSink};
use crate::error::Result;
use crate::notify::{Notification, Notifier};
use crate::time::unix_timestamp;
use helpmate_core::{Booking, BookingEvent, Config, Entity, Error, Store};
use std::collections::BTreeSet;

/// Marketplace operations over a store and its collaborators.
#[derive(Debug)]
pub struct Marketplace<S, N, A> {
    pub(crate) store: S,
    notifier: N,
    audit: A,
    pub(crate) config: Config,
}

impl<S: Store, N: Notifier, A: AuditSink> Marketplace<S, N, A> {
    /// Creates a marketplace.
    ///
    /// # Arguments
    ///
    /// * `store` - Record storage
    /// * `notifier` - Notification delivery
    /// * `audit` - Audit sink
    /// * `config` - Validated configuration
    pub fn new(store: S, notifier: N, audit: A, config: Config) -> Self {
        Self {
            store,
            notifier,
            audit,
            config,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn now(&self) -> Result<i64> {
        unix_timestamp()
    }

    pub(crate) fn load_booking(&self, booking_id: &str) -> Result<Booking> {
        self.store
            .get_booking(booking_id)?
            .ok_or_else(|| Error::not_found(Entity::Booking, booking_id).into())
    }

    /// Loads a booking the user is a party to.
    pub(crate) fn load_booking_for(&self, booking_id: &str, user_id: &str) -> Result<Booking> {
        let booking = self.load_booking(booking_id)?;
        if !booking.is_party(user_id) {
            return Err(Error::Forbidden(format!(
                "User {} cannot access booking {}",
                user_id, booking_id
            ))
            .into());
        }
        Ok(booking)
    }

    pub(crate) fn record_event(&self, event: &BookingEvent) {
        if let Err(e) = self.store.append_event(event) {
            tracing::warn!(
                booking_id = %event.booking_id,
                action = event.kind.action(),
                error = %e,
                "Failed to append booking event"
            );
        }
    }

    pub(crate) fn send(&self, recipients: BTreeSet<String>, notification: Notification) {
        if !self.config.notifications_enabled || recipients.is_empty() {
            return;
        }
        if let Err(e) = self.notifier.notify(&recipients, &notification) {
            tracing::warn!(
                title = %notification.title,
                error = %e,
                "Failed to deliver notification"
            );
        }
    }

    pub(crate) fn audit(&self, entry: AuditEntry) {
        if let Err(e) = self.audit.record(&entry) {
            tracing::warn!(
                action = %entry.action,
                entity_id = %entry.entity_id,
                error = %e,
                "Failed to record audit entry"
            );
        }
    }
}

/// Customer and assigned helper of a booking.
pub(crate) fn parties(booking: &Booking) -> BTreeSet<String> {
    let mut recipients = BTreeSet::new();
    recipients.insert(booking.customer_id.clone());
    if let Some(helper_id) = booking.helper_id() {
        recipients.insert(helper_id.to_string());
    }
    recipients
}
