// Rust guideline compliant 2026-10-12

//! In-memory store.
//!
//! All tables live behind one `RwLock`, so every conditional write and the
//! reliability update that rides along with it happen in one critical
//! section. State is lost when the process exits.

use super::records;
use super::{CasResult, DisputeDecision, EscrowChange, HelperStanding, StatusChange, Store};
use crate::{
    Booking, BookingEvent, BookingStatus, Dispute, Error, HelperProfile, Message, Metadata, Payment,
    PaymentStatus, Result, Review,
};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    bookings: Vec<Booking>,
    events: Vec<BookingEvent>,
    messages: Vec<Message>,
    reviews: Vec<Review>,
    payments: Vec<Payment>,
    helpers: Vec<HelperProfile>,
    disputes: Vec<Dispute>,
}

/// Thread-safe in-memory implementation of [`Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::Storage("lock poisoned".to_string())
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(poison_err)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(poison_err)
    }
}

impl Store for MemoryStore {
    fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        Ok(records::find(&self.read()?.bookings, id).cloned())
    }

    fn insert_booking(&self, booking: &Booking) -> Result<()> {
        records::insert_booking(&mut self.write()?.bookings, booking)
    }

    fn conditional_assign_helper(
        &self,
        booking_id: &str,
        helper_id: &str,
        expected: BookingStatus,
        now: i64,
    ) -> Result<CasResult<Booking>> {
        let mut tables = self.write()?;
        Ok(records::assign_helper(
            &mut tables.bookings,
            booking_id,
            helper_id,
            expected,
            now,
        ))
    }

    fn set_booking_status(&self, change: &StatusChange) -> Result<CasResult<Booking>> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        Ok(records::apply_status_change(
            &mut tables.bookings,
            &mut tables.helpers,
            change,
        ))
    }

    fn list_bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        Ok(records::bookings_for_user(&self.read()?.bookings, user_id))
    }

    fn append_event(&self, event: &BookingEvent) -> Result<()> {
        records::insert_unique(&mut self.write()?.events, event)
    }

    fn list_events(&self, booking_id: &str) -> Result<Vec<BookingEvent>> {
        Ok(records::for_booking(&self.read()?.events, booking_id, |e| {
            e.booking_id.as_str()
        }))
    }

    fn insert_message(&self, message: &Message) -> Result<()> {
        records::insert_unique(&mut self.write()?.messages, message)
    }

    fn list_messages(&self, booking_id: &str) -> Result<Vec<Message>> {
        Ok(records::for_booking(&self.read()?.messages, booking_id, |m| {
            m.booking_id.as_str()
        }))
    }

    fn insert_review(&self, review: &Review) -> Result<()> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        records::insert_review(&mut tables.reviews, &mut tables.helpers, review)
    }

    fn insert_payment(&self, payment: &Payment) -> Result<()> {
        records::insert_payment(&mut self.write()?.payments, payment)
    }

    fn get_payment(&self, id: &str) -> Result<Option<Payment>> {
        Ok(records::find(&self.read()?.payments, id).cloned())
    }

    fn get_payment_by_provider_ref(&self, provider_ref: &str) -> Result<Option<Payment>> {
        Ok(self
            .read()?
            .payments
            .iter()
            .find(|p| p.provider_ref.as_deref() == Some(provider_ref))
            .cloned())
    }

    fn list_payments(&self, booking_id: &str) -> Result<Vec<Payment>> {
        Ok(records::for_booking(&self.read()?.payments, booking_id, |p| {
            p.booking_id.as_str()
        }))
    }

    fn conditional_set_escrow(&self, change: &EscrowChange) -> Result<CasResult<Payment>> {
        records::set_escrow(&mut self.write()?.payments, change)
    }

    fn conditional_set_payment_status(
        &self,
        payment_id: &str,
        expected: PaymentStatus,
        status: PaymentStatus,
        metadata: &Metadata,
        now: i64,
    ) -> Result<CasResult<Payment>> {
        Ok(records::set_payment_status(
            &mut self.write()?.payments,
            payment_id,
            expected,
            status,
            metadata,
            now,
        ))
    }

    fn get_helper(&self, id: &str) -> Result<Option<HelperProfile>> {
        Ok(records::find(&self.read()?.helpers, id).cloned())
    }

    fn upsert_helper(&self, profile: &HelperProfile) -> Result<()> {
        records::upsert_helper(&mut self.write()?.helpers, profile)
    }

    fn list_helpers(&self) -> Result<Vec<HelperProfile>> {
        Ok(self.read()?.helpers.clone())
    }

    fn update_reliability_score(&self, helper_id: &str, delta: i32) -> Result<Option<u8>> {
        Ok(records::adjust_reliability(
            &mut self.write()?.helpers,
            helper_id,
            delta,
        ))
    }

    fn set_helper_standing(
        &self,
        helper_id: &str,
        standing: HelperStanding,
    ) -> Result<Option<HelperProfile>> {
        Ok(records::set_helper_standing(
            &mut self.write()?.helpers,
            helper_id,
            standing,
        ))
    }

    fn insert_dispute(&self, dispute: &Dispute) -> Result<()> {
        records::insert_dispute(&mut self.write()?.disputes, dispute)
    }

    fn get_dispute(&self, id: &str) -> Result<Option<Dispute>> {
        Ok(records::find(&self.read()?.disputes, id).cloned())
    }

    fn list_disputes(&self) -> Result<Vec<Dispute>> {
        Ok(records::disputes_newest_first(&self.read()?.disputes))
    }

    fn conditional_set_dispute_status(
        &self,
        decision: &DisputeDecision,
    ) -> Result<CasResult<Dispute>> {
        Ok(records::set_dispute_status(
            &mut self.write()?.disputes,
            decision,
        ))
    }
}
