// Rust guideline compliant 2026-10-12

//! JSONL file store.
//!
//! Each table is one file of newline-delimited JSON under the data directory.
//! Writers take an exclusive `fs2` lock on `<data-dir>/store.lock`, load the
//! tables they touch, apply the change and write them back in two phases:
//! every touched table is first written and synced to a temp file, and the
//! temp files are renamed over the tables only once all of them are written.
//! Readers do not lock: a rename is atomic, so a reader always sees either the
//! old or the new file.
//!
//! Lines that fail to parse are skipped on read but kept verbatim when the
//! table is rewritten.

use super::records;
use super::{CasResult, DisputeDecision, EscrowChange, HelperStanding, StatusChange, Store};
use crate::{
    Booking, BookingEvent, BookingStatus, Dispute, Error, HelperProfile, Message, Metadata,
    Payment, PaymentStatus, Result, Review,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Bookings table file name.
pub const BOOKINGS_FILE: &str = "bookings.jsonl";
/// Payments table file name.
pub const PAYMENTS_FILE: &str = "payments.jsonl";
/// Helper profiles table file name.
pub const HELPERS_FILE: &str = "helpers.jsonl";
/// Lifecycle events table file name.
pub const EVENTS_FILE: &str = "events.jsonl";
/// Chat messages table file name.
pub const MESSAGES_FILE: &str = "messages.jsonl";
/// Reviews table file name.
pub const REVIEWS_FILE: &str = "reviews.jsonl";
/// Disputes table file name.
pub const DISPUTES_FILE: &str = "disputes.jsonl";

const LOCK_FILE: &str = "store.lock";

/// Parsed rows of a table plus the lines that did not parse.
#[derive(Debug)]
struct Table<T> {
    rows: Vec<T>,
    unparsed: Vec<String>,
}

/// A table written to its temp file, waiting to be renamed into place.
#[derive(Debug)]
struct Staged {
    temp_path: PathBuf,
    path: PathBuf,
}

/// Tables staged for one write.
///
/// Temp files still staged when the batch is dropped are removed, so a
/// failure while staging leaves every table untouched.
#[derive(Debug, Default)]
struct Batch {
    staged: Vec<Staged>,
}

impl Batch {
    fn commit(mut self) -> Result<()> {
        while !self.staged.is_empty() {
            let next = self.staged.remove(0);
            if let Err(e) = std::fs::rename(&next.temp_path, &next.path) {
                remove_temp(&next.temp_path);
                return Err(e.into());
            }
        }
        Ok(())
    }
}

impl Drop for Batch {
    fn drop(&mut self) {
        for staged in &self.staged {
            remove_temp(&staged.temp_path);
        }
    }
}

fn remove_temp(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::debug!(path = %path.display(), error = %e, "Failed to remove temp table");
    }
}

/// File-backed implementation of [`Store`].
#[derive(Debug, Clone)]
pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    /// Opens a store rooted at an existing data directory.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory holding the table files
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or is not a directory.
    pub fn open(dir: PathBuf) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Storage(format!(
                "Data directory does not exist: {}",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    /// Returns the data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Loads a table, one JSON document per line.
    ///
    /// Malformed lines are logged and set aside.
    fn load_table<T: DeserializeOwned>(&self, name: &str) -> Result<Table<T>> {
        let path = self.table_path(name);
        let mut table = Table {
            rows: Vec::new(),
            unparsed: Vec::new(),
        };
        if !path.exists() {
            return Ok(table);
        }

        let reader = BufReader::new(File::open(&path)?);
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(row) => table.rows.push(row),
                Err(e) => {
                    tracing::warn!(
                        table = name,
                        line = index + 1,
                        error = %e,
                        "Skipping malformed JSONL record"
                    );
                    table.unparsed.push(line);
                }
            }
        }
        Ok(table)
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        Ok(self.load_table(name)?.rows)
    }

    /// Writes a table to its temp file and adds it to the batch.
    fn stage<T: Serialize>(&self, batch: &mut Batch, name: &str, table: &Table<T>) -> Result<()> {
        let path = self.table_path(name);
        let temp_path = path.with_extension("jsonl.tmp");

        let file = File::create(&temp_path)?;
        batch.staged.push(Staged { temp_path, path });

        let mut writer = BufWriter::new(file);
        for row in &table.rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n")?;
        }
        for line in &table.unparsed {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Executes a closure with an exclusive lock on the data directory.
    ///
    /// Blocks until the lock is available. The lock is released when the
    /// closure returns, whether or not it succeeded.
    fn with_lock<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        use fs2::FileExt;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.table_path(LOCK_FILE))?;
        lock_file.lock_exclusive()?;

        let result = f();

        if let Err(e) = lock_file.unlock() {
            tracing::warn!(error = %e, "Failed to release store lock");
        }
        result
    }

    /// Load-modify-save of a single table under the lock.
    ///
    /// The table is written back only if the closure succeeds and reports a
    /// change.
    fn update<T, R, F>(&self, name: &str, f: F) -> Result<R>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce(&mut Vec<T>) -> Result<(R, bool)>,
    {
        self.with_lock(|| {
            let mut table = self.load_table(name)?;
            let (out, changed) = f(&mut table.rows)?;
            if changed {
                let mut batch = Batch::default();
                self.stage(&mut batch, name, &table)?;
                batch.commit()?;
            }
            Ok(out)
        })
    }
}

fn changed<T>(result: CasResult<T>) -> (CasResult<T>, bool) {
    let applied = result.is_applied();
    (result, applied)
}

impl Store for JsonlStore {
    fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        let bookings: Vec<Booking> = self.load(BOOKINGS_FILE)?;
        Ok(records::find(&bookings, id).cloned())
    }

    fn insert_booking(&self, booking: &Booking) -> Result<()> {
        self.update(BOOKINGS_FILE, |rows: &mut Vec<Booking>| {
            records::insert_booking(rows, booking).map(|()| ((), true))
        })
    }

    fn conditional_assign_helper(
        &self,
        booking_id: &str,
        helper_id: &str,
        expected: BookingStatus,
        now: i64,
    ) -> Result<CasResult<Booking>> {
        self.update(BOOKINGS_FILE, |rows: &mut Vec<Booking>| {
            Ok(changed(records::assign_helper(
                rows, booking_id, helper_id, expected, now,
            )))
        })
    }

    fn set_booking_status(&self, change: &StatusChange) -> Result<CasResult<Booking>> {
        self.with_lock(|| {
            let mut bookings: Table<Booking> = self.load_table(BOOKINGS_FILE)?;
            let mut helpers: Table<HelperProfile> = self.load_table(HELPERS_FILE)?;
            let result =
                records::apply_status_change(&mut bookings.rows, &mut helpers.rows, change);
            if result.is_applied() {
                let mut batch = Batch::default();
                self.stage(&mut batch, BOOKINGS_FILE, &bookings)?;
                if change.reliability.is_some() {
                    self.stage(&mut batch, HELPERS_FILE, &helpers)?;
                }
                batch.commit()?;
            }
            Ok(result)
        })
    }

    fn list_bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        let bookings: Vec<Booking> = self.load(BOOKINGS_FILE)?;
        Ok(records::bookings_for_user(&bookings, user_id))
    }

    fn append_event(&self, event: &BookingEvent) -> Result<()> {
        self.update(EVENTS_FILE, |rows: &mut Vec<BookingEvent>| {
            records::insert_unique(rows, event).map(|()| ((), true))
        })
    }

    fn list_events(&self, booking_id: &str) -> Result<Vec<BookingEvent>> {
        let events: Vec<BookingEvent> = self.load(EVENTS_FILE)?;
        Ok(records::for_booking(&events, booking_id, |e| e.booking_id.as_str()))
    }

    fn insert_message(&self, message: &Message) -> Result<()> {
        self.update(MESSAGES_FILE, |rows: &mut Vec<Message>| {
            records::insert_unique(rows, message).map(|()| ((), true))
        })
    }

    fn list_messages(&self, booking_id: &str) -> Result<Vec<Message>> {
        let messages: Vec<Message> = self.load(MESSAGES_FILE)?;
        Ok(records::for_booking(&messages, booking_id, |m| m.booking_id.as_str()))
    }

    fn insert_review(&self, review: &Review) -> Result<()> {
        self.with_lock(|| {
            let mut reviews: Table<Review> = self.load_table(REVIEWS_FILE)?;
            let mut helpers: Table<HelperProfile> = self.load_table(HELPERS_FILE)?;
            records::insert_review(&mut reviews.rows, &mut helpers.rows, review)?;
            let mut batch = Batch::default();
            self.stage(&mut batch, REVIEWS_FILE, &reviews)?;
            self.stage(&mut batch, HELPERS_FILE, &helpers)?;
            batch.commit()
        })
    }

    fn insert_payment(&self, payment: &Payment) -> Result<()> {
        self.update(PAYMENTS_FILE, |rows: &mut Vec<Payment>| {
            records::insert_payment(rows, payment).map(|()| ((), true))
        })
    }

    fn get_payment(&self, id: &str) -> Result<Option<Payment>> {
        let payments: Vec<Payment> = self.load(PAYMENTS_FILE)?;
        Ok(records::find(&payments, id).cloned())
    }

    fn get_payment_by_provider_ref(&self, provider_ref: &str) -> Result<Option<Payment>> {
        let payments: Vec<Payment> = self.load(PAYMENTS_FILE)?;
        Ok(payments
            .into_iter()
            .find(|p| p.provider_ref.as_deref() == Some(provider_ref)))
    }

    fn list_payments(&self, booking_id: &str) -> Result<Vec<Payment>> {
        let payments: Vec<Payment> = self.load(PAYMENTS_FILE)?;
        Ok(records::for_booking(&payments, booking_id, |p| p.booking_id.as_str()))
    }

    fn conditional_set_escrow(&self, change: &EscrowChange) -> Result<CasResult<Payment>> {
        self.update(PAYMENTS_FILE, |rows: &mut Vec<Payment>| {
            Ok(changed(records::set_escrow(rows, change)?))
        })
    }

    fn conditional_set_payment_status(
        &self,
        payment_id: &str,
        expected: PaymentStatus,
        status: PaymentStatus,
        metadata: &Metadata,
        now: i64,
    ) -> Result<CasResult<Payment>> {
        self.update(PAYMENTS_FILE, |rows: &mut Vec<Payment>| {
            Ok(changed(records::set_payment_status(
                rows, payment_id, expected, status, metadata, now,
            )))
        })
    }

    fn get_helper(&self, id: &str) -> Result<Option<HelperProfile>> {
        let helpers: Vec<HelperProfile> = self.load(HELPERS_FILE)?;
        Ok(records::find(&helpers, id).cloned())
    }

    fn upsert_helper(&self, profile: &HelperProfile) -> Result<()> {
        self.update(HELPERS_FILE, |rows: &mut Vec<HelperProfile>| {
            records::upsert_helper(rows, profile).map(|()| ((), true))
        })
    }

    fn list_helpers(&self) -> Result<Vec<HelperProfile>> {
        self.load(HELPERS_FILE)
    }

    fn update_reliability_score(&self, helper_id: &str, delta: i32) -> Result<Option<u8>> {
        self.update(HELPERS_FILE, |rows: &mut Vec<HelperProfile>| {
            let score = records::adjust_reliability(rows, helper_id, delta);
            Ok((score, score.is_some()))
        })
    }

    fn set_helper_standing(
        &self,
        helper_id: &str,
        standing: HelperStanding,
    ) -> Result<Option<HelperProfile>> {
        self.update(HELPERS_FILE, |rows: &mut Vec<HelperProfile>| {
            let profile = records::set_helper_standing(rows, helper_id, standing);
            let found = profile.is_some();
            Ok((profile, found))
        })
    }

    fn insert_dispute(&self, dispute: &Dispute) -> Result<()> {
        self.update(DISPUTES_FILE, |rows: &mut Vec<Dispute>| {
            records::insert_dispute(rows, dispute).map(|()| ((), true))
        })
    }

    fn get_dispute(&self, id: &str) -> Result<Option<Dispute>> {
        let disputes: Vec<Dispute> = self.load(DISPUTES_FILE)?;
        Ok(records::find(&disputes, id).cloned())
    }

    fn list_disputes(&self) -> Result<Vec<Dispute>> {
        let disputes: Vec<Dispute> = self.load(DISPUTES_FILE)?;
        Ok(records::disputes_newest_first(&disputes))
    }

    fn conditional_set_dispute_status(
        &self,
        decision: &DisputeDecision,
    ) -> Result<CasResult<Dispute>> {
        self.update(DISPUTES_FILE, |rows: &mut Vec<Dispute>| {
            Ok(changed(records::set_dispute_status(rows, decision)))
        })
    }
}
