// Rust guideline compliant 2026-10-12

//! Hash-based identifier generation.
//!
//! Identifiers have the form `<prefix>-<10 hex chars>`, where the hex part is
//! the head of a SHA-256 digest over the seed, timestamp and a nonce.
//! [`next_id`] also mixes in the process ID and the sub-second clock, so
//! separate processes writing to one data directory in the same second do
//! not mint the same identifier.

use crate::{Error, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix for booking identifiers.
pub const BOOKING_PREFIX: &str = "bkg";
/// Prefix for payment identifiers.
pub const PAYMENT_PREFIX: &str = "pay";
/// Prefix for lifecycle event identifiers.
pub const EVENT_PREFIX: &str = "evt";
/// Prefix for message identifiers.
pub const MESSAGE_PREFIX: &str = "msg";
/// Prefix for review identifiers.
pub const REVIEW_PREFIX: &str = "rev";
/// Prefix for dispute identifiers.
pub const DISPUTE_PREFIX: &str = "dsp";

const HASH_LEN: usize = 10;

static NONCE: AtomicU64 = AtomicU64::new(0);

/// Generates a deterministic identifier from its inputs.
///
/// # Arguments
///
/// * `prefix` - Three-letter entity prefix
/// * `seed` - Entity-specific seed text
/// * `timestamp` - Unix timestamp of creation
/// * `nonce` - Disambiguator for identical seeds
///
/// # Returns
///
/// An identifier of the form `prefix-xxxxxxxxxx`.
pub fn generate_id(prefix: &str, seed: &str, timestamp: i64, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(seed.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    hasher.update(nonce.to_le_bytes());

    let hex = format!("{:x}", hasher.finalize());
    format!("{}-{}", prefix, &hex[..HASH_LEN])
}

/// Generates a fresh identifier.
///
/// The nonce comes from a process-wide counter; the seed is extended with the
/// process ID and the current sub-second nanoseconds.
pub fn next_id(prefix: &str, seed: &str, timestamp: i64) -> String {
    let nonce = NONCE.fetch_add(1, Ordering::Relaxed);
    let salted = format!(
        "{}:{}:{}",
        seed,
        std::process::id(),
        Utc::now().timestamp_subsec_nanos()
    );
    generate_id(prefix, &salted, timestamp, nonce)
}

/// Validates the identifier format.
///
/// # Errors
///
/// Returns a validation error if the identifier is not a three-letter
/// lowercase prefix, a dash, and ten lowercase hex characters.
pub fn validate_id_format(id: &str) -> Result<()> {
    let Some((prefix, hash)) = id.split_once('-') else {
        return Err(Error::Validation(format!("Invalid ID format: {}", id)));
    };

    let prefix_ok = prefix.len() == 3 && prefix.chars().all(|c| c.is_ascii_lowercase());
    let hash_ok = hash.len() == HASH_LEN
        && hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));

    if prefix_ok && hash_ok {
        Ok(())
    } else {
        Err(Error::Validation(format!("Invalid ID format: {}", id)))
    }
}
