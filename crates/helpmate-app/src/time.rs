// Rust guideline compliant 2026-10-14

//! Wall-clock access for marketplace operations.

use crate::error::{AppError, Result};
use chrono::Utc;

/// Returns the current Unix timestamp in seconds (UTC).
///
/// # Errors
///
/// Returns an error if the clock reads a time before the Unix epoch; every
/// stored timestamp is non-negative.
pub fn unix_timestamp() -> Result<i64> {
    let now = Utc::now().timestamp();
    if now < 0 {
        return Err(AppError::InvalidInput(format!(
            "Clock reads {now}, before the Unix epoch"
        )));
    }
    Ok(now)
}
