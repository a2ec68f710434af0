// Rust guideline compliant 2026-10-12

//! Helper earnings summaries.

use crate::{Error, Payment, PaymentStatus, Result};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Gross and net earnings over fixed windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarningsSummary {
    /// Paid total over the last 7 days.
    pub week: f64,
    /// Paid total over the last calendar month.
    pub month: f64,
    /// Paid total over all time.
    pub total: f64,
    /// `week` after commission.
    pub week_net: f64,
    /// `month` after commission.
    pub month_net: f64,
    /// `total` after commission.
    pub total_net: f64,
    /// Number of paid payments counted.
    pub total_jobs: usize,
    /// Commission percent applied.
    pub commission_percent: f64,
}

fn to_datetime(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| Error::Validation(format!("Timestamp out of range: {}", ts)))
}

/// Summarises paid payments as of `now`.
///
/// Payments in any status other than `paid` are ignored. The monthly window
/// starts one calendar month before `now`.
///
/// # Errors
///
/// Returns a validation error if `now` cannot be represented as a date, or
/// if `commission_percent` lies outside `0..=100`.
pub fn summarize<'a, I>(payments: I, commission_percent: f64, now: i64) -> Result<EarningsSummary>
where
    I: IntoIterator<Item = &'a Payment>,
{
    if !(0.0..=100.0).contains(&commission_percent) {
        return Err(Error::Validation(format!(
            "Commission percent must be 0-100, got {}",
            commission_percent
        )));
    }

    let now_dt = to_datetime(now)?;
    let week_start = (now_dt - Duration::days(7)).timestamp();
    let month_start = now_dt
        .checked_sub_months(Months::new(1))
        .map_or(i64::MIN, |dt| dt.timestamp());

    let mut week = 0.0;
    let mut month = 0.0;
    let mut total = 0.0;
    let mut total_jobs = 0;

    for payment in payments
        .into_iter()
        .filter(|p| p.status == PaymentStatus::Paid)
    {
        total += payment.amount;
        total_jobs += 1;
        if payment.created_at >= week_start {
            week += payment.amount;
        }
        if payment.created_at >= month_start {
            month += payment.amount;
        }
    }

    let keep = 1.0 - commission_percent / 100.0;
    Ok(EarningsSummary {
        week,
        month,
        total,
        week_net: week * keep,
        month_net: month * keep,
        total_net: total * keep,
        total_jobs,
        commission_percent,
    })
}
