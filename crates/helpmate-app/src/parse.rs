// Rust guideline compliant 2026-10-14

//! Parsers for user-supplied values.

use crate::error::{AppError, Result};
use helpmate_core::{BookingStatus, DisputeStatus, EscrowAction, MetaValue, Metadata, PaymentMethod};

/// Parses a booking status string.
///
/// # Errors
///
/// Returns `InvalidInput` if the value names no status.
pub fn parse_status(value: &str) -> Result<BookingStatus> {
    let normalized = value.trim().to_lowercase();
    BookingStatus::ALL
        .into_iter()
        .find(|s| s.as_str() == normalized || (normalized == "en_route" && *s == BookingStatus::Enroute))
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid booking status: {}", value)))
}

/// Parses a dispute decision status.
///
/// # Errors
///
/// Returns `InvalidInput` for anything but `investigating`, `resolved` or
/// `rejected`.
pub fn parse_dispute_status(value: &str) -> Result<DisputeStatus> {
    match value.trim().to_lowercase().as_str() {
        "investigating" => Ok(DisputeStatus::Investigating),
        "resolved" => Ok(DisputeStatus::Resolved),
        "rejected" => Ok(DisputeStatus::Rejected),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid dispute status: {}",
            value
        ))),
    }
}

/// Parses a payment method.
///
/// # Errors
///
/// Returns `InvalidInput` if the method is unknown.
pub fn parse_method(value: &str) -> Result<PaymentMethod> {
    match value.trim().to_lowercase().as_str() {
        "cash" => Ok(PaymentMethod::Cash),
        "upi" => Ok(PaymentMethod::Upi),
        "gateway" | "card" => Ok(PaymentMethod::Gateway),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid payment method: {}",
            value
        ))),
    }
}

/// Parses an escrow action.
///
/// # Errors
///
/// Returns `InvalidInput` if the action is unknown.
pub fn parse_escrow_action(value: &str) -> Result<EscrowAction> {
    match value.trim().to_lowercase().as_str() {
        "hold" => Ok(EscrowAction::Hold),
        "release" => Ok(EscrowAction::Release),
        "refund" => Ok(EscrowAction::Refund),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid escrow action: {}",
            value
        ))),
    }
}

/// Parses `key=value` pairs into a metadata bag.
///
/// Values that parse as booleans or numbers are stored as such; everything
/// else is kept as a string.
///
/// # Errors
///
/// Returns `InvalidInput` if a pair has no `=` or an empty key.
pub fn parse_metadata<S: AsRef<str>>(pairs: &[S]) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(AppError::InvalidInput(format!(
                "Metadata must be key=value, got: {}",
                pair
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Metadata key cannot be empty: {}",
                pair
            )));
        }
        metadata.insert(key, parse_meta_value(raw.trim()));
    }
    Ok(metadata)
}

fn parse_meta_value(raw: &str) -> MetaValue {
    if let Ok(flag) = raw.parse::<bool>() {
        return MetaValue::Bool(flag);
    }
    match raw.parse::<f64>() {
        Ok(number) if number.is_finite() => MetaValue::Number(number),
        _ => MetaValue::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Completed").unwrap(), BookingStatus::Completed);
        assert_eq!(parse_status("en_route").unwrap(), BookingStatus::Enroute);
        assert!(parse_status("done").is_err());
    }

    #[test]
    fn test_parse_dispute_status_and_method() {
        assert_eq!(parse_dispute_status("Resolved").unwrap(), DisputeStatus::Resolved);
        assert!(parse_dispute_status("open").is_err());
        assert_eq!(parse_method("UPI").unwrap(), PaymentMethod::Upi);
        assert!(parse_method("cheque").is_err());
    }

    #[test]
    fn test_parse_escrow_action() {
        assert_eq!(parse_escrow_action("refund").unwrap(), EscrowAction::Refund);
        assert!(parse_escrow_action("void").is_err());
    }

    #[test]
    fn test_parse_metadata() {
        let meta = parse_metadata(&["tip=50", "rush=true", "note=back gate", "code=NaN"]).unwrap();
        assert_eq!(meta.get("tip"), Some(&MetaValue::Number(50.0)));
        assert_eq!(meta.get("rush"), Some(&MetaValue::Bool(true)));
        assert_eq!(meta.get("note").and_then(MetaValue::as_str), Some("back gate"));
        assert_eq!(meta.get("code").and_then(MetaValue::as_str), Some("NaN"));

        assert!(parse_metadata(&["novalue"]).is_err());
        assert!(parse_metadata(&["=x"]).is_err());
    }
}
