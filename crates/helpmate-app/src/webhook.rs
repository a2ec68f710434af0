// Rust guideline compliant 2026-10-14

//! Payment gateway webhooks.
//!
//! The gateway signs each delivery with a base64 HMAC-SHA256 of the raw
//! request body, keyed by the configured webhook secret. Deliveries are
//! verified before the payload is parsed and then reconciled like any other
//! gateway report.

use crate::audit::AuditSink;
use crate::error::Result;
use crate::marketplace::Marketplace;
use crate::notify::Notifier;
use crate::payment::{GatewayOutcome, Reconciliation};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use helpmate_core::{Error, Store};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ORDER_ID_POINTER: &str = "/data/order/cf_order_id";
const STATUS_POINTER: &str = "/data/payment/payment_status";
const PAYMENT_ID_POINTER: &str = "/data/payment/cf_payment_id";

/// Signs a webhook body the way the gateway does.
///
/// Returns `None` only if the secret cannot key the MAC.
pub fn sign_webhook_body(secret: &str, raw_body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(raw_body);
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Checks a webhook signature against the raw body.
///
/// Returns `false` when no secret is configured, when the signature is
/// missing or not base64, or when it does not match.
pub fn verify_webhook_signature(secret: Option<&str>, raw_body: &[u8], signature: Option<&str>) -> bool {
    let (Some(secret), Some(signature)) = (secret, signature) else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);
    mac.verify_slice(&expected).is_ok()
}

/// Extracts the provider reference and outcome from a webhook body.
pub(crate) fn parse_webhook_payload(raw_body: &str) -> Result<(String, GatewayOutcome)> {
    let invalid = || Error::Validation("Invalid webhook payload".to_string());
    let payload: Value = serde_json::from_str(raw_body).map_err(|_| invalid())?;

    let provider_ref = text_at(&payload, ORDER_ID_POINTER).ok_or_else(invalid)?;
    let raw_status = text_at(&payload, STATUS_POINTER).ok_or_else(invalid)?;
    let outcome = GatewayOutcome {
        raw_status,
        gateway_payment_id: text_at(&payload, PAYMENT_ID_POINTER),
    };
    Ok((provider_ref, outcome))
}

/// Reads a non-empty string or number at a JSON pointer.
fn text_at(payload: &Value, pointer: &str) -> Option<String> {
    match payload.pointer(pointer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl<S: Store, N: Notifier, A: AuditSink> Marketplace<S, N, A> {
    /// Verifies and applies a gateway webhook delivery.
    ///
    /// # Arguments
    ///
    /// * `raw_body` - Request body exactly as received
    /// * `signature` - Value of the signature header, if present
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `Forbidden` if the signature does not verify
    /// - A validation error if the order reference or payment status is missing
    /// - Any error from [`Marketplace::reconcile_gateway_payment`]
    pub fn handle_gateway_webhook(&self, raw_body: &str, signature: Option<&str>) -> Result<Reconciliation> {
        let secret = self.config.webhook_secret.as_deref();
        if !verify_webhook_signature(secret, raw_body.as_bytes(), signature) {
            tracing::warn!(
                secret_configured = secret.is_some(),
                signature_present = signature.is_some(),
                "Rejected gateway webhook"
            );
            return Err(Error::Forbidden("Invalid webhook signature".to_string()).into());
        }

        let (provider_ref, outcome) = parse_webhook_payload(raw_body)?;
        tracing::debug!(provider_ref = %provider_ref, raw_status = %outcome.raw_status, "Gateway webhook accepted");
        self.reconcile_gateway_payment(&provider_ref, &outcome)
    }
}
