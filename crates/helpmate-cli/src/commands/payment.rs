// Rust guideline compliant 2026-10-16

//! Implementation of the `helpmate payment` commands.

use super::open_marketplace;
use crate::OutputFormatter;
use anyhow::{Context, Result};
use helpmate_app::{parse_escrow_action, parse_metadata, parse_method, GatewayOutcome, NewPayment};
use std::path::{Path, PathBuf};

/// Payment actions.
#[derive(Debug, Clone, PartialEq, clap::Subcommand)]
pub enum PaymentAction {
    /// Record a payment for a completed booking
    Record {
        /// Booking ID
        booking_id: String,

        /// Customer or helper recording the payment
        #[arg(long)]
        actor: String,

        /// Payment method (cash, upi, gateway)
        #[arg(long, default_value = "cash")]
        method: String,

        /// Amount received
        #[arg(long)]
        amount: f64,

        /// Gateway reference
        #[arg(long)]
        provider_ref: Option<String>,

        /// Payment metadata as key=value
        #[arg(long = "meta")]
        meta: Vec<String>,
    },

    /// Hold, release or refund escrow on a payment
    Escrow {
        /// Payment ID
        payment_id: String,

        /// Escrow action (hold, release, refund)
        action: String,

        /// Operator performing the action
        #[arg(long)]
        actor: String,

        /// Note stored with the action
        #[arg(long)]
        note: Option<String>,
    },

    /// Open a pending gateway payment
    Open {
        /// Booking ID
        booking_id: String,

        /// Paying customer
        #[arg(long)]
        actor: String,

        /// Order amount
        #[arg(long)]
        amount: f64,

        /// Gateway order reference
        #[arg(long)]
        provider_ref: String,
    },

    /// Apply a gateway status report
    Reconcile {
        /// Gateway order reference
        provider_ref: String,

        /// Gateway status, e.g. SUCCESS or FAILED
        #[arg(long)]
        status: String,

        /// Gateway payment ID
        #[arg(long)]
        gateway_payment_id: Option<String>,
    },

    /// Verify and apply a signed gateway webhook delivery
    Webhook {
        /// File holding the raw request body
        #[arg(long)]
        body_file: PathBuf,

        /// Base64 HMAC-SHA256 signature header
        #[arg(long)]
        signature: Option<String>,
    },
}

/// Runs a payment action.
///
/// # Arguments
///
/// * `action` - The action to run
/// * `root` - Project root containing `.helpmate`
/// * `formatter` - The output formatter to use
///
/// # Errors
///
/// Returns an error if the data directory is missing, an argument cannot be
/// parsed, or the marketplace rejects the operation.
pub fn execute(action: PaymentAction, root: Option<&Path>, formatter: &dyn OutputFormatter) -> Result<()> {
    let market = open_marketplace(root)?;

    let output = match action {
        PaymentAction::Record {
            booking_id,
            actor,
            method,
            amount,
            provider_ref,
            meta,
        } => {
            let receipt = market.record_payment(NewPayment {
                booking_id,
                actor_id: actor,
                method: parse_method(&method)?,
                amount,
                provider_ref,
                metadata: parse_metadata(&meta)?,
            })?;
            formatter.format_receipt(&receipt)
        }
        PaymentAction::Escrow {
            payment_id,
            action,
            actor,
            note,
        } => {
            let action = parse_escrow_action(&action)?;
            let payment = market.apply_escrow_action(&payment_id, &actor, action, note.as_deref())?;
            formatter.format_payment(&payment)
        }
        PaymentAction::Open {
            booking_id,
            actor,
            amount,
            provider_ref,
        } => {
            let payment = market.open_gateway_payment(&booking_id, &actor, amount, &provider_ref)?;
            formatter.format_payment(&payment)
        }
        PaymentAction::Reconcile {
            provider_ref,
            status,
            gateway_payment_id,
        } => {
            let outcome = GatewayOutcome {
                raw_status: status,
                gateway_payment_id,
            };
            formatter.format_reconciliation(&market.reconcile_gateway_payment(&provider_ref, &outcome)?)
        }
        PaymentAction::Webhook {
            body_file,
            signature,
        } => {
            let body = std::fs::read_to_string(&body_file)
                .with_context(|| format!("Failed to read webhook body from {}", body_file.display()))?;
            formatter.format_reconciliation(&market.handle_gateway_webhook(&body, signature.as_deref())?)
        }
    };

    println!("{}", output);
    Ok(())
}
