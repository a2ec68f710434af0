// Rust guideline compliant 2026-10-14

//! Payment recording, escrow and gateway reconciliation.

use crate::audit::{AuditEntry, AuditSink};
use crate::error::Result;
use crate::marketplace::Marketplace;
use crate::notify::Notifier;
use helpmate_core::{
    Booking, BookingStatus, CasResult, Entity, Error, EscrowAction, EscrowChange, Metadata,
    Payment, PaymentMethod, PaymentStatus, Store,
};
use serde::{Deserialize, Serialize};

/// Actor recorded for changes driven by the payment gateway.
pub const GATEWAY_ACTOR: &str = "gateway";

/// Input for recording a completed payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    /// Booking being paid for.
    pub booking_id: String,
    /// Party recording the payment.
    pub actor_id: String,
    /// Payment method.
    pub method: PaymentMethod,
    /// Amount received.
    pub amount: f64,
    /// Gateway reference, if any.
    #[serde(default)]
    pub provider_ref: Option<String>,
    /// Extra payment metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

/// Result of recording a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Stored payment.
    pub payment: Payment,
    /// Booking after the payment was applied.
    pub booking: Booking,
}

/// Status report delivered by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOutcome {
    /// Gateway status string, e.g. `SUCCESS` or `FAILED`.
    pub raw_status: String,
    /// Gateway-side payment identifier.
    #[serde(default)]
    pub gateway_payment_id: Option<String>,
}

impl GatewayOutcome {
    /// Maps the gateway status onto a payment status.
    pub fn payment_status(&self) -> PaymentStatus {
        match self.raw_status.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => PaymentStatus::Paid,
            "FAILED" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }
}

/// Outcome of a gateway reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Reconciliation {
    /// No payment carries the reference.
    UnknownReference {
        /// Reference that was looked up.
        provider_ref: String,
    },
    /// The payment already had the reported status.
    Unchanged {
        /// Payment as stored.
        payment: Payment,
    },
    /// The payment status was updated.
    Updated {
        /// Payment after the update.
        payment: Payment,
        /// Booking, if the payment drove it to `paid`.
        #[serde(default)]
        booking: Option<Booking>,
    },
}

impl<S: Store, N: Notifier, A: AuditSink> Marketplace<S, N, A> {
    /// Records a payment received for a completed booking.
    ///
    /// A `completed` booking is moved to `paid`. Payments recorded against an
    /// already `paid` booking are stored without a status change. The payment
    /// is audited only after the status write succeeds; if that write fails
    /// the stored payment stays without an audit entry.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the booking does not exist
    /// - `Forbidden` if the actor is not a party, or the booking is neither
    ///   `completed` nor `paid`
    /// - A validation error if the amount is negative
    /// - Any error from [`Marketplace::update_status`]
    pub fn record_payment(&self, input: NewPayment) -> Result<PaymentReceipt> {
        let booking = self.load_booking_for(&input.booking_id, &input.actor_id)?;
        if !matches!(booking.status, BookingStatus::Completed | BookingStatus::Paid) {
            return Err(Error::Forbidden(format!(
                "Payment can only be recorded for completed bookings, booking is {}",
                booking.status
            ))
            .into());
        }

        let now = self.now()?;
        let mut payment = Payment::new(
            input.booking_id.clone(),
            input.method,
            PaymentStatus::Paid,
            input.amount,
            now,
        );
        payment.provider_ref = input.provider_ref;
        payment.metadata = input.metadata;
        self.store.insert_payment(&payment)?;
        tracing::debug!(payment_id = %payment.id, booking_id = %booking.id, "Payment recorded");

        let updated = if booking.status == BookingStatus::Completed {
            self.update_status(
                &booking.id,
                &input.actor_id,
                BookingStatus::Paid,
                Metadata::new().with("payment_id", payment.id.as_str()),
            )?
        } else {
            booking
        };

        self.audit(AuditEntry::booking(
            &input.actor_id,
            "booking.payment.recorded",
            &updated.id,
            Metadata::new()
                .with("payment_id", payment.id.as_str())
                .with("amount", payment.amount),
            now,
        ));
        Ok(PaymentReceipt {
            payment,
            booking: updated,
        })
    }

    /// Opens a pending gateway payment for a booking.
    ///
    /// The payment is settled later through
    /// [`Marketplace::reconcile_gateway_payment`].
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the booking does not exist
    /// - `Forbidden` if the actor is not the customer
    /// - `Conflict` if the reference is already in use
    /// - A validation error if the amount is negative
    pub fn open_gateway_payment(
        &self,
        booking_id: &str,
        actor_id: &str,
        amount: f64,
        provider_ref: &str,
    ) -> Result<Payment> {
        let booking = self.load_booking(booking_id)?;
        if booking.customer_id != actor_id {
            return Err(Error::Forbidden("Only the customer can start a gateway payment".to_string()).into());
        }
        if self.store.get_payment_by_provider_ref(provider_ref)?.is_some() {
            return Err(Error::Conflict(format!(
                "Provider reference already in use: {}",
                provider_ref
            ))
            .into());
        }

        let now = self.now()?;
        let mut payment = Payment::new(
            booking_id.to_string(),
            PaymentMethod::Gateway,
            PaymentStatus::Pending,
            amount,
            now,
        );
        payment.provider_ref = Some(provider_ref.to_string());
        payment.metadata.insert("source", "gateway");
        self.store.insert_payment(&payment)?;

        self.audit(AuditEntry::payment(
            actor_id,
            "payment.gateway.opened",
            &payment.id,
            Metadata::new()
                .with("booking_id", booking_id)
                .with("provider_ref", provider_ref),
            now,
        ));
        Ok(payment)
    }

    /// Applies an escrow action to a payment.
    ///
    /// The store applies the action to its current row, so a concurrent
    /// gateway status update is kept.
    ///
    /// # Arguments
    ///
    /// * `payment_id` - Payment to act on
    /// * `actor_id` - Operator performing the action
    /// * `action` - Hold, release or refund
    /// * `note` - Optional note stored with the action
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` if the payment does not exist
    /// - The escrow precondition error for an illegal move, including one
    ///   caused by a concurrent action
    /// - `Conflict` if the payment changed concurrently but the action would
    ///   still be legal
    pub fn apply_escrow_action(
        &self,
        payment_id: &str,
        actor_id: &str,
        action: EscrowAction,
        note: Option<&str>,
    ) -> Result<Payment> {
        let payment = self
            .store
            .get_payment(payment_id)?
            .ok_or_else(|| Error::not_found(Entity::Payment, payment_id))?;

        action.check(&payment.id, payment.escrow_status)?;

        let now = self.now()?;
        let change = EscrowChange {
            payment_id: payment_id.to_string(),
            expected: payment.escrow_status,
            action,
            note: note.map(str::to_string),
            now,
        };
        let stored = match self.store.conditional_set_escrow(&change)? {
            CasResult::Applied(stored) => stored,
            CasResult::NotFound => return Err(Error::not_found(Entity::Payment, payment_id).into()),
            CasResult::Mismatch { current } => {
                action.check(&current.id, current.escrow_status)?;
                return Err(Error::Conflict(format!(
                    "Escrow of payment {} changed while applying {}",
                    payment_id, action
                ))
                .into());
            }
        };
        tracing::debug!(payment_id, %action, escrow_status = %stored.escrow_status, "Escrow updated");

        let mut payload = Metadata::new()
            .with("booking_id", stored.booking_id.as_str())
            .with("from", payment.escrow_status.to_string())
            .with("to", stored.escrow_status.to_string());
        if let Some(note) = note {
            payload.insert("note", note);
        }
        self.audit(AuditEntry::payment(
            actor_id,
            &format!("payment.escrow.{}", action),
            payment_id,
            payload,
            now,
        ));
        Ok(stored)
    }

    /// Applies a gateway status report to the payment carrying `provider_ref`.
    ///
    /// Repeated reports of the same status are no-ops. When a payment becomes
    /// `paid` and its booking is `completed`, the booking is moved to `paid`
    /// on behalf of the customer.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the payment changed to a different status
    /// concurrently, or any error from [`Marketplace::update_status`].
    pub fn reconcile_gateway_payment(
        &self,
        provider_ref: &str,
        outcome: &GatewayOutcome,
    ) -> Result<Reconciliation> {
        let Some(existing) = self.store.get_payment_by_provider_ref(provider_ref)? else {
            tracing::debug!(provider_ref, "Gateway report for unknown reference");
            return Ok(Reconciliation::UnknownReference {
                provider_ref: provider_ref.to_string(),
            });
        };

        let status = outcome.payment_status();
        if existing.status == status {
            return Ok(Reconciliation::Unchanged { payment: existing });
        }

        let mut metadata = Metadata::new().with("raw_status", outcome.raw_status.as_str());
        if let Some(gateway_payment_id) = &outcome.gateway_payment_id {
            metadata.insert("gateway_payment_id", gateway_payment_id.as_str());
        }

        let now = self.now()?;
        let payment = match self.store.conditional_set_payment_status(
            &existing.id,
            existing.status,
            status,
            &metadata,
            now,
        )? {
            CasResult::Applied(payment) => payment,
            CasResult::NotFound => return Err(Error::not_found(Entity::Payment, &existing.id).into()),
            CasResult::Mismatch { current } if current.status == status => {
                return Ok(Reconciliation::Unchanged { payment: current });
            }
            CasResult::Mismatch { current } => {
                return Err(Error::Conflict(format!(
                    "Payment {} changed to {} during reconciliation",
                    current.id, current.status
                ))
                .into());
            }
        };

        self.audit(AuditEntry::payment(
            GATEWAY_ACTOR,
            "payment.gateway.reconciled",
            &payment.id,
            metadata
                .with("from", existing.status.to_string())
                .with("to", status.to_string()),
            now,
        ));

        let mut booking = None;
        if status == PaymentStatus::Paid {
            let current = self.load_booking(&payment.booking_id)?;
            if current.status == BookingStatus::Completed {
                booking = Some(self.update_status(
                    &current.id,
                    &current.customer_id,
                    BookingStatus::Paid,
                    Metadata::new()
                        .with("payment_id", payment.id.as_str())
                        .with("provider_ref", provider_ref),
                )?);
            }
        }
        Ok(Reconciliation::Updated { payment, booking })
    }
}
