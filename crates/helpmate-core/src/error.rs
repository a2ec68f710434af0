// Rust guideline compliant 2026-10-12

//! Error types for the Helpmate core library.

use crate::models::{BookingStatus, EscrowStatus};
use std::fmt;
use thiserror::Error;

/// Result type alias for Helpmate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of stored entity referenced by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A booking.
    Booking,
    /// A payment.
    Payment,
    /// A helper profile.
    Helper,
    /// A dispute.
    Dispute,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Booking => write!(f, "Booking"),
            Entity::Payment => write!(f, "Payment"),
            Entity::Helper => write!(f, "Helper profile"),
            Entity::Dispute => write!(f, "Dispute"),
        }
    }
}

/// Error types for Helpmate operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed input shape or out-of-range value.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up.
        entity: Entity,
        /// Identifier that was looked up.
        id: String,
    },

    /// Actor lacks the relationship required for the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested lifecycle move is not in the transition table.
    #[error("Cannot transition booking from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: BookingStatus,
        /// Requested status.
        to: BookingStatus,
    },

    /// Another helper claimed the booking first.
    #[error("Booking unavailable for acceptance: {0}")]
    BookingUnavailable(String),

    /// The stored row changed between read and conditional write.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// Hold requested on a payment whose escrow already left `na`.
    #[error("Escrow already initiated for payment {payment_id} (currently {current})")]
    EscrowAlreadyInitiated {
        /// Payment identifier.
        payment_id: String,
        /// Escrow status observed.
        current: EscrowStatus,
    },

    /// Release requested on a payment whose escrow is not held.
    #[error("Escrow must be held before release for payment {payment_id} (currently {current})")]
    EscrowNotHeld {
        /// Payment identifier.
        payment_id: String,
        /// Escrow status observed.
        current: EscrowStatus,
    },

    /// Refund requested after the escrow was released.
    #[error("Cannot refund released escrow for payment {0}")]
    CannotRefundReleased(String),

    /// Refund requested on a payment that was already refunded.
    #[error("Escrow already refunded for payment {0}")]
    EscrowAlreadyRefunded(String),

    /// Storage backend failure not covered by IO or JSON.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Builds a `NotFound` error for the given entity.
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }
}
