// Rust guideline compliant 2026-10-14

//! Error handling for Helpmate application services.

use helpmate_core::Error as CoreError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for application-level operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Stable error codes for command and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The requested entity was not found.
    NotFound,
    /// The actor lacks the relationship the operation needs.
    Forbidden,
    /// The requested lifecycle move is not allowed.
    InvalidTransition,
    /// Another helper accepted the booking first.
    BookingUnavailable,
    /// The record changed between read and write.
    Conflict,
    /// Escrow was already placed on hold or finished.
    EscrowAlreadyInitiated,
    /// Escrow must be held first.
    EscrowNotHeld,
    /// Released escrow cannot be refunded.
    CannotRefundReleased,
    /// Escrow was already refunded.
    EscrowAlreadyRefunded,
    /// Input validation failed.
    ValidationError,
    /// The request included invalid inputs.
    InvalidInput,
    /// IO failure while reading or writing data.
    IoError,
    /// JSON serialization or parsing failed.
    JsonError,
    /// Storage backend failure.
    StorageError,
    /// The data directory has not been initialized.
    RepoNotInitialized,
}

/// Application-level errors with stable mapping to error codes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Data directory is missing.
    #[error("Helpmate data directory not found at {path}. Run 'helpmate init' first.")]
    RepoNotInitialized {
        /// Path where `.helpmate` was expected.
        path: PathBuf,
    },

    /// Invalid input was provided by the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from core library operations.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// IO error not represented by core errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns a stable error code for the error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::RepoNotInitialized { .. } => ErrorCode::RepoNotInitialized,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => ErrorCode::NotFound,
                CoreError::Forbidden(_) => ErrorCode::Forbidden,
                CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
                CoreError::BookingUnavailable(_) => ErrorCode::BookingUnavailable,
                CoreError::Conflict(_) => ErrorCode::Conflict,
                CoreError::EscrowAlreadyInitiated { .. } => ErrorCode::EscrowAlreadyInitiated,
                CoreError::EscrowNotHeld { .. } => ErrorCode::EscrowNotHeld,
                CoreError::CannotRefundReleased(_) => ErrorCode::CannotRefundReleased,
                CoreError::EscrowAlreadyRefunded(_) => ErrorCode::EscrowAlreadyRefunded,
                CoreError::Validation(_) => ErrorCode::ValidationError,
                CoreError::Io(_) => ErrorCode::IoError,
                CoreError::Json(_) => ErrorCode::JsonError,
                CoreError::Storage(_) => ErrorCode::StorageError,
            },
        }
    }

    /// Returns structured details for errors that benefit from extra context.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::RepoNotInitialized { path } => Some(serde_json::json!({
                "path": path,
            })),
            AppError::InvalidInput(_) | AppError::Io(_) => None,
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => Some(serde_json::json!({
                    "entity": entity.to_string(),
                    "id": id,
                })),
                CoreError::InvalidTransition { from, to } => Some(serde_json::json!({
                    "from": from,
                    "to": to,
                })),
                CoreError::BookingUnavailable(booking_id) => Some(serde_json::json!({
                    "booking_id": booking_id,
                })),
                CoreError::EscrowAlreadyInitiated {
                    payment_id,
                    current,
                }
                | CoreError::EscrowNotHeld {
                    payment_id,
                    current,
                } => Some(serde_json::json!({
                    "payment_id": payment_id,
                    "escrow_status": current,
                })),
                CoreError::CannotRefundReleased(payment_id)
                | CoreError::EscrowAlreadyRefunded(payment_id) => Some(serde_json::json!({
                    "payment_id": payment_id,
                })),
                _ => None,
            },
        }
    }

    /// Returns true for business-rule failures, as opposed to malformed
    /// input or infrastructure errors.
    #[must_use]
    pub fn is_domain_error(&self) -> bool {
        !matches!(
            self.code(),
            ErrorCode::ValidationError
                | ErrorCode::InvalidInput
                | ErrorCode::IoError
                | ErrorCode::JsonError
                | ErrorCode::StorageError
                | ErrorCode::RepoNotInitialized
        )
    }
}
