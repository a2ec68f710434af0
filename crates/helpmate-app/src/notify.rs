// Rust guideline compliant 2026-10-14

//! Notification delivery.
//!
//! Notifications are fire-and-forget: the marketplace logs a failed delivery
//! and carries on, so a notifier never decides whether an operation succeeded.

use crate::error::Result;
use helpmate_core::Metadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum characters of a chat message carried in a notification body.
pub const PREVIEW_LEN: usize = 90;

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Short title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Structured data for the client, e.g. the booking ID.
    #[serde(default)]
    pub data: Metadata,
}

impl Notification {
    /// Creates a notification.
    pub fn new(title: impl Into<String>, body: impl Into<String>, data: Metadata) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data,
        }
    }
}

/// Delivers notifications to users.
pub trait Notifier: Send + Sync {
    /// Sends one notification to every recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery failed.
    fn notify(&self, recipients: &BTreeSet<String>, notification: &Notification) -> Result<()>;
}

/// Notifier that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _recipients: &BTreeSet<String>, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

/// Notifier that writes each notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, recipients: &BTreeSet<String>, notification: &Notification) -> Result<()> {
        tracing::info!(
            recipients = ?recipients,
            title = %notification.title,
            body = %notification.body,
            "Notification sent"
        );
        Ok(())
    }
}

/// Returns at most [`PREVIEW_LEN`] characters of `body`.
pub fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_LEN).collect()
}
