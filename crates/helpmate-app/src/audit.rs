// Rust guideline compliant 2026-10-14

//! Audit trail of state-changing operations.

use crate::error::Result;
use helpmate_core::Metadata;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Audit file name inside the data directory.
pub const AUDIT_FILE: &str = "audit.jsonl";

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// User who performed the action.
    pub actor_id: String,
    /// Dotted action name, e.g. `booking.accepted`.
    pub action: String,
    /// Kind of entity acted on.
    pub entity_type: String,
    /// Identifier of the entity acted on.
    pub entity_id: String,
    /// Action-specific payload.
    #[serde(default)]
    pub payload: Metadata,
    /// Unix timestamp of the action.
    pub at: i64,
}

impl AuditEntry {
    /// Creates an entry for a booking action.
    pub fn booking(actor_id: &str, action: &str, booking_id: &str, payload: Metadata, at: i64) -> Self {
        Self::new(actor_id, action, "booking", booking_id, payload, at)
    }

    /// Creates an entry for a payment action.
    pub fn payment(actor_id: &str, action: &str, payment_id: &str, payload: Metadata, at: i64) -> Self {
        Self::new(actor_id, action, "payment", payment_id, payload, at)
    }

    /// Creates an entry for a helper profile action.
    pub fn helper(actor_id: &str, action: &str, helper_id: &str, payload: Metadata, at: i64) -> Self {
        Self::new(actor_id, action, "helper", helper_id, payload, at)
    }

    /// Creates an entry for a dispute action.
    pub fn dispute(actor_id: &str, action: &str, dispute_id: &str, payload: Metadata, at: i64) -> Self {
        Self::new(actor_id, action, "dispute", dispute_id, payload, at)
    }

    fn new(
        actor_id: &str,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        payload: Metadata,
        at: i64,
    ) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            payload,
            at,
        }
    }
}

/// Receives audit entries.
pub trait AuditSink: Send + Sync {
    /// Records one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be recorded.
    fn record(&self, entry: &AuditEntry) -> Result<()>;
}

/// Audit sink that emits entries as structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &AuditEntry) -> Result<()> {
        tracing::info!(
            target: "helpmate::audit",
            actor_id = %entry.actor_id,
            action = %entry.action,
            entity_type = %entry.entity_type,
            entity_id = %entry.entity_id,
            at = entry.at,
            "audit"
        );
        Ok(())
    }
}

/// Append-only JSONL audit log.
#[derive(Debug, Clone)]
pub struct JsonlAuditLog {
    path: PathBuf,
}

impl JsonlAuditLog {
    /// Creates a log writing to `path`. The file is created on first write.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read_all(&self) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(helpmate_core::Error::from)?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl AuditSink for JsonlAuditLog {
    fn record(&self, entry: &AuditEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry).map_err(helpmate_core::Error::from)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
