// Rust guideline compliant 2026-10-16

//! Command implementations for the Helpmate CLI.

pub mod booking;
pub mod dispute;
pub mod helper;
pub mod init;
pub mod payment;

use anyhow::Result;
use helpmate_app::{DataDir, JsonlAuditLog, LogNotifier, Marketplace};
use helpmate_core::JsonlStore;
use std::path::Path;

/// Marketplace backed by the on-disk data directory.
pub type CliMarketplace = Marketplace<JsonlStore, LogNotifier, JsonlAuditLog>;

/// Opens the marketplace in the data directory under `root`.
///
/// # Errors
///
/// Returns an error if:
/// - The `.helpmate` directory does not exist
/// - The configuration is invalid
/// - The store cannot be opened
pub fn open_marketplace(root: Option<&Path>) -> Result<CliMarketplace> {
    let data_dir = DataDir::discover(root)?;
    let config = data_dir.load_config()?;
    let store = data_dir.open_store()?;
    tracing::debug!(dir = %data_dir.dir().display(), "Opened data directory");
    Ok(Marketplace::new(
        store,
        LogNotifier,
        data_dir.audit_log(),
        config,
    ))
}
