// Rust guideline compliant 2026-10-16

//! Implementation of the `helpmate init` command.
//!
//! Creates the `.helpmate` data directory with a default configuration.

use anyhow::Result;
use helpmate_app::{DataDir, SuccessEnvelope};
use serde_json::json;
use std::path::Path;

/// Initializes a Helpmate data directory.
///
/// # Arguments
///
/// * `root` - Project root; defaults to the current directory
/// * `json` - Emit a JSON envelope instead of text
///
/// # Errors
///
/// Returns an error if the directory or config file cannot be written.
pub fn execute(root: Option<&Path>, json: bool) -> Result<()> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let (data_dir, created) = DataDir::init(&root)?;

    if json {
        let envelope = SuccessEnvelope::new(json!({
            "path": data_dir.dir(),
            "created": created,
        }));
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if created {
        println!("✓ Helpmate initialized at {}", data_dir.dir().display());
        println!("  - Created {}", data_dir.config_path().display());
    } else {
        println!("Helpmate already initialized at {}", data_dir.dir().display());
    }

    Ok(())
}
