// Rust guideline compliant 2026-10-16

//! Implementation of the `helpmate dispute` commands.

use super::open_marketplace;
use crate::OutputFormatter;
use anyhow::Result;
use helpmate_app::{parse_dispute_status, NewDispute};
use std::path::Path;

/// Dispute actions.
#[derive(Debug, Clone, PartialEq, clap::Subcommand)]
pub enum DisputeAction {
    /// Raise a dispute on a booking
    Raise {
        /// Booking ID
        booking_id: String,

        /// Customer or helper raising the dispute
        #[arg(long)]
        actor: String,

        /// Why the dispute is raised
        #[arg(long)]
        reason: String,

        /// Evidence references
        #[arg(long = "evidence", value_delimiter = ',')]
        evidence: Vec<String>,
    },

    /// List disputes, newest first
    List,

    /// Record a decision on a dispute
    Resolve {
        /// Dispute ID
        id: String,

        /// New status (investigating, resolved, rejected)
        status: String,

        /// Operator making the decision
        #[arg(long)]
        actor: String,

        /// Resolution note
        #[arg(long)]
        note: Option<String>,
    },
}

/// Runs a dispute action.
///
/// # Errors
///
/// Returns an error if the data directory is missing, an argument cannot be
/// parsed, or the marketplace rejects the operation.
pub fn execute(action: DisputeAction, root: Option<&Path>, formatter: &dyn OutputFormatter) -> Result<()> {
    let market = open_marketplace(root)?;

    let output = match action {
        DisputeAction::Raise {
            booking_id,
            actor,
            reason,
            evidence,
        } => {
            let dispute = market.raise_dispute(NewDispute {
                booking_id,
                raised_by: actor,
                reason,
                evidence,
            })?;
            formatter.format_dispute(&dispute)
        }
        DisputeAction::List => formatter.format_disputes(&market.list_disputes()?),
        DisputeAction::Resolve {
            id,
            status,
            actor,
            note,
        } => {
            let status = parse_dispute_status(&status)?;
            formatter.format_dispute(&market.resolve_dispute(&id, &actor, status, note.as_deref())?)
        }
    };

    println!("{}", output);
    Ok(())
}
