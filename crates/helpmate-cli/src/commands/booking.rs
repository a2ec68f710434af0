// Rust guideline compliant 2026-10-16

//! Implementation of the `helpmate booking` commands.

use super::open_marketplace;
use crate::OutputFormatter;
use anyhow::Result;
use helpmate_app::{parse_metadata, parse_status, NewBooking, NewReview};
use helpmate_core::PriceRange;
use std::path::Path;

/// Booking actions.
#[derive(Debug, Clone, PartialEq, clap::Subcommand)]
pub enum BookingAction {
    /// Request a new booking
    Create {
        /// Customer making the request
        #[arg(long)]
        customer: String,

        /// Service category
        #[arg(long)]
        category: String,

        /// Job address
        #[arg(long)]
        address: String,

        /// Scheduled start (Unix timestamp)
        #[arg(long)]
        scheduled_at: Option<i64>,

        /// Notes for the helper
        #[arg(long)]
        notes: Option<String>,

        /// Lower bound of the price estimate
        #[arg(long)]
        price_min: Option<f64>,

        /// Upper bound of the price estimate
        #[arg(long)]
        price_max: Option<f64>,
    },

    /// Accept a requested booking
    Accept {
        /// Booking ID
        id: String,

        /// Accepting helper
        #[arg(long)]
        helper: String,
    },

    /// Decline a requested booking
    Decline {
        /// Booking ID
        id: String,

        /// Declining helper
        #[arg(long)]
        helper: String,

        /// Reason for declining
        #[arg(long)]
        reason: Option<String>,
    },

    /// Move a booking to a new status
    ///
    /// The customer may only mark a booking paid; the assigned helper drives
    /// the rest of the lifecycle.
    Status {
        /// Booking ID
        id: String,

        /// Target status
        status: String,

        /// Customer or assigned helper making the change
        #[arg(long)]
        actor: String,

        /// Event metadata as key=value
        #[arg(long = "meta")]
        meta: Vec<String>,
    },

    /// Cancel a booking
    Cancel {
        /// Booking ID
        id: String,

        /// Customer or helper cancelling
        #[arg(long)]
        actor: String,
    },

    /// Show a booking
    Show {
        /// Booking ID
        id: String,

        /// Requesting user
        #[arg(long)]
        user: String,
    },

    /// Show a booking with its events, messages and payments
    Timeline {
        /// Booking ID
        id: String,

        /// Requesting user
        #[arg(long)]
        user: String,
    },

    /// List a user's bookings
    List {
        /// Customer or helper
        #[arg(long)]
        user: String,
    },

    /// Send a message on a booking
    Message {
        /// Booking ID
        id: String,

        /// Message text
        body: String,

        /// Sender
        #[arg(long)]
        sender: String,
    },

    /// Review the helper of a paid booking
    Review {
        /// Booking ID
        id: String,

        /// Rating from 1 to 5
        rating: u8,

        /// Reviewing customer
        #[arg(long)]
        customer: String,

        /// Review comment
        #[arg(long)]
        comment: Option<String>,
    },
}

/// Runs a booking action.
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
pub fn execute(action: BookingAction, root: Option<&Path>, formatter: &dyn OutputFormatter) -> Result<()> {
    let market = open_marketplace(root)?;

    let output = match action {
        BookingAction::Create {
            customer,
            category,
            address,
            scheduled_at,
            notes,
            price_min,
            price_max,
        } => {
            let booking = market.create_booking(NewBooking {
                customer_id: customer,
                category_id: category,
                address_id: address,
                scheduled_at,
                notes,
                price_estimate: PriceRange {
                    min: price_min,
                    max: price_max,
                },
            })?;
            formatter.format_booking(&booking)
        }
        BookingAction::Accept { id, helper } => {
            formatter.format_booking(&market.accept_booking(&id, &helper)?)
        }
        BookingAction::Decline { id, helper, reason } => {
            formatter.format_decline(&market.decline_booking(&id, &helper, reason.as_deref())?)
        }
        BookingAction::Status {
            id,
            status,
            actor,
            meta,
        } => {
            let status = parse_status(&status)?;
            let metadata = parse_metadata(&meta)?;
            formatter.format_booking(&market.request_status_change(&id, &actor, status, metadata)?)
        }
        BookingAction::Cancel { id, actor } => {
            formatter.format_booking(&market.cancel_booking(&id, &actor)?)
        }
        BookingAction::Show { id, user } => formatter.format_booking(&market.get_booking(&id, &user)?),
        BookingAction::Timeline { id, user } => {
            formatter.format_timeline(&market.booking_timeline(&id, &user)?)
        }
        BookingAction::List { user } => formatter.format_bookings(&market.list_bookings(&user)?),
        BookingAction::Message { id, body, sender } => {
            formatter.format_message(&market.add_message(&id, &sender, &body)?)
        }
        BookingAction::Review {
            id,
            rating,
            customer,
            comment,
        } => {
            let review = market.add_review(NewReview {
                booking_id: id,
                customer_id: customer,
                rating,
                comment,
            })?;
            formatter.format_review(&review)
        }
    };

    println!("{}", output);
    Ok(())
}
