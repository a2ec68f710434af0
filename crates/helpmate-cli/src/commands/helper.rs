// Rust guideline compliant 2026-10-16

//! Implementation of the `helpmate helper` commands.

use super::open_marketplace;
use crate::OutputFormatter;
use anyhow::Result;
use helpmate_app::{unix_timestamp, AppError, HelperModeration};
use helpmate_core::{CandidateQuery, GeoPoint, MatchPreferences, Store, VerificationStatus};
use std::path::Path;

/// Helper actions.
#[derive(Debug, Clone, PartialEq, clap::Subcommand)]
pub enum HelperAction {
    /// Create or update a helper profile
    Register {
        /// Helper ID
        id: String,

        /// Service categories offered
        #[arg(long = "service", value_delimiter = ',')]
        services: Vec<String>,

        /// Zones served
        #[arg(long = "area", value_delimiter = ',')]
        areas: Vec<String>,

        /// Base price
        #[arg(long)]
        base_price: Option<f64>,

        /// Latitude of the helper's location
        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        /// Longitude of the helper's location
        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        /// Verification status (pending, approved, rejected)
        #[arg(long)]
        verification: Option<String>,

        /// Whether the profile is active
        #[arg(long)]
        active: Option<bool>,

        /// Whether the helper is taking jobs now
        #[arg(long)]
        available: Option<bool>,
    },

    /// Show a helper profile
    Show {
        /// Helper ID
        id: String,
    },

    /// Verify and activate a helper
    Approve {
        /// Helper ID
        id: String,

        /// Operator making the decision
        #[arg(long)]
        actor: String,
    },

    /// Fail a helper's verification and deactivate them
    Reject {
        /// Helper ID
        id: String,

        /// Operator making the decision
        #[arg(long)]
        actor: String,
    },

    /// Deactivate a helper without changing verification
    Suspend {
        /// Helper ID
        id: String,

        /// Operator making the decision
        #[arg(long)]
        actor: String,
    },

    /// Rank helpers for a request
    Rank {
        /// Service category
        #[arg(long)]
        category: String,

        /// Zone the helper must serve
        #[arg(long)]
        zone: Option<String>,

        /// Latitude of the job
        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        /// Longitude of the job
        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        /// Lower bound of the customer's budget
        #[arg(long)]
        price_min: Option<f64>,

        /// Upper bound of the customer's budget
        #[arg(long)]
        price_max: Option<f64>,
    },

    /// Summarise a helper's earnings
    Earnings {
        /// Helper ID
        id: String,
    },
}

fn point(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPoint> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    }
}

fn parse_verification(value: &str) -> Result<VerificationStatus, AppError> {
    match value.trim().to_lowercase().as_str() {
        "pending" => Ok(VerificationStatus::Pending),
        "approved" => Ok(VerificationStatus::Approved),
        "rejected" => Ok(VerificationStatus::Rejected),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid verification status: {}",
            value
        ))),
    }
}

/// Runs a helper action.
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
pub fn execute(action: HelperAction, root: Option<&Path>, formatter: &dyn OutputFormatter) -> Result<()> {
    let market = open_marketplace(root)?;

    let output = match action {
        HelperAction::Register {
            id,
            services,
            areas,
            base_price,
            lat,
            lng,
            verification,
            active,
            available,
        } => {
            let mut profile = match market.store().get_helper(&id)? {
                Some(profile) => profile,
                None => market.new_helper_profile(&id),
            };
            if !services.is_empty() {
                profile.services = services;
            }
            if !areas.is_empty() {
                profile.service_areas = areas;
            }
            if let Some(base_price) = base_price {
                profile.base_price = base_price;
            }
            if let Some(location) = point(lat, lng) {
                profile.location = Some(location);
            }
            if let Some(verification) = verification {
                profile.verification = parse_verification(&verification)?;
            }
            if let Some(active) = active {
                profile.is_active = active;
            }
            if let Some(available) = available {
                profile.is_available = available;
            }
            market.register_helper(&profile)?;
            formatter.format_helper(&profile)
        }
        HelperAction::Show { id } => formatter.format_helper(&market.get_helper(&id)?),
        HelperAction::Approve { id, actor } => {
            formatter.format_helper(&market.moderate_helper(&id, &actor, HelperModeration::Approve)?)
        }
        HelperAction::Reject { id, actor } => {
            formatter.format_helper(&market.moderate_helper(&id, &actor, HelperModeration::Reject)?)
        }
        HelperAction::Suspend { id, actor } => {
            formatter.format_helper(&market.moderate_helper(&id, &actor, HelperModeration::Suspend)?)
        }
        HelperAction::Rank {
            category,
            zone,
            lat,
            lng,
            price_min,
            price_max,
        } => {
            let query = CandidateQuery {
                category_id: category,
                zone_id: zone,
                location: point(lat, lng),
                preferences: MatchPreferences {
                    price_min,
                    price_max,
                },
            };
            formatter.format_ranking(&market.rank_helpers(&query)?)
        }
        HelperAction::Earnings { id } => {
            let summary = market.helper_earnings(&id, unix_timestamp()?)?;
            formatter.format_earnings(&id, &summary)
        }
    };

    println!("{}", output);
    Ok(())
}
