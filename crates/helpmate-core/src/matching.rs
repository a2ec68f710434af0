// Rust guideline compliant 2026-10-12

//! Helper matching and ranking engine.
//!
//! Candidates are scored with five sub-scores, each normalised into `[0, 1]`,
//! and combined with fixed weights that sum to one. Ranking is a stable sort
//! on the combined score, so equal scores keep their input order, and the
//! result depends on nothing but the inputs.

use crate::{GeoPoint, HelperProfile, VerificationStatus};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum number of ranked candidates returned.
pub const MAX_RANKED: usize = 20;

/// Weight of the distance sub-score.
pub const DISTANCE_WEIGHT: f64 = 0.35;
/// Weight of the rating sub-score.
pub const RATING_WEIGHT: f64 = 0.20;
/// Weight of the reliability sub-score.
pub const RELIABILITY_WEIGHT: f64 = 0.25;
/// Weight of the price-fit sub-score.
pub const PRICE_FIT_WEIGHT: f64 = 0.10;
/// Weight of the availability sub-score.
pub const AVAILABILITY_WEIGHT: f64 = 0.10;

/// Distance at which the distance sub-score reaches zero.
pub const MAX_DISTANCE_KM: f64 = 20.0;
/// Price-fit score used when no price band is given.
pub const NEUTRAL_PRICE_FIT: f64 = 0.5;

const KM_PER_DEGREE: f64 = 111.0;
const PARALLEL_THRESHOLD: usize = 1_000;

/// Momentary projection of a helper for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperCandidate {
    /// Helper identifier.
    pub id: String,
    /// Distance from the job in kilometres.
    pub distance_km: f64,
    /// Average review rating (0-5).
    pub rating_avg: f64,
    /// Number of reviews.
    pub rating_count: u32,
    /// Reliability score (0-100).
    pub reliability_score: f64,
    /// Helper's base price.
    pub base_price: f64,
    /// Whether the helper is available now.
    pub is_available: bool,
}

/// Customer preferences applied while ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPreferences {
    /// Lower bound of the preferred price band.
    #[serde(default)]
    pub price_min: Option<f64>,
    /// Upper bound of the preferred price band.
    #[serde(default)]
    pub price_max: Option<f64>,
}

impl MatchPreferences {
    /// Returns the preferred band when both bounds are given and ordered.
    pub fn price_band(&self) -> Option<(f64, f64)> {
        match (self.price_min, self.price_max) {
            (Some(min), Some(max)) if min <= max => Some((min, max)),
            _ => None,
        }
    }
}

/// Per-candidate score with its components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Distance sub-score.
    pub distance: f64,
    /// Rating sub-score.
    pub rating: f64,
    /// Reliability sub-score.
    pub reliability: f64,
    /// Price-fit sub-score.
    pub price_fit: f64,
    /// Availability sub-score.
    pub availability: f64,
    /// Weighted total.
    pub total: f64,
}

/// A candidate with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// The scored candidate.
    pub candidate: HelperCandidate,
    /// Score components.
    pub score: ScoreBreakdown,
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Linear falloff reaching zero at [`MAX_DISTANCE_KM`].
pub fn distance_score(distance_km: f64) -> f64 {
    clamp_unit(1.0 - distance_km / MAX_DISTANCE_KM)
}

/// Average rating discounted by a logarithmic confidence factor.
pub fn rating_score(rating_avg: f64, rating_count: u32) -> f64 {
    let average = clamp_unit(rating_avg / 5.0);
    let confidence = clamp_unit((f64::from(rating_count) + 1.0).log10() / 2.0);
    average * confidence
}

/// Reliability scaled into `[0, 1]`.
pub fn reliability_score(reliability: f64) -> f64 {
    clamp_unit(reliability / 100.0)
}

/// Fit of a base price against the preferred band.
///
/// Inside the band scores 1; outside it decays linearly to zero over a span
/// equal to the band width (at least 1).
pub fn price_fit_score(base_price: f64, preferences: &MatchPreferences) -> f64 {
    let Some((min, max)) = preferences.price_band() else {
        return NEUTRAL_PRICE_FIT;
    };
    if base_price >= min && base_price <= max {
        return 1.0;
    }
    let span = (max - min).max(1.0);
    let delta = if base_price < min {
        min - base_price
    } else {
        base_price - max
    };
    clamp_unit(1.0 - delta / span)
}

/// Scores one candidate.
pub fn score_candidate(candidate: &HelperCandidate, preferences: &MatchPreferences) -> ScoreBreakdown {
    let distance = distance_score(candidate.distance_km);
    let rating = rating_score(candidate.rating_avg, candidate.rating_count);
    let reliability = reliability_score(candidate.reliability_score);
    let price_fit = price_fit_score(candidate.base_price, preferences);
    let availability = if candidate.is_available { 1.0 } else { 0.0 };

    let total = DISTANCE_WEIGHT * distance
        + RATING_WEIGHT * rating
        + RELIABILITY_WEIGHT * reliability
        + PRICE_FIT_WEIGHT * price_fit
        + AVAILABILITY_WEIGHT * availability;

    ScoreBreakdown {
        distance,
        rating,
        reliability,
        price_fit,
        availability,
        total,
    }
}

/// Ranks candidates by descending score.
///
/// # Arguments
///
/// * `candidates` - Pre-filtered candidates, in a caller-chosen order
/// * `preferences` - Customer preferences
///
/// # Returns
///
/// At most [`MAX_RANKED`] candidates, best first; equal scores keep their
/// input order.
pub fn rank(candidates: Vec<HelperCandidate>, preferences: &MatchPreferences) -> Vec<RankedCandidate> {
    let score = |candidate: HelperCandidate| {
        let score = score_candidate(&candidate, preferences);
        RankedCandidate { candidate, score }
    };

    let mut ranked: Vec<RankedCandidate> = if candidates.len() >= PARALLEL_THRESHOLD {
        candidates.into_par_iter().map(score).collect()
    } else {
        candidates.into_iter().map(score).collect()
    };

    ranked.sort_by(|a, b| b.score.total.total_cmp(&a.score.total));
    ranked.truncate(MAX_RANKED);
    ranked
}

/// Query used to select candidates from stored helper profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuery {
    /// Required service category.
    pub category_id: String,
    /// Optional zone the helper must serve.
    #[serde(default)]
    pub zone_id: Option<String>,
    /// Job location, if known.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Ranking preferences.
    #[serde(default)]
    pub preferences: MatchPreferences,
}

/// Rough planar distance in kilometres between two points.
pub fn approx_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = a.lat - b.lat;
    let dlng = a.lng - b.lng;
    (dlat * dlat + dlng * dlng).sqrt() * KM_PER_DEGREE
}

/// Selects eligible profiles and projects them into candidates.
///
/// A profile is eligible when it is active, approved, offers the category,
/// and serves the zone if one is given. Distance falls back to
/// `default_distance_km` when either location is unknown.
pub fn filter_eligible(
    profiles: &[HelperProfile],
    query: &CandidateQuery,
    default_distance_km: f64,
) -> Vec<HelperCandidate> {
    profiles
        .iter()
        .filter(|p| p.is_active && p.verification == VerificationStatus::Approved)
        .filter(|p| p.services.iter().any(|s| *s == query.category_id))
        .filter(|p| match &query.zone_id {
            Some(zone) => p.service_areas.iter().any(|area| area == zone),
            None => true,
        })
        .map(|p| HelperCandidate {
            id: p.id.clone(),
            distance_km: match (query.location, p.location) {
                (Some(job), Some(helper)) => approx_distance_km(job, helper),
                _ => default_distance_km,
            },
            rating_avg: p.rating_avg,
            rating_count: p.rating_count,
            reliability_score: f64::from(p.reliability_score),
            base_price: p.base_price,
            is_available: p.is_available,
        })
        .collect()
}
