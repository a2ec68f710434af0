// Rust guideline compliant 2026-10-12

//! Helpmate Core Library
//!
//! This crate provides the decision-making components of the Helpmate marketplace:
//! - Data models (Booking, Payment, HelperProfile, typed metadata)
//! - Booking lifecycle transition table
//! - Reliability score rule
//! - Escrow payment guard
//! - Helper matching and ranking engine
//! - Earnings summaries
//! - Disputes raised against bookings
//! - Storage contract with in-memory and JSONL implementations
//! - Error types and result handling

pub mod config;
pub mod earnings;
pub mod error;
pub mod escrow;
pub mod fsm;
pub mod identity;
pub mod matching;
pub mod metadata;
pub mod models;
pub mod reliability;
pub mod storage;

pub use config::{Config, OutputFormat};
pub use earnings::EarningsSummary;
pub use error::{Entity, Error, Result};
pub use escrow::{apply_escrow_action, EscrowAction};
pub use fsm::validate_transition;
pub use matching::{
    filter_eligible, rank, CandidateQuery, HelperCandidate, MatchPreferences, RankedCandidate,
    ScoreBreakdown,
};
pub use metadata::{MetaValue, Metadata};
pub use models::{
    Booking, BookingEvent, BookingStatus, Dispute, DisputeStatus, EscrowStatus, EventKind,
    GeoPoint, HelperAssignment, HelperProfile, Message, Payment, PaymentMethod, PaymentStatus,
    PriceRange, Review, VerificationStatus,
};
pub use reliability::reliability_delta;
pub use storage::{
    CasResult, DisputeDecision, EscrowChange, HelperStanding, JsonlStore, MemoryStore,
    ReliabilityAdjustment, StatusChange, Store,
};
