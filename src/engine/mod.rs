//! Opportunity engine: compares two canonicalized book snapshots.
//!
//! This module handles:
//! - Per-book indexing and deduplication of canonical quotes
//! - Devigging, EV and fractional Kelly sizing
//! - Opportunity detection and ranking
//! - Odds-drop detection between snapshots of one book

pub mod calculator;
pub mod detector;
pub mod index;
pub mod movement;
pub mod types;

pub use calculator::{devig, expected_value, kelly_fraction, size_stake, FairPrice, StakeSizing};
pub use detector::{find_opportunities, rank};
pub use index::{index_book, observed_teams, IndexDiagnostics, Keep, QuoteIndex};
pub use movement::{detect_drops, drop_percent, MovementReport, OddsDrop};
pub use types::{
    ComparisonReport, EngineSettings, ExclusionCounts, ExclusionReason, MatchStats, Opportunity, RankBy,
};
