//! Engine settings, opportunity records and run diagnostics.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::normalize::{CanonicalLine, CanonicalParticipant, MarketId, MarketKind};

/// Ordering of the returned opportunity list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RankBy {
    /// Expected value, descending.
    #[default]
    Ev,
    /// Price difference `candidate - reference`, descending.
    Edge,
}

/// Parameters of one comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Bankroll the Kelly fraction is applied to.
    pub bankroll: Decimal,
    /// Full Kelly is divided by this (4 = quarter Kelly).
    pub kelly_divisor: Decimal,
    /// Opportunities need EV strictly above this.
    pub min_ev: Decimal,
    /// Output ordering.
    pub rank_by: RankBy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            bankroll: Decimal::new(100, 0),
            kelly_divisor: Decimal::new(4, 0),
            min_ev: Decimal::ZERO,
            rank_by: RankBy::Ev,
        }
    }
}

/// Why a record or candidate quote produced no opportunity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExclusionReason {
    /// Blank market or participant.
    InvalidInput,
    /// Odd not > 1.
    InvalidOdd,
    /// Market label not in the vocabulary.
    UnmappedMarket,
    /// Total-market participant neither over nor under.
    NonTwoSidedTotal,
    /// Sided market without exactly two participants.
    AmbiguousOpposite,
    /// Reference book does not quote the opposite outcome.
    MissingOpposite,
}

/// Excluded-record counts per reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExclusionCounts(BTreeMap<ExclusionReason, usize>);

impl ExclusionCounts {
    /// Count one exclusion.
    pub fn record(&mut self, reason: ExclusionReason) {
        *self.0.entry(reason).or_default() += 1;
    }

    /// Count for a reason (0 when never seen).
    pub fn get(&self, reason: ExclusionReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    /// Total excluded.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Non-zero counts in reason order.
    pub fn iter(&self) -> impl Iterator<Item = (ExclusionReason, usize)> + '_ {
        self.0.iter().map(|(reason, count)| (*reason, *count))
    }
}

/// Match-rate counters of one comparison run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Raw reference records received.
    pub reference_records: usize,
    /// Raw candidate records received.
    pub candidate_records: usize,
    /// Distinct reference keys after deduplication.
    pub reference_keys: usize,
    /// Distinct candidate keys after deduplication.
    pub candidate_keys: usize,
    /// Duplicate quotes discarded (both books).
    pub duplicates_discarded: usize,
    /// Candidate keys the reference book does not quote.
    pub unmatched: usize,
    /// Candidate odd not above the reference odd.
    pub not_better: usize,
    /// EV at or below the configured minimum.
    pub below_threshold: usize,
    /// Opportunities emitted.
    pub emitted: usize,
}

/// A candidate price that beats the devigged reference market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    /// Canonical market.
    pub market: MarketId,
    /// Total or sided.
    pub kind: MarketKind,
    /// Canonical participant.
    pub participant: CanonicalParticipant,
    /// Canonical line.
    pub line: CanonicalLine,
    /// Canonical participant of the opposite outcome.
    pub opposite_participant: CanonicalParticipant,
    /// Canonical line of the opposite outcome.
    pub opposite_line: CanonicalLine,
    /// Market label as quoted by the candidate book.
    pub market_label: String,
    /// Participant label as quoted by the candidate book.
    pub participant_label: String,
    /// Candidate book name.
    pub candidate_book: String,
    /// Candidate book's odd.
    pub candidate_odd: Decimal,
    /// Reference book's odd for the same outcome.
    pub reference_odd: Decimal,
    /// Reference book's odd for the opposite outcome.
    pub opposite_odd: Decimal,
    /// `candidate_odd - reference_odd`.
    pub edge: Decimal,
    /// Sum of the reference implied probabilities.
    pub overround: Decimal,
    /// Devigged probability of this outcome.
    pub fair_probability: Decimal,
    /// Devigged probability of the opposite outcome.
    pub fair_probability_opposite: Decimal,
    /// Expected profit per unit staked at the candidate odd.
    pub ev: Decimal,
    /// Full Kelly fraction.
    pub kelly: Decimal,
    /// Kelly fraction after the configured divisor.
    pub kelly_fraction: Decimal,
    /// Suggested stake (`kelly_fraction * bankroll`).
    pub stake: Decimal,
}

impl Opportunity {
    /// EV in percent.
    pub fn ev_pct(&self) -> Decimal {
        self.ev * Decimal::ONE_HUNDRED
    }
}

/// Everything one comparison run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// Opportunities, ranked, never truncated.
    pub opportunities: Vec<Opportunity>,
    /// Excluded records per reason.
    pub exclusions: ExclusionCounts,
    /// Unmapped market labels (`book: label`) with occurrence counts.
    pub unmapped_labels: BTreeMap<String, usize>,
    /// Match-rate counters.
    pub stats: MatchStats,
}
