//! Odds-drop detection between two snapshots of the same book.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use super::index::{index_book, IndexDiagnostics, Keep};
use super::types::ExclusionCounts;
use crate::metrics;
use crate::normalize::{CanonicalKey, Canonicalizer};
use crate::odds::RawOddsRecord;

/// One outcome whose price fell between snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsDrop {
    /// Canonical key, rendered `market|participant|line`.
    pub key: String,
    /// Market label as quoted in the current snapshot.
    pub market_label: String,
    /// Participant label as quoted in the current snapshot.
    pub participant_label: String,
    /// Book name.
    pub book: String,
    /// Odd in the previous snapshot.
    pub previous_odd: Decimal,
    /// Odd in the current snapshot.
    pub current_odd: Decimal,
    /// `(previous - current) / previous * 100`.
    pub drop_pct: Decimal,
}

/// Result of one movement run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovementReport {
    /// Drops at or above the threshold, largest first.
    pub drops: Vec<OddsDrop>,
    /// Keys quoted in both snapshots.
    pub matched: usize,
    /// Excluded records per reason (both snapshots).
    pub exclusions: ExclusionCounts,
    /// Unmapped labels (`book: label`) with counts.
    pub unmapped_labels: BTreeMap<String, usize>,
}

/// Percentage fall from `previous` to `current`; negative when the odd rose.
pub fn drop_percent(previous: Decimal, current: Decimal) -> Option<Decimal> {
    (previous - current)
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Report every canonical key whose odd fell by at least `threshold_pct` percent.
#[instrument(skip_all, fields(previous = previous.len(), current = current.len(), %threshold_pct))]
pub fn detect_drops(
    previous: &[RawOddsRecord],
    current: &[RawOddsRecord],
    canonicalizer: &Canonicalizer,
    threshold_pct: Decimal,
) -> MovementReport {
    let _timer = metrics::timer_movement();
    let mut diagnostics = IndexDiagnostics::default();

    let before = index_book(previous, canonicalizer, Keep::Highest, &mut diagnostics);
    let after = index_book(current, canonicalizer, Keep::Highest, &mut diagnostics);

    let mut matched = 0;
    let mut drops: Vec<(CanonicalKey, OddsDrop)> = Vec::new();

    for quote in after.sorted() {
        let Some(old) = before.get(&quote.key) else {
            continue;
        };
        matched += 1;

        let Some(drop_pct) = drop_percent(old.odd, quote.odd) else {
            continue;
        };
        if drop_pct < threshold_pct {
            continue;
        }

        drops.push((
            quote.key.clone(),
            OddsDrop {
                key: quote.key.to_string(),
                market_label: quote.raw.market.clone(),
                participant_label: quote.raw.participant.clone(),
                book: quote.raw.book.clone(),
                previous_odd: old.odd,
                current_odd: quote.odd,
                drop_pct: drop_pct.round_dp(2),
            },
        ));
    }

    drops.sort_by(|(ka, a), (kb, b)| b.drop_pct.cmp(&a.drop_pct).then_with(|| ka.cmp(kb)));
    metrics::add_odds_drops(drops.len());
    info!(matched, drops = drops.len(), "Movement check complete");

    MovementReport {
        drops: drops.into_iter().map(|(_, drop)| drop).collect(),
        matched,
        exclusions: diagnostics.exclusions,
        unmapped_labels: diagnostics.unmapped_labels,
    }
}
