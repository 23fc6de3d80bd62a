//! Positive-EV opportunity detection between a reference and a candidate book.

use std::cmp::Ordering;

use tracing::{debug, info, instrument};

use super::calculator::{devig, expected_value, size_stake};
use super::index::{index_book, observed_teams, IndexDiagnostics, Keep};
use super::types::{ComparisonReport, EngineSettings, ExclusionReason, MatchStats, Opportunity, RankBy};
use crate::error::CanonicalError;
use crate::metrics;
use crate::normalize::Canonicalizer;
use crate::odds::RawOddsRecord;

/// Compare a candidate book against a sharp reference book.
///
/// Both snapshots are canonicalized and deduplicated (reference keeps the lowest
/// odd per key, candidate the highest). A candidate quote becomes an
/// [`Opportunity`] when it beats the reference price for the same key, the
/// reference also quotes the opposite outcome, and the EV against the devigged
/// reference probability is above `settings.min_ev`.
///
/// Never fails: every skipped record or quote is accounted for in the report.
#[instrument(
    skip_all,
    fields(reference = reference.len(), candidate = candidate.len())
)]
pub fn find_opportunities(
    reference: &[RawOddsRecord],
    candidate: &[RawOddsRecord],
    canonicalizer: &Canonicalizer,
    settings: &EngineSettings,
) -> ComparisonReport {
    let _timer = metrics::timer_comparison();
    let mut diagnostics = IndexDiagnostics::default();

    let reference_index = index_book(reference, canonicalizer, Keep::Lowest, &mut diagnostics);
    let candidate_index = index_book(candidate, canonicalizer, Keep::Highest, &mut diagnostics);
    let teams = observed_teams(&[&reference_index, &candidate_index]);

    let mut stats = MatchStats {
        reference_records: reference.len(),
        candidate_records: candidate.len(),
        reference_keys: reference_index.len(),
        candidate_keys: candidate_index.len(),
        duplicates_discarded: reference_index.duplicates() + candidate_index.duplicates(),
        ..MatchStats::default()
    };
    let mut opportunities = Vec::new();

    for quote in candidate_index.sorted() {
        let Some(reference_quote) = reference_index.get(&quote.key) else {
            stats.unmatched += 1;
            continue;
        };

        if quote.odd <= reference_quote.odd {
            stats.not_better += 1;
            continue;
        }

        let market_teams = teams.get(&quote.key.market).map(Vec::as_slice).unwrap_or(&[]);
        let opposite_key = match quote.key.opposite(quote.kind, market_teams) {
            Ok(key) => key,
            Err(e) => {
                debug!(key = %quote.key, error = %e, "No opposite outcome");
                diagnostics.exclude(&e);
                continue;
            }
        };

        let Some(opposite_quote) = reference_index.get(&opposite_key) else {
            let e = CanonicalError::MissingOpposite {
                key: opposite_key.to_string(),
            };
            debug!(key = %quote.key, error = %e, "Cannot devig");
            diagnostics.exclude(&e);
            continue;
        };

        let opposite_odds = reference_index.all_odds(&opposite_key);
        if opposite_odds.len() > 1 {
            debug!(
                key = %opposite_key,
                quoted = ?opposite_odds,
                used = %opposite_quote.odd,
                "Opposite quoted more than once; devigging against the lowest"
            );
        }

        let Some(price) = devig(reference_quote.odd, opposite_quote.odd) else {
            let e = CanonicalError::InvalidOdd {
                odd: opposite_quote.odd.to_string(),
            };
            diagnostics.exclude(&e);
            continue;
        };

        let ev = expected_value(quote.odd, price.fair);
        if ev <= settings.min_ev {
            stats.below_threshold += 1;
            debug!(key = %quote.key, %ev, min_ev = %settings.min_ev, "Below EV threshold");
            continue;
        }

        let sizing = size_stake(ev, quote.odd, settings.kelly_divisor, settings.bankroll);

        opportunities.push(Opportunity {
            market: quote.key.market.clone(),
            kind: quote.kind,
            participant: quote.key.participant.clone(),
            line: quote.key.line.clone(),
            opposite_participant: opposite_key.participant,
            opposite_line: opposite_key.line,
            market_label: quote.raw.market.clone(),
            participant_label: quote.raw.participant.clone(),
            candidate_book: quote.raw.book.clone(),
            candidate_odd: quote.odd,
            reference_odd: reference_quote.odd,
            opposite_odd: opposite_quote.odd,
            edge: quote.odd - reference_quote.odd,
            overround: price.overround,
            fair_probability: price.fair,
            fair_probability_opposite: price.fair_opposite,
            ev,
            kelly: sizing.kelly,
            kelly_fraction: sizing.fraction,
            stake: sizing.stake,
        });
    }

    rank(&mut opportunities, settings.rank_by);
    stats.emitted = opportunities.len();
    metrics::add_opportunities_emitted(opportunities.len());

    info!(
        reference_keys = stats.reference_keys,
        candidate_keys = stats.candidate_keys,
        unmatched = stats.unmatched,
        excluded = diagnostics.exclusions.total(),
        unmapped = diagnostics.exclusions.get(ExclusionReason::UnmappedMarket),
        emitted = stats.emitted,
        "Comparison complete"
    );

    ComparisonReport {
        opportunities,
        exclusions: diagnostics.exclusions,
        unmapped_labels: diagnostics.unmapped_labels,
        stats,
    }
}

/// Sort descending by the chosen measure; ties fall back to the canonical key.
pub fn rank(opportunities: &mut [Opportunity], by: RankBy) {
    opportunities.sort_by(|a, b| {
        let primary = match by {
            RankBy::Ev => b.ev.cmp(&a.ev),
            RankBy::Edge => b.edge.cmp(&a.edge),
        };
        primary.then_with(|| by_key(a, b))
    });
}

fn by_key(a: &Opportunity, b: &Opportunity) -> Ordering {
    (&a.market, &a.participant, &a.line).cmp(&(&b.market, &b.participant, &b.line))
}
