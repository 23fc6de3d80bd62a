//! Per-book quote index keyed by canonical outcome.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::debug;

use super::types::ExclusionCounts;
use crate::error::CanonicalError;
use crate::metrics;
use crate::normalize::{CanonicalKey, CanonicalParticipant, CanonicalQuote, Canonicalizer, MarketId, MarketKind};
use crate::odds::RawOddsRecord;

/// Which quote survives when one book quotes the same key twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    /// Lowest odd (conservative reference price).
    Lowest,
    /// Highest odd (best price available to the bettor).
    Highest,
}

impl Keep {
    fn prefers(self, incoming: Decimal, current: Decimal) -> bool {
        match self {
            Keep::Lowest => incoming < current,
            Keep::Highest => incoming > current,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    best: CanonicalQuote,
    odds: SmallVec<[Decimal; 2]>,
}

/// Deduplicated quotes of one book.
#[derive(Debug, Clone)]
pub struct QuoteIndex {
    keep: Keep,
    slots: HashMap<CanonicalKey, Slot>,
    duplicates: usize,
}

impl QuoteIndex {
    /// Create an empty index.
    pub fn new(keep: Keep) -> Self {
        Self {
            keep,
            slots: HashMap::new(),
            duplicates: 0,
        }
    }

    /// Insert a quote. Returns `false` if its key was already present.
    pub fn insert(&mut self, quote: CanonicalQuote) -> bool {
        match self.slots.get_mut(&quote.key) {
            Some(slot) => {
                self.duplicates += 1;
                slot.odds.push(quote.odd);
                let (kept, discarded) = if self.keep.prefers(quote.odd, slot.best.odd) {
                    (quote.odd, std::mem::replace(&mut slot.best, quote).odd)
                } else {
                    (slot.best.odd, quote.odd)
                };
                debug!(key = %slot.best.key, %kept, %discarded, "Duplicate quote discarded");
                false
            }
            None => {
                let mut odds = SmallVec::new();
                odds.push(quote.odd);
                self.slots.insert(quote.key.clone(), Slot { best: quote, odds });
                true
            }
        }
    }

    /// Surviving quote for a key.
    pub fn get(&self, key: &CanonicalKey) -> Option<&CanonicalQuote> {
        self.slots.get(key).map(|slot| &slot.best)
    }

    /// Every odd quoted for a key, in input order.
    ///
    /// Lookups always read the surviving quote from [`QuoteIndex::get`]; this list
    /// only reports what was discarded around it.
    pub fn all_odds(&self, key: &CanonicalKey) -> &[Decimal] {
        self.slots.get(key).map(|slot| slot.odds.as_slice()).unwrap_or(&[])
    }

    /// Surviving quotes ordered by key.
    pub fn sorted(&self) -> Vec<&CanonicalQuote> {
        let mut quotes: Vec<_> = self.slots.values().map(|slot| &slot.best).collect();
        quotes.sort_by(|a, b| a.key.cmp(&b.key));
        quotes
    }

    /// Distinct keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Quotes discarded as duplicates.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Team tokens quoted per sided market.
    pub fn teams(&self) -> BTreeMap<MarketId, BTreeSet<String>> {
        let mut teams: BTreeMap<MarketId, BTreeSet<String>> = BTreeMap::new();
        for slot in self.slots.values() {
            if let (MarketKind::Sided, Some(team)) = (slot.best.kind, slot.best.key.participant.team()) {
                teams
                    .entry(slot.best.key.market.clone())
                    .or_default()
                    .insert(team.to_string());
            }
        }
        teams
    }
}

/// Diagnostics collected while indexing.
#[derive(Debug, Default)]
pub struct IndexDiagnostics {
    /// Excluded records per reason.
    pub exclusions: ExclusionCounts,
    /// Unmapped labels (`book: label`) with counts.
    pub unmapped_labels: BTreeMap<String, usize>,
}

impl IndexDiagnostics {
    /// Count a failed record.
    pub fn exclude(&mut self, error: &CanonicalError) {
        let reason = error.reason();
        self.exclusions.record(reason);
        metrics::inc_records_excluded(reason);

        if let CanonicalError::UnmappedMarket { book, label } = error {
            *self.unmapped_labels.entry(format!("{book}: {label}")).or_default() += 1;
        }
    }
}

/// Canonicalize a book snapshot into a deduplicated index.
///
/// Records that cannot be canonicalized, and total-market quotes whose side is
/// neither over nor under, are counted in `diagnostics` and left out.
pub fn index_book(
    records: &[RawOddsRecord],
    canonicalizer: &Canonicalizer,
    keep: Keep,
    diagnostics: &mut IndexDiagnostics,
) -> QuoteIndex {
    let mut index = QuoteIndex::new(keep);

    for record in records {
        let quote = match canonicalizer.canonicalize(record) {
            Ok(quote) => quote,
            Err(e) => {
                debug!(book = %record.book, market = %record.market, error = %e, "Record excluded");
                diagnostics.exclude(&e);
                continue;
            }
        };

        if let (MarketKind::Total, CanonicalParticipant::Unclassified(label)) =
            (quote.kind, &quote.key.participant)
        {
            let e = CanonicalError::NonTwoSidedTotal { label: label.clone() };
            debug!(book = %record.book, error = %e, "Record excluded");
            diagnostics.exclude(&e);
            continue;
        }

        metrics::inc_records_canonicalized(&record.book);
        if !index.insert(quote) {
            metrics::inc_duplicate_quotes(&record.book);
        }
    }

    index
}

/// Merge the sided-market teams seen in several indexes.
pub fn observed_teams(indexes: &[&QuoteIndex]) -> BTreeMap<MarketId, Vec<String>> {
    let mut merged: BTreeMap<MarketId, BTreeSet<String>> = BTreeMap::new();
    for index in indexes {
        for (market, teams) in index.teams() {
            merged.entry(market).or_default().extend(teams);
        }
    }
    merged
        .into_iter()
        .map(|(market, teams)| (market, teams.into_iter().collect()))
        .collect()
}
