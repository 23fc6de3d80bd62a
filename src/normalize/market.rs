//! Market label canonicalization against a configured variant table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::line::LineKind;
use super::text::normalize;
use crate::error::VocabularyError;

static ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b1(?:º|ª|o|st)\b").expect("valid ordinal pattern"));

/// Book key for labels that apply to every book.
pub const SHARED_BOOK: &str = "*";

/// How a market's outcomes relate to each other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarketKind {
    /// Over/under on a statistic: flip participant, keep line.
    Total,
    /// Two named sides (handicap, moneyline): other participant, negated line.
    Sided,
}

impl MarketKind {
    /// Line rendering rule for markets of this kind.
    pub fn line_kind(&self) -> LineKind {
        match self {
            MarketKind::Total => LineKind::Total,
            MarketKind::Sided => LineKind::Signed,
        }
    }
}

/// Canonical market identifier, e.g. `handicap-first-half`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(pub String);

impl MarketId {
    /// Borrow the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One canonical market as declared in the vocabulary file.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketSpec {
    /// Canonical id.
    pub id: MarketId,
    /// Total or sided.
    pub kind: MarketKind,
    /// Labels recognized for every book.
    #[serde(default)]
    pub shared: Vec<String>,
    /// Labels recognized per book name.
    #[serde(default)]
    pub variants: BTreeMap<String, Vec<String>>,
}

/// Resolved canonical market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDef {
    /// Canonical id.
    pub id: MarketId,
    /// Total or sided.
    pub kind: MarketKind,
}

/// Result of a market lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketLookup<'a> {
    /// Label resolved to a canonical market.
    Mapped(&'a MarketDef),
    /// No variant matched; carries the original label.
    Unmapped(String),
}

/// Compiled variant table: `(book, label slug) → market`.
#[derive(Debug, Clone)]
pub struct MarketTable {
    markets: Vec<MarketDef>,
    index: HashMap<(String, String), usize>,
}

impl MarketTable {
    /// Compile market specs, rejecting duplicate ids and conflicting variants.
    pub fn new(specs: &[MarketSpec]) -> Result<Self, VocabularyError> {
        let mut markets: Vec<MarketDef> = Vec::with_capacity(specs.len());
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        for spec in specs {
            if markets.iter().any(|m| m.id == spec.id) {
                return Err(VocabularyError::DuplicateMarket {
                    id: spec.id.to_string(),
                });
            }
            if spec.shared.is_empty() && spec.variants.values().all(Vec::is_empty) {
                return Err(VocabularyError::EmptyVariants {
                    id: spec.id.to_string(),
                });
            }

            let position = markets.len();
            markets.push(MarketDef {
                id: spec.id.clone(),
                kind: spec.kind,
            });

            let labelled = spec
                .shared
                .iter()
                .map(|label| (SHARED_BOOK.to_string(), label))
                .chain(spec.variants.iter().flat_map(|(book, labels)| {
                    labels.iter().map(move |label| (book_key(book), label))
                }));

            for (book, label) in labelled {
                let slot = (book.clone(), market_slug(label));
                if let Some(&existing) = index.get(&slot) {
                    if existing != position {
                        return Err(VocabularyError::ConflictingVariant {
                            book,
                            label: label.clone(),
                            existing: markets[existing].id.to_string(),
                            incoming: spec.id.to_string(),
                        });
                    }
                    continue;
                }
                index.insert(slot, position);
            }
        }

        Ok(Self { markets, index })
    }

    /// Map a raw market label quoted by `book` to its canonical market.
    ///
    /// Book-specific variants win over shared ones. Unknown labels are never guessed.
    pub fn canonicalize(&self, book: &str, raw_label: &str) -> MarketLookup<'_> {
        let slug = market_slug(raw_label);
        self.index
            .get(&(book_key(book), slug.clone()))
            .or_else(|| self.index.get(&(SHARED_BOOK.to_string(), slug)))
            .map(|&i| MarketLookup::Mapped(&self.markets[i]))
            .unwrap_or_else(|| MarketLookup::Unmapped(raw_label.to_string()))
    }

    /// Look up a market by canonical id.
    pub fn get(&self, id: &MarketId) -> Option<&MarketDef> {
        self.markets.iter().find(|m| &m.id == id)
    }

    /// All canonical markets in declaration order.
    pub fn markets(&self) -> &[MarketDef] {
        &self.markets
    }

    /// Number of compiled label variants.
    pub fn variant_count(&self) -> usize {
        self.index.len()
    }
}

/// Book names are matched case- and accent-insensitively.
pub fn book_key(book: &str) -> String {
    normalize(book)
}

/// Lookup slug of a market label.
///
/// Normalizes, turns the "first" ordinal ("1º", "1o", "1ª") into `primeiro`, and
/// drops spaces, hyphens, parentheses and other punctuation except `+` and `/`
/// (which distinguish "Gols +/-" style labels).
pub fn market_slug(label: &str) -> String {
    let normalized = normalize(label);
    ORDINAL
        .replace_all(&normalized, "primeiro")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '+' || *c == '/')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, kind: MarketKind, book: &str, labels: &[&str]) -> MarketSpec {
        let mut variants = BTreeMap::new();
        variants.insert(book.to_string(), labels.iter().map(|l| l.to_string()).collect());
        MarketSpec {
            id: MarketId(id.to_string()),
            kind,
            shared: vec![],
            variants,
        }
    }

    #[test]
    fn slug_strips_punctuation_and_ordinals() {
        assert_eq!(market_slug("Handicap Asiático - 1º Tempo"), "handicapasiaticoprimeirotempo");
        assert_eq!(market_slug("1o Tempo - Handicap Asiatico"), "primeirotempohandicapasiatico");
        assert_eq!(market_slug("Total (Escanteios) - Partida"), "totalescanteiospartida");
        assert_eq!(market_slug("Gols +/-"), "gols+/");
        assert_eq!(market_slug("Gols +/- - Mais Alternativas"), "gols+/maisalternativas");
    }

    #[test]
    fn ordinal_needs_word_boundary() {
        assert_eq!(market_slug("Over 10 Corners"), "over10corners");
        assert_eq!(market_slug("21o minuto"), "21ominuto");
    }

    #[test]
    fn resolves_book_specific_variants() {
        let table = MarketTable::new(&[
            spec("handicap-first-half", MarketKind::Sided, "bet365", &["1º Tempo - Handicap Asiático"]),
            spec("handicap-first-half-pin", MarketKind::Sided, "pinnacle", &["Handicap - 1º Tempo"]),
        ])
        .unwrap();

        match table.canonicalize("Bet365", "1º tempo - handicap asiatico") {
            MarketLookup::Mapped(def) => {
                assert_eq!(def.id.as_str(), "handicap-first-half");
                assert_eq!(def.kind, MarketKind::Sided);
            }
            other => panic!("expected mapped, got {other:?}"),
        }

        // label of another book does not leak across
        assert_eq!(
            table.canonicalize("bet365", "Handicap - 1º Tempo"),
            MarketLookup::Unmapped("Handicap - 1º Tempo".to_string())
        );
    }

    #[test]
    fn shared_labels_apply_to_any_book() {
        let mut total = spec("total-goals-full-match", MarketKind::Total, "bet365", &["Gols +/-"]);
        total.shared = vec!["Total - Partida".to_string()];
        let table = MarketTable::new(&[total]).unwrap();

        assert!(matches!(table.canonicalize("pinnacle", "Total - Partida"), MarketLookup::Mapped(_)));
        assert!(matches!(table.canonicalize("betano", "total-partida"), MarketLookup::Mapped(_)));
    }

    #[test]
    fn conflicting_variant_is_rejected() {
        let err = MarketTable::new(&[
            spec("a", MarketKind::Total, "bet365", &["Escanteios Asiáticos"]),
            spec("b", MarketKind::Total, "bet365", &["escanteios asiaticos"]),
        ])
        .unwrap_err();

        assert!(matches!(err, VocabularyError::ConflictingVariant { ref existing, ref incoming, .. }
            if existing == "a" && incoming == "b"));
    }

    #[test]
    fn duplicate_and_empty_markets_are_rejected() {
        let dup = MarketTable::new(&[
            spec("a", MarketKind::Total, "bet365", &["x"]),
            spec("a", MarketKind::Total, "pinnacle", &["y"]),
        ]);
        assert_eq!(dup.unwrap_err(), VocabularyError::DuplicateMarket { id: "a".to_string() });

        let empty = MarketTable::new(&[spec("a", MarketKind::Total, "bet365", &[])]);
        assert_eq!(empty.unwrap_err(), VocabularyError::EmptyVariants { id: "a".to_string() });
    }

    #[test]
    fn kind_decides_line_rendering() {
        assert_eq!(MarketKind::Total.line_kind(), LineKind::Total);
        assert_eq!(MarketKind::Sided.line_kind(), LineKind::Signed);
    }
}
