//! Vocabulary loading and record canonicalization.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::line::{canonicalize_line, CanonicalLine};
use super::market::{MarketId, MarketKind, MarketLookup, MarketSpec, MarketTable};
use super::participant::{CanonicalParticipant, ParticipantRules, SideVocabulary};
use crate::error::{CanonicalError, Result, VocabularyError};
use crate::odds::RawOddsRecord;

/// Vocabulary bundled with the crate (`config/vocabulary.json`).
pub const BUNDLED_VOCABULARY: &str = include_str!("../../config/vocabulary.json");

/// Operator-maintained mapping data.
#[derive(Debug, Clone, Deserialize)]
pub struct Vocabulary {
    /// Canonical markets and their per-book label variants.
    pub markets: Vec<MarketSpec>,
    /// Over/under phrases.
    #[serde(default)]
    pub sides: SideVocabulary,
    /// Curated team aliases: raw name → canonical token.
    #[serde(default)]
    pub team_aliases: HashMap<String, String>,
}

impl Vocabulary {
    /// Parse a vocabulary from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a vocabulary file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The vocabulary shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_VOCABULARY)
    }
}

/// Canonical identity of a betting outcome. Matching is exact equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey {
    /// Canonical market.
    pub market: MarketId,
    /// Canonical side.
    pub participant: CanonicalParticipant,
    /// Canonical line.
    pub line: CanonicalLine,
}

impl CanonicalKey {
    /// Key of the logically opposite outcome.
    ///
    /// Totals flip over/under and keep the line. Sided markets take the other of
    /// exactly two known `teams` and negate the line; any other team count fails closed.
    pub fn opposite(&self, kind: MarketKind, teams: &[String]) -> std::result::Result<Self, CanonicalError> {
        let participant = match kind {
            MarketKind::Total => self.participant.flip_side().ok_or_else(|| {
                CanonicalError::NonTwoSidedTotal {
                    label: self.participant.to_string(),
                }
            })?,
            MarketKind::Sided => {
                let ambiguous = || CanonicalError::AmbiguousOpposite {
                    market: self.market.to_string(),
                    participants: teams.len(),
                };
                let own = self.participant.team().ok_or_else(|| ambiguous())?;
                match teams {
                    [a, b] if a == own => CanonicalParticipant::Team(b.clone()),
                    [a, b] if b == own => CanonicalParticipant::Team(a.clone()),
                    _ => return Err(ambiguous()),
                }
            }
        };

        Ok(Self {
            market: self.market.clone(),
            participant,
            line: self.line.opposite(),
        })
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.market, self.participant, self.line)
    }
}

/// A raw record resolved into the canonical key space.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalQuote {
    /// Canonical key.
    pub key: CanonicalKey,
    /// Market kind decided by the market table.
    pub kind: MarketKind,
    /// Decimal odd.
    pub odd: Decimal,
    /// Source record, kept for reporting.
    pub raw: RawOddsRecord,
}

/// Resolves raw records into canonical quotes.
///
/// Immutable once built; safe to share between concurrent comparison runs.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    markets: MarketTable,
    participants: ParticipantRules,
}

impl Canonicalizer {
    /// Compile a vocabulary, keeping `team_token_limit` leading tokens of team names.
    pub fn new(vocabulary: &Vocabulary, team_token_limit: usize) -> std::result::Result<Self, VocabularyError> {
        Ok(Self {
            markets: MarketTable::new(&vocabulary.markets)?,
            participants: ParticipantRules::new(
                &vocabulary.sides,
                &vocabulary.team_aliases,
                team_token_limit,
            )?,
        })
    }

    /// Compiled market table.
    pub fn markets(&self) -> &MarketTable {
        &self.markets
    }

    /// Compiled participant rules.
    pub fn participants(&self) -> &ParticipantRules {
        &self.participants
    }

    /// Canonicalize one record.
    pub fn canonicalize(&self, record: &RawOddsRecord) -> std::result::Result<CanonicalQuote, CanonicalError> {
        if record.market.trim().is_empty() {
            return Err(CanonicalError::InvalidInput { field: "market" });
        }
        if record.participant.trim().is_empty() {
            return Err(CanonicalError::InvalidInput { field: "participant" });
        }
        if record.odd <= Decimal::ONE {
            return Err(CanonicalError::InvalidOdd {
                odd: record.odd.to_string(),
            });
        }

        let market = match self.markets.canonicalize(&record.book, &record.market) {
            MarketLookup::Mapped(def) => def,
            MarketLookup::Unmapped(label) => {
                return Err(CanonicalError::UnmappedMarket {
                    book: record.book.clone(),
                    label,
                })
            }
        };

        let participant = self.participants.canonicalize(&record.participant, market.kind);
        if participant.team().is_some_and(str::is_empty) {
            return Err(CanonicalError::InvalidInput { field: "participant" });
        }
        let line = canonicalize_line(record.line.as_deref(), market.kind.line_kind());
        if line.is_unparsed() {
            debug!(book = %record.book, line = ?record.line, "Line kept verbatim");
        }

        Ok(CanonicalQuote {
            key: CanonicalKey {
                market: market.id.clone(),
                participant,
                line,
            },
            kind: market.kind,
            odd: record.odd,
            raw: record.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::line::LineKind;
    use rust_decimal_macros::dec;

    fn canonicalizer() -> Canonicalizer {
        Canonicalizer::new(&Vocabulary::bundled().unwrap(), 2).unwrap()
    }

    fn key(market: &str, participant: CanonicalParticipant, line: &str, kind: LineKind) -> CanonicalKey {
        CanonicalKey {
            market: MarketId(market.to_string()),
            participant,
            line: canonicalize_line(Some(line), kind),
        }
    }

    #[test]
    fn bundled_vocabulary_compiles() {
        let canon = canonicalizer();
        assert!(canon.markets().markets().len() >= 10);
        assert!(canon.markets().variant_count() > canon.markets().markets().len());
    }

    #[test]
    fn both_books_land_on_the_same_key() {
        let canon = canonicalizer();
        let pinnacle = RawOddsRecord::new("pinnacle", "Total - Partida", "Acima de", Some("2.5"), dec!(2.0));
        let bet365 = RawOddsRecord::new("bet365", "Gols +/-", "Mais de", Some("2.5"), dec!(2.2));

        let a = canon.canonicalize(&pinnacle).unwrap();
        let b = canon.canonicalize(&bet365).unwrap();

        assert_eq!(a.key, b.key);
        assert_eq!(a.key.to_string(), "total-goals-full-match|over|2.5");
        assert_eq!(a.kind, MarketKind::Total);
    }

    #[test]
    fn rejects_blank_fields_and_bad_odds() {
        let canon = canonicalizer();
        let blank = RawOddsRecord::new("bet365", " ", "Mais de", Some("2.5"), dec!(2.0));
        assert_eq!(
            canon.canonicalize(&blank).unwrap_err(),
            CanonicalError::InvalidInput { field: "market" }
        );

        let flat = RawOddsRecord::new("bet365", "Gols +/-", "Mais de", Some("2.5"), dec!(1.0));
        assert!(matches!(canon.canonicalize(&flat), Err(CanonicalError::InvalidOdd { .. })));
    }

    #[test]
    fn team_label_without_name_is_invalid() {
        let canon = canonicalizer();
        for label in ["(Escanteios)", "-"] {
            let record = RawOddsRecord::new("pinnacle", "Handicap", label, Some("+1.5"), dec!(1.5));
            assert_eq!(
                canon.canonicalize(&record).unwrap_err(),
                CanonicalError::InvalidInput { field: "participant" }
            );
        }
    }

    #[test]
    fn unknown_market_is_unmapped_not_guessed() {
        let canon = canonicalizer();
        let record = RawOddsRecord::new("bet365", "Total de Gols da Equipe", "Mais de", Some("1.5"), dec!(1.9));
        assert_eq!(
            canon.canonicalize(&record).unwrap_err(),
            CanonicalError::UnmappedMarket {
                book: "bet365".to_string(),
                label: "Total de Gols da Equipe".to_string(),
            }
        );
    }

    #[test]
    fn total_opposite_flips_side_and_keeps_line() {
        let over = key("total-corners-full-match", CanonicalParticipant::Over, "9.5", LineKind::Total);
        let under = over.opposite(MarketKind::Total, &[]).unwrap();
        assert_eq!(under.to_string(), "total-corners-full-match|under|9.5");
        assert_eq!(under.opposite(MarketKind::Total, &[]).unwrap(), over);
    }

    #[test]
    fn unclassified_total_has_no_opposite() {
        let odd = key(
            "total-goals-full-match",
            CanonicalParticipant::Unclassified("exatamente".into()),
            "2",
            LineKind::Total,
        );
        assert!(matches!(
            odd.opposite(MarketKind::Total, &[]),
            Err(CanonicalError::NonTwoSidedTotal { .. })
        ));
    }

    #[test]
    fn handicap_opposite_swaps_team_and_negates_line() {
        let teams = vec!["palmeiras".to_string(), "santos".to_string()];
        let home = key(
            "handicap-full-match",
            CanonicalParticipant::Team("palmeiras".into()),
            "-1.25",
            LineKind::Signed,
        );

        let away = home.opposite(MarketKind::Sided, &teams).unwrap();
        assert_eq!(away.to_string(), "handicap-full-match|santos|+1.25");
        assert_eq!(away.opposite(MarketKind::Sided, &teams).unwrap(), home);
    }

    #[test]
    fn sided_opposite_fails_closed_without_two_teams() {
        let teams = vec!["palmeiras".to_string(), "santos".to_string(), "empate".to_string()];
        let home = key(
            "moneyline-full-match",
            CanonicalParticipant::Team("palmeiras".into()),
            "",
            LineKind::Signed,
        );
        assert_eq!(
            home.opposite(MarketKind::Sided, &teams).unwrap_err(),
            CanonicalError::AmbiguousOpposite {
                market: "moneyline-full-match".to_string(),
                participants: 3,
            }
        );

        // team not among the two observed
        let stranger = key(
            "handicap-full-match",
            CanonicalParticipant::Team("corinthians".into()),
            "0",
            LineKind::Signed,
        );
        assert!(stranger.opposite(MarketKind::Sided, &teams[..2]).is_err());
    }
}
