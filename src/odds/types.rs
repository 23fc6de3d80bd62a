//! Raw odds records as delivered by the scraping collaborators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::convert::deserialize_odd;

/// One quoted outcome, in the source book's own vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOddsRecord {
    /// Market label as shown by the book ("Handicap Asiático - 1º Tempo").
    #[serde(default)]
    pub market: String,
    /// Side label (team name, "Mais de", "Acima de 2.5", ...).
    #[serde(default)]
    pub participant: String,
    /// Line as text; absent for moneyline-style markets.
    #[serde(default)]
    pub line: Option<String>,
    /// Decimal odd. JSON input may also carry fractional ("17/20"),
    /// American ("-110") or comma-decimal ("1,85") strings. Missing or
    /// unusable values load as zero and are excluded as invalid odds.
    #[serde(default, deserialize_with = "deserialize_odd")]
    pub odd: Decimal,
    /// Source book identifier ("pinnacle", "bet365").
    #[serde(default)]
    pub book: String,
}

impl RawOddsRecord {
    /// Build a record.
    pub fn new(
        book: impl Into<String>,
        market: impl Into<String>,
        participant: impl Into<String>,
        line: Option<&str>,
        odd: Decimal,
    ) -> Self {
        Self {
            market: market.into(),
            participant: participant.into(),
            line: line.map(str::to_string),
            odd,
            book: book.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn deserializes_native_odd_formats() {
        let json = r#"[
            {"market": "Gols +/-", "participant": "Mais de", "line": "2.5", "odd": 1.95, "book": "bet365"},
            {"market": "Gols +/-", "participant": "Menos de", "line": "2.5", "odd": "17/20", "book": "bet365"},
            {"market": "Total - Partida", "participant": "Acima de", "line": "2.5", "odd": "-110", "book": "pinnacle"},
            {"market": "Total - Partida", "participant": "Menos de", "odd": "1,85", "book": "pinnacle"}
        ]"#;

        let records: Vec<RawOddsRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(records[0].odd, dec!(1.95));
        assert_eq!(records[1].odd, dec!(1.85));
        assert_eq!(records[2].odd.round_dp(4), dec!(1.9091));
        assert_eq!(records[3].odd, dec!(1.85));
        assert_eq!(records[3].line, None);
    }

    #[test]
    fn unusable_odd_spoils_only_its_own_record() {
        let json = r#"[
            {"market": "Gols +/-", "participant": "Mais de", "line": "2.5", "odd": "1,95", "book": "bet365"},
            {"market": "Gols +/-", "participant": "Menos de", "line": "2.5", "odd": "SP", "book": "bet365"},
            {"market": "Gols +/-", "participant": "Menos de", "line": "3.5", "odd": "1.00", "book": "bet365"},
            {"market": "Gols +/-", "participant": "Mais de", "line": "3.5", "odd": null, "book": "bet365"},
            {"market": "Gols +/-", "participant": "Mais de", "line": "4.5", "book": "bet365"}
        ]"#;

        let records: Vec<RawOddsRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].odd, dec!(1.95));
        for record in &records[1..] {
            assert_eq!(record.odd, Decimal::ZERO);
        }
    }

    #[test]
    fn missing_labels_deserialize_as_blank() {
        let record: RawOddsRecord = serde_json::from_str(r#"{"odd": 2.0}"#).unwrap();
        assert!(record.market.is_empty());
        assert!(record.participant.is_empty());
    }
}
