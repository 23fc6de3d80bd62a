//! Participant canonicalization: over/under sides and team tokens.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::market::MarketKind;
use super::text::{normalize, strip_parenthesized, words};
use crate::error::VocabularyError;

/// Canonical side of an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalParticipant {
    /// "More than" side of a total.
    Over,
    /// "Less than" side of a total.
    Under,
    /// Team token of a sided market.
    Team(String),
    /// Total-market phrasing that is neither over nor under (lower-cased raw label).
    Unclassified(String),
}

impl CanonicalParticipant {
    /// Opposite side of a total; `None` for anything but over/under.
    pub fn flip_side(&self) -> Option<CanonicalParticipant> {
        match self {
            CanonicalParticipant::Over => Some(CanonicalParticipant::Under),
            CanonicalParticipant::Under => Some(CanonicalParticipant::Over),
            _ => None,
        }
    }

    /// Team token, if this is a team.
    pub fn team(&self) -> Option<&str> {
        match self {
            CanonicalParticipant::Team(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for CanonicalParticipant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalParticipant::Over => write!(f, "over"),
            CanonicalParticipant::Under => write!(f, "under"),
            CanonicalParticipant::Team(name) => write!(f, "{}", name),
            CanonicalParticipant::Unclassified(label) => write!(f, "{}", label),
        }
    }
}

impl Serialize for CanonicalParticipant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Over/under phrases as written by the books (any case, accents allowed).
#[derive(Debug, Clone, Deserialize)]
pub struct SideVocabulary {
    /// Phrases meaning "more than".
    pub over: Vec<String>,
    /// Phrases meaning "less than".
    pub under: Vec<String>,
}

impl Default for SideVocabulary {
    fn default() -> Self {
        Self {
            over: vec!["over".into(), "acima".into(), "mais".into()],
            under: vec!["under".into(), "menos".into(), "abaixo".into()],
        }
    }
}

/// Compiled participant rules.
#[derive(Debug, Clone)]
pub struct ParticipantRules {
    over: Vec<String>,
    under: Vec<String>,
    aliases: HashMap<String, String>,
    token_limit: usize,
}

impl ParticipantRules {
    /// Compile side phrases and team aliases.
    ///
    /// `token_limit` is the number of leading name tokens kept for teams.
    pub fn new(
        sides: &SideVocabulary,
        aliases: &HashMap<String, String>,
        token_limit: usize,
    ) -> Result<Self, VocabularyError> {
        let over = compile_phrases(&sides.over);
        let under = compile_phrases(&sides.under);
        if over.is_empty() {
            return Err(VocabularyError::EmptySideVocabulary { side: "over" });
        }
        if under.is_empty() {
            return Err(VocabularyError::EmptySideVocabulary { side: "under" });
        }

        let aliases = aliases
            .iter()
            .map(|(raw, canonical)| (team_name(raw), normalize(canonical)))
            .collect();

        Ok(Self {
            over,
            under,
            aliases,
            token_limit: token_limit.max(1),
        })
    }

    /// Number of leading tokens kept for team names.
    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    /// Canonicalize a raw participant label for a market of the given kind.
    pub fn canonicalize(&self, raw: &str, kind: MarketKind) -> CanonicalParticipant {
        match kind {
            MarketKind::Total => self.classify_side(raw),
            MarketKind::Sided => CanonicalParticipant::Team(self.team_token(raw)),
        }
    }

    fn classify_side(&self, raw: &str) -> CanonicalParticipant {
        let padded = format!(" {} ", words(&normalize(raw)).collect::<Vec<_>>().join(" "));
        let is_over = self.over.iter().any(|p| padded.contains(p.as_str()));
        let is_under = self.under.iter().any(|p| padded.contains(p.as_str()));
        match (is_over, is_under) {
            (true, false) => CanonicalParticipant::Over,
            (false, true) => CanonicalParticipant::Under,
            _ => CanonicalParticipant::Unclassified(raw.trim().to_lowercase()),
        }
    }

    /// Team token: alias when curated, otherwise the first `token_limit` words of
    /// the normalized name without parenthesized qualifiers.
    ///
    /// Distinct teams sharing their leading words collapse to the same token
    /// ("Real Madrid" / "Real Madrid Castilla" at limit 2); add an alias to split them.
    pub fn team_token(&self, raw: &str) -> String {
        let name = team_name(raw);
        if let Some(alias) = self.aliases.get(&name) {
            return alias.clone();
        }
        words(&name).take(self.token_limit).collect::<Vec<_>>().join(" ")
    }
}

fn team_name(raw: &str) -> String {
    let cleaned = strip_parenthesized(&normalize(raw));
    words(&cleaned).collect::<Vec<_>>().join(" ")
}

fn compile_phrases(phrases: &[String]) -> Vec<String> {
    phrases
        .iter()
        .map(|p| words(&normalize(p)).collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .map(|p| format!(" {p} "))
        .collect()
}
