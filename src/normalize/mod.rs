//! Normalization module: maps per-book vocabularies into one key space.
//!
//! This module handles:
//! - Text normalization (case, diacritics, hyphens, whitespace)
//! - Line parsing and quarter-point quantization
//! - Market label canonicalization against a configured variant table
//! - Participant canonicalization (over/under, team tokens)

pub mod canonicalizer;
pub mod line;
pub mod market;
pub mod participant;
pub mod text;

pub use canonicalizer::{CanonicalKey, CanonicalQuote, Canonicalizer, Vocabulary, BUNDLED_VOCABULARY};
pub use line::{canonicalize_line, quantize, CanonicalLine, LineKind};
pub use market::{market_slug, MarketDef, MarketId, MarketKind, MarketLookup, MarketSpec, MarketTable};
pub use participant::{CanonicalParticipant, ParticipantRules, SideVocabulary};
pub use text::normalize;
