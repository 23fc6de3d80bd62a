//! Unified error types for the odds engine.

use thiserror::Error;

use crate::engine::ExclusionReason;

/// Unified error type for the odds engine.
#[derive(Error, Debug)]
pub enum EdgeError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Canonical vocabulary could not be loaded or compiled.
    #[error("vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while compiling the market/participant vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    /// The same canonical market id is declared twice.
    #[error("market {id} is declared more than once")]
    DuplicateMarket {
        /// Offending market id.
        id: String,
    },

    /// A market declares no label variants at all.
    #[error("market {id} has no label variants")]
    EmptyVariants {
        /// Offending market id.
        id: String,
    },

    /// One label variant resolves to two different markets for the same book.
    #[error("label {label:?} for book {book} maps to both {existing} and {incoming}")]
    ConflictingVariant {
        /// Book the label belongs to ("*" for shared labels).
        book: String,
        /// Raw label as written in the vocabulary.
        label: String,
        /// Market that claimed the label first.
        existing: String,
        /// Market that tried to claim it again.
        incoming: String,
    },

    /// Over or under phrase list is empty.
    #[error("{side} vocabulary is empty")]
    EmptySideVocabulary {
        /// "over" or "under".
        side: &'static str,
    },
}

/// Per-record canonicalization and matching failures.
///
/// None of these aborts a comparison run; each one is counted under its
/// [`ExclusionReason`] and the record is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    /// A required field is missing or blank.
    #[error("record has no {field}")]
    InvalidInput {
        /// Name of the missing field.
        field: &'static str,
    },

    /// Odd is not a usable decimal price (must be > 1).
    #[error("invalid odd {odd}")]
    InvalidOdd {
        /// The rejected odd, rendered.
        odd: String,
    },

    /// Market label has no canonical mapping for its book.
    #[error("no canonical market for {label:?} ({book})")]
    UnmappedMarket {
        /// Book the label came from.
        book: String,
        /// Original raw label.
        label: String,
    },

    /// Participant of a total market is neither over nor under.
    #[error("cannot classify {label:?} as over/under")]
    NonTwoSidedTotal {
        /// Lower-cased raw participant label.
        label: String,
    },

    /// Sided market does not have exactly two participants.
    #[error("market {market} has {participants} participants, cannot infer opposite")]
    AmbiguousOpposite {
        /// Canonical market id.
        market: String,
        /// Distinct participants observed.
        participants: usize,
    },

    /// Opposite outcome is not quoted by the reference book.
    #[error("reference book has no quote for opposite key {key}")]
    MissingOpposite {
        /// Rendered opposite key.
        key: String,
    },
}

impl CanonicalError {
    /// Diagnostic bucket this failure is counted under.
    pub fn reason(&self) -> ExclusionReason {
        match self {
            CanonicalError::InvalidInput { .. } => ExclusionReason::InvalidInput,
            CanonicalError::InvalidOdd { .. } => ExclusionReason::InvalidOdd,
            CanonicalError::UnmappedMarket { .. } => ExclusionReason::UnmappedMarket,
            CanonicalError::NonTwoSidedTotal { .. } => ExclusionReason::NonTwoSidedTotal,
            CanonicalError::AmbiguousOpposite { .. } => ExclusionReason::AmbiguousOpposite,
            CanonicalError::MissingOpposite { .. } => ExclusionReason::MissingOpposite,
        }
    }
}

/// Native odds strings that cannot be turned into a decimal odd.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OddsFormatError {
    /// Empty string.
    #[error("empty odds value")]
    Empty,

    /// Not a recognizable decimal, fractional or American price.
    #[error("malformed odds value {0:?}")]
    Malformed(String),

    /// Parsed, but the resulting decimal odd is not > 1.
    #[error("odds value {0:?} is out of range")]
    OutOfRange(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, EdgeError>;
