//! Odds input module.
//!
//! This module handles:
//! - The raw per-book odds record consumed by the engine
//! - Conversion of fractional, American and comma-decimal odds

pub mod convert;
pub mod types;

pub use convert::{american_to_decimal, fractional_to_decimal, parse_odd};
pub use types::RawOddsRecord;
