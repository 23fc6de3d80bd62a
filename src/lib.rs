//! Cross-book odds normalization and positive-EV opportunity engine.
//!
//! Two bookmakers quote the same football match in their own vocabulary. This
//! library maps both into one canonical key space, then prices every candidate
//! quote against the sharp reference book with its margin removed.
//!
//! # Method
//!
//! For a candidate odd `C` at key `K`, with reference odds `A` at `K` and `B`
//! at the opposite outcome:
//!
//! ```text
//! overround = 1/A + 1/B
//! fair      = (1/A) / overround
//! EV        = C * fair - 1
//! kelly     = EV / (C - 1)
//! stake     = kelly / divisor * bankroll
//! ```
//!
//! With `A = 2.00`, `B = 2.10`, `C = 2.20` the fair probability is 0.5122 and
//! the EV is 12.68%.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`odds`]: Raw records and native odds conversion
//! - [`normalize`]: Text, line, market and participant canonicalization
//! - [`engine`]: Matching, devigging, ranking and odds movement
//! - [`metrics`]: Counters and latency histograms

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod odds;

pub use config::Config;
pub use error::{EdgeError, Result};
