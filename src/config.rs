//! Application configuration loaded from environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::engine::{EngineSettings, RankBy};
use crate::error::Result;
use crate::normalize::{Canonicalizer, Vocabulary};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Stake Sizing ===
    /// Bankroll the Kelly fraction is applied to.
    #[serde(default = "default_bankroll")]
    pub bankroll: Decimal,

    /// Full Kelly is divided by this (4 = quarter Kelly).
    #[serde(default = "default_kelly_divisor")]
    pub kelly_divisor: Decimal,

    // === Opportunity Filter ===
    /// Opportunities need EV strictly above this (0.03 = 3%).
    #[serde(default)]
    pub min_ev: Decimal,

    /// Ranking of the opportunity list: ev or edge.
    #[serde(default)]
    pub rank_by: RankBy,

    // === Canonicalization ===
    /// Leading name tokens kept when matching team names.
    #[serde(default = "default_team_token_limit")]
    pub team_token_limit: usize,

    /// Vocabulary JSON file; the bundled vocabulary is used when unset.
    #[serde(default)]
    pub vocabulary_path: Option<String>,

    // === Odds Movement ===
    /// Minimum drop, in percent, reported between two snapshots.
    #[serde(default = "default_drop_threshold")]
    pub drop_threshold_pct: Decimal,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bankroll: default_bankroll(),
            kelly_divisor: default_kelly_divisor(),
            min_ev: Decimal::ZERO,
            rank_by: RankBy::default(),
            team_token_limit: default_team_token_limit(),
            vocabulary_path: None,
            drop_threshold_pct: default_drop_threshold(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

fn default_bankroll() -> Decimal {
    Decimal::new(100, 0) // 100 units
}

fn default_kelly_divisor() -> Decimal {
    Decimal::new(4, 0) // quarter Kelly
}

fn default_team_token_limit() -> usize {
    2
}

fn default_drop_threshold() -> Decimal {
    Decimal::new(3, 0) // 3%
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> std::result::Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.bankroll <= Decimal::ZERO {
            return Err("BANKROLL must be positive".to_string());
        }

        if self.kelly_divisor < Decimal::ONE {
            return Err("KELLY_DIVISOR must be at least 1".to_string());
        }

        if self.min_ev <= -Decimal::ONE {
            return Err("MIN_EV must be greater than -1".to_string());
        }

        if self.team_token_limit == 0 {
            return Err("TEAM_TOKEN_LIMIT must be at least 1".to_string());
        }

        if self.drop_threshold_pct <= Decimal::ZERO {
            return Err("DROP_THRESHOLD_PCT must be positive".to_string());
        }

        Ok(())
    }

    /// Engine parameters for one comparison run.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            bankroll: self.bankroll,
            kelly_divisor: self.kelly_divisor,
            min_ev: self.min_ev,
            rank_by: self.rank_by,
        }
    }

    /// Load the configured vocabulary (file or bundled).
    pub fn vocabulary(&self) -> Result<Vocabulary> {
        match &self.vocabulary_path {
            Some(path) => Vocabulary::from_path(path),
            None => Vocabulary::bundled(),
        }
    }

    /// Build the canonicalizer from the configured vocabulary.
    pub fn canonicalizer(&self) -> Result<Canonicalizer> {
        Ok(Canonicalizer::new(&self.vocabulary()?, self.team_token_limit)?)
    }
}
