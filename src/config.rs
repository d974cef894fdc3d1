//! Configuration loading, validation and logging setup.
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty file (or no file at all) gives a working node.
//!
//! # Example
//!
//! ```
//! use hyperbet::config::HyperbetConfig;
//!
//! let config = HyperbetConfig::parse_toml(r#"
//!     [betting]
//!     moderator = "referee"
//!     resolve_delay_sec = 600
//!
//!     [logging]
//!     level = "debug"
//! "#).unwrap();
//!
//! assert_eq!(config.betting.moderator, "referee");
//! let rules = config.betting.rules().unwrap();
//! assert_eq!(rules.resolve_delay_sec, 600);
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;
use crate::types::{Asset, Odds};

/// Largest stake whose payout at the widest allowed odds still fits in the
/// ledger's signed 64-bit share type.
pub const DEFAULT_MAX_BET_STAKE: u64 = 9_214_157_878_975_800;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HyperbetConfig {
    pub betting: BettingConfig,
    pub logging: LoggingConfig,
}

impl HyperbetConfig {
    /// Parse and validate a TOML document.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.betting.rules()?;
        self.logging.validate()
    }
}

// ============================================================================
// Betting parameters
// ============================================================================

/// Chain-wide betting parameters as written in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BettingConfig {
    /// The only account allowed to manage games.
    pub moderator: String,
    /// Delay between posting results and paying out matched bets.
    pub resolve_delay_sec: u64,
    /// Auto resolve delay used when a game is created without one.
    pub auto_resolve_delay_default_sec: u64,
    pub auto_resolve_delay_max_sec: u64,
    /// Largest allowed move of a game's start time in one update.
    pub max_start_time_shift_sec: u64,
    /// Minimum stake in base units.
    pub min_bet_stake: u64,
    /// Maximum stake in base units.
    pub max_bet_stake: u64,
    /// Lowest accepted odds as `"n/d"`; the highest is its complement.
    pub min_odds: String,
    /// Run the game startup task every N blocks.
    pub startup_cadence_blocks: u64,
    /// Run the auto resolve (expiry) task every N blocks.
    pub expiry_cadence_blocks: u64,
    /// Run the bet resolution task every N blocks.
    pub resolve_cadence_blocks: u64,
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            moderator: "moderator".into(),
            resolve_delay_sec: 24 * 60 * 60,
            auto_resolve_delay_default_sec: 7 * 24 * 60 * 60,
            auto_resolve_delay_max_sec: 30 * 24 * 60 * 60,
            max_start_time_shift_sec: 7 * 24 * 60 * 60,
            min_bet_stake: 1_000_000,
            max_bet_stake: DEFAULT_MAX_BET_STAKE,
            min_odds: "1001/1000".into(),
            startup_cadence_blocks: 1,
            expiry_cadence_blocks: 1,
            resolve_cadence_blocks: 1,
        }
    }
}

impl BettingConfig {
    /// Validate and convert into the typed rules the engine runs on.
    pub fn rules(&self) -> Result<BettingRules, ConfigError> {
        let invalid = |field, reason: &str| ConfigError::InvalidValue {
            field,
            reason: reason.to_string(),
        };

        if self.moderator.trim().is_empty() {
            return Err(invalid("betting.moderator", "must not be empty"));
        }
        if self.auto_resolve_delay_max_sec == 0 {
            return Err(invalid("betting.auto_resolve_delay_max_sec", "must be positive"));
        }
        if self.auto_resolve_delay_default_sec == 0
            || self.auto_resolve_delay_default_sec > self.auto_resolve_delay_max_sec
        {
            return Err(invalid(
                "betting.auto_resolve_delay_default_sec",
                "must be within [1, auto_resolve_delay_max_sec]",
            ));
        }
        if self.min_bet_stake == 0 {
            return Err(invalid("betting.min_bet_stake", "must be positive"));
        }
        if self.max_bet_stake < self.min_bet_stake {
            return Err(invalid("betting.max_bet_stake", "must not be below min_bet_stake"));
        }
        for (field, cadence) in [
            ("betting.startup_cadence_blocks", self.startup_cadence_blocks),
            ("betting.expiry_cadence_blocks", self.expiry_cadence_blocks),
            ("betting.resolve_cadence_blocks", self.resolve_cadence_blocks),
        ] {
            if cadence == 0 {
                return Err(invalid(field, "must be positive"));
            }
        }

        let min_odds: Odds = self
            .min_odds
            .parse()
            .map_err(|e: crate::error::ValidationError| invalid("betting.min_odds", &e.to_string()))?;
        let max_odds = min_odds.inverted();
        if min_odds.cmp_value(&max_odds).is_gt() {
            return Err(invalid("betting.min_odds", "must be at most 2/1"));
        }

        Ok(BettingRules {
            moderator: self.moderator.clone(),
            resolve_delay_sec: self.resolve_delay_sec,
            auto_resolve_delay_default_sec: self.auto_resolve_delay_default_sec,
            auto_resolve_delay_max_sec: self.auto_resolve_delay_max_sec,
            max_start_time_shift_sec: self.max_start_time_shift_sec,
            min_bet_stake: Asset::native(self.min_bet_stake),
            max_bet_stake: Asset::native(self.max_bet_stake),
            min_odds,
            max_odds,
            startup_cadence_blocks: self.startup_cadence_blocks,
            expiry_cadence_blocks: self.expiry_cadence_blocks,
            resolve_cadence_blocks: self.resolve_cadence_blocks,
        })
    }
}

/// Validated, typed betting parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BettingRules {
    pub moderator: String,
    pub resolve_delay_sec: u64,
    pub auto_resolve_delay_default_sec: u64,
    pub auto_resolve_delay_max_sec: u64,
    pub max_start_time_shift_sec: u64,
    pub min_bet_stake: Asset,
    pub max_bet_stake: Asset,
    pub min_odds: Odds,
    pub max_odds: Odds,
    pub startup_cadence_blocks: u64,
    pub expiry_cadence_blocks: u64,
    pub resolve_cadence_blocks: u64,
}

impl BettingRules {
    #[inline]
    pub fn is_moderator(&self, account: &str) -> bool {
        self.moderator == account
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("unknown format '{}', expected pretty or json", other),
            }),
        }
    }

    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = HyperbetConfig::default();
        assert!(config.validate().is_ok());

        let rules = config.betting.rules().unwrap();
        assert_eq!(rules.min_odds, Odds::new(1001, 1000).unwrap());
        assert_eq!(rules.max_odds, Odds::new(1001, 1).unwrap());
        assert_eq!(rules.min_bet_stake, Asset::native(1_000_000));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = HyperbetConfig::parse_toml("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.betting.resolve_delay_sec, 86_400);
    }

    #[test]
    fn test_partial_override() {
        let config = HyperbetConfig::parse_toml(
            r#"
            [betting]
            min_odds = "11/10"
            min_bet_stake = 5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        let rules = config.betting.rules().unwrap();
        assert_eq!(rules.max_odds, Odds::new(11, 1).unwrap());
        assert_eq!(rules.min_bet_stake, Asset::native(5));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.betting.moderator, "moderator");
    }

    #[test]
    fn test_invalid_values_rejected() {
        for doc in [
            "[betting]\nmoderator = \"\"",
            "[betting]\nmin_odds = \"3/1\"",
            "[betting]\nmin_odds = \"oops\"",
            "[betting]\nmin_bet_stake = 0",
            "[betting]\nresolve_cadence_blocks = 0",
            "[betting]\nauto_resolve_delay_default_sec = 0",
            "[logging]\nformat = \"xml\"",
        ] {
            let err = HyperbetConfig::parse_toml(doc).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { .. }),
                "expected invalid value for {:?}, got {:?}",
                doc,
                err
            );
        }
    }

    #[test]
    fn test_parse_error() {
        let err = HyperbetConfig::parse_toml("[betting\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = HyperbetConfig::load("/nonexistent/hyperbet.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile(_)));
    }
}
