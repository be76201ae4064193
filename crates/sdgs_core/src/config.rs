//! Controller configuration.
//!
//! # Responsibility
//! - Hold the tunables of the reconciliation driver (page size, year
//!   bounds, post-mutation acknowledgement delay, region policy).
//! - Load them from a JSON document with per-field defaults.
//!
//! # Invariants
//! - `page_size > 0`.
//! - `min_year <= max_year`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 15;
pub const DEFAULT_MIN_YEAR: i32 = 2000;
pub const DEFAULT_MAX_YEAR: i32 = 2100;
pub const DEFAULT_ACK_DELAY_MS: u64 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Rows per table page.
    pub page_size: usize,
    /// Lowest year accepted by create.
    pub min_year: i32,
    /// Highest year accepted by create.
    pub max_year: i32,
    /// Wait between a store acknowledgement and the cache reload.
    pub ack_delay_ms: u64,
    /// Only regions already present in the cache may be created.
    pub restrict_regions: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            min_year: DEFAULT_MIN_YEAR,
            max_year: DEFAULT_MAX_YEAR,
            ack_delay_ms: DEFAULT_ACK_DELAY_MS,
            restrict_regions: true,
        }
    }
}

impl ControllerConfig {
    /// Parses and validates a JSON config document. Missing keys default.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.min_year > self.max_year {
            return Err(ConfigError::InvertedYearBounds {
                min_year: self.min_year,
                max_year: self.max_year,
            });
        }
        Ok(())
    }

    pub fn ack_delay(&self) -> Duration {
        Duration::from_millis(self.ack_delay_ms)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    ZeroPageSize,
    InvertedYearBounds { min_year: i32, max_year: i32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid controller config: {err}"),
            Self::ZeroPageSize => write!(f, "page_size must be greater than zero"),
            Self::InvertedYearBounds { min_year, max_year } => {
                write!(f, "min_year {min_year} must not exceed max_year {max_year}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ControllerConfig, DEFAULT_MAX_YEAR, DEFAULT_PAGE_SIZE};

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = ControllerConfig::from_json_str(r#"{ "ack_delay_ms": 0 }"#)
            .expect("partial config should parse");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.max_year, DEFAULT_MAX_YEAR);
        assert!(config.ack_delay().is_zero());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = ControllerConfig::from_json_str(r#"{ "page_size": 0 }"#)
            .expect_err("zero page size must fail");
        assert!(matches!(err, ConfigError::ZeroPageSize));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ControllerConfig::from_json_str(r#"{ "pagesize": 10 }"#)
            .expect_err("typo must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
