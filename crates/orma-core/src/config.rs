//! Engine configuration.
//!
//! Loaded from TOML. Every key is optional; unknown keys are rejected so a
//! typo never silently falls back to a default.

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::FetchTiming,
};
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

pub const DEFAULT_MAX_FETCH_DEPTH: usize = 5;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_fetch_depth must be at least 1")]
    ZeroFetchDepth,
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Config, err.to_string())
    }
}

///
/// EngineConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Record statistics events through the session's metrics sink.
    pub statistics: bool,
    /// Deepest join-fetch level; to-one associations beyond it become a
    /// separate select using `default_to_one_timing`.
    pub max_fetch_depth: usize,
    /// Timing applied to fetch-graph associations past the join depth.
    pub default_to_one_timing: FetchTiming,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            statistics: false,
            max_fetch_depth: DEFAULT_MAX_FETCH_DEPTH,
            default_to_one_timing: FetchTiming::Immediate,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML config document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_fetch_depth == 0 {
            return Err(ConfigError::ZeroFetchDepth);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty config parses");

        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn parses_all_keys() {
        let config = EngineConfig::from_toml_str(
            r#"
            statistics = true
            max_fetch_depth = 2
            default_to_one_timing = "delayed"
            "#,
        )
        .expect("config parses");

        assert!(config.statistics);
        assert_eq!(config.max_fetch_depth, 2);
        assert_eq!(config.default_to_one_timing, FetchTiming::Delayed);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = EngineConfig::from_toml_str("statistcs = true").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_zero_fetch_depth() {
        let err = EngineConfig::from_toml_str("max_fetch_depth = 0").unwrap_err();

        assert!(matches!(err, ConfigError::ZeroFetchDepth));
        assert_eq!(InternalError::from(err).origin, ErrorOrigin::Config);
    }
}
