//! Engine configuration
//!
//! Loaded from JSON. Every field has a default so an empty object `{}` is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum server seed entropy in bytes (256 bits)
pub const MIN_SERVER_SEED_BYTES: usize = 32;

/// Errors raised while loading configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Seed lifecycle settings
///
/// # Example
/// ```
/// use fairness_core_rs::FairnessConfig;
///
/// let config = FairnessConfig::from_json_str(r#"{"max_client_seed_len": 32}"#).unwrap();
/// assert_eq!(config.max_client_seed_len, 32);
/// assert_eq!(config.server_seed_bytes, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    /// Random bytes per server seed (rendered as hex)
    pub server_seed_bytes: usize,

    /// Random bytes per auto-generated client seed (rendered as hex)
    pub client_seed_bytes: usize,

    /// Longest client seed a player may supply, in characters
    pub max_client_seed_len: usize,

    /// Compare-and-set attempts before a nonce advance gives up
    pub max_nonce_retries: u32,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            server_seed_bytes: MIN_SERVER_SEED_BYTES,
            client_seed_bytes: 16,
            max_client_seed_len: 64,
            max_nonce_retries: 3,
        }
    }
}

impl FairnessConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FairnessConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_seed_bytes < MIN_SERVER_SEED_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server_seed_bytes must be >= {}",
                MIN_SERVER_SEED_BYTES
            )));
        }

        if self.client_seed_bytes == 0 {
            return Err(ConfigError::Invalid(
                "client_seed_bytes must be > 0".to_string(),
            ));
        }

        if self.max_client_seed_len == 0 {
            return Err(ConfigError::Invalid(
                "max_client_seed_len must be > 0".to_string(),
            ));
        }

        // Auto-generated seeds must pass the same length check as supplied ones
        if self.client_seed_bytes.saturating_mul(2) > self.max_client_seed_len {
            return Err(ConfigError::Invalid(format!(
                "client_seed_bytes {} renders longer than max_client_seed_len {}",
                self.client_seed_bytes, self.max_client_seed_len
            )));
        }

        if self.max_nonce_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_nonce_retries must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(
            FairnessConfig::from_json_str("{}").unwrap(),
            FairnessConfig::default()
        );
    }

    #[test]
    fn test_short_server_seed_rejected() {
        let err = FairnessConfig::from_json_str(r#"{"server_seed_bytes": 16}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let config = FairnessConfig {
            max_nonce_retries: 0,
            ..FairnessConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_seed_must_fit_length_limit() {
        let err = FairnessConfig::from_json_str(
            r#"{"client_seed_bytes": 40, "max_client_seed_len": 64}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            FairnessConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
