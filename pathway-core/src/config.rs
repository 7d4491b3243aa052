//! Runtime configuration recognized by the core and its external collaborators.

use crate::error::PathwayError;
use std::env;

/// Default cap on accepted event payload size: 1 MiB.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1_048_576;

/// Default cap on `session_id` length.
pub const DEFAULT_SESSION_ID_MAX_LENGTH: usize = 128;

/// Options recognized across the core and the (out-of-scope) HTTP/CLI
/// collaborators that embed it. `api_key` is carried here purely as a
/// pass-through field: this crate never reads it itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathwayConfig {
    pub db_path: String,
    pub api_key: Option<String>,
    pub max_payload_size: usize,
    pub session_id_max_length: usize,
}

impl Default for PathwayConfig {
    fn default() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            api_key: None,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            session_id_max_length: DEFAULT_SESSION_ID_MAX_LENGTH,
        }
    }
}

impl PathwayConfig {
    /// Validates field-level invariants. Does not touch the filesystem or
    /// attempt to open `db_path`; that belongs to the store's own `open`.
    pub fn validate(&self) -> Result<(), PathwayError> {
        if self.max_payload_size == 0 {
            return Err(PathwayError::InvalidEnvelope {
                reason: "max_payload_size must be greater than zero".to_string(),
            });
        }
        if self.session_id_max_length == 0 || self.session_id_max_length > crate::ids::MAX_ID_LENGTH
        {
            return Err(PathwayError::InvalidEnvelope {
                reason: format!(
                    "session_id_max_length must be within 1..={}",
                    crate::ids::MAX_ID_LENGTH
                ),
            });
        }
        if self.db_path.is_empty() {
            return Err(PathwayError::InvalidEnvelope {
                reason: "db_path must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Reads `PATHWAY_DB_PATH`, `PATHWAY_API_KEY`, `PATHWAY_MAX_PAYLOAD_SIZE`,
    /// and `PATHWAY_SESSION_ID_MAX_LENGTH`, falling back to defaults for any
    /// variable that's unset or fails to parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var("PATHWAY_DB_PATH").unwrap_or(defaults.db_path),
            api_key: env::var("PATHWAY_API_KEY").ok(),
            max_payload_size: env::var("PATHWAY_MAX_PAYLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_payload_size),
            session_id_max_length: env::var("PATHWAY_SESSION_ID_MAX_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_id_max_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PathwayConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_max_payload_size_is_invalid() {
        let mut config = PathwayConfig::default();
        config.max_payload_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn session_id_max_length_over_envelope_cap_is_invalid() {
        let mut config = PathwayConfig::default();
        config.session_id_max_length = 9000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_db_path_is_invalid() {
        let mut config = PathwayConfig::default();
        config.db_path = String::new();
        assert!(config.validate().is_err());
    }
}
