//! Engine configuration with file, environment, and compiled-default layers.

pub mod cleanup_config;
pub mod defaults;
pub mod observability_config;
pub mod session_config;

pub use cleanup_config::CleanupConfig;
pub use observability_config::ObservabilityConfig;
pub use session_config::SessionConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Environment override for `session.pos_seed_neighbors`.
pub const ENV_POS_SEED_NEIGHBORS: &str = "IQR_POS_SEED_NEIGHBORS";
/// Environment override for `observability.log_level`.
pub const ENV_LOG_LEVEL: &str = "IQR_LOG_LEVEL";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`IQR_*`)
/// 2. TOML config file
/// 3. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IqrConfig {
    pub session: SessionConfig,
    pub cleanup: CleanupConfig,
    pub observability: ObservabilityConfig,
}

impl IqrConfig {
    /// Load configuration from a TOML file, apply environment overrides,
    /// and validate the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let mut config: IqrConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (no environment layer).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: IqrConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `IQR_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(ENV_POS_SEED_NEIGHBORS) {
            self.session.pos_seed_neighbors =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::ValidationFailed {
                        field: ENV_POS_SEED_NEIGHBORS.to_string(),
                        message: format!("not a positive integer: {raw}"),
                    })?;
        }
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            self.observability.log_level = level;
        }
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.pos_seed_neighbors == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "session.pos_seed_neighbors".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        validate_cleanup_secs(
            "cleanup.inactivity_timeout_secs",
            self.cleanup.inactivity_timeout_secs,
        )?;
        validate_cleanup_secs("cleanup.max_age_secs", self.cleanup.max_age_secs)?;
        Ok(())
    }
}

fn validate_cleanup_secs(field: &str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 || secs > defaults::MAX_CLEANUP_SECS {
        return Err(ConfigError::ValidationFailed {
            field: field.to_string(),
            message: format!(
                "must be between 1 and {} seconds, got {secs}",
                defaults::MAX_CLEANUP_SECS
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = IqrConfig::from_toml("").unwrap();
        assert_eq!(config, IqrConfig::default());
        assert_eq!(
            config.session.pos_seed_neighbors,
            defaults::DEFAULT_POS_SEED_NEIGHBORS
        );
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = IqrConfig::from_toml(
            r#"
            [session]
            pos_seed_neighbors = 25

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.session.pos_seed_neighbors, 25);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.cleanup, CleanupConfig::default());
    }

    #[test]
    fn zero_fanout_rejected() {
        let err = IqrConfig::from_toml("[session]\npos_seed_neighbors = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "session.pos_seed_neighbors"));
    }

    #[test]
    fn cleanup_thresholds_bounded() {
        for (toml_str, field) in [
            ("[cleanup]\nmax_age_secs = 0\n", "cleanup.max_age_secs"),
            ("[cleanup]\ninactivity_timeout_secs = 0\n", "cleanup.inactivity_timeout_secs"),
            ("[cleanup]\nmax_age_secs = 100000000000000000\n", "cleanup.max_age_secs"),
        ] {
            let err = IqrConfig::from_toml(toml_str).unwrap_err();
            assert!(
                matches!(err, ConfigError::ValidationFailed { field: ref f, .. } if f == field),
                "{toml_str}: {err:?}"
            );
        }

        let mut config = IqrConfig::default();
        config.cleanup.max_age_secs = defaults::MAX_CLEANUP_SECS;
        assert!(config.validate().is_ok());
        config.cleanup.max_age_secs = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = IqrConfig::from_toml("[session\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_file_reported() {
        let err = IqrConfig::load(Path::new("/nonexistent/iqr.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
