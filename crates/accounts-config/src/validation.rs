//! Configuration validation.
//!
//! Every section is checked and all problems are reported together, so a bad
//! deployment fails at startup with the full list instead of one at a time.

use crate::{AppConfig, CacheConfig, DatabaseConfig, ObservabilityConfig, RedisConfig, ServerConfig};
use thiserror::Error;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    /// Port 0 cannot be bound.
    #[error("Invalid port for {name}: {value} (must be 1-65535)")]
    InvalidPort { name: &'static str, value: u16 },

    /// Pool size configuration is invalid (min must be <= max).
    #[error("Invalid pool size: min ({min}) cannot be greater than max ({max})")]
    InvalidPoolSize { min: u32, max: u32 },

    /// URL format is invalid.
    #[error("Invalid {url_type} URL: {message}")]
    InvalidUrl {
        url_type: &'static str,
        message: String,
    },

    /// Timeout or TTL must be positive.
    #[error("'{name}' must be positive, got 0")]
    NonPositive { name: &'static str },

    /// Password hash cost is out of range.
    #[error("Invalid password hash cost: {value} (must be between {minimum} and {maximum})")]
    InvalidHashCost {
        value: u32,
        minimum: u32,
        maximum: u32,
    },

    /// Log level is invalid.
    #[error("Invalid log level: '{value}' (valid: trace, debug, info, warn, error)")]
    InvalidLogLevel { value: String },

    /// Log format is invalid.
    #[error("Invalid log format: '{value}' (valid: pretty, json)")]
    InvalidLogFormat { value: String },
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    const MIN_HASH_COST: u32 = 1;
    const MAX_HASH_COST: u32 = 10;
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    const VALID_LOG_FORMATS: &'static [&'static str] = &["pretty", "json"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(&config.server, &mut errors);
        Self::validate_database(&config.database, &mut errors);
        Self::validate_redis(&config.redis, &mut errors);
        if config.redis.enabled {
            Self::validate_cache(&config.cache, &mut errors);
        }
        Self::validate_observability(&config.observability, &mut errors);

        let cost = config.security.password_hash_cost;
        if !(Self::MIN_HASH_COST..=Self::MAX_HASH_COST).contains(&cost) {
            errors.push(ConfigValidationError::InvalidHashCost {
                value: cost,
                minimum: Self::MIN_HASH_COST,
                maximum: Self::MAX_HASH_COST,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(config: &ServerConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port",
                value: config.port,
            });
        }
        if config.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "server.request_timeout_secs",
            });
        }
    }

    fn validate_database(config: &DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database",
                message: "URL cannot be empty".to_string(),
            });
            return;
        }
        if config.is_in_memory() {
            return;
        }
        if !config.url.starts_with("postgres://") && !config.url.starts_with("postgresql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database",
                message: "URL must start with postgres://, postgresql:// or memory://".to_string(),
            });
        }
        if config.min_connections > config.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }
        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "database.connect_timeout_secs",
            });
        }
    }

    fn validate_redis(config: &RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.enabled {
            return;
        }
        if !config.url.starts_with("redis://") && !config.url.starts_with("rediss://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis",
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        }
        if config.pool_size == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "redis.pool_size",
            });
        }
    }

    fn validate_cache(config: &CacheConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.user_ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "cache.user_ttl_secs",
            });
        }
        if config.operation_timeout_ms == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "cache.operation_timeout_ms",
            });
        }
    }

    fn validate_observability(config: &ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
        let format = config.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("\n  {}. {}", i + 1, error));
    }
    output
}
