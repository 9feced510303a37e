//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use accounts_core::AccountError;
use config::{Config, ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the active environment file.
pub const ENVIRONMENT_VAR: &str = "ACCOUNTS_ENVIRONMENT";

/// Loads [`AppConfig`] from layered sources.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    environment: String,
}

impl ConfigLoader {
    /// Creates a loader reading from `config_dir`.
    ///
    /// Sources are applied in order, later ones overriding earlier ones:
    /// 1. `default.toml`
    /// 2. `{environment}.toml` (environment from `ACCOUNTS_ENVIRONMENT`, default `development`)
    /// 3. `local.toml` (not committed to version control)
    /// 4. Environment variables such as `ACCOUNTS__DATABASE__URL`
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());
        Self {
            config_dir: config_dir.into(),
            environment,
        }
    }

    /// Creates a loader for the default location (`./config`).
    #[must_use]
    pub fn from_default_location() -> Self {
        Self::new("./config")
    }

    /// Overrides the environment name.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Loads and validates the configuration.
    pub fn load(&self) -> Result<AppConfig, AccountError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        info!("Loading configuration for environment: {}", self.environment);

        let mut builder = Config::builder();
        for name in ["default", self.environment.as_str(), "local"] {
            let path = self.config_dir.join(format!("{name}.toml"));
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("ACCOUNTS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_account_error)?;
        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_account_error)?;

        ConfigValidator::validate(&app_config)
            .map_err(|errors| AccountError::Configuration(format_validation_errors(&errors)))?;

        Ok(app_config)
    }
}

fn config_error_to_account_error(err: ConfigError) -> AccountError {
    AccountError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_directory_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new(dir.path().join("absent"))
            .with_environment("test")
            .load()
            .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.user_ttl_secs, 1800);
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 8081\n\n[cache]\nuser_ttl_secs = 60\n",
        )
        .unwrap();
        fs::write(dir.path().join("staging.toml"), "[server]\nport = 9999\n").unwrap();

        let config = ConfigLoader::new(dir.path())
            .with_environment("staging")
            .load()
            .unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.cache.user_ttl_secs, 60);
        assert_eq!(config.cache.operation_timeout_ms, 250);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[observability]\nlog_format = \"xml\"\n",
        )
        .unwrap();

        let err = ConfigLoader::new(dir.path())
            .with_environment("test")
            .load()
            .unwrap_err();
        assert!(matches!(err, AccountError::Configuration(msg) if msg.contains("xml")));
    }
}
