//! Server startup utilities.

use accounts_config::{AppConfig, ObservabilityConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `observability.log_level` when set.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=debug", config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("{} v{} ({})", config.app.name, config.app.version, config.app.environment);
    info!("REST API:  http://{}/api/v1/users", config.server.addr());
    info!("Health:    http://{}/health", config.server.addr());
    info!("Ready:     http://{}/ready", config.server.addr());
    if config.observability.metrics_enabled {
        info!("Metrics:   http://{}/metrics", config.observability.metrics_addr);
    }
    info!(
        "Store:     {}",
        if config.database.is_in_memory() { "in-memory" } else { "postgres" }
    );
    info!(
        "Cache:     {}",
        if config.redis.enabled { "redis" } else { "disabled" }
    );
    info!("{}", separator);
}
