//! Service composition.
//!
//! ```text
//! database.url = memory://   → InMemoryUserRepository
//! database.url = postgres:// → PgUserRepository (+ migrations)
//!
//! redis.enabled = true  → CachedUserService(UserServiceImpl, UserCache(RedisCacheStore))
//! redis.enabled = false → UserServiceImpl
//! ```

use accounts_config::{AppConfig, CacheConfig, DatabaseConfig, ObservabilityConfig, RedisConfig};
use accounts_core::{AccountError, AccountResult, HealthCheck};
use accounts_repository::{DatabasePool, InMemoryUserRepository, PgUserRepository, UserRepository};
use accounts_rest::AppState;
use accounts_security::{PasswordHasher, PasswordHasherInterface};
use accounts_service::{
    metrics::register_metrics, CacheStore, CachedUserService, MetricsSink, NoopMetrics,
    PrometheusMetrics, RedisCacheStore, UserCache, UserService, UserServiceImpl,
};
use deadpool_redis::{Config, Pool, Runtime};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the HTTP layer needs, plus handles to release on shutdown.
pub struct Application {
    pub state: AppState,
    pub database: Option<DatabasePool>,
}

impl Application {
    /// Builds the service stack described by `config`.
    pub async fn build(config: &AppConfig) -> AccountResult<Self> {
        let metrics = metrics_sink(&config.observability)?;
        let mut health_checks: Vec<Arc<dyn HealthCheck>> = Vec::new();

        let (repository, database) = build_repository(&config.database).await?;
        if let Some(pool) = &database {
            health_checks.push(Arc::new(pool.clone()));
        }

        let cache_store = if config.redis.enabled {
            let store = Arc::new(RedisCacheStore::new(Arc::new(create_redis_pool(&config.redis)?)));
            if let Err(e) = store.ping().await {
                warn!("Redis is not reachable yet, serving from the store until it is: {}", e);
            }
            health_checks.push(store.clone());
            Some(store as Arc<dyn CacheStore>)
        } else {
            None
        };

        let password_hasher = Arc::new(PasswordHasher::with_cost(config.security.password_hash_cost));
        let user_service = compose_user_service(
            repository,
            password_hasher,
            cache_store,
            &config.cache,
            metrics,
        );

        Ok(Self {
            state: AppState::new(user_service, health_checks),
            database,
        })
    }

    /// Releases pooled connections.
    pub async fn shutdown(&self) {
        if let Some(pool) = &self.database {
            pool.close().await;
        }
    }
}

/// Wires the business service and, when a cache store is given, the
/// cache-aside decorator in front of it.
pub fn compose_user_service(
    repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasherInterface>,
    cache_store: Option<Arc<dyn CacheStore>>,
    cache_config: &CacheConfig,
    metrics: Arc<dyn MetricsSink>,
) -> Arc<dyn UserService> {
    let service = Arc::new(UserServiceImpl::new(repository, password_hasher, metrics.clone()));

    match cache_store {
        Some(store) => {
            let cache = UserCache::new(store, metrics.clone())
                .with_ttl(cache_config.user_ttl())
                .with_timeout(cache_config.operation_timeout());
            info!(
                "User cache enabled (ttl {}s, timeout {}ms)",
                cache_config.user_ttl_secs, cache_config.operation_timeout_ms
            );
            Arc::new(CachedUserService::new(service, cache, metrics))
        }
        None => {
            info!("User cache disabled");
            service
        }
    }
}

async fn build_repository(
    config: &DatabaseConfig,
) -> AccountResult<(Arc<dyn UserRepository>, Option<DatabasePool>)> {
    if config.is_in_memory() {
        info!("Using in-memory record store");
        return Ok((Arc::new(InMemoryUserRepository::new()), None));
    }

    let pool = DatabasePool::connect(config).await?;
    if config.run_migrations {
        pool.run_migrations().await?;
    }
    Ok((Arc::new(PgUserRepository::new(pool.clone())), Some(pool)))
}

/// Creates the shared Redis pool. Connections are opened lazily.
pub fn create_redis_pool(config: &RedisConfig) -> AccountResult<Pool> {
    info!("Creating Redis connection pool...");

    Config::from_url(&config.url)
        .builder()
        .map_err(|e| AccountError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| AccountError::Cache(format!("Failed to create Redis pool: {}", e)))
}

/// Installs the Prometheus exporter when enabled and returns the sink to record into.
pub fn metrics_sink(config: &ObservabilityConfig) -> AccountResult<Arc<dyn MetricsSink>> {
    if !config.metrics_enabled {
        return Ok(Arc::new(NoopMetrics));
    }

    let addr: SocketAddr = config.metrics_addr.parse().map_err(|e| {
        AccountError::Configuration(format!("Invalid metrics address '{}': {}", config.metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| AccountError::Configuration(format!("Failed to install metrics exporter: {}", e)))?;
    register_metrics();

    info!("Prometheus exporter listening on {}", addr);
    Ok(Arc::new(PrometheusMetrics))
}
