//! Main application router.

use crate::{
    controllers::{health_controller, user_controller},
    middleware::track_requests,
    state::AppState,
};
use accounts_config::ServerConfig;
use axum::{middleware, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Mount point of the user endpoints.
pub const USERS_PATH: &str = "/api/v1/users";

/// Creates the main application router.
pub fn create_router(state: AppState, server_config: &ServerConfig) -> Router {
    let router = Router::new()
        .merge(health_controller::router())
        .nest(USERS_PATH, user_controller::router())
        .route("/", get(root))
        .with_state(state)
        .layer(TimeoutLayer::new(server_config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(track_requests));

    info!("Router created with user endpoints under {}", USERS_PATH);
    router
}

/// Root endpoint handler.
async fn root() -> &'static str {
    concat!("Accounts API v", env!("CARGO_PKG_VERSION"))
}
