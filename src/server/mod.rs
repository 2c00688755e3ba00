pub mod auth;
pub mod routes;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Full HTTP surface. Unknown paths fall through to the static frontend.
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/api/register", post(routes::register))
        .route("/api/login", post(routes::login))
        .route("/api/stock/{symbol}", get(routes::get_stock))
        .route("/api/stock/{symbol}/summary", get(routes::get_stock_summary))
        .route("/api/invest", post(routes::invest))
        .route("/api/option/price", post(routes::price_option))
        .route("/api/option/payoff", post(routes::payoff))
        .route("/api/counters", get(routes::get_counters))
        .fallback_service(
            ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html"))),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Password hashing and SQLite are blocking; keep them off the async workers.
pub(crate) async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Database(format!("blocking task failed: {e}")))?
}
