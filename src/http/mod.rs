//! HTTP surface: routing, shared state, and the server.

mod error;
mod server;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::countdown::routes::{create_countdown, delete_countdown, get_countdown, list_countdowns};
use crate::countdown::CountdownRepository;
use crate::ratelimit::{rate_limit_gate, RateLimiter};

pub use error::{ApiError, ApiResult};
pub use server::HttpServer;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub countdowns: CountdownRepository,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(countdowns: CountdownRepository, limiter: Arc<RateLimiter>) -> Self {
        Self { countdowns, limiter }
    }
}

/// Build the application router.
///
/// Only countdown creation passes through the rate limit gate; reads and
/// deletes are never limited.
pub fn router(state: AppState) -> Router {
    let gated_create = post(create_countdown)
        .route_layer(from_fn_with_state(state.limiter.clone(), rate_limit_gate));

    Router::new()
        .route("/", get(|| async { "Countdown API" }))
        .route("/api/countdowns", gated_create.get(list_countdowns))
        .route(
            "/api/countdowns/{id}",
            get(get_countdown).delete(delete_countdown),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
