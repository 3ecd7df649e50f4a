//! The structured 429 returned when an identity's quota is spent.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::counter::FixedWindow;
use crate::config::RateLimitConfig;

const EXCEEDED: &str = "Rate limit exceeded";

/// Body of a rate limit rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub error: String,
    pub message: String,
    /// Seconds until the current window closes
    pub retry_after: u64,
    /// Configured quota per window
    pub limit: u64,
    /// Configured window length, seconds
    pub window: u64,
}

impl RateLimitInfo {
    /// Rejection for a request at `now_ms` inside `window`.
    pub fn exceeded(config: &RateLimitConfig, window: &FixedWindow, now_ms: i64) -> Self {
        let retry_after = window.retry_after_secs(now_ms);
        Self {
            error: EXCEEDED.to_string(),
            message: format!(
                "Maximum {} countdowns per {} seconds. Try again in {} seconds.",
                config.max_requests, config.window_secs, retry_after
            ),
            retry_after,
            limit: config.max_requests,
            window: config.window_secs,
        }
    }
}

impl IntoResponse for RateLimitInfo {
    fn into_response(self) -> Response {
        let retry_after = HeaderValue::from(self.retry_after);
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after)],
            Json(self),
        )
            .into_response()
    }
}
