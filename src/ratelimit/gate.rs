//! HTTP middleware placing the limiter in front of a write handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::info;

use super::identity::extract_identity;
use super::limiter::{Decision, RateLimiter};

/// Admit or short-circuit a request before the wrapped handler runs.
///
/// On rejection the handler is never invoked and the 429 body from
/// [`RateLimitInfo`](super::RateLimitInfo) is returned. The peer address is
/// read from connection info when the server provides it.
pub async fn rate_limit_gate(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let identity = extract_identity(request.headers(), peer, limiter.config());

    match limiter.admit(&identity, limiter.now()).await {
        Decision::Admit => next.run(request).await,
        Decision::Reject(rejection) => {
            info!(
                identity = %identity,
                retry_after = rejection.retry_after,
                "Rejected countdown creation over rate limit"
            );
            rejection.into_response()
        }
    }
}
