use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use skybook_store::redis_repo::rate_limit_key;
use std::net::SocketAddr;
use tracing::warn;

use crate::state::AppState;

/// Per-IP fixed-window limit. Only installed when Redis is configured; a
/// Redis failure lets the request through.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    let Some(redis) = state.redis.as_ref() else {
        return next.run(req).await;
    };

    let key = rate_limit_key(&addr.ip().to_string());
    let limits = &state.rate_limit;

    match redis
        .check_rate_limit(&key, limits.requests_per_window, limits.window_seconds)
        .await
    {
        Ok(true) => next.run(req).await,
        Ok(false) => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded").into_response(),
        Err(e) => {
            warn!("Rate limiter unavailable, allowing request: {}", e);
            next.run(req).await
        }
    }
}
