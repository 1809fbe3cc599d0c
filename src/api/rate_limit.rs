//! Per-caller rate limiting middleware
//!
//! Applied to the QR generation routes. The caller identity comes from the
//! bearer token; requests without a parseable token pass straight through
//! so the handler's own authentication rejection stays authoritative.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{error::AppError, models::Claims, services::rate_limit::RateLimitDecision, AppState};

/// Key namespace for the QR generation routes
const NAMESPACE: &str = "qr-generate";

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Rate limit middleware for QR generation
pub async fn qr_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let claims = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .and_then(|token| Claims::from_token(token, &state.config.auth.jwt_secret).ok());

    // unauthenticated requests get the handler's 401, not a limiter verdict
    let Some(claims) = claims else {
        return next.run(request).await;
    };

    let decision = state
        .services
        .rate_limit
        .check(NAMESPACE, &claims.user_id.to_string())
        .await;

    if !decision.allowed {
        let retry_after_secs = (decision.reset_at - Utc::now()).num_seconds().max(0);
        let mut response = AppError::RateLimited { retry_after_secs }.into_response();
        decorate(response.headers_mut(), &decision);
        return response;
    }

    let mut response = next.run(request).await;
    decorate(response.headers_mut(), &decision);
    response
}

fn decorate(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    if let Ok(value) = decision.limit.to_string().parse() {
        headers.insert(LIMIT_HEADER, value);
    }
    if let Ok(value) = decision.remaining.to_string().parse() {
        headers.insert(REMAINING_HEADER, value);
    }
    if let Ok(value) = decision.reset_at.timestamp().to_string().parse() {
        headers.insert(RESET_HEADER, value);
    }
}
