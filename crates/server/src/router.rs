use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use counter_core::{counter::JokeCounter, metrics};
use std::net::SocketAddr;
use std::sync::Arc;

/// Resolves the witness identity for a request.
///
/// Behind the reverse proxy every connection arrives from the same peer, so
/// the first hop in `X-Forwarded-For` is the identity that matters. Without
/// the header (direct access, local testing) the peer address stands in. The
/// header is trusted as-is; the proxy is expected to strip client-supplied
/// values.
#[must_use]
pub fn witness_id(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| peer.ip().to_string(), std::string::ToString::to_string)
}

/// Handles a joke vote from one witness.
///
/// Replies with the agreed count, the caller's own tally, and the current
/// epoch rates. A witness the bounded table cannot admit gets `403` and a
/// fixed message body.
pub async fn handle_joke(
    axum::extract::State(counter): axum::extract::State<Arc<JokeCounter>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let witness = witness_id(&headers, peer);

    match counter.vote(&witness).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "joke_count": outcome.agreed_count,
                "ip_joke_count": outcome.witness_count,
                "rate_hour": outcome.rate.per_hour,
                "rate_day": outcome.rate.per_day,
            })),
        ),
        Err(e) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "message": e.to_string() })),
        ),
    }
}

/// Handles a reset request from one witness.
///
/// Always `200`: a single reset only zeroes the caller's tally and the
/// response does not reveal whether a reset quorum formed.
pub async fn handle_reset(
    axum::extract::State(counter): axum::extract::State<Arc<JokeCounter>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let witness = witness_id(&headers, peer);
    let outcome = counter.reset(&witness).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": format!("Reset count for IP {witness}"),
            "rate_hour": outcome.rate.per_hour,
            "rate_day": outcome.rate.per_day,
        })),
    )
}

pub async fn handle_health(
    axum::extract::State(counter): axum::extract::State<Arc<JokeCounter>>,
) -> impl IntoResponse {
    let status = counter.status().await;

    let health_status = serde_json::json!({
        "status": "healthy",
        "counter": {
            "joke_count": status.agreed_count,
            "witnesses": status.witnesses,
            "epoch_start": status.epoch_start.to_rfc3339(),
            "rate_hour": status.rate.per_hour
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (
        StatusCode::OK,
        [("content-type", "application/json")],
        serde_json::to_string(&health_status).unwrap_or_default(),
    )
}

#[allow(clippy::unused_async)]
pub async fn handle_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics::render(),
    )
}
