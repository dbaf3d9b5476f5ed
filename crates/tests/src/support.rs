//! Shared helpers for integration tests.

use axum::{
    extract::connect_info::MockConnectInfo,
    routing::{get, post},
    Router,
};
use counter_core::counter::JokeCounter;
use server::router;
use std::net::SocketAddr;
use std::sync::Arc;

/// Assembles the HTTP routes around `counter`, with a mocked peer address so
/// connect-info extraction works under `oneshot`.
#[must_use]
pub fn test_app(counter: Arc<JokeCounter>) -> Router {
    Router::new()
        .route("/joke", post(router::handle_joke))
        .route("/reset", post(router::handle_reset))
        .route("/health", get(router::handle_health))
        .route("/metrics", get(router::handle_metrics))
        .with_state(counter)
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
}

/// Drives `pairs` rounds of two-witness agreement, raising the agreed count
/// by `pairs`.
///
/// # Panics
///
/// Panics if a vote is rejected, which only happens when `counter` was built
/// with a witness bound below two.
pub async fn agree_pairs(counter: &JokeCounter, pairs: u64) {
    for _ in 0..pairs {
        counter.vote("10.0.0.1").await.unwrap();
        counter.vote("10.0.0.2").await.unwrap();
    }
}
