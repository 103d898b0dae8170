use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable with or without a session. The guard never inspects the
/// credential for these paths.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /logout
        // Clears the session cookie and returns to the login page.
        .route("/logout", post(handlers::logout))
}
