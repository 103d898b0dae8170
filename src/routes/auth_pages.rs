use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Auth Pages Router Module
///
/// `/` and `/login` are auth-only: the guard sends visitors holding a valid
/// session to the dashboard before these handlers run.
pub fn auth_page_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Landing; anonymous visitors continue to the login page.
        .route("/", get(handlers::landing))
        // GET /login, POST /login
        // Sign-in form and credential submission.
        .route("/login", get(handlers::login_page).post(handlers::login))
}
