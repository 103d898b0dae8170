use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, put},
};

/// Dashboard Router Module
///
/// The admin's workspace. Every handler here can rely on the `AdminSession`
/// extractor because the guard only lets requests with verified claims through.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // Totals and recent activity.
        .route("/dashboard", get(handlers::get_overview))
        // GET /dashboard/session
        .route("/dashboard/session", get(handlers::get_session))
        // GET /dashboard/settings
        // Backend reachability and category counts.
        .route("/dashboard/settings", get(handlers::get_settings))
        // --- Blogs ---
        .route(
            "/dashboard/blogs",
            get(handlers::list_blogs).post(handlers::create_blog),
        )
        .route(
            "/dashboard/blogs/{slug}",
            get(handlers::get_blog)
                .put(handlers::update_blog)
                .delete(handlers::delete_blog),
        )
        .route(
            "/dashboard/blogs/category/{name}",
            get(handlers::list_blogs_by_category),
        )
        // --- Categories ---
        .route(
            "/dashboard/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/dashboard/categories/{url_key}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        // --- Comment moderation ---
        .route("/dashboard/comments/{slug}", get(handlers::list_comments))
        .route(
            "/dashboard/comments/{slug}/{comment_id}/status",
            patch(handlers::moderate_comment),
        )
        // --- Leads ---
        .route("/dashboard/leads", get(handlers::list_leads))
}
