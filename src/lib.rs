use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod backend;
pub mod config;
pub mod errors;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod session;

// Routing grouped by access class (public, auth pages, dashboard).
pub mod routes;
use routes::{auth_pages, dashboard, public};

// --- Public Re-exports ---

pub use backend::{Backend, BackendState, HttpBackend, MockBackend};
pub use config::AppConfig;
pub use guard::{AccessDecision, RouteClass, RouteGuard};
pub use session::{Claims, SessionKeys};

/// ApiDoc
///
/// OpenAPI document for every handler and schema, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::landing, handlers::login_page, handlers::login, handlers::logout,
        handlers::get_overview, handlers::get_session, handlers::get_settings,
        handlers::list_blogs, handlers::create_blog, handlers::get_blog,
        handlers::update_blog, handlers::delete_blog, handlers::list_blogs_by_category,
        handlers::list_categories, handlers::create_category, handlers::update_category,
        handlers::delete_category, handlers::list_comments, handlers::moderate_comment,
        handlers::list_leads
    ),
    components(
        schemas(
            models::Blog, models::BlogFormData, models::UpdateBlogRequest, models::Category,
            models::CategoryRequest, models::ActiveStatus, models::Comment, models::CommentList,
            models::CommentStatus, models::ModerationStatus, models::CommentStatusUpdate,
            models::Contact, models::DashboardOverview, models::SessionInfo,
            models::BackendStatus, models::SettingsOverview,
        )
    ),
    tags(
        (name = "cms-admin", description = "Session-gated CMS admin gateway")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request needs, cloned per request: immutable config, the
/// session keys, the route guard built from them, and the injected backend client.
#[derive(Clone)]
pub struct AppState {
    /// Client for the external CMS backend.
    pub backend: BackendState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Signing and verification keys derived from `config.jwt_secret`.
    pub sessions: SessionKeys,
    /// Access policy applied to every request.
    pub guard: RouteGuard,
}

impl AppState {
    /// Derives keys and guard from `config` so they can never disagree about the secret.
    pub fn new(config: AppConfig, backend: BackendState) -> Self {
        let sessions = SessionKeys::from_secret(&config.jwt_secret);
        let guard = RouteGuard::new(sessions.clone());
        Self {
            backend,
            config,
            sessions,
            guard,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, wraps all of them (fallback included) in the route
/// guard, and adds request-id and tracing layers outermost.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(auth_pages::auth_page_routes())
        .merge(dashboard::dashboard_routes())
        .fallback(errors::not_found)
        // Runs for every path, including unknown ones, so `/dashboard/<anything>`
        // still requires a session before it can 404.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span per request carrying method, path and `x-request-id`. The query string
/// is left out so login error codes and filters do not end up in logs verbatim.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}
