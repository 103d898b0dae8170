use cms_admin::{
    AppState,
    backend::{BackendState, HttpBackend},
    config::AppConfig,
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs logging, wires the backend client and serves
/// the admin gateway.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cms_admin=debug,tower_http=info".into());

    // Logging has to exist before `AppConfig::load` so its fallback warnings are visible;
    // the format is chosen from APP_ENV directly for that reason.
    let production = std::env::var("APP_ENV").as_deref() == Ok("production");
    if production {
        // PROD: JSON lines for log aggregation.
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // LOCAL: human-readable output.
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    let config = AppConfig::load();
    tracing::info!("Admin gateway starting in {:?} mode", config.env);

    // 2. Backend client, constructed once and injected through AppState.
    let backend = HttpBackend::new(&config.backend_url)
        .expect("FATAL: BACKEND_URL is not a valid base URL.");
    tracing::info!(backend_url = %config.backend_url, "CMS backend configured");
    let backend = Arc::new(backend) as BackendState;

    // 3. Router and server startup
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, backend));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind listen address. Check BIND_ADDR.");
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
