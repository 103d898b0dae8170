use std::env;

use crate::session::{CookieOptions, SESSION_COOKIE};

/// Fallback signing secret for local development. Anything signed with it is forgeable.
pub const INSECURE_DEFAULT_SECRET: &str = "your-super-secret-jwt-key-change-in-production";

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// One day, matching the lifetime of an admin login.
const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// AppConfig
///
/// Holds the gateway's entire configuration state. Immutable once loaded and pulled
/// into handlers and middleware via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the `Secure` cookie flag and log format.
    pub env: Env,
    // Shared HS256 secret used to sign and verify session credentials.
    pub jwt_secret: String,
    // Base URL of the external CMS REST backend.
    pub backend_url: String,
    // Address the HTTP server binds to.
    pub bind_addr: String,
    // Lifetime of a freshly issued session token and its cookie, in seconds.
    pub session_ttl_secs: i64,
}

/// Env
///
/// Defines the runtime context: relaxed defaults locally, mandatory secrets and
/// `Secure` cookies in production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests; never reads the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: INSECURE_DEFAULT_SECRET.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables.
    ///
    /// # Panics
    /// Panics in production when `JWT_SECRET` is unset, so the gateway never starts
    /// signing sessions with the public fallback secret.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("JWT_SECRET not set, falling back to the insecure default secret");
                INSECURE_DEFAULT_SECRET.to_string()
            }),
        };

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|ttl| *ttl > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Self {
            env,
            jwt_secret,
            backend_url: env::var("BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            session_ttl_secs,
        }
    }

    /// Attributes for the session cookie in this environment.
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            name: SESSION_COOKIE,
            secure: self.env == Env::Production,
            max_age_secs: self.session_ttl_secs,
        }
    }
}
