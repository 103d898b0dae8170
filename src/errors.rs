use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// CredentialError
///
/// Why a presented session credential could not be turned into an admin identity.
/// These never leave the route guard: every variant collapses into a redirect.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No cookie, or a cookie with an empty value.
    #[error("no session credential presented")]
    Missing,
    /// Bad signature, elapsed expiry, malformed token, unsupported algorithm.
    #[error("session credential rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// BackendError
///
/// Failures talking to the external CMS backend. Handlers return these directly;
/// the `IntoResponse` impl below decides what the browser sees.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    /// The request never produced an HTTP response (DNS, refused connection, timeout).
    #[error("backend unreachable: {0}")]
    Network(String),
    /// The backend answered 404.
    #[error("{0}")]
    NotFound(String),
    /// Any other non-2xx answer. `message` is the backend's `error` field or `HTTP <code>`.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// A 2xx answer whose body did not match the expected shape.
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl BackendError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BackendError::NotFound(_) => StatusCode::NOT_FOUND,
            BackendError::Status { status, .. } => match StatusCode::from_u16(*status) {
                // Client errors are the admin's problem and pass through as-is.
                Ok(code) if code.is_client_error() => code,
                _ => StatusCode::BAD_GATEWAY,
            },
            BackendError::Network(_) | BackendError::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "backend call failed");
        } else {
            tracing::debug!(error = %self, "backend rejected request");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Uniform JSON body for unmatched paths.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "not found".to_string(),
        }),
    )
        .into_response()
}
