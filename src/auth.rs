use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};

use crate::session::Claims;

/// AdminSession Extractor Result
///
/// The signed-in administrator behind a dashboard request. Handlers take this
/// as an argument to learn who is acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub username: String,
    /// Subject claim of the session token.
    pub subject: String,
    pub claims: Claims,
}

/// AdminSession Extractor Implementation
///
/// The route guard verifies the cookie once and stores the resulting `Claims`
/// in the request extensions; this extractor only reads them back. A handler
/// mounted outside the guard therefore never sees a session and is rejected
/// with 401 instead of silently running unauthenticated.
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AdminSession {
            username: claims.username.clone(),
            subject: claims.sub.clone(),
            claims,
        })
    }
}
