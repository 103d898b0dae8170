//! Session credentials: claims, token issuance and verification, and the cookie that carries them.

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::errors::CredentialError;

/// Name of the cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "auth-token";

/// Claims
///
/// Payload of the session token. Signed with the shared secret at login and
/// checked by the route guard on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Claims {
    /// Subject: the identifier the backend authenticated.
    pub sub: String,
    pub username: String,
    /// Issued at, seconds since the Unix epoch.
    #[ts(type = "number")]
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch. Tokens are rejected once this has passed.
    #[ts(type = "number")]
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: &str, username: &str, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            username: username.to_string(),
            iat: now,
            exp: now + ttl_secs,
        }
    }
}

/// SessionKeys
///
/// Encoding and decoding halves of the shared secret plus the validation rules.
/// Built once from config and cloned into the application state.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    pub fn from_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Signs `claims` into a compact HS256 token.
    pub fn issue(&self, claims: &Claims) -> Result<String, CredentialError> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }

    /// Checks signature and expiry. Every failure mode comes back as `CredentialError`;
    /// nothing here panics on hostile input.
    pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        if token.is_empty() {
            return Err(CredentialError::Missing);
        }
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

/// CookieOptions
///
/// Attributes of the session cookie. `secure` is only set in production so the
/// cookie still works over plain HTTP on a developer machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub name: &'static str,
    pub secure: bool,
    pub max_age_secs: i64,
}

impl CookieOptions {
    fn render(&self, value: &str, max_age_secs: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name, value, max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value attaching a freshly issued token. Tokens from `issue`
    /// are base64url segments joined by dots, so they always form a valid header.
    pub fn session_cookie(&self, token: &str) -> HeaderValue {
        header_value(self.render(token, self.max_age_secs))
    }

    /// `Set-Cookie` value that empties the cookie and expires it immediately.
    pub fn cleared_cookie(&self) -> HeaderValue {
        header_value(self.render("", 0))
    }
}

fn header_value(raw: String) -> HeaderValue {
    HeaderValue::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "session cookie is not a valid header value, sending it empty");
        HeaderValue::from_static("")
    })
}

/// Returns the first non-empty value of cookie `name` across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.trim_matches('"').to_string())
}
