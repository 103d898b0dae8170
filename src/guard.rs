use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    errors::CredentialError,
    session::{self, Claims, SessionKeys},
};

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/login";
/// Root of the protected area; authenticated visitors of auth pages land here.
pub const PROTECTED_HOME: &str = "/dashboard";

/// RouteClass
///
/// Access category of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Anyone may pass; the credential is never inspected.
    Public,
    /// Pages meant for visitors who are not signed in (login, landing).
    AuthOnly,
    /// The dashboard tree; requires a valid session credential.
    Protected,
}

/// RouteTable
///
/// Static classification rules. Auth-only pages match exactly; protected areas
/// match the prefix itself and anything below it on a segment boundary, so
/// `/dashboard` and `/dashboard/blogs` are protected while `/dashboards` is not.
#[derive(Debug, Clone)]
pub struct RouteTable {
    auth_only: &'static [&'static str],
    protected_prefixes: &'static [&'static str],
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            auth_only: &["/", LOGIN_PATH],
            protected_prefixes: &[PROTECTED_HOME],
        }
    }
}

impl RouteTable {
    pub fn new(
        auth_only: &'static [&'static str],
        protected_prefixes: &'static [&'static str],
    ) -> Self {
        Self {
            auth_only,
            protected_prefixes,
        }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        let protected = self.protected_prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        });
        if protected {
            return RouteClass::Protected;
        }
        if self.auth_only.iter().any(|page| *page == path) {
            return RouteClass::AuthOnly;
        }
        RouteClass::Public
    }
}

/// CredentialState
///
/// What the presented credential amounts to for this one request. Recomputed
/// every time; nothing is remembered between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Unauthenticated,
    Authenticated(Claims),
    /// Present but failed verification. Behaves like `Unauthenticated` and
    /// additionally gets its cookie cleared on protected routes.
    Invalid,
}

/// AccessDecision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    RedirectToLogin { clear_credential: bool },
    RedirectToProtectedHome,
}

/// The decision table. Pure: depends on nothing but its arguments.
pub fn decide(class: RouteClass, credential: &CredentialState) -> AccessDecision {
    match (class, credential) {
        (RouteClass::Public, _) => AccessDecision::Allow,
        (RouteClass::Protected, CredentialState::Authenticated(_)) => AccessDecision::Allow,
        (RouteClass::Protected, CredentialState::Unauthenticated) => {
            AccessDecision::RedirectToLogin {
                clear_credential: false,
            }
        }
        (RouteClass::Protected, CredentialState::Invalid) => AccessDecision::RedirectToLogin {
            clear_credential: true,
        },
        (RouteClass::AuthOnly, CredentialState::Authenticated(_)) => {
            AccessDecision::RedirectToProtectedHome
        }
        (RouteClass::AuthOnly, _) => AccessDecision::Allow,
    }
}

/// GuardOutcome
///
/// A decision plus, when the visitor is signed in on a protected route, the
/// verified claims so the request can carry them downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub class: RouteClass,
    pub decision: AccessDecision,
    pub session: Option<Claims>,
}

/// RouteGuard
///
/// Framework-independent access control: path + optional credential in, decision out.
/// Holds only immutable keys and rules, so one instance serves all requests concurrently.
#[derive(Clone)]
pub struct RouteGuard {
    keys: SessionKeys,
    routes: RouteTable,
}

impl RouteGuard {
    pub fn new(keys: SessionKeys) -> Self {
        Self {
            keys,
            routes: RouteTable::default(),
        }
    }

    pub fn with_routes(keys: SessionKeys, routes: RouteTable) -> Self {
        Self { keys, routes }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        self.routes.classify(path)
    }

    /// Verification never escapes as an error: any failure is `Invalid`.
    pub fn credential_state(&self, credential: Option<&str>) -> CredentialState {
        let Some(token) = credential else {
            return CredentialState::Unauthenticated;
        };
        match self.keys.verify(token) {
            Ok(claims) => CredentialState::Authenticated(claims),
            Err(CredentialError::Missing) => CredentialState::Unauthenticated,
            Err(err) => {
                tracing::debug!(error = %err, "session credential failed verification");
                CredentialState::Invalid
            }
        }
    }

    pub fn check(&self, path: &str, credential: Option<&str>) -> GuardOutcome {
        let class = self.classify(path);
        let state = match class {
            RouteClass::Public => CredentialState::Unauthenticated,
            _ => self.credential_state(credential),
        };
        let decision = decide(class, &state);
        let session = match (decision, state) {
            (AccessDecision::Allow, CredentialState::Authenticated(claims)) => Some(claims),
            _ => None,
        };
        GuardOutcome {
            class,
            decision,
            session,
        }
    }
}

/// route_guard
///
/// Axum middleware applying `RouteGuard` to every request. Allowed requests
/// proceed untouched apart from the verified `Claims` inserted into the request
/// extensions; everything else is answered here with a 302 redirect.
pub async fn route_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let options = state.config.cookie_options();
    let credential = session::read_cookie(request.headers(), options.name);
    let outcome = state
        .guard
        .check(request.uri().path(), credential.as_deref());

    match outcome.decision {
        AccessDecision::Allow => {
            if let Some(claims) = outcome.session {
                request.extensions_mut().insert(claims);
            }
            next.run(request).await
        }
        AccessDecision::RedirectToLogin { clear_credential } => {
            tracing::debug!(
                path = %request.uri().path(),
                clear_credential,
                "redirecting to login"
            );
            let mut response = found(LOGIN_PATH);
            if clear_credential {
                response
                    .headers_mut()
                    .append(header::SET_COOKIE, options.cleared_cookie());
            }
            response
        }
        AccessDecision::RedirectToProtectedHome => {
            tracing::debug!(path = %request.uri().path(), "already signed in, redirecting to dashboard");
            found(PROTECTED_HOME)
        }
    }
}

/// 302 to `location`. Guard redirects are always `Found`, whatever the request method.
fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
