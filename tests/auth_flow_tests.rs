use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use cms_admin::{
    AppConfig, AppState, MockBackend, SessionKeys, create_router, backend::BackendState,
};
use std::sync::Arc;
use tower::util::ServiceExt;

const TEST_JWT_SECRET: &str = "auth-flow-secret-value";

fn app(backend: MockBackend) -> Router {
    let mut config = AppConfig::default();
    config.jwt_secret = TEST_JWT_SECRET.to_string();
    config.session_ttl_secs = 3600;
    create_router(AppState::new(config, Arc::new(backend) as BackendState))
}

fn backend_with_admin() -> MockBackend {
    MockBackend::new().with_admin("admin", "s3cret")
}

async fn post_login(app: Router, body: &'static str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = cookie {
        request = request.header(header::COOKIE, format!("auth-token={token}"));
    }
    app.oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Pulls the token out of `auth-token=<token>; Path=/; ...`.
fn token_from(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("auth-token="))
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_login_success_sets_session_cookie() {
    let response = post_login(app(backend_with_admin()), "username=admin&password=s3cret", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_str(&response, header::LOCATION), Some("/dashboard"));

    let cookie = header_str(&response, header::SET_COOKIE).expect("session cookie");
    assert!(cookie.contains("Max-Age=3600"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));

    let claims = SessionKeys::from_secret(TEST_JWT_SECRET)
        .verify(&token_from(cookie))
        .unwrap();
    assert_eq!(claims.username, "admin");
    assert_eq!(claims.sub, "admin");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_issued_cookie_opens_the_dashboard() {
    let router = app(backend_with_admin());
    let login = post_login(router.clone(), "username=admin&password=s3cret", None).await;
    let token = token_from(header_str(&login, header::SET_COOKIE).unwrap());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/dashboard/session")
                .header(header::COOKIE, format!("theme=dark; auth-token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password_bounces_back() {
    let response = post_login(app(backend_with_admin()), "username=admin&password=nope", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        header_str(&response, header::LOCATION),
        Some("/login?error=CredentialsSignin")
    );
    assert!(header_str(&response, header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_missing_fields_bounces_back() {
    for body in ["username=&password=s3cret", "username=admin", ""] {
        let response = post_login(app(backend_with_admin()), body, None).await;
        assert_eq!(
            header_str(&response, header::LOCATION),
            Some("/login?error=CredentialsSignin"),
            "body {body:?}"
        );
        assert!(header_str(&response, header::SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_login_backend_unreachable_returns_to_form() {
    let router = app(MockBackend::new_failing());
    let response = post_login(router.clone(), "username=admin&password=s3cret", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        header_str(&response, header::LOCATION),
        Some("/login?error=BackendUnavailable")
    );
    assert!(header_str(&response, header::SET_COOKIE).is_none());

    let page = router
        .oneshot(
            Request::builder()
                .uri("/login?error=BackendUnavailable")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(page.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("Sign-in is temporarily unavailable."));
    assert!(html.contains(r#"<form method="post" action="/login">"#));
}

#[tokio::test]
async fn test_login_error_page_shows_notice() {
    let response = app(backend_with_admin())
        .oneshot(
            Request::builder()
                .uri("/login?error=CredentialsSignin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Invalid username or password."));
}

#[tokio::test]
async fn test_login_post_while_signed_in_goes_to_dashboard() {
    let router = app(backend_with_admin());
    let login = post_login(router.clone(), "username=admin&password=s3cret", None).await;
    let token = token_from(header_str(&login, header::SET_COOKIE).unwrap());

    let again = post_login(router, "username=admin&password=s3cret", Some(&token)).await;
    assert_eq!(again.status(), StatusCode::FOUND);
    assert_eq!(header_str(&again, header::LOCATION), Some("/dashboard"));
    assert!(header_str(&again, header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let response = app(backend_with_admin())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_str(&response, header::LOCATION), Some("/login"));
    let cookie = header_str(&response, header::SET_COOKIE).unwrap();
    assert!(cookie.starts_with("auth-token=;"));
    assert!(cookie.contains("Max-Age=0"));
}
