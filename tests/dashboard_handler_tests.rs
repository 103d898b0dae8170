use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use cms_admin::{
    AppConfig, AppState, Backend, MockBackend, SessionKeys, create_router,
    backend::BackendState,
    models::{
        ActiveStatus, BackendStatus, Blog, BlogFormData, Category, Comment, CommentList, Contact,
        DashboardOverview, SettingsOverview,
    },
    session::Claims,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::util::ServiceExt;

const TEST_JWT_SECRET: &str = "dashboard-test-secret";

fn app(backend: Arc<MockBackend>) -> Router {
    let mut config = AppConfig::default();
    config.jwt_secret = TEST_JWT_SECRET.to_string();
    create_router(AppState::new(config, backend as BackendState))
}

fn session_cookie() -> String {
    let token = SessionKeys::from_secret(TEST_JWT_SECRET)
        .issue(&Claims::new("editor", "editor", 3600))
        .unwrap();
    format!("auth-token={token}")
}

async fn send(app: Router, method: &str, uri: &str, json: Option<serde_json::Value>) -> Response {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, session_cookie());
    let body = match json {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(request.body(body).unwrap()).await.unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn blog_form(title: &str, category: &str) -> BlogFormData {
    BlogFormData {
        title: title.to_string(),
        content: format!("<p>{title}</p>"),
        author: "editor".to_string(),
        category: category.to_string(),
        image: None,
    }
}

/// Two categories, three posts, some engagement and two leads.
async fn seeded_backend() -> Arc<MockBackend> {
    let backend = MockBackend::new()
        .with_contact("Ada", "ada@example.com", "Interested in a demo")
        .with_contact("Linus", "linus@example.com", "Partnership");
    backend.create_category("Rust").await.unwrap();
    backend.create_category("Travel").await.unwrap();
    backend
        .create_blog(blog_form("Ownership Explained", "Rust"))
        .await
        .unwrap();
    backend
        .create_blog(blog_form("Async in Practice", "rust"))
        .await
        .unwrap();
    backend
        .create_blog(blog_form("Lisbon Weekend", "TRAVEL"))
        .await
        .unwrap();

    backend.like("ownership-explained").unwrap();
    backend.like("ownership-explained").unwrap();
    backend.like("lisbon-weekend").unwrap();
    backend
        .add_comment("ownership-explained", "ann", "Finally makes sense")
        .unwrap();
    backend
        .add_comment("ownership-explained", "spam-bot", "cheap pills")
        .unwrap();
    Arc::new(backend)
}

#[tokio::test]
async fn test_overview_totals() {
    let response = send(app(seeded_backend().await), "GET", "/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let overview: DashboardOverview = read_json(response).await;
    assert_eq!(overview.username, "editor");
    assert_eq!(overview.total_blogs, 3);
    assert_eq!(overview.total_likes, 3);
    assert_eq!(overview.total_comments, 2);
    assert_eq!(overview.total_leads, 2);
    assert_eq!(overview.recent_blogs.len(), 3);
    assert_eq!(overview.recent_leads.len(), 2);
}

#[tokio::test]
async fn test_overview_caps_recent_items() {
    let backend = MockBackend::new();
    backend.create_category("news").await.unwrap();
    for i in 0..7 {
        backend
            .create_blog(blog_form(&format!("Post {i}"), "news"))
            .await
            .unwrap();
    }

    let response = send(app(Arc::new(backend)), "GET", "/dashboard", None).await;
    let overview: DashboardOverview = read_json(response).await;
    assert_eq!(overview.total_blogs, 7);
    assert_eq!(overview.recent_blogs.len(), 5);
}

#[tokio::test]
async fn test_create_category_is_lowercased() {
    let backend = Arc::new(MockBackend::new());
    let response = send(
        app(backend.clone()),
        "POST",
        "/dashboard/categories",
        Some(serde_json::json!({ "categoryName": "Web Dev" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let category: Category = read_json(response).await;
    assert_eq!(category.category_name, "web dev");
    assert_eq!(category.url_key, "web-dev");
    assert_eq!(backend.get_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_category_surfaces_backend_message() {
    let backend = seeded_backend().await;
    let response = send(
        app(backend),
        "POST",
        "/dashboard/categories",
        Some(serde_json::json!({ "categoryName": "RUST" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body["error"], "Category already exists");
}

#[tokio::test]
async fn test_rename_and_delete_category() {
    let backend = seeded_backend().await;
    let renamed = send(
        app(backend.clone()),
        "PUT",
        "/dashboard/categories/travel",
        Some(serde_json::json!({ "categoryName": "Trips" })),
    )
    .await;
    assert_eq!(renamed.status(), StatusCode::OK);
    let category: Category = read_json(renamed).await;
    assert_eq!(category.url_key, "trips");

    let deleted = send(app(backend.clone()), "DELETE", "/dashboard/categories/trips", None).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = send(app(backend), "DELETE", "/dashboard/categories/trips", None).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blog_lifecycle() {
    let backend = seeded_backend().await;

    let created = send(
        app(backend.clone()),
        "POST",
        "/dashboard/blogs",
        Some(serde_json::json!({
            "title": "Borrow Checker Tips",
            "content": "<h2>Tips</h2>",
            "author": "editor",
            "category": "Rust"
        })),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let blog: Blog = read_json(created).await;
    assert_eq!(blog.slug, "borrow-checker-tips");
    assert_eq!(blog.category.category_name, "rust");

    let updated = send(
        app(backend.clone()),
        "PUT",
        "/dashboard/blogs/borrow-checker-tips",
        Some(serde_json::json!({ "title": "Borrow Checker Tricks" })),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let blog: Blog = read_json(updated).await;
    assert_eq!(blog.title, "Borrow Checker Tricks");
    assert_eq!(blog.content, "<h2>Tips</h2>");

    let fetched = send(app(backend.clone()), "GET", "/dashboard/blogs/borrow-checker-tips", None).await;
    assert_eq!(fetched.status(), StatusCode::OK);

    let deleted = send(app(backend.clone()), "DELETE", "/dashboard/blogs/borrow-checker-tips", None).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = send(app(backend), "GET", "/dashboard/blogs/borrow-checker-tips", None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = read_json(gone).await;
    assert_eq!(body["error"], "Blog not found");
}

#[tokio::test]
async fn test_blogs_by_category_ignores_case() {
    let response = send(
        app(seeded_backend().await),
        "GET",
        "/dashboard/blogs/category/RUST",
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let blogs: Vec<Blog> = read_json(response).await;
    assert_eq!(blogs.len(), 2);
    assert!(blogs.iter().all(|b| b.category.category_name == "rust"));
}

#[tokio::test]
async fn test_comment_moderation() {
    let backend = seeded_backend().await;

    let pending = send(
        app(backend.clone()),
        "GET",
        "/dashboard/comments/ownership-explained?status=pending",
        None,
    )
    .await;
    let list: CommentList = read_json(pending).await;
    assert_eq!(list.total, 2);
    let spam = list
        .comments
        .iter()
        .find(|c| c.user == "spam-bot")
        .unwrap()
        .id
        .clone();

    let rejected = send(
        app(backend.clone()),
        "PATCH",
        &format!("/dashboard/comments/ownership-explained/{spam}/status"),
        Some(serde_json::json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(rejected.status(), StatusCode::OK);
    let comment: Comment = read_json(rejected).await;
    assert_eq!(comment.status.as_str(), "rejected");

    let still_pending = send(
        app(backend),
        "GET",
        "/dashboard/comments/ownership-explained?status=pending",
        None,
    )
    .await;
    let list: CommentList = read_json(still_pending).await;
    assert_eq!(list.total, 1);
    assert_eq!(list.comments[0].user, "ann");
}

#[tokio::test]
async fn test_moderation_cannot_reset_to_pending() {
    let backend = seeded_backend().await;
    let response = send(
        app(backend),
        "PATCH",
        "/dashboard/comments/ownership-explained/whatever/status",
        Some(serde_json::json!({ "status": "pending" })),
    )
    .await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_leads_listing() {
    let response = send(app(seeded_backend().await), "GET", "/dashboard/leads", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let leads: Vec<Contact> = read_json(response).await;
    assert_eq!(leads.len(), 2);
    assert!(leads.iter().any(|c| c.email == "ada@example.com"));
}

#[tokio::test]
async fn test_backend_outage_is_bad_gateway() {
    let backend = Arc::new(MockBackend::new_failing());
    for path in ["/dashboard", "/dashboard/blogs", "/dashboard/leads"] {
        let response = send(app(backend.clone()), "GET", path, None).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY, "{path}");
    }
}

#[tokio::test]
async fn test_settings_counts_active_categories() {
    let backend = seeded_backend().await;
    backend
        .set_category_status("travel", ActiveStatus::Inactive)
        .unwrap();

    let response = send(app(backend), "GET", "/dashboard/settings", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let settings: SettingsOverview = read_json(response).await;
    assert_eq!(settings.username, "editor");
    assert_eq!(settings.backend, BackendStatus::Online);
    assert_eq!(settings.backend_url, "http://localhost:5000");
    assert_eq!(settings.session_ttl_secs, 86400);
    assert_eq!(settings.total_categories, 2);
    assert_eq!(settings.active_categories, 1);
}

#[tokio::test]
async fn test_settings_reports_offline_backend() {
    let response = send(
        app(Arc::new(MockBackend::new_failing())),
        "GET",
        "/dashboard/settings",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let settings: SettingsOverview = read_json(response).await;
    assert_eq!(settings.backend, BackendStatus::Offline);
    assert_eq!(settings.total_categories, 0);
    assert_eq!(settings.active_categories, 0);
}

#[tokio::test]
async fn test_settings_requires_session() {
    let response = app(seeded_backend().await)
        .oneshot(
            Request::builder()
                .uri("/dashboard/settings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
}
