use crate::{
    AppState,
    auth::AdminSession,
    errors::BackendError,
    guard::{LOGIN_PATH, PROTECTED_HOME},
    models::{
        ActiveStatus, BackendStatus, Blog, BlogFormData, Category, CategoryRequest, Comment,
        CommentList, CommentStatus, CommentStatusUpdate, Contact, DashboardOverview, LoginRequest,
        SessionInfo, SettingsOverview, UpdateBlogRequest,
    },
    session::Claims,
};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

/// Where a failed sign-in lands; the login page shows an error for this code.
const LOGIN_FAILED: &str = "/login?error=CredentialsSignin";
/// Where a sign-in lands when the backend could not be asked at all.
const LOGIN_UNAVAILABLE: &str = "/login?error=BackendUnavailable";
/// How many items the dashboard overview lists as recent activity.
const RECENT_LIMIT: usize = 5;

// --- Filter Structs ---

/// LoginPageQuery
///
/// Query string of `GET /login`. `error` selects a fixed notice; its value is
/// never echoed into the page.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LoginPageQuery {
    pub error: Option<String>,
}

/// CommentFilter
///
/// Optional moderation-state filter for a post's comment list.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CommentFilter {
    pub status: Option<CommentStatus>,
}

// --- Auth Pages ---

/// landing
///
/// [Auth-only Route] The site root. Anonymous visitors are sent to the login
/// page; signed-in visitors never get here because the guard redirects them to
/// the dashboard first.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 303, description = "Redirect to /login"))
)]
pub async fn landing() -> Redirect {
    Redirect::to(LOGIN_PATH)
}

/// login_page
///
/// [Auth-only Route] Renders the sign-in form.
#[utoipa::path(
    get,
    path = "/login",
    params(LoginPageQuery),
    responses((status = 200, description = "Login form", content_type = "text/html"))
)]
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let notice = match query.error.as_deref() {
        None => "",
        Some("BackendUnavailable") => {
            r#"<p class="error" role="alert">Sign-in is temporarily unavailable. Please try again.</p>"#
        }
        Some(_) => r#"<p class="error" role="alert">Invalid username or password.</p>"#,
    };
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin sign in</title></head>
<body>
<main>
<h1>Admin sign in</h1>
{notice}
<form method="post" action="{LOGIN_PATH}">
<label>Username <input name="username" type="text" autocomplete="username" required></label>
<label>Password <input name="password" type="password" autocomplete="current-password" required></label>
<button type="submit">Sign in</button>
</form>
</main>
</body>
</html>"#
    ))
}

/// login
///
/// [Auth-only Route] Verifies the submitted credentials against the backend and,
/// on success, issues a signed session cookie and sends the admin to the dashboard.
/// Rejected or empty credentials bounce back to the login page, and so does an
/// unreachable backend, with its own error code.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content_type = "application/x-www-form-urlencoded", description = "username and password"),
    responses(
        (status = 303, description = "Signed in (to /dashboard), rejected (to /login?error=CredentialsSignin) or backend unreachable (to /login?error=BackendUnavailable)")
    )
)]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginRequest>) -> Response {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Redirect::to(LOGIN_FAILED).into_response();
    }

    match state.backend.login(username, &form.password).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!(%username, "admin sign-in rejected by backend");
            return Redirect::to(LOGIN_FAILED).into_response();
        }
        Err(e) => {
            tracing::warn!(%username, error = %e, "admin sign-in failed, backend unavailable");
            return Redirect::to(LOGIN_UNAVAILABLE).into_response();
        }
    }

    let claims = Claims::new(username, username, state.config.session_ttl_secs);
    let token = match state.sessions.issue(&claims) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to sign session token");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(%username, "admin signed in");
    let mut response = Redirect::to(PROTECTED_HOME).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        state.config.cookie_options().session_cookie(&token),
    );
    response
}

/// logout
///
/// [Public Route] Clears the session cookie. Safe to call without a session.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Cookie cleared, redirect to /login"))
)]
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut response = Redirect::to(LOGIN_PATH).into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        state.config.cookie_options().cleared_cookie(),
    );
    response
}

// --- Dashboard ---

/// get_overview
///
/// [Protected Route] Headline counts plus the most recent posts and leads.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Dashboard overview", body = DashboardOverview))
)]
pub async fn get_overview(
    admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Json<DashboardOverview>, BackendError> {
    let (mut blogs, mut leads) =
        tokio::try_join!(state.backend.get_blogs(), state.backend.get_contacts())?;

    let total_likes = blogs.iter().map(|b| b.like_count).sum();
    let total_comments = blogs.iter().map(|b| b.comment_count).sum();
    let total_blogs = blogs.len() as u64;
    let total_leads = leads.len() as u64;

    blogs.sort_by(|a, b| b.post_date.cmp(&a.post_date));
    blogs.truncate(RECENT_LIMIT);
    leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    leads.truncate(RECENT_LIMIT);

    Ok(Json(DashboardOverview {
        username: admin.username,
        total_blogs,
        total_likes,
        total_comments,
        total_leads,
        recent_blogs: blogs,
        recent_leads: leads,
    }))
}

/// get_session
///
/// [Protected Route] The signed-in admin and when the session expires.
#[utoipa::path(
    get,
    path = "/dashboard/session",
    responses((status = 200, description = "Current session", body = SessionInfo))
)]
pub async fn get_session(admin: AdminSession) -> Json<SessionInfo> {
    Json(SessionInfo::from(admin.claims))
}

/// get_settings
///
/// [Protected Route] Account details, backend reachability and category counts.
/// Checks the backend with a category listing; a failed check is reported as
/// `offline` in a 200 response rather than surfacing as 502.
#[utoipa::path(
    get,
    path = "/dashboard/settings",
    responses((status = 200, description = "Settings overview", body = SettingsOverview))
)]
pub async fn get_settings(
    admin: AdminSession,
    State(state): State<AppState>,
) -> Json<SettingsOverview> {
    let (backend, categories) = match state.backend.get_categories().await {
        Ok(categories) => (BackendStatus::Online, categories),
        Err(e) => {
            tracing::warn!(error = %e, "backend status check failed");
            (BackendStatus::Offline, Vec::new())
        }
    };
    let active_categories = categories
        .iter()
        .filter(|c| c.active_status == ActiveStatus::Active)
        .count() as u64;

    Json(SettingsOverview {
        username: admin.username,
        subject: admin.subject,
        backend,
        backend_url: state.config.backend_url.clone(),
        session_ttl_secs: state.config.session_ttl_secs,
        total_categories: categories.len() as u64,
        active_categories,
    })
}

/// list_blogs
///
/// [Protected Route] All posts, as the backend returns them.
#[utoipa::path(
    get,
    path = "/dashboard/blogs",
    responses((status = 200, description = "Blogs", body = [Blog]))
)]
pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<Blog>>, BackendError> {
    Ok(Json(state.backend.get_blogs().await?))
}

/// create_blog
///
/// [Protected Route] Publishes a new post. The category name is lowercased.
#[utoipa::path(
    post,
    path = "/dashboard/blogs",
    request_body = BlogFormData,
    responses((status = 201, description = "Created", body = Blog))
)]
pub async fn create_blog(
    admin: AdminSession,
    State(state): State<AppState>,
    Json(payload): Json<BlogFormData>,
) -> Result<(StatusCode, Json<Blog>), BackendError> {
    let blog = state.backend.create_blog(payload).await?;
    tracing::info!(admin = %admin.username, slug = %blog.slug, "blog created");
    Ok((StatusCode::CREATED, Json(blog)))
}

/// get_blog
///
/// [Protected Route] One post by slug.
#[utoipa::path(
    get,
    path = "/dashboard/blogs/{slug}",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 200, description = "Found", body = Blog),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Blog>, BackendError> {
    Ok(Json(state.backend.get_blog(&slug).await?))
}

/// update_blog
///
/// [Protected Route] Partial update of a post.
#[utoipa::path(
    put,
    path = "/dashboard/blogs/{slug}",
    params(("slug" = String, Path, description = "Blog slug")),
    request_body = UpdateBlogRequest,
    responses((status = 200, description = "Updated", body = Blog))
)]
pub async fn update_blog(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateBlogRequest>,
) -> Result<Json<Blog>, BackendError> {
    let blog = state.backend.update_blog(&slug, payload).await?;
    tracing::info!(admin = %admin.username, %slug, "blog updated");
    Ok(Json(blog))
}

/// delete_blog
///
/// [Protected Route] Removes a post.
#[utoipa::path(
    delete,
    path = "/dashboard/blogs/{slug}",
    params(("slug" = String, Path, description = "Blog slug")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_blog(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, BackendError> {
    state.backend.delete_blog(&slug).await?;
    tracing::info!(admin = %admin.username, %slug, "blog deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// list_blogs_by_category
///
/// [Protected Route] Posts filed under one category name (case-insensitive).
#[utoipa::path(
    get,
    path = "/dashboard/blogs/category/{name}",
    params(("name" = String, Path, description = "Category name")),
    responses((status = 200, description = "Blogs in category", body = [Blog]))
)]
pub async fn list_blogs_by_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Blog>>, BackendError> {
    Ok(Json(state.backend.get_blogs_by_category(&name).await?))
}

/// list_categories
#[utoipa::path(
    get,
    path = "/dashboard/categories",
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, BackendError> {
    Ok(Json(state.backend.get_categories().await?))
}

/// create_category
///
/// [Protected Route] Adds a category. Names are stored lowercase.
#[utoipa::path(
    post,
    path = "/dashboard/categories",
    request_body = CategoryRequest,
    responses((status = 201, description = "Created", body = Category))
)]
pub async fn create_category(
    admin: AdminSession,
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), BackendError> {
    let category = state.backend.create_category(&payload.category_name).await?;
    tracing::info!(admin = %admin.username, url_key = %category.url_key, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// update_category
///
/// [Protected Route] Renames the category identified by `url_key`.
#[utoipa::path(
    put,
    path = "/dashboard/categories/{url_key}",
    params(("url_key" = String, Path, description = "Category URL key")),
    request_body = CategoryRequest,
    responses((status = 200, description = "Updated", body = Category))
)]
pub async fn update_category(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(url_key): Path<String>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<Category>, BackendError> {
    let category = state
        .backend
        .update_category(&url_key, &payload.category_name)
        .await?;
    tracing::info!(admin = %admin.username, %url_key, "category updated");
    Ok(Json(category))
}

/// delete_category
#[utoipa::path(
    delete,
    path = "/dashboard/categories/{url_key}",
    params(("url_key" = String, Path, description = "Category URL key")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_category(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(url_key): Path<String>,
) -> Result<StatusCode, BackendError> {
    state.backend.delete_category(&url_key).await?;
    tracing::info!(admin = %admin.username, %url_key, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// list_comments
///
/// [Protected Route] Comments on one post, optionally filtered by moderation state.
#[utoipa::path(
    get,
    path = "/dashboard/comments/{slug}",
    params(("slug" = String, Path, description = "Blog slug"), CommentFilter),
    responses((status = 200, description = "Comments", body = CommentList))
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(filter): Query<CommentFilter>,
) -> Result<Json<CommentList>, BackendError> {
    Ok(Json(state.backend.get_comments(&slug, filter.status).await?))
}

/// moderate_comment
///
/// [Protected Route] Approves or rejects a comment.
#[utoipa::path(
    patch,
    path = "/dashboard/comments/{slug}/{comment_id}/status",
    params(
        ("slug" = String, Path, description = "Blog slug"),
        ("comment_id" = String, Path, description = "Comment ID")
    ),
    request_body = CommentStatusUpdate,
    responses((status = 200, description = "Moderated", body = Comment))
)]
pub async fn moderate_comment(
    admin: AdminSession,
    State(state): State<AppState>,
    Path((slug, comment_id)): Path<(String, String)>,
    Json(payload): Json<CommentStatusUpdate>,
) -> Result<Json<Comment>, BackendError> {
    let comment = state
        .backend
        .update_comment_status(&slug, &comment_id, payload.status)
        .await?;
    tracing::info!(
        admin = %admin.username,
        %slug,
        %comment_id,
        status = comment.status.as_str(),
        "comment moderated"
    );
    Ok(Json(comment))
}

/// list_leads
///
/// [Protected Route] Contact-form submissions.
#[utoipa::path(
    get,
    path = "/dashboard/leads",
    responses((status = 200, description = "Leads", body = [Contact]))
)]
pub async fn list_leads(State(state): State<AppState>) -> Result<Json<Vec<Contact>>, BackendError> {
    Ok(Json(state.backend.get_contacts().await?))
}
