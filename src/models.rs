use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::session::Claims;

// --- Backend Schemas (mirrored from the CMS backend's JSON) ---

/// Category
///
/// A blog category. `url_key` is the backend's stable identifier used in paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub category_name: String,
    pub url_key: String,
    pub active_status: ActiveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ActiveStatus {
    Active,
    Inactive,
}

/// Comment
///
/// A reader comment on a blog post. New comments arrive as `Pending` and are
/// moderated from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub text: String,
    #[ts(type = "string")]
    pub date: DateTime<Utc>,
    pub status: CommentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

/// Blog
///
/// A published post. `category` always arrives populated from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// HTML produced by the rich-text editor.
    pub content: String,
    pub author: String,
    pub category: Category,
    #[ts(type = "string")]
    pub post_date: DateTime<Utc>,
    #[ts(type = "number")]
    #[serde(default)]
    pub like_count: u64,
    #[ts(type = "number")]
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Contact
///
/// A lead submitted through the public site's contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub source: String,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request/Response DTOs ---

/// BlogFormData
///
/// Payload for creating a post. `category` is a category name; it is lowercased
/// before it reaches the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BlogFormData {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl BlogFormData {
    /// The backend stores category names lowercase.
    pub fn normalized(mut self) -> Self {
        self.category = normalize_category(&self.category);
        self
    }
}

/// UpdateBlogRequest
///
/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateBlogRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UpdateBlogRequest {
    pub fn normalized(mut self) -> Self {
        self.category = self.category.as_deref().map(normalize_category);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryRequest {
    pub category_name: String,
}

impl CategoryRequest {
    pub fn new(category_name: &str) -> Self {
        Self {
            category_name: normalize_category(category_name),
        }
    }
}

pub fn normalize_category(name: &str) -> String {
    name.trim().to_lowercase()
}

/// CommentList
///
/// Shape of the backend's comment listing for one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentList {
    #[ts(type = "number")]
    pub total: u64,
    pub comments: Vec<Comment>,
}

/// Moderation outcome. Comments can be approved or rejected, never reset to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ModerationStatus {
    Approved,
    Rejected,
}

impl From<ModerationStatus> for CommentStatus {
    fn from(status: ModerationStatus) -> Self {
        match status {
            ModerationStatus::Approved => CommentStatus::Approved,
            ModerationStatus::Rejected => CommentStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentStatusUpdate {
    pub status: ModerationStatus,
}

/// Credentials posted by the login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// DashboardOverview
///
/// Headline numbers and most recent activity for the dashboard landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardOverview {
    pub username: String,
    #[ts(type = "number")]
    pub total_blogs: u64,
    #[ts(type = "number")]
    pub total_likes: u64,
    #[ts(type = "number")]
    pub total_comments: u64,
    #[ts(type = "number")]
    pub total_leads: u64,
    pub recent_blogs: Vec<Blog>,
    pub recent_leads: Vec<Contact>,
}

/// SessionInfo
///
/// The signed-in admin as seen by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionInfo {
    pub username: String,
    pub subject: String,
    #[ts(type = "number")]
    pub expires_at: i64,
}

impl From<Claims> for SessionInfo {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            subject: claims.sub,
            expires_at: claims.exp,
        }
    }
}

/// Whether the CMS backend answered the settings page's status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum BackendStatus {
    Online,
    Offline,
}

/// SettingsOverview
///
/// Account, connection and category summary shown on the settings page.
/// Category counts are zero while the backend is offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SettingsOverview {
    pub username: String,
    pub subject: String,
    pub backend: BackendStatus,
    pub backend_url: String,
    #[ts(type = "number")]
    pub session_ttl_secs: i64,
    #[ts(type = "number")]
    pub total_categories: u64,
    #[ts(type = "number")]
    pub active_categories: u64,
}
