use async_trait::async_trait;
use chrono::Utc;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    errors::BackendError,
    models::{
        ActiveStatus, Blog, BlogFormData, Category, CategoryRequest, Comment, CommentList,
        CommentStatus, Contact, ModerationStatus, UpdateBlogRequest, normalize_category,
    },
};

// 1. Backend Contract
/// Backend
///
/// Everything the admin gateway needs from the external CMS REST backend.
/// Handlers only see this trait, so tests swap in `MockBackend` without a network.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Checks admin credentials. `Ok(false)` means the backend rejected them;
    /// `Err` means it could not answer.
    async fn login(&self, username: &str, password: &str) -> Result<bool, BackendError>;

    // --- Categories ---
    async fn get_categories(&self) -> Result<Vec<Category>, BackendError>;
    async fn create_category(&self, name: &str) -> Result<Category, BackendError>;
    async fn update_category(&self, url_key: &str, name: &str) -> Result<Category, BackendError>;
    async fn delete_category(&self, url_key: &str) -> Result<(), BackendError>;

    // --- Blogs ---
    async fn get_blogs(&self) -> Result<Vec<Blog>, BackendError>;
    async fn get_blog(&self, slug: &str) -> Result<Blog, BackendError>;
    async fn get_blogs_by_category(&self, category: &str) -> Result<Vec<Blog>, BackendError>;
    async fn create_blog(&self, blog: BlogFormData) -> Result<Blog, BackendError>;
    async fn update_blog(&self, slug: &str, blog: UpdateBlogRequest) -> Result<Blog, BackendError>;
    async fn delete_blog(&self, slug: &str) -> Result<(), BackendError>;

    // --- Comment moderation ---
    async fn get_comments(
        &self,
        slug: &str,
        status: Option<CommentStatus>,
    ) -> Result<CommentList, BackendError>;
    async fn update_comment_status(
        &self,
        slug: &str,
        comment_id: &str,
        status: ModerationStatus,
    ) -> Result<Comment, BackendError>;

    // --- Leads ---
    async fn get_contacts(&self) -> Result<Vec<Contact>, BackendError>;
}

/// BackendState
///
/// The shared, injected backend handle carried in `AppState`.
pub type BackendState = Arc<dyn Backend>;

// 2. The Real Implementation (HTTP)
/// HttpBackend
///
/// reqwest-based client for the CMS backend. Every endpoint lives under `<base>/api/`.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::Network(format!("invalid backend URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Network(format!(
                "backend URL {base_url} cannot carry a path"
            )));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// Builds `<base>/api/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// Sends the request and returns the raw body of a 2xx answer.
    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        tracing::debug!(status = status.as_u16(), %message, "backend returned an error");

        if status == StatusCode::NOT_FOUND {
            Err(BackendError::NotFound(message))
        } else {
            Err(BackendError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let body = self.execute(request).await?;
        serde_json::from_slice(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> Result<bool, BackendError> {
        let request = self
            .client
            .post(self.endpoint(&["auth", "login"]))
            .json(&serde_json::json!({ "username": username, "password": password }));

        match self.execute(request).await {
            Ok(_) => Ok(true),
            Err(BackendError::Status {
                status: 400 | 401 | 403,
                ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_categories(&self) -> Result<Vec<Category>, BackendError> {
        self.send(self.client.get(self.endpoint(&["categories"])))
            .await
    }

    async fn create_category(&self, name: &str) -> Result<Category, BackendError> {
        let request = self
            .client
            .post(self.endpoint(&["categories"]))
            .json(&CategoryRequest::new(name));
        self.send(request).await
    }

    async fn update_category(&self, url_key: &str, name: &str) -> Result<Category, BackendError> {
        let request = self
            .client
            .put(self.endpoint(&["categories", url_key]))
            .json(&CategoryRequest::new(name));
        self.send(request).await
    }

    async fn delete_category(&self, url_key: &str) -> Result<(), BackendError> {
        self.execute(self.client.delete(self.endpoint(&["categories", url_key])))
            .await
            .map(|_| ())
    }

    async fn get_blogs(&self) -> Result<Vec<Blog>, BackendError> {
        self.send(self.client.get(self.endpoint(&["blogs"]))).await
    }

    async fn get_blog(&self, slug: &str) -> Result<Blog, BackendError> {
        self.send(self.client.get(self.endpoint(&["blogs", slug])))
            .await
    }

    async fn get_blogs_by_category(&self, category: &str) -> Result<Vec<Blog>, BackendError> {
        let category = normalize_category(category);
        self.send(
            self.client
                .get(self.endpoint(&["blogs", "category", &category])),
        )
        .await
    }

    async fn create_blog(&self, blog: BlogFormData) -> Result<Blog, BackendError> {
        let request = self
            .client
            .post(self.endpoint(&["blogs"]))
            .json(&blog.normalized());
        self.send(request).await
    }

    async fn update_blog(&self, slug: &str, blog: UpdateBlogRequest) -> Result<Blog, BackendError> {
        let request = self
            .client
            .put(self.endpoint(&["blogs", slug]))
            .json(&blog.normalized());
        self.send(request).await
    }

    async fn delete_blog(&self, slug: &str) -> Result<(), BackendError> {
        self.execute(self.client.delete(self.endpoint(&["blogs", slug])))
            .await
            .map(|_| ())
    }

    async fn get_comments(
        &self,
        slug: &str,
        status: Option<CommentStatus>,
    ) -> Result<CommentList, BackendError> {
        let mut request = self.client.get(self.endpoint(&["blogs", slug, "comments"]));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        self.send(request).await
    }

    async fn update_comment_status(
        &self,
        slug: &str,
        comment_id: &str,
        status: ModerationStatus,
    ) -> Result<Comment, BackendError> {
        let request = self
            .client
            .patch(self.endpoint(&["blogs", slug, "comments", comment_id, "status"]))
            .json(&serde_json::json!({ "status": status }));
        self.send(request).await
    }

    async fn get_contacts(&self) -> Result<Vec<Contact>, BackendError> {
        self.send(self.client.get(self.endpoint(&["contact"]))).await
    }
}

// 3. The Mock Implementation (For Tests)
/// MockBackend
///
/// In-memory stand-in for the CMS backend. Mirrors the backend's observable rules
/// (lowercase category names, slugs derived from titles, 404 for unknown keys)
/// so handler tests exercise realistic data without a network.
pub struct MockBackend {
    data: Mutex<MockData>,
    /// When true, every call fails as if the backend were unreachable.
    pub should_fail: bool,
}

#[derive(Default)]
struct MockData {
    admins: Vec<(String, String)>,
    categories: Vec<Category>,
    blogs: Vec<Blog>,
    contacts: Vec<Contact>,
    next_id: u64,
}

impl MockData {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }

    fn blog_mut(&mut self, slug: &str) -> Result<&mut Blog, BackendError> {
        self.blogs
            .iter_mut()
            .find(|b| b.slug == slug)
            .ok_or_else(|| BackendError::NotFound("Blog not found".to_string()))
    }

    fn category_named(&self, name: &str) -> Result<Category, BackendError> {
        let name = normalize_category(name);
        self.categories
            .iter()
            .find(|c| c.category_name == name)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 400,
                message: format!("Category '{name}' does not exist"),
            })
    }
}

/// Lowercase, alphanumerics kept, every other run of characters collapsed to one `-`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(MockData::default()),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    /// Registers an admin account accepted by `login`.
    pub fn with_admin(self, username: &str, password: &str) -> Self {
        self.lock()
            .admins
            .push((username.to_string(), password.to_string()));
        self
    }

    /// Seeds a contact-form lead.
    pub fn with_contact(self, name: &str, email: &str, message: &str) -> Self {
        {
            let mut data = self.lock();
            let id = data.next_id();
            data.contacts.push(Contact {
                id,
                name: name.to_string(),
                email: email.to_string(),
                mobile: "0000000000".to_string(),
                source: "website".to_string(),
                message: message.to_string(),
                created_at: Utc::now(),
            });
        }
        self
    }

    /// Simulates a reader posting a comment; it starts out pending.
    pub fn add_comment(&self, slug: &str, user: &str, text: &str) -> Result<Comment, BackendError> {
        let mut data = self.lock();
        let id = data.next_id();
        let blog = data.blog_mut(slug)?;
        let comment = Comment {
            id,
            user: user.to_string(),
            text: text.to_string(),
            date: Utc::now(),
            status: CommentStatus::Pending,
        };
        blog.comments.push(comment.clone());
        blog.comment_count += 1;
        Ok(comment)
    }

    /// Simulates a reader liking a post.
    pub fn like(&self, slug: &str) -> Result<u64, BackendError> {
        let mut data = self.lock();
        let blog = data.blog_mut(slug)?;
        blog.like_count += 1;
        Ok(blog.like_count)
    }

    /// Simulates a category being switched on or off in the backend.
    pub fn set_category_status(
        &self,
        url_key: &str,
        status: ActiveStatus,
    ) -> Result<(), BackendError> {
        let mut data = self.lock();
        let category = data
            .categories
            .iter_mut()
            .find(|c| c.url_key == url_key)
            .ok_or_else(|| BackendError::NotFound("Category not found".to_string()))?;
        category.active_status = status;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.should_fail {
            return Err(BackendError::Network(
                "Mock Backend Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn login(&self, username: &str, password: &str) -> Result<bool, BackendError> {
        self.check_available()?;
        Ok(self
            .lock()
            .admins
            .iter()
            .any(|(u, p)| u == username && p == password))
    }

    async fn get_categories(&self) -> Result<Vec<Category>, BackendError> {
        self.check_available()?;
        Ok(self.lock().categories.clone())
    }

    async fn create_category(&self, name: &str) -> Result<Category, BackendError> {
        self.check_available()?;
        let request = CategoryRequest::new(name);
        let mut data = self.lock();
        if data
            .categories
            .iter()
            .any(|c| c.category_name == request.category_name)
        {
            return Err(BackendError::Status {
                status: 400,
                message: "Category already exists".to_string(),
            });
        }
        let now = Utc::now();
        let category = Category {
            id: data.next_id(),
            url_key: slugify(&request.category_name),
            category_name: request.category_name,
            active_status: ActiveStatus::Active,
            created_at: Some(now),
            updated_at: Some(now),
        };
        data.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, url_key: &str, name: &str) -> Result<Category, BackendError> {
        self.check_available()?;
        let request = CategoryRequest::new(name);
        let mut data = self.lock();
        let category = data
            .categories
            .iter_mut()
            .find(|c| c.url_key == url_key)
            .ok_or_else(|| BackendError::NotFound("Category not found".to_string()))?;
        category.url_key = slugify(&request.category_name);
        category.category_name = request.category_name;
        category.updated_at = Some(Utc::now());
        let updated = category.clone();

        for blog in data.blogs.iter_mut().filter(|b| b.category.id == updated.id) {
            blog.category = updated.clone();
        }
        Ok(updated)
    }

    async fn delete_category(&self, url_key: &str) -> Result<(), BackendError> {
        self.check_available()?;
        let mut data = self.lock();
        let before = data.categories.len();
        data.categories.retain(|c| c.url_key != url_key);
        if data.categories.len() == before {
            return Err(BackendError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }

    async fn get_blogs(&self) -> Result<Vec<Blog>, BackendError> {
        self.check_available()?;
        Ok(self.lock().blogs.clone())
    }

    async fn get_blog(&self, slug: &str) -> Result<Blog, BackendError> {
        self.check_available()?;
        self.lock().blog_mut(slug).map(|b| b.clone())
    }

    async fn get_blogs_by_category(&self, category: &str) -> Result<Vec<Blog>, BackendError> {
        self.check_available()?;
        let category = normalize_category(category);
        Ok(self
            .lock()
            .blogs
            .iter()
            .filter(|b| b.category.category_name == category)
            .cloned()
            .collect())
    }

    async fn create_blog(&self, blog: BlogFormData) -> Result<Blog, BackendError> {
        self.check_available()?;
        let blog = blog.normalized();
        let mut data = self.lock();
        let category = data.category_named(&blog.category)?;
        let slug = slugify(&blog.title);
        if slug.is_empty() || data.blogs.iter().any(|b| b.slug == slug) {
            return Err(BackendError::Status {
                status: 400,
                message: "A blog with this title already exists".to_string(),
            });
        }
        let created = Blog {
            id: data.next_id(),
            title: blog.title,
            slug,
            image: blog.image,
            content: blog.content,
            author: blog.author,
            category,
            post_date: Utc::now(),
            like_count: 0,
            comment_count: 0,
            comments: Vec::new(),
        };
        data.blogs.push(created.clone());
        Ok(created)
    }

    async fn update_blog(&self, slug: &str, blog: UpdateBlogRequest) -> Result<Blog, BackendError> {
        self.check_available()?;
        let update = blog.normalized();
        let mut data = self.lock();
        let category = match &update.category {
            Some(name) => Some(data.category_named(name)?),
            None => None,
        };
        let existing = data.blog_mut(slug)?;
        if let Some(title) = update.title {
            existing.title = title;
        }
        if let Some(content) = update.content {
            existing.content = content;
        }
        if let Some(author) = update.author {
            existing.author = author;
        }
        if let Some(image) = update.image {
            existing.image = Some(image);
        }
        if let Some(category) = category {
            existing.category = category;
        }
        Ok(existing.clone())
    }

    async fn delete_blog(&self, slug: &str) -> Result<(), BackendError> {
        self.check_available()?;
        let mut data = self.lock();
        let before = data.blogs.len();
        data.blogs.retain(|b| b.slug != slug);
        if data.blogs.len() == before {
            return Err(BackendError::NotFound("Blog not found".to_string()));
        }
        Ok(())
    }

    async fn get_comments(
        &self,
        slug: &str,
        status: Option<CommentStatus>,
    ) -> Result<CommentList, BackendError> {
        self.check_available()?;
        let mut data = self.lock();
        let blog = data.blog_mut(slug)?;
        let comments: Vec<Comment> = blog
            .comments
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        Ok(CommentList {
            total: comments.len() as u64,
            comments,
        })
    }

    async fn update_comment_status(
        &self,
        slug: &str,
        comment_id: &str,
        status: ModerationStatus,
    ) -> Result<Comment, BackendError> {
        self.check_available()?;
        let mut data = self.lock();
        let blog = data.blog_mut(slug)?;
        let comment = blog
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| BackendError::NotFound("Comment not found".to_string()))?;
        comment.status = status.into();
        Ok(comment.clone())
    }

    async fn get_contacts(&self) -> Result<Vec<Contact>, BackendError> {
        self.check_available()?;
        Ok(self.lock().contacts.clone())
    }
}
