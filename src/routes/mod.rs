//! Router Module Index
//!
//! Organizes routing by access class. The route guard classifies paths on its
//! own, so these modules only group handlers; they do not enforce access.

/// Routes open to everyone (health check, logout).
pub mod public;

/// Pages for visitors who are not signed in (landing, login).
pub mod auth_pages;

/// The dashboard tree. Every path here starts with `/dashboard` and is
/// therefore protected by the route guard.
pub mod dashboard;
