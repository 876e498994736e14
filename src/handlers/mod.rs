//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, query string)
//! 2. Delegates to a service or runs a simple query
//! 3. Returns HTTP response (JSON, status code)

/// Notification badges and admin keys
pub mod admin;
/// Categories and cities
pub mod catalog;
/// Conversations, messages and the live stream
pub mod chat;
/// Listing comments and moderation
pub mod comments;
/// Service health
pub mod health;
/// Listing index, detail and admin CRUD
pub mod listings;
/// Ephemeral stories
pub mod stories;
