//! Ephemeral story models.
//!
//! A story is a media post attached to a listing. It is visible on the public
//! site until `expires_at`, after which the purge task deletes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a story record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Story {
    pub id: Uuid,
    pub listing_id: Uuid,
    /// Public URL of the image or video
    pub media_url: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Request body for publishing a story.
///
/// # JSON Example
///
/// ```json
/// {
///   "listing_id": "550e8400-e29b-41d4-a716-446655440000",
///   "media_url": "https://cdn.example.com/stories/1.jpg",
///   "caption": "New photos",
///   "ttl_hours": 12
/// }
/// ```
///
/// `ttl_hours` falls back to the configured story lifetime.
#[derive(Debug, Deserialize)]
pub struct CreateStoryRequest {
    pub listing_id: Uuid,
    pub media_url: String,
    pub caption: Option<String>,
    pub ttl_hours: Option<i64>,
}
