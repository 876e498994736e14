//! Listing comment models.
//!
//! Comments posted from the public site start unapproved and only become
//! visible after an admin approves them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a comment record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub author_name: String,
    pub body: String,
    /// Pending comments are only visible in the admin panel
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for posting a comment.
///
/// # JSON Example
///
/// ```json
/// { "author_name": "Can", "body": "Very kind, recommended." }
/// ```
///
/// # Validation
///
/// - `author_name`: Required, at most 80 characters
/// - `body`: Required, at most 2000 characters
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub author_name: String,
    pub body: String,
}

/// Comment as shown on the public listing page.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            author_name: comment.author_name,
            body: comment.body,
            created_at: comment.created_at,
        }
    }
}
