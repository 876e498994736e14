//! Chat models: conversations between a visitor and the site operator.
//!
//! A conversation is opened from a listing page. Visitor and admin messages
//! are stored in `messages` and pushed to live subscribers through the chat
//! hub.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a conversation record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Conversation {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub visitor_name: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a chat message record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub body: String,
    /// True for operator replies sent from the admin panel
    pub from_admin: bool,
    /// Read flag for visitor messages, set by the admin panel
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for opening a conversation on a listing.
///
/// ```json
/// { "visitor_name": "Can", "body": "Hello, are you available tonight?" }
/// ```
#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub visitor_name: String,
    /// Optional first message
    pub body: Option<String>,
}

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// Conversation as listed in the admin panel inbox.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub listing_title: String,
    pub visitor_name: String,
    pub unread_count: i64,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Response for opening a conversation.
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}
