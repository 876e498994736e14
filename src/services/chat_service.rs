//! Chat service - conversations, messages and realtime publication.
//!
//! Messages are written to the database first. Only after the write
//! succeeds is the message handed to the `ChatHub` for live subscribers, so
//! a subscriber never sees a message that is missing from the history.

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::chat::{Conversation, ConversationSummary, Message, StartConversationRequest};
use crate::services::chat_hub::ChatHub;
use crate::services::listing_service;
use crate::services::validation::{optional_text, required_text};

const MAX_MESSAGE_CHARS: usize = 4000;

const MESSAGE_COLUMNS: &str = "id, conversation_id, body, from_admin, is_read, created_at";

pub async fn get_conversation(
    pool: &DbPool,
    conversation_id: Uuid,
) -> Result<Conversation, AppError> {
    sqlx::query_as::<_, Conversation>(
        "SELECT id, listing_id, visitor_name, created_at FROM conversations WHERE id = $1",
    )
    .bind(conversation_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Conversation"))
}

/// Open a conversation on an active listing, optionally with a first message.
///
/// # Process
///
/// 1. Validate visitor name and first message
/// 2. Verify the listing is visible
/// 3. Insert conversation and first message in one transaction
/// 4. Publish the first message
pub async fn start_conversation(
    pool: &DbPool,
    hub: &ChatHub,
    listing_id: Uuid,
    request: StartConversationRequest,
) -> Result<(Conversation, Vec<Message>), AppError> {
    let visitor_name = required_text("visitor_name", &request.visitor_name, 80)?;
    let first_body = match optional_text(request.body) {
        Some(body) => Some(required_text("body", &body, MAX_MESSAGE_CHARS)?),
        None => None,
    };

    listing_service::get_active_listing(pool, listing_id).await?;

    let mut tx = pool.begin().await?;

    let conversation = sqlx::query_as::<_, Conversation>(
        r#"
        INSERT INTO conversations (listing_id, visitor_name)
        VALUES ($1, $2)
        RETURNING id, listing_id, visitor_name, created_at
        "#,
    )
    .bind(listing_id)
    .bind(visitor_name)
    .fetch_one(&mut *tx)
    .await?;

    let mut messages = Vec::new();
    if let Some(body) = first_body {
        let message = sqlx::query_as::<_, Message>(&format!(
            "INSERT INTO messages (conversation_id, body) VALUES ($1, $2) RETURNING {}",
            MESSAGE_COLUMNS
        ))
        .bind(conversation.id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await?;
        messages.push(message);
    }

    tx.commit().await?;

    tracing::info!(conversation_id = %conversation.id, %listing_id, "Conversation started");

    for message in &messages {
        hub.publish(message.clone());
    }

    Ok((conversation, messages))
}

/// Store a message in an existing conversation and publish it.
pub async fn send_message(
    pool: &DbPool,
    hub: &ChatHub,
    conversation_id: Uuid,
    body: &str,
    from_admin: bool,
) -> Result<Message, AppError> {
    let body = required_text("body", body, MAX_MESSAGE_CHARS)?;

    get_conversation(pool, conversation_id).await?;

    // Operator replies are stored as read: the unread counter tracks visitor messages only
    let message = sqlx::query_as::<_, Message>(&format!(
        r#"
        INSERT INTO messages (conversation_id, body, from_admin, is_read)
        VALUES ($1, $2, $3, $3)
        RETURNING {}
        "#,
        MESSAGE_COLUMNS
    ))
    .bind(conversation_id)
    .bind(body)
    .bind(from_admin)
    .fetch_one(pool)
    .await?;

    let delivered = hub.publish(message.clone());
    tracing::debug!(%conversation_id, from_admin, delivered, "Message published");

    Ok(message)
}

/// Full message history of a conversation, oldest first.
pub async fn history(pool: &DbPool, conversation_id: Uuid) -> Result<Vec<Message>, AppError> {
    get_conversation(pool, conversation_id).await?;

    let messages = sqlx::query_as::<_, Message>(&format!(
        "SELECT {} FROM messages WHERE conversation_id = $1 ORDER BY created_at, id",
        MESSAGE_COLUMNS
    ))
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Admin inbox: every conversation with its unread visitor message count,
/// most recently active first.
pub async fn list_summaries(pool: &DbPool) -> Result<Vec<ConversationSummary>, AppError> {
    let summaries = sqlx::query_as::<_, ConversationSummary>(
        r#"
        SELECT c.id,
               c.listing_id,
               l.title AS listing_title,
               c.visitor_name,
               COUNT(m.id) FILTER (WHERE m.from_admin = false AND m.is_read = false) AS unread_count,
               MAX(m.created_at) AS last_message_at,
               c.created_at
        FROM conversations c
        JOIN listings l ON l.id = c.listing_id
        LEFT JOIN messages m ON m.conversation_id = c.id
        GROUP BY c.id, l.title
        ORDER BY COALESCE(MAX(m.created_at), c.created_at) DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(summaries)
}

/// Mark every visitor message of a conversation as read.
///
/// Returns the number of messages that changed.
pub async fn mark_read(pool: &DbPool, conversation_id: Uuid) -> Result<u64, AppError> {
    get_conversation(pool, conversation_id).await?;

    let updated = sqlx::query(
        "UPDATE messages SET is_read = true
         WHERE conversation_id = $1 AND from_admin = false AND is_read = false",
    )
    .bind(conversation_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(updated)
}
