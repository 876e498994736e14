//! Chat HTTP handlers.
//!
//! Public site:
//! - POST /api/v1/listings/{id}/conversations - Open a conversation
//! - GET /api/v1/conversations/{id}/messages - Message history
//! - POST /api/v1/conversations/{id}/messages - Visitor message
//! - GET /api/v1/conversations/{id}/stream - Live messages (Server-Sent Events)
//!
//! Admin panel:
//! - GET /admin/v1/conversations - Inbox with unread counts
//! - POST /admin/v1/conversations/{id}/messages - Operator reply
//! - POST /admin/v1/conversations/{id}/read - Mark visitor messages read

use std::time::Duration;

use crate::{
    error::AppError,
    middleware::auth::AdminContext,
    models::chat::{
        ConversationResponse, ConversationSummary, Message, SendMessageRequest,
        StartConversationRequest,
    },
    services::chat_service,
    state::AppState,
};
use crate::extract::{Json, Path};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use serde_json::{Value, json};
use uuid::Uuid;

/// Open a conversation from a listing page.
///
/// # Request Body
///
/// ```json
/// { "visitor_name": "Can", "body": "Hello!" }
/// ```
///
/// # Response (201 Created)
///
/// The conversation with its messages so far. The visitor keeps the `id`
/// to send further messages and to open the live stream.
pub async fn start_conversation(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    Json(request): Json<StartConversationRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>), AppError> {
    let (conversation, messages) =
        chat_service::start_conversation(&state.pool, &state.chat, listing_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ConversationResponse {
            conversation,
            messages,
        }),
    ))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(
        chat_service::history(&state.pool, conversation_id).await?,
    ))
}

pub async fn send_visitor_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message =
        chat_service::send_message(&state.pool, &state.chat, conversation_id, &request.body, false)
            .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Live message stream for one conversation.
///
/// Each new message (visitor or operator) is sent as an SSE event named
/// `message` whose data is the message JSON. Messages sent before the
/// stream was opened come from the history endpoint.
///
/// # Errors
///
/// - 404 if the conversation does not exist
pub async fn stream_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    chat_service::get_conversation(&state.pool, conversation_id).await?;

    tracing::debug!(%conversation_id, "Chat stream opened");

    let stream = state
        .chat
        .subscribe(conversation_id)
        .map(|message| Event::default().event("message").json_data(&message));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConversationSummary>>, AppError> {
    Ok(Json(chat_service::list_summaries(&state.pool).await?))
}

pub async fn send_admin_reply(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message =
        chat_service::send_message(&state.pool, &state.chat, conversation_id, &request.body, true)
            .await?;

    tracing::info!(%conversation_id, admin = %admin.label, "Operator replied");

    Ok((StatusCode::CREATED, Json(message)))
}

/// Mark a conversation's visitor messages as read.
///
/// # Response (200 OK)
///
/// ```json
/// { "updated": 3 }
/// ```
pub async fn mark_read(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let updated = chat_service::mark_read(&state.pool, conversation_id).await?;

    Ok(Json(json!({ "updated": updated })))
}
