//! Comment HTTP handlers.
//!
//! Public site:
//! - GET /api/v1/listings/{id}/comments - Approved comments
//! - POST /api/v1/listings/{id}/comments - Submit comment for moderation
//!
//! Admin panel:
//! - GET /admin/v1/comments/pending - Moderation queue
//! - POST /admin/v1/comments/{id}/approve
//! - DELETE /admin/v1/comments/{id}

use crate::{
    error::AppError,
    models::comment::{Comment, CommentResponse, CreateCommentRequest},
    services::comment_service,
    state::AppState,
};
use crate::extract::{Json, Path};
use axum::{extract::State, http::StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

pub async fn list_comments(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let comments = comment_service::list_approved(&state.pool, listing_id).await?;

    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// Submit a comment.
///
/// # Request Body
///
/// ```json
/// { "author_name": "Can", "body": "Very kind, recommended." }
/// ```
///
/// # Response (202 Accepted)
///
/// The comment is stored but not visible until approved.
///
/// ```json
/// { "id": "550e8400-...", "status": "pending" }
/// ```
pub async fn create_comment(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let comment = comment_service::create_comment(&state.pool, listing_id, request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "id": comment.id, "status": "pending" })),
    ))
}

pub async fn list_pending(State(state): State<AppState>) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(comment_service::list_pending(&state.pool).await?))
}

pub async fn approve_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(comment_service::approve(&state.pool, comment_id).await?))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    comment_service::delete(&state.pool, comment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
