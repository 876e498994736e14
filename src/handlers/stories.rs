//! Story HTTP handlers.
//!
//! - GET /api/v1/stories - Unexpired stories (optionally `?listing_id=`)
//! - POST /admin/v1/stories - Publish a story
//! - DELETE /admin/v1/stories/{id} - Remove a story before it expires

use crate::{
    error::AppError,
    models::story::{CreateStoryRequest, Story},
    services::story_service,
    state::AppState,
};
use crate::extract::{Json, Path, Query};
use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct StoryQuery {
    pub listing_id: Option<Uuid>,
}

pub async fn list_stories(
    State(state): State<AppState>,
    Query(query): Query<StoryQuery>,
) -> Result<Json<Vec<Story>>, AppError> {
    Ok(Json(
        story_service::list_active(&state.pool, query.listing_id).await?,
    ))
}

/// Publish a story.
///
/// # Request Body
///
/// ```json
/// {
///   "listing_id": "550e8400-...",
///   "media_url": "https://cdn.example.com/stories/1.jpg",
///   "caption": "New photos",
///   "ttl_hours": 12
/// }
/// ```
///
/// `ttl_hours` defaults to `STORY_TTL_HOURS` and must be within 1..=168.
pub async fn create_story(
    State(state): State<AppState>,
    Json(request): Json<CreateStoryRequest>,
) -> Result<(StatusCode, Json<Story>), AppError> {
    let story =
        story_service::create_story(&state.pool, request, state.config.story_ttl_hours).await?;

    Ok((StatusCode::CREATED, Json(story)))
}

pub async fn delete_story(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    story_service::delete_story(&state.pool, story_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
