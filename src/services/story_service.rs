//! Story service - ephemeral media posts.
//!
//! Stories expire `ttl_hours` after publication. Expired stories are hidden
//! from reads immediately and removed by a periodic purge task.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::story::{CreateStoryRequest, Story};
use crate::services::listing_service;
use crate::services::validation::{optional_text, validate_media_url};

/// Longest lifetime an admin may request (one week).
pub const MAX_TTL_HOURS: i64 = 168;

const STORY_COLUMNS: &str = "id, listing_id, media_url, caption, created_at, expires_at";

/// Expiry instant for a story published at `published_at`.
///
/// # Errors
///
/// - `InvalidRequest`: TTL outside 1..=168 hours
pub fn expiry(published_at: DateTime<Utc>, ttl_hours: i64) -> Result<DateTime<Utc>, AppError> {
    if !(1..=MAX_TTL_HOURS).contains(&ttl_hours) {
        return Err(AppError::InvalidRequest(format!(
            "ttl_hours must be between 1 and {}",
            MAX_TTL_HOURS
        )));
    }

    Ok(published_at + chrono::Duration::hours(ttl_hours))
}

/// Publish a story for a listing.
pub async fn create_story(
    pool: &DbPool,
    request: CreateStoryRequest,
    default_ttl_hours: i64,
) -> Result<Story, AppError> {
    validate_media_url("media_url", request.media_url.trim())?;
    let expires_at = expiry(Utc::now(), request.ttl_hours.unwrap_or(default_ttl_hours))?;

    listing_service::get_listing(pool, request.listing_id).await?;

    let story = sqlx::query_as::<_, Story>(&format!(
        r#"
        INSERT INTO stories (listing_id, media_url, caption, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        STORY_COLUMNS
    ))
    .bind(request.listing_id)
    .bind(request.media_url.trim())
    .bind(optional_text(request.caption))
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    tracing::info!(story_id = %story.id, expires_at = %story.expires_at, "Story published");

    Ok(story)
}

/// Unexpired stories of active listings, newest first.
///
/// `listing_id` narrows the result to one listing.
pub async fn list_active(pool: &DbPool, listing_id: Option<Uuid>) -> Result<Vec<Story>, AppError> {
    let stories = sqlx::query_as::<_, Story>(
        r#"
        SELECT s.id, s.listing_id, s.media_url, s.caption, s.created_at, s.expires_at
        FROM stories s
        JOIN listings l ON l.id = s.listing_id
        WHERE s.expires_at > NOW()
          AND l.is_active = true
          AND ($1::uuid IS NULL OR s.listing_id = $1)
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(listing_id)
    .fetch_all(pool)
    .await?;

    Ok(stories)
}

pub async fn delete_story(pool: &DbPool, story_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM stories WHERE id = $1")
        .bind(story_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Story"));
    }

    Ok(())
}

/// Delete every expired story. Returns the number of rows removed.
pub async fn purge_expired(pool: &DbPool) -> Result<u64, AppError> {
    let removed = sqlx::query("DELETE FROM stories WHERE expires_at <= NOW()")
        .execute(pool)
        .await?
        .rows_affected();

    Ok(removed)
}

/// Run `purge_expired` every `every`.
///
/// Failures are logged and the next tick tries again.
pub fn spawn_purge_task(pool: DbPool, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match purge_expired(&pool).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Expired stories purged"),
                Err(e) => tracing::error!("Story purge failed: {:?}", e),
            }
        }
    })
}
