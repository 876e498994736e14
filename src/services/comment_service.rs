//! Comment service: public posting and admin moderation.

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::comment::{Comment, CreateCommentRequest};
use crate::services::{listing_service, validation::required_text};

const COMMENT_COLUMNS: &str = "id, listing_id, author_name, body, is_approved, created_at";

/// Post a comment on an active listing. The comment waits for approval.
pub async fn create_comment(
    pool: &DbPool,
    listing_id: Uuid,
    request: CreateCommentRequest,
) -> Result<Comment, AppError> {
    let author_name = required_text("author_name", &request.author_name, 80)?;
    let body = required_text("body", &request.body, 2000)?;

    listing_service::get_active_listing(pool, listing_id).await?;

    let comment = sqlx::query_as::<_, Comment>(&format!(
        r#"
        INSERT INTO comments (listing_id, author_name, body)
        VALUES ($1, $2, $3)
        RETURNING {}
        "#,
        COMMENT_COLUMNS
    ))
    .bind(listing_id)
    .bind(author_name)
    .bind(body)
    .fetch_one(pool)
    .await?;

    tracing::info!(comment_id = %comment.id, %listing_id, "Comment awaiting moderation");

    Ok(comment)
}

/// Approved comments of an active listing, newest first.
///
/// Comments of an inactive listing are hidden along with the listing.
const APPROVED_COMMENTS_QUERY: &str = r#"
    SELECT c.id, c.listing_id, c.author_name, c.body, c.is_approved, c.created_at
    FROM comments c
    JOIN listings l ON l.id = c.listing_id
    WHERE c.listing_id = $1 AND c.is_approved = true AND l.is_active = true
    ORDER BY c.created_at DESC
"#;

/// Approved comments of a listing, newest first. Empty for an inactive
/// listing.
pub async fn list_approved(pool: &DbPool, listing_id: Uuid) -> Result<Vec<Comment>, AppError> {
    let comments = sqlx::query_as::<_, Comment>(APPROVED_COMMENTS_QUERY)
        .bind(listing_id)
        .fetch_all(pool)
        .await?;

    Ok(comments)
}

/// Moderation queue, oldest first.
pub async fn list_pending(pool: &DbPool) -> Result<Vec<Comment>, AppError> {
    let comments = sqlx::query_as::<_, Comment>(&format!(
        "SELECT {} FROM comments WHERE is_approved = false ORDER BY created_at",
        COMMENT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(comments)
}

pub async fn approve(pool: &DbPool, comment_id: Uuid) -> Result<Comment, AppError> {
    sqlx::query_as::<_, Comment>(&format!(
        "UPDATE comments SET is_approved = true WHERE id = $1 RETURNING {}",
        COMMENT_COLUMNS
    ))
    .bind(comment_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Comment"))
}

pub async fn delete(pool: &DbPool, comment_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Comment"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approved_comments_require_active_listing() {
        let query = APPROVED_COMMENTS_QUERY.split_whitespace().collect::<Vec<_>>().join(" ");

        assert!(query.contains("JOIN listings l ON l.id = c.listing_id"));
        assert!(query.contains("c.is_approved = true AND l.is_active = true"));
    }

    #[test]
    fn approved_comments_select_comment_columns() {
        let selected = APPROVED_COMMENTS_QUERY
            .split("FROM")
            .next()
            .unwrap()
            .replace("SELECT", "")
            .replace("c.", "");
        let selected: Vec<&str> = selected.split(',').map(str::trim).collect();
        let expected: Vec<&str> = COMMENT_COLUMNS.split(',').map(str::trim).collect();

        assert_eq!(selected, expected);
    }
}
