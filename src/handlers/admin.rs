//! Admin panel housekeeping: notification badges and admin key management.
//!
//! - GET /admin/v1/notifications - Badge counters
//! - GET /admin/v1/keys - List admin keys (no secrets)
//! - POST /admin/v1/keys - Issue a key (plaintext returned once)
//! - DELETE /admin/v1/keys/{id} - Revoke a key

use crate::{
    error::AppError,
    middleware::auth::AdminContext,
    models::api_key::{AdminKeyResponse, CreateAdminKeyRequest},
    services::api_key_service,
    state::AppState,
};
use crate::extract::{Json, Path};
use axum::{Extension, extract::State, http::StatusCode};
use serde::Serialize;
use uuid::Uuid;

/// Badge counters shown in the admin navigation.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct NotificationCounts {
    /// Comments waiting for approval
    pub pending_comments: i64,

    /// Visitor messages not yet marked read
    pub unread_messages: i64,
}

/// Notification badge counters.
///
/// # Response (200 OK)
///
/// ```json
/// { "pending_comments": 4, "unread_messages": 12 }
/// ```
pub async fn notifications(
    State(state): State<AppState>,
) -> Result<Json<NotificationCounts>, AppError> {
    let counts = sqlx::query_as::<_, NotificationCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM comments WHERE is_approved = false) AS pending_comments,
            (SELECT COUNT(*) FROM messages WHERE from_admin = false AND is_read = false) AS unread_messages
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(counts))
}

pub async fn list_keys(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminKeyResponse>>, AppError> {
    Ok(Json(api_key_service::list_keys(&state.pool).await?))
}

/// Issue a new admin key.
///
/// # Response (201 Created)
///
/// ```json
/// {
///   "id": "550e8400-...",
///   "label": "moderator laptop",
///   "key": "a1b2c3d4e5f6...",
///   "is_active": true,
///   "created_at": "2025-01-15T10:30:00Z"
/// }
/// ```
///
/// The `key` is only returned here; store it immediately.
pub async fn create_key(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Json(request): Json<CreateAdminKeyRequest>,
) -> Result<(StatusCode, Json<AdminKeyResponse>), AppError> {
    let key = api_key_service::create_key(&state.pool, request).await?;

    tracing::info!(key_id = %key.id, issued_by = %admin.label, "Admin key created");

    Ok((StatusCode::CREATED, Json(key)))
}

/// Revoke an admin key (soft delete). Returns 204 No Content.
pub async fn revoke_key(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(key_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    api_key_service::revoke_key(&state.pool, admin.key_id, key_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
