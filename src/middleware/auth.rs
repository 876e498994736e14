//! Admin key authentication middleware.
//!
//! This middleware intercepts every admin panel request to:
//! 1. Extract the key from the Authorization header
//! 2. Hash it and verify an active key with that hash exists
//! 3. Inject the admin context into the request
//! 4. Reject unauthorized requests with HTTP 401

use crate::{error::AppError, services::api_key_service, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Authentication context attached to admin requests.
///
/// Handlers extract it with `Extension<AdminContext>`.
#[derive(Debug, Clone)]
pub struct AdminContext {
    /// ID of the admin key used for this request
    pub key_id: Uuid,

    /// Label of the key, for audit logging
    pub label: String,
}

/// Admin authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <key>` header from request
/// 2. Look up the SHA-256 hash of `<key>` among active admin keys
/// 3. If found: inject `AdminContext` into request, call next handler
/// 4. If not found: return 401 Unauthorized error
///
/// The header is checked before any database access, so requests without a
/// bearer key are rejected without touching the pool.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    // Expected format: "Bearer <key>"
    let key = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(AppError::InvalidApiKey)?;

    let record = api_key_service::authenticate(&state.pool, key).await?;

    tracing::debug!(key_id = %record.id, label = %record.label, "Admin request authenticated");

    request.extensions_mut().insert(AdminContext {
        key_id: record.id,
        label: record.label,
    });

    Ok(next.run(request).await)
}
