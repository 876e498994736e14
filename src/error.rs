//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Every handler returns `Result<T, AppError>`. Errors are terminal for the
/// current request: nothing is retried.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid or missing admin API keys
/// - **Resource Errors**: Requested resources not found
/// - **Validation Errors**: Invalid request data or filter values
/// - **Conflicts**: Duplicate catalog entries
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Constraint violations are reported to the client as 409 (unique) or
    /// 400 (foreign key); everything else is a 500 with details hidden.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Admin API key is missing, invalid, or revoked.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Listing does not exist, or is inactive on a public route.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Listing not found")]
    ListingNotFound,

    /// Any other resource (category, city, comment, conversation, story, key)
    /// does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request body, path or query parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// The write would duplicate an existing unique value.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Conflict")]
    Conflict(String),
}

impl AppError {
    /// Map a unique-constraint violation to `Conflict` with `message`.
    ///
    /// Any other database error is kept as `Database`.
    ///
    /// ```ignore
    /// .fetch_one(pool)
    /// .await
    /// .map_err(AppError::on_unique("City already exists"))?;
    /// ```
    pub fn on_unique(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(message.to_string())
            }
            other => AppError::Database(other),
        }
    }
}

/// Malformed or incomplete JSON body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Path segment that does not parse (e.g. a non-UUID id).
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Query string that does not deserialize.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidApiKey` → 401 Unauthorized
/// - `ListingNotFound` / `NotFound` → 404 Not Found
/// - `InvalidRequest` → 400 Bad Request
/// - `Conflict` → 409 Conflict
/// - `Database` → 409 / 400 for constraint violations not mapped at the
///   source, otherwise 500
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::ListingNotFound => {
                (StatusCode::NOT_FOUND, "listing_not_found", self.to_string())
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Database(sqlx::Error::Database(ref db_err))
                if db_err.is_unique_violation() =>
            {
                (
                    StatusCode::CONFLICT,
                    "conflict",
                    "A record with the same value already exists".to_string(),
                )
            }
            AppError::Database(sqlx::Error::Database(ref db_err))
                if db_err.is_foreign_key_violation() =>
            {
                (
                    StatusCode::BAD_REQUEST,
                    "invalid_request",
                    "Referenced record does not exist".to_string(),
                )
            }
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    /// Driver-independent database error with a chosen kind.
    #[derive(Debug)]
    struct ConstraintError(ErrorKind);

    impl fmt::Display for ConstraintError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "constraint violated")
        }
    }

    impl std::error::Error for ConstraintError {}

    impl DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn db_error(kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintError(kind)))
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err = AppError::on_unique("City already exists")(db_error(ErrorKind::UniqueViolation));

        assert!(matches!(err, AppError::Conflict(ref msg) if msg == "City already exists"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn other_database_errors_pass_through() {
        let err = AppError::on_unique("unused")(db_error(ErrorKind::ForeignKeyViolation));
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = AppError::on_unique("unused")(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::InvalidApiKey, StatusCode::UNAUTHORIZED),
            (AppError::ListingNotFound, StatusCode::NOT_FOUND),
            (AppError::NotFound("Comment"), StatusCode::NOT_FOUND),
            (
                AppError::InvalidRequest("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn body_shape() {
        let response = AppError::NotFound("Story").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "Story not found");
    }
}
