//! Category and city catalog models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing category (maps to the `categories` table).
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// URL-safe identifier, unique
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a category.
///
/// ```json
/// { "name": "Massage", "slug": "massage" }
/// ```
///
/// `slug` is derived from `name` when omitted.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: Option<String>,
}

/// City a listing can be located in (maps to the `cities` table).
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct City {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a city.
#[derive(Debug, Deserialize)]
pub struct CreateCityRequest {
    pub name: String,
}
