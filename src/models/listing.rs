//! Listing data models and API request/response types.
//!
//! This module defines:
//! - `Listing`: Database entity representing a profile listing
//! - `ListingPrice`: Pricing row attached to a listing
//! - Request types for creating and updating listings (admin panel)
//! - Response types returned to the public site and the admin panel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Represents a listing record from the database.
///
/// # Database Table
///
/// Maps to the `listings` table. Each listing:
/// - Optionally belongs to one category and one city
/// - Carries optional physical descriptors used by the public filters
/// - Carries two display flags (`is_premium`, `is_vip`) that decide its tier
///
/// # Optional Attributes
///
/// `age`, `height_cm` and `weight_kg` are nullable. A listing without a value
/// never matches an active range filter on that attribute.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Listing {
    /// Unique identifier for this listing
    pub id: Uuid,

    /// Headline shown on listing cards
    pub title: String,

    /// Free-form profile text
    pub description: Option<String>,

    /// Foreign key to `categories` (nulled when the category is deleted)
    pub category_id: Option<Uuid>,

    /// Foreign key to `cities` (nulled when the city is deleted)
    pub city_id: Option<Uuid>,

    /// Age in years
    pub age: Option<i32>,

    /// Height in centimetres
    pub height_cm: Option<i32>,

    /// Weight in kilograms
    pub weight_kg: Option<i32>,

    /// Hair color as entered by the admin (compared case-insensitively)
    pub hair_color: Option<String>,

    /// Contact phone number
    pub phone: Option<String>,

    /// Public URL of the cover image
    pub image_url: Option<String>,

    /// Premium tier flag (takes precedence over `is_vip`)
    pub is_premium: bool,

    /// VIP tier flag
    pub is_vip: bool,

    /// Inactive listings are hidden from the public site
    pub is_active: bool,

    /// Timestamp when the listing was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last admin edit
    pub updated_at: DateTime<Utc>,
}

/// Pricing row of a listing (e.g. "1 hour" → 150000 cents).
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ListingPrice {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub label: String,
    pub amount_cents: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Pricing row as sent by the admin panel.
///
/// # JSON Example
///
/// ```json
/// { "label": "1 hour", "amount_cents": 150000, "currency": "TRY" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PriceInput {
    pub label: String,
    pub amount_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Default currency value when not specified in request.
fn default_currency() -> String {
    "TRY".to_string()
}

/// Request body for creating a new listing.
///
/// # JSON Example
///
/// ```json
/// {
///   "title": "Merve",
///   "description": "Friendly and punctual",
///   "city_id": "550e8400-e29b-41d4-a716-446655440000",
///   "age": 24,
///   "height_cm": 168,
///   "weight_kg": 54,
///   "hair_color": "Blonde",
///   "is_premium": true,
///   "prices": [{ "label": "1 hour", "amount_cents": 150000 }]
/// }
/// ```
///
/// # Validation
///
/// - `title`: Required, non-empty, at most 200 characters
/// - `age`: At least 18 when present
/// - `height_cm` / `weight_kg`: Positive when present
/// - `image_url`: Must be an http(s) URL when present
/// - `prices`: Each price needs a label and a positive amount
#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub age: Option<i32>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub hair_color: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub prices: Vec<PriceInput>,
}

fn default_active() -> bool {
    true
}

/// Request body for a partial listing update.
///
/// Absent fields are left untouched. Text fields are cleared with an empty
/// string; `category_id`, `city_id`, `age`, `height_cm` and `weight_kg` are
/// cleared with an explicit `null`. When `prices` is present the listing's
/// pricing rows are replaced wholesale.
///
/// ```json
/// { "height_cm": null, "age": 29 }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub city_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub height_cm: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub weight_kg: Option<Option<i32>>,
    pub hair_color: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub is_premium: Option<bool>,
    pub is_vip: Option<bool>,
    pub is_active: Option<bool>,
    pub prices: Option<Vec<PriceInput>>,
}

/// Distinguish an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Listing as shown on listing cards.
///
/// Internal bookkeeping (`is_active`, `updated_at`) is not exposed to the
/// public site.
#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub age: Option<i32>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub hair_color: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub is_premium: bool,
    pub is_vip: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title,
            description: listing.description,
            category_id: listing.category_id,
            city_id: listing.city_id,
            age: listing.age,
            height_cm: listing.height_cm,
            weight_kg: listing.weight_kg,
            hair_color: listing.hair_color,
            phone: listing.phone,
            image_url: listing.image_url,
            is_premium: listing.is_premium,
            is_vip: listing.is_vip,
            created_at: listing.created_at,
        }
    }
}

/// Price as shown to clients.
#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub label: String,
    pub amount_cents: i64,
    pub currency: String,
}

impl From<ListingPrice> for PriceResponse {
    fn from(price: ListingPrice) -> Self {
        Self {
            label: price.label,
            amount_cents: price.amount_cents,
            currency: price.currency,
        }
    }
}

/// Listing detail page: the listing plus its pricing rows.
#[derive(Debug, Serialize)]
pub struct ListingDetailResponse {
    #[serde(flatten)]
    pub listing: ListingResponse,
    pub prices: Vec<PriceResponse>,
}

/// Admin view of a listing, including fields hidden from the public site.
#[derive(Debug, Serialize)]
pub struct AdminListingResponse {
    #[serde(flatten)]
    pub listing: Listing,
    pub prices: Vec<PriceResponse>,
}

/// Public listing index split into display tiers.
///
/// # JSON Example
///
/// ```json
/// {
///   "premium": [ { "id": "...", "title": "Merve", ... } ],
///   "vip": [],
///   "normal": [ { "id": "...", "title": "Ayla", ... } ],
///   "total": 2
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct TieredListingsResponse {
    pub premium: Vec<ListingResponse>,
    pub vip: Vec<ListingResponse>,
    pub normal: Vec<ListingResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: &str) -> UpdateListingRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn update_tells_null_from_absent() {
        let absent = update("{}");
        assert_eq!(absent.height_cm, None);
        assert_eq!(absent.city_id, None);

        let cleared = update(r#"{"height_cm": null, "city_id": null}"#);
        assert_eq!(cleared.height_cm, Some(None));
        assert_eq!(cleared.city_id, Some(None));
        assert_eq!(cleared.age, None);

        let set = update(r#"{"age": 29, "weight_kg": 61}"#);
        assert_eq!(set.age, Some(Some(29)));
        assert_eq!(set.weight_kg, Some(Some(61)));
    }

    #[test]
    fn update_rejects_wrong_type_for_nullable_field() {
        assert!(serde_json::from_str::<UpdateListingRequest>(r#"{"age": "old"}"#).is_err());
    }
}
