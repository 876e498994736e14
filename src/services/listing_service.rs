//! Listing service - reads and multi-step writes for listings.
//!
//! This service handles:
//! - The public listing index (fetch active listings, filter, split into tiers)
//! - Listing detail with pricing
//! - Admin create / update / delete
//!
//! # Atomicity Guarantees
//!
//! Writes touching more than one table (listing + prices, dependent rows +
//! listing) run inside a single PostgreSQL transaction. A failure at any
//! step rolls back the earlier steps.

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::listing::{
    CreateListingRequest, Listing, ListingPrice, PriceInput, UpdateListingRequest,
};
use crate::services::listing_filter::{ListingFilter, Tiers, filter_and_partition};
use crate::services::validation::{optional_text, required_text, validate_media_url};

const LISTING_COLUMNS: &str = "id, title, description, category_id, city_id, age, height_cm, \
     weight_kg, hair_color, phone, image_url, is_premium, is_vip, is_active, created_at, updated_at";

const MAX_TITLE_CHARS: usize = 200;

/// Validate the optional physical descriptors and image URL.
fn validate_attributes(
    age: Option<i32>,
    height_cm: Option<i32>,
    weight_kg: Option<i32>,
    image_url: Option<&str>,
) -> Result<(), AppError> {
    if age.is_some_and(|a| a < 18) {
        return Err(AppError::InvalidRequest("age must be at least 18".to_string()));
    }

    if height_cm.is_some_and(|h| h <= 0) {
        return Err(AppError::InvalidRequest(
            "height_cm must be positive".to_string(),
        ));
    }

    if weight_kg.is_some_and(|w| w <= 0) {
        return Err(AppError::InvalidRequest(
            "weight_kg must be positive".to_string(),
        ));
    }

    if let Some(url) = image_url {
        validate_media_url("image_url", url)?;
    }

    Ok(())
}

/// Apply a nullable update. `None` leaves the field as is; `Some(None)` clears it.
fn set_nullable<T>(current: &mut Option<T>, update: Option<Option<T>>) {
    if let Some(value) = update {
        *current = value;
    }
}

/// Validate pricing rows.
fn validate_prices(prices: &[PriceInput]) -> Result<(), AppError> {
    for price in prices {
        required_text("price label", &price.label, 100)?;

        if price.amount_cents <= 0 {
            return Err(AppError::InvalidRequest(
                "Price amount must be positive".to_string(),
            ));
        }

        if price.currency.len() != 3 || !price.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(AppError::InvalidRequest(format!(
                "Invalid currency code: {}",
                price.currency
            )));
        }
    }

    Ok(())
}

/// Fetch every active listing, newest first.
pub async fn fetch_active_listings(pool: &DbPool) -> Result<Vec<Listing>, AppError> {
    let listings = sqlx::query_as::<_, Listing>(&format!(
        "SELECT {} FROM listings WHERE is_active = true ORDER BY created_at DESC",
        LISTING_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(listings)
}

/// Build the public listing index.
///
/// # Process
///
/// 1. Fetch all active listings into memory (no pagination)
/// 2. Keep the listings matching every active filter
/// 3. Stable-partition them into premium / vip / normal
pub async fn public_index(pool: &DbPool, filter: &ListingFilter) -> Result<Tiers<Listing>, AppError> {
    let listings = fetch_active_listings(pool).await?;
    let fetched = listings.len();

    let tiers = filter_and_partition(listings, filter);

    tracing::debug!(
        fetched,
        matched = tiers.len(),
        premium = tiers.premium.len(),
        vip = tiers.vip.len(),
        "Listing index built"
    );

    Ok(tiers)
}

/// Fetch any listing by ID (admin).
pub async fn get_listing(pool: &DbPool, listing_id: Uuid) -> Result<Listing, AppError> {
    sqlx::query_as::<_, Listing>(&format!(
        "SELECT {} FROM listings WHERE id = $1",
        LISTING_COLUMNS
    ))
    .bind(listing_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::ListingNotFound)
}

/// Fetch a listing visible on the public site.
///
/// Inactive listings are reported as not found.
pub async fn get_active_listing(pool: &DbPool, listing_id: Uuid) -> Result<Listing, AppError> {
    let listing = get_listing(pool, listing_id).await?;

    if !listing.is_active {
        return Err(AppError::ListingNotFound);
    }

    Ok(listing)
}

/// Pricing rows of a listing, in creation order.
pub async fn prices_for(pool: &DbPool, listing_id: Uuid) -> Result<Vec<ListingPrice>, AppError> {
    let prices = sqlx::query_as::<_, ListingPrice>(
        r#"
        SELECT id, listing_id, label, amount_cents, currency, created_at
        FROM listing_prices
        WHERE listing_id = $1
        ORDER BY created_at, label
        "#,
    )
    .bind(listing_id)
    .fetch_all(pool)
    .await?;

    Ok(prices)
}

/// Fetch all listings including inactive ones, newest first (admin).
pub async fn list_all_listings(pool: &DbPool) -> Result<Vec<Listing>, AppError> {
    let listings = sqlx::query_as::<_, Listing>(&format!(
        "SELECT {} FROM listings ORDER BY created_at DESC",
        LISTING_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(listings)
}

/// Insert pricing rows inside an open transaction.
async fn insert_prices(
    tx: &mut sqlx::PgConnection,
    listing_id: Uuid,
    prices: Vec<PriceInput>,
) -> Result<Vec<ListingPrice>, AppError> {
    let mut inserted = Vec::with_capacity(prices.len());

    for price in prices {
        let row = sqlx::query_as::<_, ListingPrice>(
            r#"
            INSERT INTO listing_prices (listing_id, label, amount_cents, currency)
            VALUES ($1, $2, $3, $4)
            RETURNING id, listing_id, label, amount_cents, currency, created_at
            "#,
        )
        .bind(listing_id)
        .bind(price.label.trim())
        .bind(price.amount_cents)
        .bind(&price.currency)
        .fetch_one(&mut *tx)
        .await?;

        inserted.push(row);
    }

    Ok(inserted)
}

/// Create a listing together with its pricing rows.
///
/// # Process
///
/// 1. Validate listing fields and prices
/// 2. Start database transaction
/// 3. Insert listing
/// 4. Insert each price
/// 5. Commit (or rollback on error)
///
/// # Errors
///
/// - `InvalidRequest`: Validation failed, or category/city does not exist
/// - `Database`: Database error occurred
pub async fn create_listing(
    pool: &DbPool,
    request: CreateListingRequest,
) -> Result<(Listing, Vec<ListingPrice>), AppError> {
    let title = required_text("title", &request.title, MAX_TITLE_CHARS)?;
    let image_url = optional_text(request.image_url);
    validate_attributes(
        request.age,
        request.height_cm,
        request.weight_kg,
        image_url.as_deref(),
    )?;
    validate_prices(&request.prices)?;

    let mut tx = pool.begin().await?;

    let listing = sqlx::query_as::<_, Listing>(&format!(
        r#"
        INSERT INTO listings (
            title, description, category_id, city_id, age, height_cm, weight_kg,
            hair_color, phone, image_url, is_premium, is_vip, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {}
        "#,
        LISTING_COLUMNS
    ))
    .bind(title)
    .bind(optional_text(request.description))
    .bind(request.category_id)
    .bind(request.city_id)
    .bind(request.age)
    .bind(request.height_cm)
    .bind(request.weight_kg)
    .bind(optional_text(request.hair_color))
    .bind(optional_text(request.phone))
    .bind(image_url)
    .bind(request.is_premium)
    .bind(request.is_vip)
    .bind(request.is_active)
    .fetch_one(&mut *tx)
    .await?;

    let prices = insert_prices(&mut tx, listing.id, request.prices).await?;

    tx.commit().await?;

    tracing::info!(listing_id = %listing.id, prices = prices.len(), "Listing created");

    Ok((listing, prices))
}

/// Apply a partial update to a listing.
///
/// Absent fields are left untouched; an empty string clears an optional text
/// field. When `prices` is present the existing pricing rows are replaced.
///
/// # Process
///
/// 1. Start database transaction
/// 2. Lock the listing row (`FOR UPDATE`)
/// 3. Merge and validate the new values
/// 4. Write the listing, replace prices if requested
/// 5. Commit
pub async fn update_listing(
    pool: &DbPool,
    listing_id: Uuid,
    request: UpdateListingRequest,
) -> Result<(Listing, Vec<ListingPrice>), AppError> {
    if let Some(ref prices) = request.prices {
        validate_prices(prices)?;
    }

    let mut tx = pool.begin().await?;

    let mut listing = sqlx::query_as::<_, Listing>(&format!(
        "SELECT {} FROM listings WHERE id = $1 FOR UPDATE",
        LISTING_COLUMNS
    ))
    .bind(listing_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::ListingNotFound)?;

    if let Some(title) = request.title {
        listing.title = required_text("title", &title, MAX_TITLE_CHARS)?;
    }
    if let Some(description) = request.description {
        listing.description = optional_text(Some(description));
    }
    if let Some(hair_color) = request.hair_color {
        listing.hair_color = optional_text(Some(hair_color));
    }
    if let Some(phone) = request.phone {
        listing.phone = optional_text(Some(phone));
    }
    if let Some(image_url) = request.image_url {
        listing.image_url = optional_text(Some(image_url));
    }
    set_nullable(&mut listing.category_id, request.category_id);
    set_nullable(&mut listing.city_id, request.city_id);
    set_nullable(&mut listing.age, request.age);
    set_nullable(&mut listing.height_cm, request.height_cm);
    set_nullable(&mut listing.weight_kg, request.weight_kg);
    listing.is_premium = request.is_premium.unwrap_or(listing.is_premium);
    listing.is_vip = request.is_vip.unwrap_or(listing.is_vip);
    listing.is_active = request.is_active.unwrap_or(listing.is_active);

    validate_attributes(
        listing.age,
        listing.height_cm,
        listing.weight_kg,
        listing.image_url.as_deref(),
    )?;

    let listing = sqlx::query_as::<_, Listing>(&format!(
        r#"
        UPDATE listings
        SET title = $2, description = $3, category_id = $4, city_id = $5, age = $6,
            height_cm = $7, weight_kg = $8, hair_color = $9, phone = $10, image_url = $11,
            is_premium = $12, is_vip = $13, is_active = $14, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        LISTING_COLUMNS
    ))
    .bind(listing.id)
    .bind(&listing.title)
    .bind(&listing.description)
    .bind(listing.category_id)
    .bind(listing.city_id)
    .bind(listing.age)
    .bind(listing.height_cm)
    .bind(listing.weight_kg)
    .bind(&listing.hair_color)
    .bind(&listing.phone)
    .bind(&listing.image_url)
    .bind(listing.is_premium)
    .bind(listing.is_vip)
    .bind(listing.is_active)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(prices) = request.prices {
        sqlx::query("DELETE FROM listing_prices WHERE listing_id = $1")
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;

        insert_prices(&mut tx, listing_id, prices).await?;
    }

    tx.commit().await?;

    tracing::info!(%listing_id, "Listing updated");

    let prices = prices_for(pool, listing_id).await?;

    Ok((listing, prices))
}

/// Delete a listing and every row that references it.
///
/// # Process
///
/// Inside one transaction: messages → conversations → comments → stories →
/// prices → listing. Nothing is removed unless the listing itself is.
pub async fn delete_listing(pool: &DbPool, listing_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM messages WHERE conversation_id IN
         (SELECT id FROM conversations WHERE listing_id = $1)",
    )
    .bind(listing_id)
    .execute(&mut *tx)
    .await?;

    for table in ["conversations", "comments", "stories", "listing_prices"] {
        let removed = sqlx::query(&format!("DELETE FROM {} WHERE listing_id = $1", table))
            .bind(listing_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tracing::debug!(%listing_id, table, removed, "Dependent rows removed");
    }

    let deleted = sqlx::query("DELETE FROM listings WHERE id = $1")
        .bind(listing_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        tx.rollback().await?;
        return Err(AppError::ListingNotFound);
    }

    tx.commit().await?;

    tracing::info!(%listing_id, "Listing deleted");

    Ok(())
}
