//! Listing HTTP handlers.
//!
//! Public site:
//! - GET /api/v1/listings - Filtered listing index split into tiers
//! - GET /api/v1/listings/{id} - Listing detail with prices
//!
//! Admin panel:
//! - GET /admin/v1/listings - All listings, including inactive
//! - GET /admin/v1/listings/{id} - Any listing with prices
//! - POST /admin/v1/listings - Create listing with prices
//! - PUT /admin/v1/listings/{id} - Partial update
//! - DELETE /admin/v1/listings/{id} - Delete listing and dependent rows

use crate::{
    error::AppError,
    middleware::auth::AdminContext,
    models::listing::{
        AdminListingResponse, CreateListingRequest, Listing, ListingDetailResponse, ListingResponse,
        TieredListingsResponse, UpdateListingRequest,
    },
    services::{
        listing_filter::{ListingFilter, ListingFilterParams},
        listing_service,
    },
    state::AppState,
};
use crate::extract::{Json, Path, Query};
use axum::{Extension, extract::State, http::StatusCode};
use uuid::Uuid;

/// Public listing index.
///
/// # Query Parameters
///
/// All optional; `all` or an empty value disables a filter.
///
/// - `city`, `category` - UUID
/// - `age` - `18-25` | `26-35` | `36-45` | `46+`
/// - `height` - `short` | `medium` | `tall`
/// - `weight` - `slim` | `average` | `curvy`
/// - `hair_color` - exact color, case-insensitive
/// - `q` - substring of title or description, case-insensitive
///
/// # Response
///
/// - **Success (200 OK)**: Listings split into `premium`, `vip` and `normal`, each newest first
/// - **Error (400)**: Unknown filter value
///
/// The filter is parsed before the database is queried.
pub async fn list_listings(
    State(state): State<AppState>,
    Query(params): Query<ListingFilterParams>,
) -> Result<Json<TieredListingsResponse>, AppError> {
    let filter = ListingFilter::from_params(&params)?;

    let tiers = listing_service::public_index(&state.pool, &filter)
        .await?
        .map(ListingResponse::from);

    Ok(Json(TieredListingsResponse {
        total: tiers.len(),
        premium: tiers.premium,
        vip: tiers.vip,
        normal: tiers.normal,
    }))
}

/// Listing detail page.
///
/// Returns 404 for missing or inactive listings.
pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ListingDetailResponse>, AppError> {
    let listing = listing_service::get_active_listing(&state.pool, listing_id).await?;
    let prices = listing_service::prices_for(&state.pool, listing_id).await?;

    Ok(Json(ListingDetailResponse {
        listing: listing.into(),
        prices: prices.into_iter().map(Into::into).collect(),
    }))
}

/// All listings for the admin table, newest first.
pub async fn admin_list_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = listing_service::list_all_listings(&state.pool).await?;

    Ok(Json(listings))
}

/// Any listing with its prices, for the admin edit form.
pub async fn admin_get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<AdminListingResponse>, AppError> {
    let listing = listing_service::get_listing(&state.pool, listing_id).await?;
    let prices = listing_service::prices_for(&state.pool, listing_id).await?;

    Ok(Json(AdminListingResponse {
        listing,
        prices: prices.into_iter().map(Into::into).collect(),
    }))
}

/// Create a listing.
///
/// # Request Body
///
/// See `CreateListingRequest`.
///
/// # Response
///
/// - **Success (201 Created)**: The listing with its prices
/// - **Error (400)**: Validation failed or unknown category/city
/// - **Error (401)**: Invalid admin key
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Json(request): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<AdminListingResponse>), AppError> {
    let (listing, prices) = listing_service::create_listing(&state.pool, request).await?;

    tracing::info!(listing_id = %listing.id, admin = %admin.label, "Admin created listing");

    Ok((
        StatusCode::CREATED,
        Json(AdminListingResponse {
            listing,
            prices: prices.into_iter().map(Into::into).collect(),
        }),
    ))
}

/// Partially update a listing.
pub async fn update_listing(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(listing_id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<AdminListingResponse>, AppError> {
    let (listing, prices) =
        listing_service::update_listing(&state.pool, listing_id, request).await?;

    tracing::info!(%listing_id, admin = %admin.label, "Admin updated listing");

    Ok(Json(AdminListingResponse {
        listing,
        prices: prices.into_iter().map(Into::into).collect(),
    }))
}

/// Delete a listing with its prices, comments, stories and conversations.
///
/// Returns 204 No Content on success, 404 if the listing does not exist.
pub async fn delete_listing(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(listing_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    listing_service::delete_listing(&state.pool, listing_id).await?;

    tracing::info!(%listing_id, admin = %admin.label, "Admin deleted listing");

    Ok(StatusCode::NO_CONTENT)
}
