//! Category and city HTTP handlers.
//!
//! - GET /api/v1/categories, GET /api/v1/cities - public, ordered by name
//! - POST / DELETE under /admin/v1/categories and /admin/v1/cities

use crate::{
    error::AppError,
    models::catalog::{Category, City, CreateCategoryRequest, CreateCityRequest},
    services::catalog_service,
    state::AppState,
};
use crate::extract::{Json, Path};
use axum::{extract::State, http::StatusCode};
use uuid::Uuid;

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(catalog_service::list_categories(&state.pool).await?))
}

/// Create a category.
///
/// # Response
///
/// - **Success (201 Created)**
/// - **Error (400)**: Blank name
/// - **Error (409)**: Name or slug already exists
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = catalog_service::create_category(&state.pool, request).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    catalog_service::delete_category(&state.pool, category_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_cities(State(state): State<AppState>) -> Result<Json<Vec<City>>, AppError> {
    Ok(Json(catalog_service::list_cities(&state.pool).await?))
}

pub async fn create_city(
    State(state): State<AppState>,
    Json(request): Json<CreateCityRequest>,
) -> Result<(StatusCode, Json<City>), AppError> {
    let city = catalog_service::create_city(&state.pool, request).await?;

    Ok((StatusCode::CREATED, Json(city)))
}

pub async fn delete_city(
    State(state): State<AppState>,
    Path(city_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    catalog_service::delete_city(&state.pool, city_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
