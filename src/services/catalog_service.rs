//! Category and city catalog service.

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::catalog::{Category, City, CreateCategoryRequest, CreateCityRequest};
use crate::services::validation::required_text;

/// Derive a URL-safe slug: lowercase ASCII alphanumerics, every other run of
/// characters collapsed into a single `-`.
///
/// Turkish letters are folded to their ASCII counterparts first so that
/// "İstanbul Güzelleri" becomes `istanbul-guzelleri`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars() {
        let folded = match c {
            'ç' | 'Ç' => 'c',
            'ğ' | 'Ğ' => 'g',
            'ı' | 'İ' => 'i',
            'ö' | 'Ö' => 'o',
            'ş' | 'Ş' => 's',
            'ü' | 'Ü' => 'u',
            other => other.to_ascii_lowercase(),
        };

        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(folded);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub async fn list_categories(pool: &DbPool) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, created_at FROM categories ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Create a category.
///
/// # Errors
///
/// - `InvalidRequest`: Blank name, or a slug with no usable characters
/// - `Conflict`: Name or slug already taken
pub async fn create_category(
    pool: &DbPool,
    request: CreateCategoryRequest,
) -> Result<Category, AppError> {
    let name = required_text("name", &request.name, 100)?;
    let slug = slugify(request.slug.as_deref().unwrap_or(&name));

    if slug.is_empty() {
        return Err(AppError::InvalidRequest(
            "slug must contain letters or digits".to_string(),
        ));
    }

    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, slug)
        VALUES ($1, $2)
        RETURNING id, name, slug, created_at
        "#,
    )
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
    .map_err(AppError::on_unique("A category with this name or slug already exists"))?;

    Ok(category)
}

/// Delete a category. Listings referencing it keep existing with no category.
pub async fn delete_category(pool: &DbPool, category_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Category"));
    }

    Ok(())
}

pub async fn list_cities(pool: &DbPool) -> Result<Vec<City>, AppError> {
    let cities = sqlx::query_as::<_, City>("SELECT id, name, created_at FROM cities ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(cities)
}

/// Create a city.
///
/// # Errors
///
/// - `InvalidRequest`: Blank name
/// - `Conflict`: Name already taken
pub async fn create_city(pool: &DbPool, request: CreateCityRequest) -> Result<City, AppError> {
    let name = required_text("name", &request.name, 100)?;

    let city = sqlx::query_as::<_, City>(
        "INSERT INTO cities (name) VALUES ($1) RETURNING id, name, created_at",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(AppError::on_unique("A city with this name already exists"))?;

    Ok(city)
}

/// Delete a city. Listings referencing it keep existing with no city.
pub async fn delete_city(pool: &DbPool, city_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM cities WHERE id = $1")
        .bind(city_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("City"));
    }

    Ok(())
}
