//! Admin API key service.
//!
//! Handles issuing, listing, revoking and verifying admin keys. Only SHA-256
//! hashes of keys are stored; a plaintext key is returned once, when issued.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::api_key::{AdminKey, AdminKeyResponse, CreateAdminKeyRequest};
use crate::services::validation::required_text;

/// Hash a plaintext key into the 64-character hex form stored in the database.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate cryptographically secure random key.
///
/// # Output
///
/// 64 hex characters (32 random bytes)
fn generate_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Look up an active key by its plaintext value.
///
/// # Errors
///
/// - `InvalidApiKey`: No active key with this hash
pub async fn authenticate(pool: &DbPool, key: &str) -> Result<AdminKey, AppError> {
    let key_hash = hash_key(key);

    sqlx::query_as::<_, AdminKey>(
        "SELECT id, label, created_at, is_active
         FROM admin_keys
         WHERE key_hash = $1 AND is_active = true",
    )
    .bind(&key_hash)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidApiKey)
}

/// Issue a new admin key.
///
/// # Process
///
/// 1. Validate label
/// 2. Generate 32 random bytes as the key
/// 3. Store its hash
/// 4. Return the record with the plaintext key (only time it's shown)
pub async fn create_key(
    pool: &DbPool,
    request: CreateAdminKeyRequest,
) -> Result<AdminKeyResponse, AppError> {
    let label = required_text("label", &request.label, 100)?;
    let key = generate_key();

    let record = sqlx::query_as::<_, AdminKey>(
        r#"
        INSERT INTO admin_keys (key_hash, label)
        VALUES ($1, $2)
        RETURNING id, label, created_at, is_active
        "#,
    )
    .bind(hash_key(&key))
    .bind(label)
    .fetch_one(pool)
    .await
    .map_err(AppError::on_unique("Key collision, retry the request"))?;

    tracing::info!(key_id = %record.id, label = %record.label, "Admin key issued");

    Ok(AdminKeyResponse::from(record).with_key(key))
}

/// List all keys, newest first. Plaintext keys are never returned.
pub async fn list_keys(pool: &DbPool) -> Result<Vec<AdminKeyResponse>, AppError> {
    let keys = sqlx::query_as::<_, AdminKey>(
        "SELECT id, label, created_at, is_active FROM admin_keys ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(keys.into_iter().map(Into::into).collect())
}

/// Revoke a key (soft delete).
///
/// A caller may not revoke the key it is authenticated with.
pub async fn revoke_key(pool: &DbPool, caller_key_id: Uuid, key_id: Uuid) -> Result<(), AppError> {
    if caller_key_id == key_id {
        return Err(AppError::InvalidRequest(
            "Cannot revoke the key used for this request".to_string(),
        ));
    }

    let result = sqlx::query("UPDATE admin_keys SET is_active = false WHERE id = $1")
        .bind(key_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Admin key"));
    }

    tracing::info!(%key_id, "Admin key revoked");

    Ok(())
}

/// Register the bootstrap key from configuration if its hash is not stored yet.
///
/// Returns `true` when a new row was inserted.
pub async fn ensure_bootstrap_key(pool: &DbPool, key: &str) -> Result<bool, AppError> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO admin_keys (key_hash, label)
        VALUES ($1, 'bootstrap')
        ON CONFLICT (key_hash) DO NOTHING
        "#,
    )
    .bind(hash_key(key))
    .execute(pool)
    .await?
    .rows_affected();

    Ok(inserted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_sha256_hex() {
        assert_eq!(
            hash_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn generated_keys_are_unique_hex() {
        let a = generate_key();
        let b = generate_key();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn response_hides_key_unless_attached() {
        let record = AdminKey {
            id: Uuid::new_v4(),
            label: "ops".into(),
            created_at: chrono::Utc::now(),
            is_active: true,
        };

        let plain = serde_json::to_value(AdminKeyResponse::from(record.clone())).unwrap();
        assert!(plain.get("key").is_none());
        assert!(plain.get("key_hash").is_none());

        let issued =
            serde_json::to_value(AdminKeyResponse::from(record).with_key("k".into())).unwrap();
        assert_eq!(issued["key"], "k");
    }
}
