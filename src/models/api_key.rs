//! Admin API key model for authentication.
//!
//! Admin panel requests carry a bearer key. Keys are stored in the database as SHA-256 hashes; the plaintext is shown once, at creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an admin key record from the database.
///
/// # Database Table
///
/// Maps to the `admin_keys` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `key_hash`: SHA-256 hash of the actual key (only used in lookups, never loaded)
/// - `label`: Who or what the key was issued to
/// - `created_at`: When the key was created
/// - `is_active`: Whether the key is currently valid
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminKey {
    pub id: Uuid,

    /// Who or what the key was issued to
    pub label: String,

    pub created_at: DateTime<Utc>,

    /// Revoked keys are rejected during authentication but kept for audit.
    pub is_active: bool,
}

/// Request to issue a new admin key.
///
/// ```json
/// { "label": "moderator laptop" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateAdminKeyRequest {
    pub label: String,
}

/// Admin key as returned to the admin panel.
///
/// `key` is only present in the creation response.
#[derive(Debug, Serialize)]
pub struct AdminKeyResponse {
    pub id: Uuid,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AdminKey> for AdminKeyResponse {
    fn from(key: AdminKey) -> Self {
        Self {
            id: key.id,
            label: key.label,
            key: None,
            is_active: key.is_active,
            created_at: key.created_at,
        }
    }
}

impl AdminKeyResponse {
    /// Attach the plaintext key (only for issuance).
    pub fn with_key(mut self, key: String) -> Self {
        self.key = Some(key);
        self
    }
}
