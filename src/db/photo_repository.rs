// src/db/photo_repository.rs
// DOCUMENTATION: Wound photo database reads
// PURPOSE: Resolve a photo id to its stored path and owning physician

use crate::errors::GatewayError;
use crate::models::{PhotoAccess, PhotoRecord};
use async_trait::async_trait;
use sqlx::PgPool;

/// Photo lookup used by the serve endpoint
/// DOCUMENTATION: Read-only. Implemented over Postgres in production and
/// over an in-memory map in tests.
#[async_trait]
pub trait PhotoLookup: Send + Sync {
    /// Photo joined to its patient, or None when either row is missing
    async fn find_photo_access(&self, photo_id: &str)
        -> Result<Option<PhotoAccess>, GatewayError>;
}

pub struct PgPhotoRepository {
    pool: PgPool,
}

impl PgPhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every photo record, newest first
    /// DOCUMENTATION: Used by the audit CLI to check files on disk
    pub async fn list_photos(&self) -> Result<Vec<PhotoRecord>, GatewayError> {
        let photos = sqlx::query_as::<_, PhotoRecord>(
            r#"
            SELECT id, photo_path, patient_id, uploaded_at
            FROM wound_photos
            ORDER BY uploaded_at DESC NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list wound photos: {}", e);
            GatewayError::DatabaseError(format!("List photos failed: {}", e))
        })?;

        Ok(photos)
    }
}

#[async_trait]
impl PhotoLookup for PgPhotoRepository {
    async fn find_photo_access(
        &self,
        photo_id: &str,
    ) -> Result<Option<PhotoAccess>, GatewayError> {
        // Inner join: a photo whose patient is gone yields no row
        let access = sqlx::query_as::<_, PhotoAccess>(
            r#"
            SELECT wp.photo_path, wp.patient_id, p.user_id AS owner_user_id
            FROM wound_photos wp
            JOIN patients p ON p.id = wp.patient_id
            WHERE wp.id = $1
            "#,
        )
        .bind(photo_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch photo {}: {}", photo_id, e);
            GatewayError::DatabaseError(format!("Fetch photo failed: {}", e))
        })?;

        Ok(access)
    }
}
