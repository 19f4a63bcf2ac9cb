// src/models/photo.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::errors::GatewayError;

/// Wound photo reference as stored in `wound_photos`
/// Written by the upload workflows; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PhotoRecord {
    pub id: String,
    /// Relative path, e.g. `uploads/wound_photos/abc.jpg`
    pub photo_path: String,
    pub patient_id: String,
    /// `TIMESTAMP` without time zone in the portal schema
    pub uploaded_at: Option<NaiveDateTime>,
}

/// Patient row, reduced to the columns the gateway needs
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PatientRecord {
    pub id: String,
    /// Physician who registered the patient (`patients.user_id`)
    #[sqlx(rename = "user_id")]
    pub owner_user_id: Option<String>,
}

/// Photo joined to its patient
/// DOCUMENTATION: One row per photo whose patient still exists.
/// A photo without a patient never produces a PhotoAccess.
/// A patient without an owner is reachable by superadmins only.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PhotoAccess {
    pub photo_path: String,
    pub patient_id: String,
    pub owner_user_id: Option<String>,
}

impl PhotoAccess {
    /// Join a photo to its patient; None when they do not belong together
    pub fn join(photo: &PhotoRecord, patient: &PatientRecord) -> Option<Self> {
        if photo.patient_id != patient.id {
            return None;
        }

        Some(Self {
            photo_path: photo.photo_path.clone(),
            patient_id: patient.id.clone(),
            owner_user_id: patient.owner_user_id.clone(),
        })
    }
}

/// Query string of the serve endpoint: `?id=<photo id>`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PhotoQuery {
    #[validate(length(max = 64))]
    pub id: Option<String>,
}

impl PhotoQuery {
    /// Requested photo id, trimmed
    /// DOCUMENTATION: Missing or blank ids are a bad request, as are ids
    /// longer than the VARCHAR(64) primary key could ever hold
    pub fn photo_id(&self) -> Result<&str, GatewayError> {
        let id = self.id.as_deref().map(str::trim).unwrap_or("");
        if id.is_empty() {
            return Err(GatewayError::BadRequest("Photo ID required".to_string()));
        }

        if self.validate().is_err() {
            return Err(GatewayError::BadRequest("Invalid photo ID".to_string()));
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(id: Option<&str>) -> PhotoQuery {
        PhotoQuery {
            id: id.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_or_blank_id_is_bad_request() {
        for q in [query(None), query(Some("")), query(Some("   "))] {
            match q.photo_id() {
                Err(GatewayError::BadRequest(msg)) => assert_eq!(msg, "Photo ID required"),
                other => panic!("expected BadRequest, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_overlong_id_is_rejected() {
        let long = "x".repeat(65);
        assert!(matches!(
            query(Some(&long)).photo_id(),
            Err(GatewayError::BadRequest(_))
        ));
    }

    #[test]
    fn test_id_is_trimmed() {
        assert_eq!(query(Some(" wp_123 ")).photo_id().unwrap(), "wp_123");
    }
}
