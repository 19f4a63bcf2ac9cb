// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the photo gateway

use actix_web::{error::ResponseError, http::header::ContentType, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Gateway error types
/// DOCUMENTATION: Every terminal outcome of a photo request other than success
/// Each variant maps to a status code and a short plain-text body.
/// Internal details (SQL errors, filesystem paths) never reach the client.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("Access denied")]
    Forbidden,

    #[error("Photo not found")]
    PhotoNotFound,

    #[error("Photo file not found on server")]
    FileNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl GatewayError {
    /// Body sent to the client
    fn client_message(&self) -> String {
        match self {
            GatewayError::DatabaseError(_)
            | GatewayError::StorageError(_)
            | GatewayError::InternalError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(e: sqlx::Error) -> Self {
        GatewayError::DatabaseError(e.to_string())
    }
}

/// Convert GatewayError to HTTP response
/// DOCUMENTATION: Plain-text body, never cached
impl ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("Request failed: {}", self);
        }

        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .insert_header(("Cache-Control", "no-store"))
            .body(self.client_message())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::PhotoNotFound => StatusCode::NOT_FOUND,
            GatewayError::FileNotFound => StatusCode::NOT_FOUND,
            GatewayError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    fn body_text(err: &GatewayError) -> String {
        let bytes = err.error_response().into_body().try_into_bytes().unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            GatewayError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(GatewayError::PhotoNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(GatewayError::FileNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = GatewayError::StorageError("/var/www/html/uploads/a.jpg: EACCES".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(&err), "Internal server error");
    }

    #[test]
    fn test_plain_text_bodies() {
        assert_eq!(body_text(&GatewayError::Unauthorized), "Unauthorized");
        assert_eq!(body_text(&GatewayError::Forbidden), "Access denied");
        assert_eq!(
            body_text(&GatewayError::BadRequest("Photo ID required".into())),
            "Photo ID required"
        );
        assert_eq!(body_text(&GatewayError::FileNotFound), "Photo file not found on server");
    }
}
