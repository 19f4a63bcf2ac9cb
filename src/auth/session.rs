// src/auth/session.rs
// DOCUMENTATION: Session token verification
// PURPOSE: Turn an incoming request into an explicit AuthContext

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::GatewayError;
use crate::models::{AuthContext, Role, DEFAULT_ROLE};

/// Claims carried by a portal session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id (`users.id`)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 session verifier
/// DOCUMENTATION: Registered once as app data; shared by all workers.
/// Tokens are read from `Authorization: Bearer` first, then from the
/// session cookie.
pub struct SessionVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
}

impl SessionVerifier {
    pub fn new(secret: &str, cookie_name: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            cookie_name: cookie_name.into(),
        }
    }

    /// Mint a token for a user
    /// The portal login flow owns real sessions; this serves the audit CLI
    /// and tests.
    pub fn issue(
        &self,
        user_id: &str,
        role: Option<&str>,
        ttl: Duration,
    ) -> Result<String, GatewayError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            role: role.map(str::to_string),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| GatewayError::InternalError(format!("Token generation failed: {}", e)))
    }

    /// Decode and check a raw token
    pub fn verify(&self, token: &str) -> Result<AuthContext, GatewayError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                log::debug!("Rejected session token: {}", e);
                GatewayError::Unauthorized
            })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(GatewayError::Unauthorized);
        }

        let role = claims
            .role
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        Ok(AuthContext {
            user_id: claims.sub,
            role: Role::from(role),
        })
    }

    /// Authenticate a request
    pub fn authenticate(&self, req: &HttpRequest) -> Result<AuthContext, GatewayError> {
        let token = self.extract_token(req).ok_or(GatewayError::Unauthorized)?;
        self.verify(&token)
    }

    fn extract_token(&self, req: &HttpRequest) -> Option<String> {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(token) = bearer {
            return Some(token.to_string());
        }

        req.cookie(&self.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Extract the caller from the registered SessionVerifier
impl FromRequest for AuthContext {
    type Error = GatewayError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<SessionVerifier>>() {
            Some(verifier) => verifier.authenticate(req),
            None => {
                log::error!("SessionVerifier not registered - rejecting request");
                Err(GatewayError::Unauthorized)
            }
        };

        ready(result)
    }
}
