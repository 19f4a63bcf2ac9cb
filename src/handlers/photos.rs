// src/handlers/photos.rs
// DOCUMENTATION: HTTP handler for wound photo serving
// PURPOSE: Authenticate, parse the photo id, call the gateway, stream bytes

use crate::config::Config;
use crate::db::PhotoLookup;
use crate::errors::GatewayError;
use crate::models::{AuthContext, PhotoQuery};
use crate::services::{PhotoService, PhotoStorage};
use actix_web::{body::SizedStream, http::header, web, HttpRequest, HttpResponse};

/// Cache policy for served photos
/// Photos are per-user medical data: private caches only.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub max_age: u32,
}

impl CacheSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_age: config.photo_cache_max_age,
        }
    }

    pub fn header_value(&self) -> String {
        format!("private, max-age={}", self.max_age)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { max_age: 3600 }
    }
}

/// GET /serve-wound-photo?id={photo_id}
/// Serve a wound photo to its owning physician or a superadmin
///
/// DOCUMENTATION: Session is checked before anything else, so an
/// unauthenticated caller gets 401 whatever the query string holds.
pub async fn serve_wound_photo(
    auth: Result<AuthContext, GatewayError>,
    req: HttpRequest,
    lookup: web::Data<dyn PhotoLookup>,
    storage: web::Data<PhotoStorage>,
    cache: web::Data<CacheSettings>,
) -> Result<HttpResponse, GatewayError> {
    let ctx = auth?;

    // Unparseable query strings are treated as a missing id
    let query = web::Query::<PhotoQuery>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();
    let photo_id = query.photo_id()?;

    let photo =
        PhotoService::fetch_photo(lookup.get_ref(), storage.get_ref(), &ctx, photo_id).await?;

    let len = photo.len;
    let mime = photo.mime;

    Ok(HttpResponse::Ok()
        .content_type(mime)
        .insert_header((header::CACHE_CONTROL, cache.header_value()))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .body(SizedStream::new(len, photo.into_stream())))
}

/// Configuration for photo routes
/// The portal and admin pages link to their own entry points; all of them
/// share one handler and one authorization rule.
pub fn config(cfg: &mut web::ServiceConfig) {
    for path in [
        "/serve-wound-photo",
        "/portal/serve-wound-photo",
        "/portal/serve-wound-photo.php",
        "/admin/serve-wound-photo",
        "/admin/serve-wound-photo.php",
    ] {
        cfg.route(path, web::get().to(serve_wound_photo));
    }
}
