// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, storage, and start HTTP server

use actix_web::{middleware::Logger, web, App, HttpServer};
use collagen_photos::auth::SessionVerifier;
use collagen_photos::config::{self, Config};
use collagen_photos::db::{PgPhotoRepository, PhotoLookup};
use collagen_photos::handlers::{self, CacheSettings};
use collagen_photos::services::PhotoStorage;
use dotenv::dotenv;
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    // Serving photos without a session secret would reject every caller
    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting collagen-photos gateway...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Shared request state
    let lookup: Arc<dyn PhotoLookup> = Arc::new(PgPhotoRepository::new(pool));
    let lookup = web::Data::from(lookup);
    let storage = web::Data::new(PhotoStorage::from_config(&config));
    let verifier = web::Data::new(SessionVerifier::new(
        &config.session_secret,
        config.session_cookie.clone(),
    ));
    let cache = web::Data::new(CacheSettings::from_config(&config));

    log::info!(
        "Photo storage root: {} ({} legacy roots, migrate on access: {})",
        config.photo_storage_root.display(),
        config.photo_legacy_roots.len(),
        config.photo_migrate_on_access
    );

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(lookup.clone())
            .app_data(storage.clone())
            .app_data(verifier.clone())
            .app_data(cache.clone())
            // Middleware
            .wrap(Logger::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::photos_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
