// src/bin/photo_audit.rs
// Operator tool for wound photo storage: reports where every stored photo
// resolves, migrates legacy files into the canonical root, and mints
// development session tokens.
use anyhow::{bail, Context, Result};
use chrono::Duration;
use collagen_photos::auth::SessionVerifier;
use collagen_photos::config::{self, Config};
use collagen_photos::db::PgPhotoRepository;
use collagen_photos::models::PhotoRecord;
use collagen_photos::services::{MigrationOutcome, PhotoStorage, RootKind};
use dotenv::dotenv;
use std::env;

// --- ANSI colors ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

const USAGE: &str = "usage: photo-audit <check | migrate | token <user_id> [role]>";

#[derive(Debug, Default, PartialEq, Eq)]
struct AuditTotals {
    canonical: usize,
    legacy: usize,
    missing: usize,
    rejected: usize,
}

impl AuditTotals {
    fn total(&self) -> usize {
        self.canonical + self.legacy + self.missing + self.rejected
    }

    fn record(&mut self, located: &Result<Option<RootKind>, ()>) {
        match located {
            Ok(Some(RootKind::Canonical)) => self.canonical += 1,
            Ok(Some(RootKind::Legacy(_))) => self.legacy += 1,
            Ok(None) => self.missing += 1,
            Err(()) => self.rejected += 1,
        }
    }
}

async fn check(storage: &PhotoStorage, photos: &[PhotoRecord]) -> AuditTotals {
    let mut totals = AuditTotals::default();

    for photo in photos {
        let located = storage
            .locate(&photo.photo_path)
            .await
            .map(|found| found.map(|f| f.kind))
            .map_err(|_| ());

        match &located {
            Ok(Some(RootKind::Canonical)) => {}
            Ok(Some(RootKind::Legacy(index))) => println!(
                "{}⚠️  {} legacy ({}): {}{}",
                YELLOW,
                photo.id,
                storage.legacy_roots()[*index].display(),
                photo.photo_path,
                RESET
            ),
            Ok(None) => println!(
                "{}❌ {} missing (patient {}): {}{}",
                RED, photo.id, photo.patient_id, photo.photo_path, RESET
            ),
            Err(()) => println!(
                "{}❌ {} unusable path: {:?}{}",
                RED, photo.id, photo.photo_path, RESET
            ),
        }

        totals.record(&located);
    }

    totals
}

async fn migrate(storage: &PhotoStorage, photos: &[PhotoRecord]) -> (usize, usize) {
    let mut copied = 0;
    let mut failed = 0;

    for photo in photos {
        match storage.migrate_legacy(&photo.photo_path).await {
            Ok(MigrationOutcome::Copied { from, to }) => {
                copied += 1;
                println!(
                    "{}✅ {}: {} -> {}{}",
                    GREEN,
                    photo.id,
                    from.display(),
                    to.display(),
                    RESET
                );
            }
            Ok(MigrationOutcome::AlreadyCanonical) | Ok(MigrationOutcome::Missing) => {}
            Err(e) => {
                failed += 1;
                println!("{}❌ {}: {}{}", RED, photo.id, e, RESET);
            }
        }
    }

    (copied, failed)
}

fn print_totals(storage: &PhotoStorage, totals: &AuditTotals) {
    println!("\n{}📋 Photo Storage Summary{}", BOLD, RESET);
    println!("──────────────────────────────────────────────────────────────");
    println!("  • Canonical root: {}", storage.canonical_root().display());
    println!("  • Photos in database: {}", totals.total());
    println!("  • Canonical: {}{}{}", GREEN, totals.canonical, RESET);
    println!("  • Legacy only: {}{}{}", YELLOW, totals.legacy, RESET);
    println!("  • Missing on disk: {}{}{}", RED, totals.missing, RESET);
    println!("  • Unusable paths: {}{}{}", RED, totals.rejected, RESET);
    if totals.legacy > 0 {
        println!("\n{}Run `photo-audit migrate` to copy legacy files.{}", CYAN, RESET);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env();

    match args.first().map(String::as_str) {
        Some("token") => {
            let user_id = args.get(1).context(USAGE)?;
            if config.session_secret.is_empty() {
                bail!("SESSION_SECRET must be set in .env");
            }
            let verifier = SessionVerifier::new(&config.session_secret, config.session_cookie);
            let token = verifier.issue(user_id, args.get(2).map(String::as_str), Duration::hours(24))?;
            println!("{}", token);
        }
        Some(command @ ("check" | "migrate")) => {
            let pool = config::init_db_pool(&config)
                .await
                .context("Failed to connect to database")?;
            let storage = PhotoStorage::from_config(&config);
            let photos = PgPhotoRepository::new(pool).list_photos().await?;

            println!("\n{}🔍 Checking {} wound photos...{}\n", CYAN, photos.len(), RESET);

            if command == "migrate" {
                let (copied, failed) = migrate(&storage, &photos).await;
                println!(
                    "\n{}✨ Migration finished: {} copied, {} failed{}",
                    BOLD, copied, failed, RESET
                );
            }

            let totals = check(&storage, &photos).await;
            print_totals(&storage, &totals);
        }
        _ => bail!(USAGE),
    }

    Ok(())
}
