// src/services/storage.rs
// DOCUMENTATION: Photo file resolution
// PURPOSE: Map a stored relative photo path to a file on disk

use crate::config::Config;
use crate::errors::GatewayError;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Where a photo file was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Canonical,
    /// Index into the configured legacy roots
    Legacy(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPhoto {
    pub path: PathBuf,
    pub kind: RootKind,
}

/// Result of moving a legacy file under the canonical root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    AlreadyCanonical,
    Copied { from: PathBuf, to: PathBuf },
    Missing,
}

/// Photo storage layout
/// DOCUMENTATION: Stored paths are relative to one canonical root. Older
/// deployments wrote files under other prefixes; those are listed as
/// legacy roots and probed after the canonical one, in order. With
/// migrate_on_access, a legacy hit is copied into the canonical root so
/// the legacy roots can eventually be dropped.
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    canonical_root: PathBuf,
    legacy_roots: Vec<PathBuf>,
    migrate_on_access: bool,
}

impl PhotoStorage {
    pub fn new(
        canonical_root: impl Into<PathBuf>,
        legacy_roots: Vec<PathBuf>,
        migrate_on_access: bool,
    ) -> Self {
        Self {
            canonical_root: canonical_root.into(),
            legacy_roots,
            migrate_on_access,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.photo_storage_root.clone(),
            config.photo_legacy_roots.clone(),
            config.photo_migrate_on_access,
        )
    }

    pub fn canonical_root(&self) -> &Path {
        &self.canonical_root
    }

    pub fn legacy_roots(&self) -> &[PathBuf] {
        &self.legacy_roots
    }

    /// Turn a stored path into a relative path that cannot leave a root
    /// DOCUMENTATION: Leading slashes are stripped (rows written by the
    /// portal upload use `/uploads/...`). Parent components or prefixes
    /// make the path unusable.
    pub fn normalize(stored: &str) -> Result<PathBuf, GatewayError> {
        let trimmed = stored.trim().trim_start_matches('/');
        let mut relative = PathBuf::new();

        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    log::error!("[serve-wound-photo] Rejected stored photo path: {:?}", stored);
                    return Err(GatewayError::FileNotFound);
                }
            }
        }

        if relative.as_os_str().is_empty() {
            log::error!("[serve-wound-photo] Empty stored photo path");
            return Err(GatewayError::FileNotFound);
        }

        Ok(relative)
    }

    /// Candidate files in probe order: canonical root, then legacy roots
    pub fn candidates(&self, stored: &str) -> Result<Vec<(RootKind, PathBuf)>, GatewayError> {
        let relative = Self::normalize(stored)?;

        let mut candidates = Vec::with_capacity(1 + self.legacy_roots.len());
        candidates.push((RootKind::Canonical, self.canonical_root.join(&relative)));
        for (index, root) in self.legacy_roots.iter().enumerate() {
            candidates.push((RootKind::Legacy(index), root.join(&relative)));
        }

        Ok(candidates)
    }

    /// First candidate that is a regular file, without side effects
    pub async fn locate(&self, stored: &str) -> Result<Option<ResolvedPhoto>, GatewayError> {
        for (kind, path) in self.candidates(stored)? {
            if is_file(&path).await {
                return Ok(Some(ResolvedPhoto { path, kind }));
            }
        }

        Ok(None)
    }

    /// Resolve a stored path for serving
    /// DOCUMENTATION: A miss is logged with every attempted path so
    /// operators can diagnose it; the client only sees a generic 404.
    pub async fn resolve(&self, stored: &str) -> Result<ResolvedPhoto, GatewayError> {
        let found = match self.locate(stored).await? {
            Some(found) => found,
            None => {
                let tried: Vec<String> = self
                    .candidates(stored)?
                    .iter()
                    .map(|(_, p)| p.display().to_string())
                    .collect();
                log::error!(
                    "[serve-wound-photo] File not found. Tried: {}",
                    tried.join(", ")
                );
                log::error!("[serve-wound-photo] Photo path from DB: {}", stored);
                return Err(GatewayError::FileNotFound);
            }
        };

        if let RootKind::Legacy(index) = found.kind {
            log::info!(
                "[serve-wound-photo] Served from legacy root {}: {}",
                self.legacy_roots[index].display(),
                stored
            );

            if self.migrate_on_access {
                if let Err(e) = self.copy_to_canonical(stored, &found.path).await {
                    log::warn!("[serve-wound-photo] Legacy migration failed for {}: {}", stored, e);
                }
            }
        }

        Ok(found)
    }

    /// Copy a legacy file under the canonical root
    /// DOCUMENTATION: Idempotent; used by the audit CLI for bulk moves.
    /// The legacy copy is left in place.
    pub async fn migrate_legacy(&self, stored: &str) -> Result<MigrationOutcome, GatewayError> {
        match self.locate(stored).await? {
            None => Ok(MigrationOutcome::Missing),
            Some(ResolvedPhoto {
                kind: RootKind::Canonical,
                ..
            }) => Ok(MigrationOutcome::AlreadyCanonical),
            Some(ResolvedPhoto { path, .. }) => {
                let to = self.copy_to_canonical(stored, &path).await?;
                Ok(MigrationOutcome::Copied { from: path, to })
            }
        }
    }

    async fn copy_to_canonical(&self, stored: &str, from: &Path) -> Result<PathBuf, GatewayError> {
        let target = self.canonical_root.join(Self::normalize(stored)?);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                GatewayError::StorageError(format!("Create {} failed: {}", parent.display(), e))
            })?;
        }

        // Copy beside the target first so readers never see a partial file
        let mut staging_name = target
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        staging_name.push(".migrating");
        let staging = target.with_file_name(staging_name);

        tokio::fs::copy(from, &staging).await.map_err(|e| {
            GatewayError::StorageError(format!("Copy {} failed: {}", from.display(), e))
        })?;
        tokio::fs::rename(&staging, &target).await.map_err(|e| {
            GatewayError::StorageError(format!("Rename {} failed: {}", staging.display(), e))
        })?;

        log::info!(
            "[serve-wound-photo] Migrated {} -> {}",
            from.display(),
            target.display()
        );
        Ok(target)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, bytes: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_normalize_strips_leading_slashes() {
        assert_eq!(
            PhotoStorage::normalize("/uploads/wound_photos/a.jpg").unwrap(),
            PathBuf::from("uploads/wound_photos/a.jpg")
        );
        assert_eq!(
            PhotoStorage::normalize("./uploads//a.jpg").unwrap(),
            PathBuf::from("uploads/a.jpg")
        );
    }

    #[test]
    fn test_normalize_rejects_traversal_and_empty() {
        for bad in ["../etc/passwd", "uploads/../../secret", "", "/", "  "] {
            assert!(
                matches!(PhotoStorage::normalize(bad), Err(GatewayError::FileNotFound)),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_candidate_order() {
        let storage = PhotoStorage::new(
            "/srv/photos",
            vec![PathBuf::from("/var/www/html"), PathBuf::from("/opt/render/project/src")],
            false,
        );
        let candidates = storage.candidates("uploads/a.jpg").unwrap();
        assert_eq!(
            candidates,
            vec![
                (RootKind::Canonical, PathBuf::from("/srv/photos/uploads/a.jpg")),
                (RootKind::Legacy(0), PathBuf::from("/var/www/html/uploads/a.jpg")),
                (RootKind::Legacy(1), PathBuf::from("/opt/render/project/src/uploads/a.jpg")),
            ]
        );
    }

    #[tokio::test]
    async fn test_canonical_root_wins() {
        let canonical = TempDir::new().unwrap();
        let legacy = TempDir::new().unwrap();
        write(canonical.path(), "uploads/a.jpg", b"canonical");
        write(legacy.path(), "uploads/a.jpg", b"legacy");

        let storage =
            PhotoStorage::new(canonical.path(), vec![legacy.path().to_path_buf()], false);
        let found = storage.resolve("/uploads/a.jpg").await.unwrap();
        assert_eq!(found.kind, RootKind::Canonical);
        assert_eq!(std::fs::read(found.path).unwrap(), b"canonical");
    }

    #[tokio::test]
    async fn test_falls_back_to_legacy_in_order() {
        let canonical = TempDir::new().unwrap();
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(second.path(), "uploads/b.jpg", b"second");

        let storage = PhotoStorage::new(
            canonical.path(),
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            false,
        );
        let found = storage.resolve("uploads/b.jpg").await.unwrap();
        assert_eq!(found.kind, RootKind::Legacy(1));
        // Not migrated unless enabled
        assert!(!canonical.path().join("uploads/b.jpg").exists());
    }

    #[tokio::test]
    async fn test_directories_do_not_count_as_hits() {
        let canonical = TempDir::new().unwrap();
        std::fs::create_dir_all(canonical.path().join("uploads/c.jpg")).unwrap();

        let storage = PhotoStorage::new(canonical.path(), Vec::new(), false);
        assert!(matches!(
            storage.resolve("uploads/c.jpg").await,
            Err(GatewayError::FileNotFound)
        ));
    }

    #[tokio::test]
    async fn test_migrate_on_access_copies_into_canonical() {
        let canonical = TempDir::new().unwrap();
        let legacy = TempDir::new().unwrap();
        write(legacy.path(), "uploads/wound_photos/d.jpg", b"legacy-bytes");

        let storage =
            PhotoStorage::new(canonical.path(), vec![legacy.path().to_path_buf()], true);

        let first = storage.resolve("uploads/wound_photos/d.jpg").await.unwrap();
        assert_eq!(first.kind, RootKind::Legacy(0));

        let migrated = canonical.path().join("uploads/wound_photos/d.jpg");
        assert_eq!(std::fs::read(&migrated).unwrap(), b"legacy-bytes");

        let second = storage.resolve("uploads/wound_photos/d.jpg").await.unwrap();
        assert_eq!(second.kind, RootKind::Canonical);
    }

    #[tokio::test]
    async fn test_migrate_legacy_outcomes() {
        let canonical = TempDir::new().unwrap();
        let legacy = TempDir::new().unwrap();
        write(legacy.path(), "uploads/e.png", b"png");
        write(canonical.path(), "uploads/f.png", b"png");

        let storage =
            PhotoStorage::new(canonical.path(), vec![legacy.path().to_path_buf()], false);

        assert!(matches!(
            storage.migrate_legacy("uploads/e.png").await.unwrap(),
            MigrationOutcome::Copied { .. }
        ));
        assert_eq!(
            storage.migrate_legacy("uploads/e.png").await.unwrap(),
            MigrationOutcome::AlreadyCanonical
        );
        assert_eq!(
            storage.migrate_legacy("uploads/f.png").await.unwrap(),
            MigrationOutcome::AlreadyCanonical
        );
        assert_eq!(
            storage.migrate_legacy("uploads/missing.png").await.unwrap(),
            MigrationOutcome::Missing
        );
    }
}
