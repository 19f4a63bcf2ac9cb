// src/services/photo_service.rs
// DOCUMENTATION: Photo access gateway
// PURPOSE: Lookup, authorize, resolve and open a wound photo for a caller

use crate::db::PhotoLookup;
use crate::errors::GatewayError;
use crate::models::AuthContext;
use crate::services::access::authorize;
use crate::services::mime::{sniff, SNIFF_LEN};
use crate::services::storage::{PhotoStorage, ResolvedPhoto};
use actix_web::web::Bytes;
use futures::stream::{self, Stream};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Chunk size used when streaming photos
const CHUNK_SIZE: usize = 64 * 1024;

/// An authorized, opened photo ready to be streamed
#[derive(Debug)]
pub struct PhotoFile {
    pub file: File,
    pub len: u64,
    pub mime: &'static str,
}

impl PhotoFile {
    /// Open a resolved file and sniff its content type
    /// The file is rewound so the stream starts at byte zero.
    pub async fn open(resolved: &ResolvedPhoto) -> Result<Self, GatewayError> {
        let io_err = |e: std::io::Error| {
            GatewayError::StorageError(format!("Read {} failed: {}", resolved.path.display(), e))
        };

        let mut file = File::open(&resolved.path).await.map_err(io_err)?;
        let len = file.metadata().await.map_err(io_err)?.len();

        let mut head = Vec::with_capacity(SNIFF_LEN);
        (&mut file)
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)
            .await
            .map_err(io_err)?;
        file.seek(SeekFrom::Start(0)).await.map_err(io_err)?;

        Ok(Self {
            file,
            len,
            mime: sniff(&head),
        })
    }

    /// File bytes as a chunked stream, untouched
    /// DOCUMENTATION: Dropping the stream (client disconnect) just closes
    /// the file.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        stream::try_unfold(self.file, |mut file| async move {
            let mut buf = vec![0u8; CHUNK_SIZE];
            let read = file.read(&mut buf).await?;
            if read == 0 {
                return Ok(None);
            }
            buf.truncate(read);
            Ok::<_, std::io::Error>(Some((Bytes::from(buf), file)))
        })
    }
}

pub struct PhotoService;

impl PhotoService {
    /// Fetch a photo on behalf of an authenticated caller
    /// DOCUMENTATION: One database read, then the filesystem probe.
    /// A missing join row and a missing file are both 404s; only the
    /// latter is logged with paths.
    pub async fn fetch_photo(
        lookup: &dyn PhotoLookup,
        storage: &PhotoStorage,
        ctx: &AuthContext,
        photo_id: &str,
    ) -> Result<PhotoFile, GatewayError> {
        let access = lookup
            .find_photo_access(photo_id)
            .await?
            .ok_or(GatewayError::PhotoNotFound)?;

        authorize(ctx, &access)?;

        let resolved = storage.resolve(&access.photo_path).await?;
        let photo = PhotoFile::open(&resolved).await?;

        log::debug!(
            "Serving photo {} to user {} ({} bytes, {})",
            photo_id,
            ctx.user_id,
            photo.len,
            photo.mime
        );
        Ok(photo)
    }
}
