//! The upload pipeline: one incoming file in, one normalized photo record out.
//!
//! ## Stages
//!
//! ```text
//! Validate     declared content type must be an accepted image type
//! StageTemp    raw bytes → <token>.tmp in the uploads root
//! Convert      decode + re-encode at quality 90 → <token>.jpg
//! CleanupTemp  remove <token>.tmp (best-effort)
//! Stat         read the converted file's size
//! Persist      insert the Photo record
//! ```
//!
//! `token` is a fresh UUID v4 per upload, so concurrent uploads of
//! same-named files cannot collide.
//!
//! Every stage failure is terminal for the request; there are no retries.
//! A failed conversion must never leave its temp file behind — that cleanup
//! is the one mandatory rollback. Later failures (stat, persist) leave the
//! converted file on disk with no record: an accepted orphan, not actively
//! reconciled.

use crate::codec::{self, CodecError, NORMALIZED_EXTENSION, Quality};
use crate::repo::{NewPhoto, Photo, PhotoRepository, RepoError};
use crate::store::{FileStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Content types an upload may declare. Anything else is refused before any
/// bytes touch disk.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Mount prefix under which stored files are served; recorded in each
/// photo's `file_path` so the frontend can fetch it directly.
pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("rejected content type: {0:?}")]
    RejectedInput(String),
    #[error("failed to write upload: {0}")]
    Io(#[source] StoreError),
    #[error("image conversion failed: {0}")]
    Conversion(#[from] CodecError),
    #[error("failed to stat converted file: {0}")]
    Metadata(#[source] StoreError),
    #[error("failed to persist photo record: {0}")]
    Persistence(#[from] RepoError),
}

/// One file as received by the upload endpoint.
#[derive(Debug)]
pub struct IncomingUpload {
    /// Client-supplied filename; only its extension is used, as a decode hint.
    pub filename: String,
    /// Declared content type from the multipart part header.
    pub content_type: String,
    /// User-supplied title, possibly empty.
    pub title: String,
    pub bytes: Vec<u8>,
}

/// Orchestrates [`FileStore`], the image codec and [`PhotoRepository`] for
/// a single upload at a time. Stateless between invocations.
pub struct UploadPipeline {
    store: FileStore,
    repo: Arc<PhotoRepository>,
    quality: Quality,
}

impl UploadPipeline {
    pub fn new(store: FileStore, repo: Arc<PhotoRepository>) -> Self {
        Self {
            store,
            repo,
            quality: Quality::default(),
        }
    }

    /// Run the full pipeline for one upload.
    pub fn ingest(&self, upload: IncomingUpload) -> Result<Photo, UploadError> {
        if !ALLOWED_CONTENT_TYPES.contains(&upload.content_type.as_str()) {
            return Err(UploadError::RejectedInput(upload.content_type));
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        let temp_name = format!("{token}.tmp");
        let final_name = format!("{token}.{NORMALIZED_EXTENSION}");

        self.store
            .save(&temp_name, &upload.bytes)
            .map_err(UploadError::Io)?;

        let encoded = match self.convert(&upload) {
            Ok(encoded) => encoded,
            Err(err) => {
                self.discard(&temp_name);
                return Err(err);
            }
        };
        if let Err(err) = self.store.save(&final_name, &encoded) {
            self.discard(&temp_name);
            self.discard(&final_name);
            return Err(UploadError::Io(err));
        }

        self.discard(&temp_name);

        // From here on a failure leaves the converted file orphaned on disk.
        let file_size = self
            .store
            .stat(&final_name)
            .map_err(UploadError::Metadata)?;

        let photo = self.repo.create(NewPhoto {
            title: upload.title,
            filename: final_name.clone(),
            file_path: format!("{PUBLIC_PREFIX}/{final_name}"),
            file_size: file_size as i64,
            created_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })?;

        Ok(photo)
    }

    fn convert(&self, upload: &IncomingUpload) -> Result<Vec<u8>, UploadError> {
        let img = codec::decode(&upload.bytes, &upload.filename)?;
        Ok(codec::encode(&img, self.quality)?)
    }

    /// Best-effort removal; a failure here never fails the request.
    fn discard(&self, name: &str) {
        if let Err(err) = self.store.remove(name) {
            warn!("failed to remove {name}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::synthetic_image_bytes;
    use image::ImageFormat;

    fn fixture() -> (tempfile::TempDir, FileStore, Arc<PhotoRepository>, UploadPipeline) {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        let repo = Arc::new(PhotoRepository::open_in_memory().unwrap());
        let pipeline = UploadPipeline::new(store.clone(), Arc::clone(&repo));
        (tmp, store, repo, pipeline)
    }

    fn png_upload(title: &str) -> IncomingUpload {
        IncomingUpload {
            filename: "holiday.png".to_string(),
            content_type: "image/png".to_string(),
            title: title.to_string(),
            bytes: synthetic_image_bytes(ImageFormat::Png, 10, 10),
        }
    }

    #[test]
    fn successful_upload_creates_record_and_file() {
        let (_tmp, store, repo, pipeline) = fixture();

        let photo = pipeline.ingest(png_upload("test")).unwrap();

        assert_eq!(photo.title, "test");
        assert!(photo.filename.ends_with(".jpg"), "{}", photo.filename);
        assert_eq!(photo.file_path, format!("uploads/{}", photo.filename));
        assert!(store.exists(&photo.filename));
        assert_eq!(store.stat(&photo.filename).unwrap() as i64, photo.file_size);
        assert!(photo.file_size > 0);
        assert_eq!(repo.get(photo.id).unwrap(), photo);
    }

    #[test]
    fn upload_leaves_no_temp_file_behind() {
        let (tmp, _store, _repo, pipeline) = fixture();

        pipeline.ingest(png_upload("t")).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {leftovers:?}");
    }

    #[test]
    fn disallowed_content_type_is_rejected_with_no_side_effects() {
        let (tmp, _store, repo, pipeline) = fixture();

        let err = pipeline
            .ingest(IncomingUpload {
                filename: "notes.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                title: String::new(),
                bytes: vec![1, 2, 3],
            })
            .unwrap_err();

        assert!(matches!(err, UploadError::RejectedInput(_)), "got {err:?}");
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn corrupt_image_fails_conversion_and_cleans_temp() {
        let (tmp, _store, repo, pipeline) = fixture();

        let err = pipeline
            .ingest(IncomingUpload {
                filename: "broken.png".to_string(),
                content_type: "image/png".to_string(),
                title: String::new(),
                bytes: b"not an image at all".to_vec(),
            })
            .unwrap_err();

        assert!(matches!(err, UploadError::Conversion(_)), "got {err:?}");
        // Mandatory rollback: nothing on disk, nothing in the database.
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn gif_content_type_is_accepted() {
        let (_tmp, _store, _repo, pipeline) = fixture();

        let photo = pipeline
            .ingest(IncomingUpload {
                filename: "anim.gif".to_string(),
                content_type: "image/gif".to_string(),
                title: String::new(),
                bytes: synthetic_image_bytes(ImageFormat::Gif, 6, 6),
            })
            .unwrap();
        assert!(photo.filename.ends_with(".jpg"));
    }

    #[test]
    fn concurrent_same_name_uploads_get_distinct_paths() {
        let (_tmp, _store, _repo, pipeline) = fixture();

        let a = pipeline.ingest(png_upload("one")).unwrap();
        let b = pipeline.ingest(png_upload("two")).unwrap();
        assert_ne!(a.filename, b.filename);
    }

    #[test]
    fn created_at_has_fixed_format() {
        let (_tmp, _store, _repo, pipeline) = fixture();

        let photo = pipeline.ingest(png_upload("t")).unwrap();
        assert!(
            chrono::NaiveDateTime::parse_from_str(&photo.created_at, "%Y-%m-%d %H:%M:%S").is_ok(),
            "unexpected timestamp: {}",
            photo.created_at
        );
    }
}
