// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image file storage on local disk.
//!
//! Uploaded images are written to the uploads directory under a
//! timestamped name and served back via `/uploads/{name}`. Deletions are
//! always best-effort: the document metadata is the source of truth and a
//! leftover file is preferable to a failed request.

use crate::error::AppError;
use crate::models::ImageRef;
use futures_util::{stream, StreamExt};
use std::path::{Path, PathBuf};

const MAX_CONCURRENT_FILE_OPS: usize = 8;

/// Extensions accepted for uploaded images.
const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Disk-backed store for uploaded images.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the files live in (served by the static file route).
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the uploads directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to create uploads directory {}: {}",
                self.dir.display(),
                e
            ))
        })
    }

    /// Persist one uploaded image and return its reference.
    ///
    /// Rejects anything that is not a jpg/jpeg/png by extension.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<ImageRef, AppError> {
        if !allowed_extension(original_name) {
            return Err(AppError::Validation(format!(
                "Only jpg, jpeg and png images are accepted (got {:?})",
                original_name
            )));
        }

        let file_name = storage_name(original_name);
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, data).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to store image {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(file = %file_name, bytes = data.len(), "Stored uploaded image");

        Ok(ImageRef::new(format!("/uploads/{}", file_name)))
    }

    /// Best-effort deletion of one stored image file.
    ///
    /// Image references pointing outside the uploads directory (externally
    /// hosted urls supplied at place creation) are left alone.
    pub async fn remove(&self, image: &ImageRef) {
        let Some(file_name) = local_file_name(&image.url) else {
            return;
        };

        let path = self.dir.join(file_name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(file = %path.display(), error = %e, "Failed to delete image file");
        }
    }

    /// Best-effort deletion of many files, bounded concurrency.
    pub async fn remove_all(&self, images: &[ImageRef]) {
        stream::iter(images)
            .for_each_concurrent(MAX_CONCURRENT_FILE_OPS, |image| self.remove(image))
            .await;
    }
}

/// Storage name for an upload: `<unix millis>-<encoded original name>`.
///
/// Percent-encoding keeps path separators and other hostile characters out
/// of the on-disk name while the original name stays recognizable.
fn storage_name(original_name: &str) -> String {
    format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        urlencoding::encode(original_name)
    )
}

fn allowed_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// File name for urls under `/uploads/`; None for anything else.
fn local_file_name(url: &str) -> Option<&str> {
    let name = url.strip_prefix("/uploads/")?;
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extension() {
        assert!(allowed_extension("ruin.jpg"));
        assert!(allowed_extension("ruin.JPEG"));
        assert!(allowed_extension("factory floor.png"));
        assert!(!allowed_extension("notes.txt"));
        assert!(!allowed_extension("archive.png.zip"));
        assert!(!allowed_extension("no_extension"));
    }

    #[test]
    fn test_storage_name_encodes_separators() {
        let name = storage_name("../evil name.png");

        let (millis, encoded) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert!(!encoded.contains('/'));
        assert_eq!(encoded, "..%2Fevil%20name.png");
    }

    #[test]
    fn test_local_file_name() {
        assert_eq!(
            local_file_name("/uploads/123-ruin.jpg"),
            Some("123-ruin.jpg")
        );
        assert_eq!(local_file_name("https://cdn.example.com/ruin.jpg"), None);
        assert_eq!(local_file_name("/uploads/../etc/passwd"), None);
        assert_eq!(local_file_name("/uploads/"), None);
    }

    #[tokio::test]
    async fn test_save_and_remove_round_trip() {
        let dir = std::env::temp_dir().join(format!("urbex-uploads-{}", uuid::Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        store.ensure_dir().await.unwrap();

        let image = store.save("ruin.jpg", b"fake image bytes").await.unwrap();
        assert!(image.url.starts_with("/uploads/"));

        let file_name = local_file_name(&image.url).unwrap();
        let on_disk = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(on_disk, b"fake image bytes");

        store.remove(&image).await;
        assert!(!dir.join(file_name).exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_other_extensions() {
        let store = UploadStore::new("uploads-test-unused");

        let result = store.save("malware.exe", b"nope").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
