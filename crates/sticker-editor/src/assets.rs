//! Asset uploads (custom shapes, user images)

use crate::constants::ALLOWED_UPLOAD_MIME_TYPES;
use crate::types::{EditorError, Result};
use std::future::Future;
use std::sync::Mutex;

/// Upload collaborator. Returns a URL the scene can reference.
pub trait AssetUploader: Send + Sync {
    fn upload(&self, bytes: Vec<u8>, mime: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Boundary checks run before anything is handed to an uploader
pub fn check_upload(len: usize, mime: &str, limit: usize) -> Result<()> {
    if len > limit {
        return Err(EditorError::ResourceLimit { size: len, limit });
    }
    let mime = mime.trim().to_ascii_lowercase();
    if !ALLOWED_UPLOAD_MIME_TYPES.contains(&mime.as_str()) {
        return Err(EditorError::UnsupportedMime(mime));
    }
    Ok(())
}

/// Keeps uploads in memory and hands out `memory://assets/{n}` URLs
#[derive(Debug, Default)]
pub struct MemoryAssetUploader {
    assets: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryAssetUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes and MIME type behind a URL handed out earlier
    pub fn get(&self, url: &str) -> Option<(String, Vec<u8>)> {
        let index: usize = url.strip_prefix("memory://assets/")?.parse().ok()?;
        self.assets.lock().ok()?.get(index).cloned()
    }
}

impl AssetUploader for MemoryAssetUploader {
    async fn upload(&self, bytes: Vec<u8>, mime: &str) -> Result<String> {
        let mut assets = self
            .assets
            .lock()
            .map_err(|_| EditorError::Upload("asset store lock poisoned".to_string()))?;
        assets.push((mime.to_string(), bytes));
        Ok(format!("memory://assets/{}", assets.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MAX_UPLOAD_BYTES;

    #[test]
    fn limit_and_mime_checks() {
        assert!(check_upload(10, "image/png", DEFAULT_MAX_UPLOAD_BYTES).is_ok());
        assert!(check_upload(10, "Image/SVG+XML", DEFAULT_MAX_UPLOAD_BYTES).is_ok());
        assert!(matches!(
            check_upload(DEFAULT_MAX_UPLOAD_BYTES + 1, "image/png", DEFAULT_MAX_UPLOAD_BYTES),
            Err(EditorError::ResourceLimit { .. })
        ));
        assert!(matches!(
            check_upload(10, "application/zip", DEFAULT_MAX_UPLOAD_BYTES),
            Err(EditorError::UnsupportedMime(_))
        ));
    }

    #[tokio::test]
    async fn memory_uploader_hands_out_urls() {
        let uploader = MemoryAssetUploader::new();
        let a = uploader.upload(vec![1, 2, 3], "image/png").await.unwrap();
        let b = uploader.upload(vec![4], "image/gif").await.unwrap();
        assert_eq!(a, "memory://assets/0");
        assert_eq!(b, "memory://assets/1");
        assert_eq!(uploader.get(&a), Some(("image/png".to_string(), vec![1, 2, 3])));
        assert_eq!(uploader.len(), 2);
    }
}
