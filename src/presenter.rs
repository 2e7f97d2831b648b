use crate::asset::ImageAsset;
use crate::constants::{BLOB_URL_PREFIX, DOWNLOAD_NAME_PREFIX};
use crate::utils::{calculate_reduction, format_file_size, Reduction};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Registry of transient addresses standing in for result bytes.
///
/// Clones share one registry.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    entries: Arc<Mutex<HashMap<String, Arc<[u8]>>>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, bytes: Arc<[u8]>) -> String {
        let url = format!("{}{}", BLOB_URL_PREFIX, Uuid::new_v4());
        self.entries().insert(url.clone(), bytes);
        url
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.entries().get(url).cloned()
    }

    /// Returns false when the address was unknown or already revoked.
    pub fn revoke(&self, url: &str) -> bool {
        self.entries().remove(url).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<[u8]>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Address plus suggested name for downloading a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadableReference {
    pub url: String,
    pub file_name: String,
    pub mime_type: String,
}

/// Display values for a finished compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationSummary {
    pub original_size: String,
    pub compressed_size: String,
    pub reduction: Reduction,
    pub download: DownloadableReference,
}

/// Owns the single live [`DownloadableReference`] of a session.
#[derive(Debug)]
pub struct ResultPresenter {
    store: BlobStore,
    current: Option<DownloadableReference>,
}

impl ResultPresenter {
    pub fn new(store: BlobStore) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Computes the metrics and publishes `result`, revoking any earlier address first.
    pub fn present(&mut self, original: &ImageAsset, result: &ImageAsset) -> PresentationSummary {
        self.release();

        let url = self.store.create(result.shared_bytes());
        let download = DownloadableReference {
            url,
            file_name: format!("{}{}", DOWNLOAD_NAME_PREFIX, original.name()),
            mime_type: result.mime_type().to_string(),
        };
        debug!(url = %download.url, file = %download.file_name, "download reference created");
        self.current = Some(download.clone());

        PresentationSummary {
            original_size: format_file_size(original.size_bytes()),
            compressed_size: format_file_size(result.size_bytes()),
            reduction: calculate_reduction(original.size_bytes(), result.size_bytes()),
            download,
        }
    }

    pub fn current(&self) -> Option<&DownloadableReference> {
        self.current.as_ref()
    }

    /// The live reference together with the bytes behind it.
    pub fn fetch(&self) -> Option<(DownloadableReference, Arc<[u8]>)> {
        let reference = self.current.as_ref()?;
        let bytes = self.store.resolve(&reference.url)?;
        Some((reference.clone(), bytes))
    }

    /// Revokes the live reference. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(reference) = self.current.take() {
            if self.store.revoke(&reference.url) {
                debug!(url = %reference.url, "download reference released");
            }
        }
    }
}

impl Drop for ResultPresenter {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> (ImageAsset, ImageAsset) {
        (
            ImageAsset::new("beach.jpg", "image/jpeg", vec![0u8; 2_000_000]),
            ImageAsset::new("beach.jpg", "image/jpeg", vec![0u8; 500_000]),
        )
    }

    #[test]
    fn test_present_summary() {
        let (original, result) = assets();
        let mut presenter = ResultPresenter::new(BlobStore::new());

        let summary = presenter.present(&original, &result);

        assert_eq!(summary.original_size, "1.9 MB");
        assert_eq!(summary.compressed_size, "488.3 KB");
        assert_eq!(summary.reduction, Reduction::Percent(75));
        assert_eq!(summary.download.file_name, "compressed_beach.jpg");
        assert!(summary.download.url.starts_with(BLOB_URL_PREFIX));
    }

    #[test]
    fn test_present_again_replaces_reference() {
        let (original, result) = assets();
        let store = BlobStore::new();
        let mut presenter = ResultPresenter::new(store.clone());

        let first = presenter.present(&original, &result);
        let second = presenter.present(&original, &result);

        assert_ne!(first.download.url, second.download.url);
        assert_eq!(store.live_count(), 1);
        assert!(store.resolve(&first.download.url).is_none());
        assert_eq!(
            store.resolve(&second.download.url).map(|b| b.len()),
            Some(500_000)
        );
    }

    #[test]
    fn test_release_is_idempotent() {
        let (original, result) = assets();
        let store = BlobStore::new();
        let mut presenter = ResultPresenter::new(store.clone());
        presenter.present(&original, &result);

        presenter.release();
        presenter.release();

        assert_eq!(store.live_count(), 0);
        assert!(presenter.current().is_none());
        assert!(presenter.fetch().is_none());
    }

    #[test]
    fn test_drop_releases_reference() {
        let (original, result) = assets();
        let store = BlobStore::new();
        {
            let mut presenter = ResultPresenter::new(store.clone());
            presenter.present(&original, &result);
            assert_eq!(store.live_count(), 1);
        }
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_empty_original_has_undefined_reduction() {
        let original = ImageAsset::new("empty.png", "image/png", Vec::new());
        let result = ImageAsset::new("empty.png", "image/png", vec![1u8; 10]);
        let mut presenter = ResultPresenter::new(BlobStore::new());

        let summary = presenter.present(&original, &result);
        assert_eq!(summary.reduction, Reduction::Undefined);
        assert_eq!(summary.reduction.to_string(), "undefined");
    }

    #[test]
    fn test_blob_store_revoke_unknown() {
        let store = BlobStore::new();
        assert!(!store.revoke("blob:squeeze/missing"));
    }
}
