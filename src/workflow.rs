//! Drives one [`UploadSession`] through intake, compression and reset, the way
//! the page's event handlers would.

use crate::asset::CompressionParameters;
use crate::codec::CodecSource;
use crate::config::WorkflowConfig;
use crate::error::{Result, WorkflowError};
use crate::invoker::CompressionInvoker;
use crate::loader::CodecLoader;
use crate::presenter::{BlobStore, DownloadableReference, PresentationSummary};
use crate::preview::Preview;
use crate::session::{Generation, UploadSession, WorkflowState};
use crate::validation::{validate, UploadCandidate};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// How a compression request ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressOutcome {
    Completed(PresentationSummary),
    /// The session was reset or given a new file while the codec ran.
    Discarded,
}

impl CompressOutcome {
    pub fn summary(&self) -> Option<&PresentationSummary> {
        match self {
            CompressOutcome::Completed(summary) => Some(summary),
            CompressOutcome::Discarded => None,
        }
    }
}

pub struct ImageWorkflow {
    session: Mutex<UploadSession>,
    loader: CodecLoader,
    invoker: CompressionInvoker,
}

impl ImageWorkflow {
    pub fn new(source: Arc<dyn CodecSource>, config: &WorkflowConfig) -> Self {
        Self::with_store(source, config, BlobStore::new())
    }

    pub fn with_store(source: Arc<dyn CodecSource>, config: &WorkflowConfig, store: BlobStore) -> Self {
        Self {
            session: Mutex::new(UploadSession::new(store)),
            loader: CodecLoader::new(source),
            invoker: CompressionInvoker::from_config(config),
        }
    }

    pub fn loader(&self) -> &CodecLoader {
        &self.loader
    }

    pub fn state(&self) -> WorkflowState {
        self.lock_session().state()
    }

    pub fn generation(&self) -> Generation {
        self.lock_session().generation()
    }

    /// Read-only access to the session for display code.
    pub fn inspect<R>(&self, f: impl FnOnce(&UploadSession) -> R) -> R {
        f(&self.lock_session())
    }

    /// Validates a picked or dropped file and, if it passes, makes it the
    /// session's original. A rejected file leaves the session untouched.
    pub fn submit(&self, candidate: UploadCandidate) -> Result<Preview> {
        let asset = validate(candidate)?;
        let preview = Preview::describe(&asset);
        self.lock_session().accept(asset);
        info!(
            name = %preview.name,
            size = %preview.original_size,
            "image ready for compression"
        );
        Ok(preview)
    }

    pub async fn submit_path(&self, path: &Path) -> Result<Preview> {
        let candidate = UploadCandidate::from_path(path).await?;
        self.submit(candidate)
    }

    /// Loads the codec if needed and compresses the current original once.
    ///
    /// Failures move the session to `Failed` and are returned. A result that
    /// arrives after a reset is dropped and reported as `Discarded`.
    pub async fn compress(&self, params: CompressionParameters) -> Result<CompressOutcome> {
        let (ticket, original) = self.lock_session().begin_compression()?;

        let outcome: Result<_> = match self.loader.ensure_loaded().await {
            Ok(codec) => self
                .invoker
                .compress(&original, &params, &codec)
                .await
                .map_err(WorkflowError::from),
            Err(err) => Err(err.into()),
        };

        let mut session = self.lock_session();
        match outcome {
            Ok(result) => Ok(session
                .complete_compression(ticket, result)
                .map_or(CompressOutcome::Discarded, CompressOutcome::Completed)),
            Err(err) => {
                if session.fail(ticket, err.clone()) {
                    Err(err)
                } else {
                    Ok(CompressOutcome::Discarded)
                }
            }
        }
    }

    /// The live download reference and its bytes, if the session is completed.
    pub fn download(&self) -> Option<(DownloadableReference, Arc<[u8]>)> {
        self.lock_session().fetch_download()
    }

    pub fn reset(&self) {
        self.lock_session().reset();
    }

    fn lock_session(&self) -> MutexGuard<'_, UploadSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::NativeCodecSource;
    use crate::error::{CompressionError, ValidationError};

    fn workflow() -> ImageWorkflow {
        ImageWorkflow::new(Arc::new(NativeCodecSource), &WorkflowConfig::default())
    }

    #[test]
    fn test_rejected_file_leaves_session_idle() {
        let workflow = workflow();
        let candidate = UploadCandidate::new("notes.txt", "text/plain", b"hello".to_vec());

        let err = workflow.submit(candidate).unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::WrongType(_))
        ));
        assert_eq!(workflow.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_compress_without_upload() {
        let workflow = workflow();
        let params = CompressionParameters::new(80, 1920).unwrap();

        let err = workflow.compress(params).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Compression(CompressionError::NoOriginal)
        ));
        assert_eq!(workflow.loader().load_attempts(), 0);
    }
}
