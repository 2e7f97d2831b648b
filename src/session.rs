use crate::asset::ImageAsset;
use crate::error::{CompressionError, WorkflowError};
use crate::presenter::{BlobStore, DownloadableReference, PresentationSummary, ResultPresenter};
use std::fmt;
use std::mem;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Previewing,
    Compressing,
    Completed,
    Failed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Previewing => "previewing",
            WorkflowState::Compressing => "compressing",
            WorkflowState::Completed => "completed",
            WorkflowState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Session epoch. Bumped by every `reset` and every `begin_compression`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Issued by `begin_compression`; the outcome must be reported with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionTicket {
    generation: Generation,
}

impl CompressionTicket {
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

// Artifacts live inside the stage, so `result` exists only when completed and
// `original` exists everywhere but idle.
enum Stage {
    Idle,
    Previewing {
        original: ImageAsset,
    },
    Compressing {
        original: ImageAsset,
    },
    Completed {
        original: ImageAsset,
        result: ImageAsset,
    },
    Failed {
        original: ImageAsset,
        error: WorkflowError,
    },
}

/// Single source of truth for one upload session.
pub struct UploadSession {
    stage: Stage,
    generation: Generation,
    presenter: ResultPresenter,
}

impl UploadSession {
    pub fn new(store: BlobStore) -> Self {
        Self {
            stage: Stage::Idle,
            generation: Generation::default(),
            presenter: ResultPresenter::new(store),
        }
    }

    pub fn state(&self) -> WorkflowState {
        match self.stage {
            Stage::Idle => WorkflowState::Idle,
            Stage::Previewing { .. } => WorkflowState::Previewing,
            Stage::Compressing { .. } => WorkflowState::Compressing,
            Stage::Completed { .. } => WorkflowState::Completed,
            Stage::Failed { .. } => WorkflowState::Failed,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn original(&self) -> Option<&ImageAsset> {
        match &self.stage {
            Stage::Idle => None,
            Stage::Previewing { original }
            | Stage::Compressing { original }
            | Stage::Completed { original, .. }
            | Stage::Failed { original, .. } => Some(original),
        }
    }

    pub fn result(&self) -> Option<&ImageAsset> {
        match &self.stage {
            Stage::Completed { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&WorkflowError> {
        match &self.stage {
            Stage::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn download(&self) -> Option<&DownloadableReference> {
        self.presenter.current()
    }

    pub fn fetch_download(&self) -> Option<(DownloadableReference, Arc<[u8]>)> {
        self.presenter.fetch()
    }

    /// Takes a validated asset as the new original.
    ///
    /// From any state other than idle this resets first, so a replaced file
    /// never inherits the previous result or an in-flight attempt.
    pub fn accept(&mut self, asset: ImageAsset) {
        if !matches!(self.stage, Stage::Idle) {
            self.reset();
        }
        debug!(name = asset.name(), size = asset.size_bytes(), "session previewing");
        self.stage = Stage::Previewing { original: asset };
    }

    /// Moves to `Compressing` and hands out the ticket together with the
    /// original to compress.
    pub fn begin_compression(
        &mut self,
    ) -> Result<(CompressionTicket, ImageAsset), CompressionError> {
        let original = match mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Idle => return Err(CompressionError::NoOriginal),
            stage @ Stage::Compressing { .. } => {
                self.stage = stage;
                return Err(CompressionError::InProgress);
            }
            Stage::Completed { original, .. } => {
                self.presenter.release();
                original
            }
            Stage::Previewing { original } | Stage::Failed { original, .. } => original,
        };

        self.generation = self.generation.next();
        let handed_out = original.clone();
        self.stage = Stage::Compressing { original };
        debug!(generation = self.generation.value(), "session compressing");

        let ticket = CompressionTicket {
            generation: self.generation,
        };
        Ok((ticket, handed_out))
    }

    /// Applies a finished compression. Returns `None` when the ticket is stale
    /// and the result was discarded.
    pub fn complete_compression(
        &mut self,
        ticket: CompressionTicket,
        result: ImageAsset,
    ) -> Option<PresentationSummary> {
        if !self.accepts(ticket) {
            warn!(
                ticket = ticket.generation.value(),
                current = self.generation.value(),
                "discarding stale compression result"
            );
            return None;
        }

        let original = match mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Compressing { original } => original,
            other => {
                self.stage = other;
                return None;
            }
        };

        let summary = self.presenter.present(&original, &result);
        debug!(
            generation = self.generation.value(),
            reduction = %summary.reduction,
            "session completed"
        );
        self.stage = Stage::Completed { original, result };
        Some(summary)
    }

    /// Records a failed attempt. Returns false when the ticket is stale.
    pub fn fail(&mut self, ticket: CompressionTicket, error: WorkflowError) -> bool {
        if !self.accepts(ticket) {
            warn!(
                ticket = ticket.generation.value(),
                current = self.generation.value(),
                error = %error,
                "discarding stale compression failure"
            );
            return false;
        }

        match mem::replace(&mut self.stage, Stage::Idle) {
            Stage::Compressing { original } => {
                debug!(generation = self.generation.value(), error = %error, "session failed");
                self.stage = Stage::Failed { original, error };
                true
            }
            other => {
                self.stage = other;
                false
            }
        }
    }

    /// Back to idle from anywhere, releasing the download reference.
    pub fn reset(&mut self) {
        self.presenter.release();
        self.generation = self.generation.next();
        self.stage = Stage::Idle;
        debug!(generation = self.generation.value(), "session reset");
    }

    fn accepts(&self, ticket: CompressionTicket) -> bool {
        ticket.generation == self.generation && matches!(self.stage, Stage::Compressing { .. })
    }
}

impl fmt::Debug for UploadSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadSession")
            .field("state", &self.state())
            .field("generation", &self.generation)
            .field("original", &self.original())
            .field("result", &self.result())
            .finish()
    }
}
