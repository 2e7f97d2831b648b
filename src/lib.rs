pub mod asset;
pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod formats;
pub mod invoker;
pub mod loader;
pub mod logger;
pub mod presenter;
pub mod preview;
pub mod session;
pub mod utils;
pub mod validation;
pub mod workflow;

pub use asset::{CompressionParameters, ImageAsset};
pub use codec::{CodecHandle, CodecOptions, CodecSource, ImageCodec, NativeCodec, NativeCodecSource};
pub use config::WorkflowConfig;
pub use error::{CodecError, CompressionError, ConfigError, Result, ValidationError, WorkflowError};
pub use invoker::CompressionInvoker;
pub use loader::{CodecLoader, LoaderStatus};
pub use presenter::{BlobStore, DownloadableReference, PresentationSummary, ResultPresenter};
pub use preview::Preview;
pub use session::{CompressionTicket, Generation, UploadSession, WorkflowState};
pub use utils::{calculate_reduction, format_file_size, Reduction};
pub use validation::{check_constraints, validate, UploadCandidate};
pub use workflow::{CompressOutcome, ImageWorkflow};
