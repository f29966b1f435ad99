use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned across the pipeline's trait seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures of a redaction run.
///
/// Input, output, model and parameter errors stop the run before any file
/// is touched. Decode, detection and encode errors belong to a single file.
#[derive(Error, Debug)]
pub enum ScrubError {
    #[error("input folder not found: {}", path.display())]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create output folder {}: {source}", path.display())]
    OutputDirectoryUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("face detection model unavailable: {0}")]
    ModelUnavailable(#[source] BoxError),
    #[error("invalid detection parameters: {0}")]
    InvalidParams(String),
    #[error("failed to decode {}: {source}", path.display())]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("face detection failed for {}: {source}", path.display())]
    DetectionFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("failed to encode {}: {source}", path.display())]
    EncodeFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl ScrubError {
    /// True for errors confined to one input file.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            ScrubError::DecodeFailed { .. }
                | ScrubError::DetectionFailed { .. }
                | ScrubError::EncodeFailed { .. }
        )
    }
}
