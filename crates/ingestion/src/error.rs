//! Ingestion error types

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Raw point cloud could not be decoded
    #[error("failed to decode point cloud for frame {frame_id:?}: {message}")]
    DecodeFailed {
        /// Transport sequence number, if known
        frame_id: Option<u64>,
        /// Error message
        message: String,
    },

    /// Source is already registered
    #[error("frame source {source_id} is already registered")]
    DuplicateSource {
        /// Source ID
        source_id: String,
    },
}

impl IngestionError {
    pub(crate) fn decode(frame_id: Option<u64>, message: impl Into<String>) -> Self {
        Self::DecodeFailed {
            frame_id,
            message: message.into(),
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
