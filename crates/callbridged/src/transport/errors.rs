//! Error types for transport bindings.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::codec::CodecError;

/// Unrecoverable transport failures. Each one ends the current serve call
/// and hands control back to the supervisor's restart policy.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Reading from the inbound channel failed.
    #[error("failed to read from the inbound channel: {source}")]
    Read {
        /// Underlying IO error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Writing a response frame failed.
    #[error("failed to write a response frame: {source}")]
    Write {
        /// Underlying IO error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A response could not be serialised.
    #[error("failed to encode a response: {message}")]
    Encode {
        /// Rendered codec error.
        message: String,
    },

    /// The frame reader thread could not be started.
    #[error("failed to start the frame reader: {source}")]
    ReaderThread {
        /// Underlying IO error.
        #[source]
        source: Arc<io::Error>,
    },

    /// An exchange artefact could not be written.
    #[error("failed to write exchange artefact {path}: {source}")]
    Artefact {
        /// Artefact path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl TransportError {
    pub(crate) fn read(source: io::Error) -> Self {
        Self::Read {
            source: Arc::new(source),
        }
    }

    pub(crate) fn write(source: io::Error) -> Self {
        Self::Write {
            source: Arc::new(source),
        }
    }

    pub(crate) fn artefact(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Artefact {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

impl From<CodecError> for TransportError {
    fn from(error: CodecError) -> Self {
        Self::Encode {
            message: error.to_string(),
        }
    }
}
