//! Transport layer error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio_rustls::rustls;

/// Errors while moving a frame over a stream.
#[derive(Debug, Error)]
pub enum TransferError {
    /// I/O error on the stream (reset, broken pipe, ...).
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended inside the 8-byte length prefix.
    #[error("stream ended after {received} of 8 length-prefix bytes")]
    TruncatedHeader {
        /// Prefix bytes read before the end of stream.
        received: usize,
    },

    /// The stream ended before the declared payload length was reached.
    #[error("truncated frame: expected {expected} bytes, received {received}")]
    Truncated {
        /// Length announced by the prefix.
        expected: u64,
        /// Bytes actually read.
        received: u64,
    },

    /// Announced length does not fit in memory on this platform.
    #[error("frame length {0} exceeds addressable memory")]
    TooLarge(u64),

    /// Reading the local source file or writing the destination file failed.
    #[error("file {path}: {source}")]
    File {
        /// Local file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl TransferError {
    /// Check if the peer stopped sending in the middle of a frame.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            TransferError::TruncatedHeader { .. } | TransferError::Truncated { .. }
        )
    }

    /// Check if the error came from the connection rather than local files.
    pub fn is_connection_error(&self) -> bool {
        match self {
            TransferError::Io(_) => true,
            TransferError::File { .. } | TransferError::TooLarge(_) => false,
            TransferError::TruncatedHeader { .. } | TransferError::Truncated { .. } => true,
        }
    }
}

/// Result type for transport operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Errors while loading trust material or building TLS configurations.
#[derive(Debug, Error)]
pub enum TlsError {
    /// A PEM file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// PEM file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The file holds no certificate.
    #[error("no certificates found in {0}")]
    NoCertificates(PathBuf),

    /// The file holds no private key.
    #[error("no private key found in {0}")]
    NoPrivateKey(PathBuf),

    /// Host cannot be used as a TLS server name.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// rustls rejected the configuration.
    #[error("rustls: {0}")]
    Rustls(#[from] rustls::Error),
}
