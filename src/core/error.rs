//! Error types shared across layers.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the word-tally transform.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Reading the input or writing the output failed.
    #[error("tally i/o on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Input file is not valid UTF-8 text.
    #[error("{path} is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidEncoding {
        /// Input file.
        path: PathBuf,
        /// Offset of the first invalid byte.
        offset: usize,
    },
}

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Chunk size must be positive.
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    /// Chunk size above the buffer limit.
    #[error("chunk size of {0} bytes exceeds the 1 MiB limit")]
    ChunkSizeTooLarge(usize),

    /// Command buffer must hold at least the trigger.
    #[error("command buffer of {0} bytes cannot hold the start command")]
    CommandBufferTooSmall(usize),

    /// Command buffer above the buffer limit.
    #[error("command buffer of {0} bytes exceeds the 1 MiB limit")]
    CommandBufferTooLarge(usize),

    /// Listen backlog must be positive.
    #[error("listen backlog must be greater than zero")]
    ZeroBacklog,

    /// Host must not be empty.
    #[error("host must not be empty")]
    EmptyHost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::ZeroChunkSize.to_string(),
            "chunk size must be greater than zero"
        );
        assert_eq!(
            ConfigError::ChunkSizeTooLarge(1 << 21).to_string(),
            "chunk size of 2097152 bytes exceeds the 1 MiB limit"
        );
    }

    #[test]
    fn test_invalid_encoding_message() {
        let err = TallyError::InvalidEncoding {
            path: PathBuf::from("in.txt"),
            offset: 3,
        };
        assert_eq!(
            err.to_string(),
            "in.txt is not valid UTF-8 (first invalid byte at offset 3)"
        );
    }
}
