//! Framed stream wrapper.
//!
//! Provides a high-level interface for the two kinds of traffic a session
//! carries: whole-file frames and the unframed start trigger.

use std::path::Path;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use super::error::{TransferError, TransferResult};
use super::frame::{payload_digest, read_frame, read_or_eof, write_frame, Received};
use crate::core::constants::{DEFAULT_CHUNK_SIZE, MAX_BUFFER_SIZE};

/// Async byte stream that speaks the length-prefixed frame protocol.
///
/// Generic over the stream so the same code runs over TLS, plain TCP, or an
/// in-memory duplex in tests.
#[derive(Debug)]
pub struct FramedStream<S> {
    /// The underlying stream.
    inner: S,
    /// Upper bound of a single read or write.
    chunk_size: usize,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a stream with the default chunk size.
    pub fn new(inner: S) -> Self {
        Self::with_chunk_size(inner, DEFAULT_CHUNK_SIZE)
    }

    /// Wrap a stream with a specific chunk size, clamped to
    /// `1..=MAX_BUFFER_SIZE`.
    pub fn with_chunk_size(inner: S, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.clamp(1, MAX_BUFFER_SIZE),
        }
    }

    /// Get the chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Send `payload` as one frame.
    pub async fn send(&mut self, payload: &[u8]) -> TransferResult<()> {
        debug!(
            "Sending frame: {} bytes, sha256 {}",
            payload.len(),
            payload_digest(payload)
        );
        write_frame(&mut self.inner, payload, self.chunk_size).await
    }

    /// Receive one frame.
    pub async fn receive(&mut self) -> TransferResult<Received> {
        let received = read_frame(&mut self.inner, self.chunk_size).await?;
        if let Received::Frame(payload) = &received {
            debug!(
                "Received frame: {} bytes, sha256 {}",
                payload.len(),
                payload_digest(payload)
            );
        }
        Ok(received)
    }

    /// Send the contents of `path` as one frame. Returns the size sent.
    pub async fn send_file(&mut self, path: &Path) -> TransferResult<u64> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| TransferError::File {
                path: path.to_path_buf(),
                source,
            })?;
        let size = contents.len() as u64;

        info!("Sending file: {} (Size: {} bytes)", path.display(), size);
        self.send(&contents).await?;
        info!("Successfully sent file: {}", path.display());

        Ok(size)
    }

    /// Receive one frame into `path`, overwriting it.
    ///
    /// Returns `None` if the peer closed the stream before the frame began.
    /// Nothing is written unless the whole frame arrived.
    pub async fn receive_file(&mut self, path: &Path) -> TransferResult<Option<u64>> {
        let payload = match self.receive().await? {
            Received::Frame(payload) => payload,
            Received::EndOfStream => return Ok(None),
        };
        let size = payload.len() as u64;

        tokio::fs::write(path, &payload)
            .await
            .map_err(|source| TransferError::File {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "Successfully received file: {} ({} bytes)",
            path.display(),
            size
        );

        Ok(Some(size))
    }

    /// Write raw, unframed bytes.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> TransferResult<()> {
        self.inner.write_all(bytes).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Perform a single read of at most `max` raw bytes (capped at
    /// `MAX_BUFFER_SIZE`).
    ///
    /// An empty result means the peer closed the stream.
    pub async fn read_command(&mut self, max: usize) -> TransferResult<Vec<u8>> {
        let mut buf = vec![0u8; max.min(MAX_BUFFER_SIZE)];
        let n = read_or_eof(&mut self.inner, &mut buf).await?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Shut down the write half (sends TLS `close_notify` on TLS streams).
    pub async fn shutdown(&mut self) -> TransferResult<()> {
        self.inner.shutdown().await?;
        Ok(())
    }
}
