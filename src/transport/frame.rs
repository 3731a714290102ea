//! Length-prefixed frame encoding and decoding.
//!
//! ```text
//! +------------------------+---------------------------+
//! | length (u64 BE, 8 B)   | payload (length bytes)    |
//! +------------------------+---------------------------+
//! ```
//!
//! There is no type tag, checksum or compression. One frame carries one whole
//! file.

use std::io;

use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::{TransferError, TransferResult};
use crate::core::constants::{LENGTH_PREFIX_SIZE, MAX_BUFFER_SIZE};

/// Upper bound on memory reserved up front for an incoming payload.
///
/// Larger frames grow the buffer as bytes actually arrive, so a bogus prefix
/// cannot force a huge allocation.
pub const MAX_PREALLOCATION: usize = 1 << 20;

/// Outcome of reading one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// A complete frame payload.
    Frame(Vec<u8>),
    /// The peer closed the stream before sending any prefix byte.
    EndOfStream,
}

impl Received {
    /// Get the payload, or `None` at end of stream.
    pub fn into_frame(self) -> Option<Vec<u8>> {
        match self {
            Received::Frame(payload) => Some(payload),
            Received::EndOfStream => None,
        }
    }

    /// Check if the peer closed the stream.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Received::EndOfStream)
    }
}

/// Encode a payload length as the wire prefix.
pub fn encode_length(len: u64) -> [u8; LENGTH_PREFIX_SIZE] {
    len.to_be_bytes()
}

/// Decode a wire prefix into a payload length.
pub fn decode_length(prefix: [u8; LENGTH_PREFIX_SIZE]) -> u64 {
    u64::from_be_bytes(prefix)
}

/// Hex SHA-256 of a payload, for transfer logs.
pub fn payload_digest(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Write one frame: the length prefix, then the payload in `chunk_size` pieces.
///
/// The stream is flushed once the whole payload is written. A failed write
/// aborts the frame; nothing is retried.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], chunk_size: usize) -> TransferResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(&encode_length(payload.len() as u64))
        .await?;
    for chunk in payload.chunks(chunk_size.max(1)) {
        writer.write_all(chunk).await?;
    }
    writer.flush().await?;
    Ok(())
}

/// Read one frame, pulling at most `chunk_size` bytes per read (capped at
/// `MAX_BUFFER_SIZE`).
///
/// Returns [`Received::EndOfStream`] if the stream ends before the first
/// prefix byte. A stream that ends anywhere later is a truncation error; the
/// partial payload is discarded.
pub async fn read_frame<R>(reader: &mut R, chunk_size: usize) -> TransferResult<Received>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    let mut filled = 0;
    while filled < LENGTH_PREFIX_SIZE {
        let n = read_or_eof(reader, &mut prefix[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(Received::EndOfStream);
            }
            return Err(TransferError::TruncatedHeader { received: filled });
        }
        filled += n;
    }

    let expected = decode_length(prefix);
    let expected_len = usize::try_from(expected).map_err(|_| TransferError::TooLarge(expected))?;

    let mut payload = Vec::with_capacity(expected_len.min(MAX_PREALLOCATION));
    let mut chunk = vec![0u8; chunk_size.clamp(1, MAX_BUFFER_SIZE)];
    while payload.len() < expected_len {
        let want = (expected_len - payload.len()).min(chunk.len());
        let n = read_or_eof(reader, &mut chunk[..want]).await?;
        if n == 0 {
            return Err(TransferError::Truncated {
                expected,
                received: payload.len() as u64,
            });
        }
        payload.extend_from_slice(&chunk[..n]);
    }

    Ok(Received::Frame(payload))
}

/// Read into `buf`, reporting an abrupt close as a zero-length read.
///
/// TLS streams surface a peer that vanished without `close_notify` as
/// `UnexpectedEof`; for framing purposes that is the same as a clean close.
pub(crate) async fn read_or_eof<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match reader.read(buf).await {
        Ok(n) => Ok(n),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DEFAULT_CHUNK_SIZE;

    async fn roundtrip(payload: Vec<u8>, chunk_size: usize) -> Received {
        let (mut client, mut server) = tokio::io::duplex(64);
        let writer = async move {
            write_frame(&mut client, &payload, chunk_size).await.unwrap();
            drop(client);
        };
        let reader = async { read_frame(&mut server, chunk_size).await.unwrap() };
        let ((), received) = tokio::join!(writer, reader);
        received
    }

    #[test]
    fn test_length_prefix_is_big_endian() {
        assert_eq!(encode_length(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(encode_length(0x0102), [0, 0, 0, 0, 0, 0, 0x01, 0x02]);
        assert_eq!(decode_length([0, 0, 0, 0, 0, 0, 0x10, 0x00]), 4096);
    }

    #[tokio::test]
    async fn test_wire_layout() {
        let mut wire = Vec::new();
        write_frame(&mut wire, b"hello", 2).await.unwrap();
        assert_eq!(&wire[..8], &[0, 0, 0, 0, 0, 0, 0, 5]);
        assert_eq!(&wire[8..], b"hello");
    }

    #[tokio::test]
    async fn test_roundtrip_empty_payload() {
        let received = roundtrip(Vec::new(), DEFAULT_CHUNK_SIZE).await;
        assert_eq!(received, Received::Frame(Vec::new()));
    }

    #[tokio::test]
    async fn test_roundtrip_across_chunk_boundaries() {
        let payload: Vec<u8> = (0..10 * DEFAULT_CHUNK_SIZE + 1)
            .map(|i| (i % 251) as u8)
            .collect();
        let received = roundtrip(payload.clone(), DEFAULT_CHUNK_SIZE).await;
        assert_eq!(received.into_frame(), Some(payload));
    }

    #[tokio::test]
    async fn test_roundtrip_tiny_chunks() {
        let payload = b"usa india usa nepal india pakistan .".to_vec();
        let received = roundtrip(payload.clone(), 3).await;
        assert_eq!(received, Received::Frame(payload));
    }

    #[tokio::test]
    async fn test_oversized_chunk_size_is_capped() {
        let mut wire = Vec::new();
        write_frame(&mut wire, b"capped", 4).await.unwrap();
        let mut reader: &[u8] = &wire;

        let received = read_frame(&mut reader, usize::MAX).await.unwrap();

        assert_eq!(received, Received::Frame(b"capped".to_vec()));
    }

    #[tokio::test]
    async fn test_end_of_stream_before_prefix() {
        let mut empty: &[u8] = &[];
        let received = read_frame(&mut empty, DEFAULT_CHUNK_SIZE).await.unwrap();
        assert!(received.is_end_of_stream());
        assert_eq!(received.into_frame(), None);
    }

    #[tokio::test]
    async fn test_truncated_prefix() {
        let mut partial: &[u8] = &[0, 0, 0];
        let err = read_frame(&mut partial, DEFAULT_CHUNK_SIZE).await.unwrap_err();
        assert!(matches!(err, TransferError::TruncatedHeader { received: 3 }));
    }

    #[tokio::test]
    async fn test_truncated_payload() {
        let mut wire = encode_length(100).to_vec();
        wire.extend_from_slice(&[7u8; 10]);
        let mut reader: &[u8] = &wire;

        let err = read_frame(&mut reader, 4).await.unwrap_err();

        assert!(matches!(
            err,
            TransferError::Truncated {
                expected: 100,
                received: 10
            }
        ));
    }

    #[tokio::test]
    async fn test_reads_only_one_frame() {
        let mut wire = Vec::new();
        write_frame(&mut wire, b"first", 4).await.unwrap();
        wire.extend_from_slice(b"start");
        let mut reader: &[u8] = &wire;

        let received = read_frame(&mut reader, 4).await.unwrap();

        assert_eq!(received, Received::Frame(b"first".to_vec()));
        assert_eq!(reader, b"start");
    }

    #[test]
    fn test_payload_digest() {
        assert_eq!(
            payload_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
