//! Transport layer.
//!
//! - **Frame encoding/decoding**: [`write_frame`] / [`read_frame`] with an
//!   8-byte big-endian length prefix, read and written in bounded chunks
//! - **Framed streams**: [`FramedStream`], which adds file transfer and the
//!   raw trigger exchange on top of any async byte stream
//! - **TLS**: [`tls`] builds the acceptor and the pinned-certificate connector
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     Client / Server session drivers     │
//! ├─────────────────────────────────────────┤
//! │         Transport Layer                 │  ← This module
//! │   frames, raw trigger, file transfer    │
//! ├─────────────────────────────────────────┤
//! │         TLS (rustls)                    │
//! ├─────────────────────────────────────────┤
//! │              TCP                        │
//! └─────────────────────────────────────────┘
//! ```

mod error;
mod frame;
mod stream;
pub mod tls;

pub use error::*;
pub use frame::*;
pub use stream::*;
