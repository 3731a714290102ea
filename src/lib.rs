//! # tally-exchange
//!
//! Secure file exchange with a word-tally transform.
//!
//! A client sends a text file to a server over TLS. The server counts the
//! words of the file, and once the client's operator confirms with `start`,
//! returns the counts as a result file.
//!
//! ## Wire protocol
//!
//! ```text
//! FRAME   := length (u64, big-endian) || payload (length bytes)
//! SESSION := FRAME(client file) ; RAW("start") ; FRAME(result file)
//! ```
//!
//! The middle step is raw bytes with no length prefix.
//!
//! ## Feature Flags
//!
//! - `transport` (default): framing and TLS streams
//! - `client` (default): client session driver
//! - `server` (default): server session driver
//!
//! ## Modules
//!
//! - [`core`]: constants, configuration and error types (always included)
//! - [`tally`]: the word-tally transform (always included)
//! - [`transport`]: framed transport and TLS setup (requires `transport` feature)
//! - [`client`]: client session driver (requires `client` feature)
//! - [`server`]: server session driver (requires `server` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_exchange::tally::WordCount;
//!
//! let counts = WordCount::from_text("usa india usa nepal india pakistan .");
//! assert_eq!(counts.render(), "usa-2\nindia-2\nnepal-1\npakistan-1\n");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Word tally transform (always included)
pub mod tally;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
pub mod transport;

// Client API (feature-gated)
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;

// Server API (feature-gated)
#[cfg(feature = "server")]
#[cfg_attr(docsrs, doc(cfg(feature = "server")))]
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::tally::{WordCount, tally_file};

    #[cfg(feature = "transport")]
    pub use crate::transport::{FramedStream, Received, TransferError, TransferResult};

    #[cfg(feature = "client")]
    pub use crate::client::{ClientError, ClientOutcome, ExchangeClient};

    #[cfg(feature = "server")]
    pub use crate::server::{ExchangeServer, ServerError, SessionOutcome};
}

// Re-export commonly used items at crate root
pub use crate::core::{ClientConfig, ConfigError, ServerConfig, TallyError};
pub use crate::tally::WordCount;

#[cfg(feature = "transport")]
pub use crate::transport::{FramedStream, Received, TransferError};
