//! Core constants, configuration, and error types.
//!
//! Always compiled; the transport, client and server layers build on these.

mod config;
pub mod constants;
mod error;

pub use config::*;
pub use error::*;
