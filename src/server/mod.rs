//! Server session driver.
//!
//! Accepts one TLS connection at a time, tallies the received file and
//! returns the result when the client sends `start`.

#[allow(clippy::module_inception)]
mod server;
mod session;

pub use server::*;
pub use session::*;
