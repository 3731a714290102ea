//! Client session driver.
//!
//! Sends one file, waits for the operator to type `start`, and stores the
//! server's result.

mod bootstrap;
#[allow(clippy::module_inception)]
mod client;
mod operator;

pub use bootstrap::*;
pub use client::*;
pub use operator::*;
