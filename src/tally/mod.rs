//! Word tally transform.
//!
//! Counts whitespace-delimited tokens up to the first lone `.` token and
//! renders the counts as `token-count` lines in first-occurrence order.
//!
//! - [`WordCount`]: the ordered, immutable count table
//! - [`tally_file`]: file-to-file wrapper used by the server

mod file;
mod table;

pub use file::tally_file;
pub use table::*;
