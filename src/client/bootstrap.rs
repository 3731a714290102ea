//! First-run bootstrap of the send file.
//!
//! A client started without its send file writes a sample one and stops, so
//! the operator can inspect or edit it before the first real exchange.

use std::io;
use std::path::Path;

use tracing::info;

use crate::core::constants::SAMPLE_PAYLOAD;

/// State of the send file before a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFileStatus {
    /// The file already existed and will be sent.
    Present,
    /// The file was missing and has just been created with sample content.
    Created,
}

/// Make sure `path` exists, creating it with [`SAMPLE_PAYLOAD`] if not.
pub async fn ensure_send_file(path: &Path) -> io::Result<SendFileStatus> {
    if tokio::fs::try_exists(path).await? {
        return Ok(SendFileStatus::Present);
    }

    info!("{} not found. Creating it with example content.", path.display());
    tokio::fs::write(path, SAMPLE_PAYLOAD).await?;
    info!("{} created. Please run the client again.", path.display());

    Ok(SendFileStatus::Created)
}
