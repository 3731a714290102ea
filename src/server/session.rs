//! Server session handling.
//!
//! One session covers one accepted connection:
//! - receive the client file
//! - tally it into the result file
//! - wait for the raw start command and answer it

use std::fmt;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::{self, JoinError};
use tracing::{debug, info, warn};

use crate::core::constants::START_COMMAND;
use crate::core::{ServerConfig, TallyError};
use crate::tally::tally_file;
use crate::transport::{FramedStream, TransferError};

/// Sequential session number, unique per server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Create a session ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Connection accepted, waiting for the client file.
    Accepted,
    /// Client file stored.
    Received,
    /// Result file written.
    Processed,
    /// Waiting for the raw command.
    AwaitingCommand,
    /// Sending the result frame.
    Responding,
    /// Connection finished.
    Closed,
}

/// How a session ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The result was sent back.
    Responded {
        /// Size of the received client file.
        received: u64,
        /// Size of the result sent.
        sent: u64,
    },
    /// The peer closed before sending any frame byte.
    PeerDisconnected,
    /// The command was not `start`; nothing was sent.
    UnrecognizedCommand {
        /// The decoded command text.
        command: String,
    },
}

/// Errors that abort a single session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Frame or raw transfer failed.
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Tallying the received file failed.
    #[error("tally error: {0}")]
    Tally(#[from] TallyError),

    /// The blocking tally task panicked or was cancelled.
    #[error("tally task failed: {0}")]
    TallyTask(#[from] JoinError),
}

/// Check if raw command text requests the result.
///
/// Matches `start` anywhere in the text, in any case.
pub fn is_start_command(command: &str) -> bool {
    command.to_ascii_lowercase().contains(START_COMMAND)
}

/// One accepted connection.
pub struct ServerSession<'a, S> {
    id: SessionId,
    stream: FramedStream<S>,
    config: &'a ServerConfig,
    phase: SessionPhase,
}

impl<'a, S> ServerSession<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a session over an established stream.
    pub fn new(id: SessionId, stream: FramedStream<S>, config: &'a ServerConfig) -> Self {
        Self {
            id,
            stream,
            config,
            phase: SessionPhase::Accepted,
        }
    }

    /// Get the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Drive the session to completion.
    pub async fn handle(mut self) -> Result<SessionOutcome, SessionError> {
        let outcome = self.exchange().await;
        self.close().await;
        outcome
    }

    async fn exchange(&mut self) -> Result<SessionOutcome, SessionError> {
        let config = self.config;

        let Some(received) = self
            .stream
            .receive_file(&config.receive_file_path)
            .await?
        else {
            info!("Client disconnected before file transfer.");
            return Ok(SessionOutcome::PeerDisconnected);
        };
        self.phase = SessionPhase::Received;

        let input = config.receive_file_path.clone();
        let output = config.result_file_path.clone();
        task::spawn_blocking(move || tally_file(&input, &output)).await??;
        self.phase = SessionPhase::Processed;

        self.phase = SessionPhase::AwaitingCommand;
        let raw = self.stream.read_command(config.command_buffer_size).await?;
        let command = String::from_utf8_lossy(&raw).into_owned();

        if !is_start_command(&command) {
            warn!("Unknown command received: {:?}", command);
            return Ok(SessionOutcome::UnrecognizedCommand { command });
        }

        info!("Client sent '{}' command. Sending result file...", START_COMMAND);
        self.phase = SessionPhase::Responding;
        let sent = self.stream.send_file(&config.result_file_path).await?;

        Ok(SessionOutcome::Responded { received, sent })
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!("Shutdown of session {} failed: {}", self.id, e);
        }
        self.phase = SessionPhase::Closed;
    }
}
