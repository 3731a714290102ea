//! High-level exchange client.
//!
//! Provides `ExchangeClient` for running one exchange against a server:
//! send the local file, wait for the operator, fetch the result.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::{debug, info};

use super::bootstrap::{SendFileStatus, ensure_send_file};
use super::operator::OperatorConsole;
use crate::core::constants::START_COMMAND;
use crate::core::{ClientConfig, ConfigError};
use crate::transport::{FramedStream, TlsError, TransferError, tls};

/// Errors that can occur in the exchange client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Trust material could not be loaded.
    #[error("tls setup failed: {0}")]
    Tls(#[from] TlsError),

    /// TCP connection could not be established.
    #[error("connection to {addr} failed: {source}")]
    ConnectionFailed {
        /// Target address.
        addr: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The server's certificate is not the pinned one.
    #[error("certificate verification failed: {0}")]
    Certificate(String),

    /// TLS handshake failed for another reason.
    #[error("handshake failed: {0}")]
    HandshakeFailed(io::Error),

    /// Frame transfer failed.
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// The server closed the connection instead of sending the result.
    #[error("server closed the connection without sending a result")]
    NoResult,

    /// Operator input ended before `start` was entered.
    #[error("operator input closed before 'start' was entered")]
    OperatorInputClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ClientError {
    /// Operator-facing hint for common failures.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ClientError::ConnectionFailed { source, .. }
                if source.kind() == io::ErrorKind::ConnectionRefused =>
            {
                Some("Connection refused. Is the server running?")
            }
            ClientError::Certificate(_) => {
                Some("Does the trusted certificate match the server's server.crt?")
            }
            ClientError::Tls(TlsError::Read { .. }) => {
                Some("Did you create the 'server.crt' and 'server.key' files?")
            }
            _ => None,
        }
    }
}

/// Client session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    /// Not connected.
    Disconnected,
    /// TLS session established.
    Connected,
    /// Send file transferred.
    Sent,
    /// Blocked on the operator.
    AwaitingOperatorTrigger,
    /// Raw start command sent.
    TriggerSent,
    /// Reading the result frame.
    ReceivingResult,
    /// Result stored.
    Done,
}

/// How a client run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientOutcome {
    /// The send file was missing and has been created; nothing was sent.
    Bootstrapped {
        /// Created file.
        path: PathBuf,
    },
    /// The full exchange completed.
    Completed {
        /// Bytes sent.
        sent: u64,
        /// Bytes received and written to the result path.
        received: u64,
    },
}

/// Client stream type.
pub type ClientStream = FramedStream<TlsStream<TcpStream>>;

/// An exchange client.
///
/// # Example
///
/// ```ignore
/// use tally_exchange::client::{ExchangeClient, OperatorConsole};
/// use tally_exchange::core::ClientConfigBuilder;
///
/// let config = ClientConfigBuilder::new().host("localhost").port(5000).build();
/// let mut client = ExchangeClient::new(config)?;
/// let outcome = client.run(&mut OperatorConsole::stdio()).await?;
/// ```
#[derive(Debug)]
pub struct ExchangeClient {
    config: ClientConfig,
    phase: ClientPhase,
}

impl ExchangeClient {
    /// Create a client after validating its configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: ClientPhase::Disconnected,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the current phase.
    pub fn phase(&self) -> ClientPhase {
        self.phase
    }

    /// Run one exchange.
    ///
    /// Creates the send file and returns [`ClientOutcome::Bootstrapped`]
    /// without connecting if it does not exist yet.
    pub async fn run<R, W>(
        &mut self,
        operator: &mut OperatorConsole<R, W>,
    ) -> Result<ClientOutcome, ClientError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let send_path = self.config.send_file_path.clone();
        if ensure_send_file(&send_path).await? == SendFileStatus::Created {
            return Ok(ClientOutcome::Bootstrapped { path: send_path });
        }

        let mut stream = self.connect().await?;
        let result = self.exchange(&mut stream, operator).await;

        if let Err(e) = stream.shutdown().await {
            debug!("TLS shutdown failed: {}", e);
        }
        self.phase = if result.is_ok() {
            ClientPhase::Done
        } else {
            ClientPhase::Disconnected
        };
        result
    }

    /// Open the TLS session to the configured server.
    pub async fn connect(&mut self) -> Result<ClientStream, ClientError> {
        let connector = tls::connector(&self.config.cert_path)?;
        let server_name = tls::server_name(&self.config.host)?;
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let tcp = TcpStream::connect((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|source| ClientError::ConnectionFailed {
                addr: addr.clone(),
                source,
            })?;

        let tls = connector.connect(server_name, tcp).await.map_err(|e| {
            if tls::is_certificate_error(&e) {
                ClientError::Certificate(e.to_string())
            } else {
                ClientError::HandshakeFailed(e)
            }
        })?;

        self.phase = ClientPhase::Connected;
        info!("Connected to secure server: {}", addr);
        Ok(FramedStream::with_chunk_size(tls, self.config.chunk_size))
    }

    async fn exchange<R, W>(
        &mut self,
        stream: &mut ClientStream,
        operator: &mut OperatorConsole<R, W>,
    ) -> Result<ClientOutcome, ClientError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let sent = stream.send_file(&self.config.send_file_path).await?;
        self.phase = ClientPhase::Sent;
        debug!("Send file delivered ({} bytes)", sent);

        self.phase = ClientPhase::AwaitingOperatorTrigger;
        operator.wait_for_start().await?;

        stream.send_raw(START_COMMAND.as_bytes()).await?;
        self.phase = ClientPhase::TriggerSent;
        info!("Sent '{}' command. Waiting for result file...", START_COMMAND);

        self.phase = ClientPhase::ReceivingResult;
        let received = stream
            .receive_file(&self.config.result_file_path)
            .await?
            .ok_or(ClientError::NoResult)?;

        Ok(ClientOutcome::Completed { sent, received })
    }
}
