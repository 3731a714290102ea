//! High-level exchange server.
//!
//! Provides `ExchangeServer`, a strictly serial TLS accept loop: each
//! connection is handled to completion before the next `accept`.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tokio_rustls::TlsAcceptor;
use tracing::{Instrument, error, info, info_span, warn};

use super::session::{ServerSession, SessionError, SessionId, SessionOutcome};
use crate::core::{ConfigError, ServerConfig};
use crate::transport::{FramedStream, TlsError, tls};

/// Errors that can occur in the exchange server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Certificate or key could not be loaded.
    #[error("tls setup failed: {0}")]
    Tls(#[from] TlsError),

    /// Failed to bind to address.
    #[error("bind to {addr} failed: {source}")]
    BindFailed {
        /// Requested address.
        addr: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// `accept` failed.
    #[error("accept failed: {0}")]
    Accept(io::Error),

    /// TLS handshake with a client failed.
    #[error("handshake with {peer} failed: {source}")]
    Handshake {
        /// Client address.
        peer: SocketAddr,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Session error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ServerError {
    /// Check if the failure came from the client connection rather than
    /// local state (files, configuration, TLS material).
    pub fn is_connection_error(&self) -> bool {
        match self {
            ServerError::Accept(_) | ServerError::Handshake { .. } => true,
            ServerError::Session(SessionError::Transfer(e)) => e.is_connection_error(),
            _ => false,
        }
    }
}

/// An exchange server.
///
/// # Example
///
/// ```ignore
/// use tally_exchange::core::ServerConfigBuilder;
/// use tally_exchange::server::ExchangeServer;
///
/// let config = ServerConfigBuilder::new().port(5000).build();
/// let mut server = ExchangeServer::bind(config).await?;
/// server.run().await;
/// ```
pub struct ExchangeServer {
    config: ServerConfig,
    listener: TcpListener,
    acceptor: TlsAcceptor,
    local_addr: SocketAddr,
    sessions_started: u64,
}

impl ExchangeServer {
    /// Load the TLS material and bind the listening socket.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let acceptor = tls::acceptor(&config.cert_path, &config.key_path)?;

        let requested = format!("{}:{}", config.host, config.port);
        let bind_failed = |source: io::Error| ServerError::BindFailed {
            addr: requested.clone(),
            source,
        };

        let addr = lookup_host((config.host.as_str(), config.port))
            .await
            .map_err(bind_failed)?
            .next()
            .ok_or_else(|| bind_failed(io::Error::from(io::ErrorKind::AddrNotAvailable)))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_failed)?;
        socket.set_reuseaddr(true).map_err(bind_failed)?;
        socket.bind(addr).map_err(bind_failed)?;
        let listener = socket.listen(config.backlog).map_err(bind_failed)?;
        let local_addr = listener.local_addr()?;

        info!("Secure server listening on {}...", local_addr);

        Ok(Self {
            config,
            listener,
            acceptor,
            local_addr,
            sessions_started: 0,
        })
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connections accepted so far.
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }

    /// Accept one connection and handle it to completion.
    pub async fn serve_one(&mut self) -> Result<SessionOutcome, ServerError> {
        let (tcp, peer) = self.listener.accept().await.map_err(ServerError::Accept)?;
        self.sessions_started += 1;
        let id = SessionId::new(self.sessions_started);

        let acceptor = &self.acceptor;
        let config = &self.config;
        let span = info_span!("session", id = id.get(), peer = %peer);

        async move {
            info!("Client connected: {}", peer);
            let tls = acceptor
                .accept(tcp)
                .await
                .map_err(|source| ServerError::Handshake { peer, source })?;
            let stream = FramedStream::with_chunk_size(tls, config.chunk_size);
            let outcome = ServerSession::new(id, stream, config).handle().await?;
            Ok::<_, ServerError>(outcome)
        }
        .instrument(span)
        .await
    }

    /// Serve connections forever, one at a time.
    ///
    /// Failures are logged per connection and never stop the loop.
    pub async fn run(&mut self) {
        loop {
            match self.serve_one().await {
                Ok(SessionOutcome::Responded { received, sent }) => {
                    info!(
                        "Session complete: received {} bytes, sent {} bytes",
                        received, sent
                    );
                }
                Ok(SessionOutcome::PeerDisconnected) => {
                    info!("Session abandoned: peer disconnected");
                }
                Ok(SessionOutcome::UnrecognizedCommand { .. }) => {
                    info!("Session closed without response");
                }
                Err(ServerError::Handshake { peer, source }) => {
                    warn!("TLS error with {}: {}", peer, source);
                }
                Err(ServerError::Session(SessionError::Transfer(e))) if e.is_truncation() => {
                    warn!("Client stopped mid-transfer: {}", e);
                }
                Err(e) if e.is_connection_error() => {
                    warn!("Connection error: {}", e);
                }
                Err(e) => {
                    error!("An error occurred: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ServerConfigBuilder, TallyError};
    use crate::transport::TransferError;

    #[test]
    fn test_connection_error_classification() {
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let handshake = ServerError::Handshake {
            peer,
            source: io::Error::from(io::ErrorKind::InvalidData),
        };
        assert!(handshake.is_connection_error());

        let reset = ServerError::Session(SessionError::Transfer(TransferError::Io(
            io::Error::from(io::ErrorKind::ConnectionReset),
        )));
        assert!(reset.is_connection_error());

        let truncated = ServerError::Session(SessionError::Transfer(TransferError::Truncated {
            expected: 50,
            received: 16,
        }));
        assert!(truncated.is_connection_error());

        let tally = ServerError::Session(SessionError::Tally(TallyError::InvalidEncoding {
            path: "received.txt".into(),
            offset: 0,
        }));
        assert!(!tally.is_connection_error());

        let local_file = ServerError::Session(SessionError::Transfer(TransferError::File {
            path: "result.txt".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }));
        assert!(!local_file.is_connection_error());
        assert!(!ServerError::Config(ConfigError::ZeroBacklog).is_connection_error());
    }

    #[tokio::test]
    async fn test_bind_requires_tls_material() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfigBuilder::new()
            .host("127.0.0.1")
            .port(0)
            .cert_path(dir.path().join("server.crt"))
            .key_path(dir.path().join("server.key"))
            .build();

        let err = ExchangeServer::bind(config).await.err().unwrap();

        assert!(matches!(err, ServerError::Tls(TlsError::Read { .. })));
    }

    #[tokio::test]
    async fn test_bind_validates_config() {
        let config = ServerConfigBuilder::new().backlog(0).build();
        let err = ExchangeServer::bind(config).await.err().unwrap();
        assert!(matches!(err, ServerError::Config(ConfigError::ZeroBacklog)));
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let dir = tempfile::tempdir().unwrap();
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        std::fs::write(dir.path().join("server.crt"), cert.pem()).unwrap();
        std::fs::write(dir.path().join("server.key"), key_pair.serialize_pem()).unwrap();

        let config = ServerConfigBuilder::new()
            .host("127.0.0.1")
            .port(0)
            .cert_path(dir.path().join("server.crt"))
            .key_path(dir.path().join("server.key"))
            .build();
        let server = ExchangeServer::bind(config).await.unwrap();

        assert_ne!(server.local_addr().port(), 0);
        assert_eq!(server.sessions_started(), 0);
    }
}
