//! Client and server configuration.
//!
//! Every driver takes its configuration at construction; nothing is read from
//! process-wide state. Defaults reproduce the stock deployment: both peers on
//! `localhost:5000`, trust material in `server.crt`/`server.key`.

use std::path::PathBuf;

use super::constants::*;
use super::error::ConfigError;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server host name or IP address.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// PEM file holding the certificate the client trusts.
    pub cert_path: PathBuf,

    /// File sent to the server.
    pub send_file_path: PathBuf,

    /// Destination of the returned result file.
    pub result_file_path: PathBuf,

    /// Chunk size for frame I/O.
    pub chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cert_path: PathBuf::from(DEFAULT_CERT_PATH),
            send_file_path: PathBuf::from(DEFAULT_SEND_FILE),
            result_file_path: PathBuf::from(DEFAULT_CLIENT_RESULT_FILE),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    /// Check the values that would otherwise fail late.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunk_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::ChunkSizeTooLarge(self.chunk_size));
        }
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host or address to bind to.
    pub host: String,

    /// Port to bind to (0 picks an ephemeral port).
    pub port: u16,

    /// PEM certificate chain presented to clients.
    pub cert_path: PathBuf,

    /// PEM private key matching `cert_path`.
    pub key_path: PathBuf,

    /// Where the received client file is stored.
    pub receive_file_path: PathBuf,

    /// Where the tally result is written.
    pub result_file_path: PathBuf,

    /// Chunk size for frame I/O.
    pub chunk_size: usize,

    /// Listen backlog.
    pub backlog: u32,

    /// Maximum bytes read for the raw start command.
    pub command_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cert_path: PathBuf::from(DEFAULT_CERT_PATH),
            key_path: PathBuf::from(DEFAULT_KEY_PATH),
            receive_file_path: PathBuf::from(DEFAULT_RECEIVE_FILE),
            result_file_path: PathBuf::from(DEFAULT_SERVER_RESULT_FILE),
            chunk_size: DEFAULT_CHUNK_SIZE,
            backlog: DEFAULT_BACKLOG,
            command_buffer_size: DEFAULT_COMMAND_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    /// Check the values that would otherwise fail late.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.chunk_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::ChunkSizeTooLarge(self.chunk_size));
        }
        if self.backlog == 0 {
            return Err(ConfigError::ZeroBacklog);
        }
        if self.command_buffer_size < START_COMMAND.len() {
            return Err(ConfigError::CommandBufferTooSmall(self.command_buffer_size));
        }
        if self.command_buffer_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::CommandBufferTooLarge(self.command_buffer_size));
        }
        Ok(())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the trusted certificate file.
    pub fn cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cert_path = path.into();
        self
    }

    /// Set the file to send.
    pub fn send_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.send_file_path = path.into();
        self
    }

    /// Set the result destination.
    pub fn result_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.result_file_path = path.into();
        self
    }

    /// Set the frame chunk size.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the bind port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the certificate chain file.
    pub fn cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cert_path = path.into();
        self
    }

    /// Set the private key file.
    pub fn key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.key_path = path.into();
        self
    }

    /// Set where received files are stored.
    pub fn receive_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.receive_file_path = path.into();
        self
    }

    /// Set where results are written.
    pub fn result_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.result_file_path = path.into();
        self
    }

    /// Set the frame chunk size.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the listen backlog.
    pub fn backlog(mut self, backlog: u32) -> Self {
        self.config.backlog = backlog;
        self
    }

    /// Set the raw command buffer size.
    pub fn command_buffer_size(mut self, size: usize) -> Self {
        self.config.command_buffer_size = size;
        self
    }

    /// Build the server configuration.
    pub fn build(self) -> ServerConfig {
        self.config
    }
}
