//! Protocol and deployment constants.
//!
//! Wire-level values MUST NOT be changed without breaking existing peers.

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Size of the frame length prefix (u64, big-endian).
pub const LENGTH_PREFIX_SIZE: usize = 8;

/// Raw trigger sent by the client to request the result frame.
pub const START_COMMAND: &str = "start";

// =============================================================================
// BUFFER SIZES
// =============================================================================

/// Default chunk size for frame reads and writes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Upper bound of a single raw command read on the server.
pub const DEFAULT_COMMAND_BUFFER_SIZE: usize = 1024;

/// Largest chunk or command buffer a configuration may ask for (1 MiB).
pub const MAX_BUFFER_SIZE: usize = 1 << 20;

/// Default listen backlog for the server socket.
pub const DEFAULT_BACKLOG: u32 = 5;

// =============================================================================
// WORD TALLY
// =============================================================================

/// Token that ends the counted region of an input file.
pub const STOP_TOKEN: &str = ".";

/// Separator between a token and its count in the result file.
pub const COUNT_SEPARATOR: char = '-';

/// Content written to a missing send file on first client run.
pub const SAMPLE_PAYLOAD: &str = "usa india usa nepal india pakistan .";

// =============================================================================
// DEFAULT ENDPOINT AND PATHS
// =============================================================================

/// Default host for both peers.
pub const DEFAULT_HOST: &str = "localhost";

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Server certificate (PEM). Trust anchor on the client side.
pub const DEFAULT_CERT_PATH: &str = "server.crt";

/// Server private key (PEM).
pub const DEFAULT_KEY_PATH: &str = "server.key";

/// File the client sends.
pub const DEFAULT_SEND_FILE: &str = "send.txt";

/// Where the client stores the returned result.
pub const DEFAULT_CLIENT_RESULT_FILE: &str = "client_result.txt";

/// Where the server stores the received file.
pub const DEFAULT_RECEIVE_FILE: &str = "received_from_client.txt";

/// Where the server writes the tally before sending it back.
pub const DEFAULT_SERVER_RESULT_FILE: &str = "result_for_client.txt";
