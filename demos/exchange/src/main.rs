//! Tally Exchange
//!
//! Runs either end of the exchange.
//!
//! Environment variables (each overridden by the matching flag):
//! - EXCHANGE_HOST: server host (bind address for the server)
//! - EXCHANGE_PORT: server port (default 5000)
//! - EXCHANGE_CERT: server certificate; the client pins it as its trust anchor
//! - EXCHANGE_KEY: server private key (server only)
//! - EXCHANGE_SEND_FILE / EXCHANGE_RESULT_FILE: client paths
//! - EXCHANGE_RECEIVE_FILE / EXCHANGE_SERVER_RESULT_FILE: server paths
//! - EXCHANGE_LOG: tracing filter directive (default "info")

mod client;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tally-exchange")]
#[command(about = "Send a text file over TLS and fetch its word tally")]
struct Args {
    /// Enable debug logging (overrides EXCHANGE_LOG)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Accept clients one at a time and answer with the tally of their file
    Server(server::ServerArgs),
    /// Send the local file, wait for 'start', store the result
    Client(client::ClientArgs),
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("EXCHANGE_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    match args.mode {
        Mode::Server(server_args) => server::run(server_args).await,
        Mode::Client(client_args) => client::run(client_args).await,
    }
}
