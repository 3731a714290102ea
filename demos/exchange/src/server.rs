//! Server mode.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tally_exchange::core::ServerConfigBuilder;
use tally_exchange::core::constants::{
    DEFAULT_BACKLOG, DEFAULT_CERT_PATH, DEFAULT_HOST, DEFAULT_KEY_PATH, DEFAULT_PORT, DEFAULT_RECEIVE_FILE,
    DEFAULT_SERVER_RESULT_FILE,
};
use tally_exchange::server::ExchangeServer;
use tracing::info;

#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "EXCHANGE_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "EXCHANGE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// PEM certificate chain
    #[arg(long, env = "EXCHANGE_CERT", default_value = DEFAULT_CERT_PATH)]
    cert: PathBuf,

    /// PEM private key
    #[arg(long, env = "EXCHANGE_KEY", default_value = DEFAULT_KEY_PATH)]
    key: PathBuf,

    /// Where each client's file is stored
    #[arg(long, env = "EXCHANGE_RECEIVE_FILE", default_value = DEFAULT_RECEIVE_FILE)]
    receive_file: PathBuf,

    /// Where the tally is written before it is sent back
    #[arg(long, env = "EXCHANGE_SERVER_RESULT_FILE", default_value = DEFAULT_SERVER_RESULT_FILE)]
    result_file: PathBuf,

    /// Pending connection queue length
    #[arg(long, default_value_t = DEFAULT_BACKLOG)]
    backlog: u32,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let config = ServerConfigBuilder::new()
        .host(args.host)
        .port(args.port)
        .cert_path(args.cert)
        .key_path(args.key)
        .receive_file_path(args.receive_file)
        .result_file_path(args.result_file)
        .backlog(args.backlog)
        .build();

    let mut server = ExchangeServer::bind(config).await?;

    let interrupted = tokio::select! {
        _ = server.run() => false,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            true
        }
    };
    if interrupted {
        info!(
            "Shutting down after {} session(s).",
            server.sessions_started()
        );
    }

    Ok(())
}
