//! Client mode.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tally_exchange::client::{ClientOutcome, ExchangeClient, OperatorConsole};
use tally_exchange::core::ClientConfigBuilder;
use tally_exchange::core::constants::{
    DEFAULT_CERT_PATH, DEFAULT_CLIENT_RESULT_FILE, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SEND_FILE,
};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Server host
    #[arg(long, env = "EXCHANGE_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, env = "EXCHANGE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Server certificate to pin
    #[arg(long, env = "EXCHANGE_CERT", default_value = DEFAULT_CERT_PATH)]
    cert: PathBuf,

    /// File to send (created with sample text if missing)
    #[arg(long, env = "EXCHANGE_SEND_FILE", default_value = DEFAULT_SEND_FILE)]
    send_file: PathBuf,

    /// Where the returned tally is stored
    #[arg(long, env = "EXCHANGE_RESULT_FILE", default_value = DEFAULT_CLIENT_RESULT_FILE)]
    result_file: PathBuf,
}

pub async fn run(args: ClientArgs) -> Result<()> {
    let result = exchange(args).await;
    info!("Client shutting down.");
    result
}

async fn exchange(args: ClientArgs) -> Result<()> {
    let config = ClientConfigBuilder::new()
        .host(args.host)
        .port(args.port)
        .cert_path(args.cert)
        .send_file_path(args.send_file)
        .result_file_path(args.result_file)
        .build();

    let mut client = ExchangeClient::new(config)?;
    let mut operator = OperatorConsole::stdio();

    match client.run(&mut operator).await {
        Ok(ClientOutcome::Bootstrapped { .. }) => Ok(()),
        Ok(ClientOutcome::Completed { sent, received }) => {
            info!(
                "Exchange complete: sent {} bytes, result of {} bytes saved to {}",
                sent,
                received,
                client.config().result_file_path.display()
            );
            Ok(())
        }
        Err(e) => {
            // Reported once by main.
            if let Some(hint) = e.hint() {
                warn!("{}", hint);
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_exchange::client::ClientError;

    #[tokio::test]
    async fn test_failure_is_returned_to_main() {
        let dir = tempfile::tempdir().unwrap();
        let send_file = dir.path().join("send.txt");
        std::fs::write(&send_file, "a b .").unwrap();
        let args = ClientArgs {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            cert: dir.path().join("missing.crt"),
            send_file,
            result_file: dir.path().join("result.txt"),
        };

        let err = run(args).await.unwrap_err();

        let client_err = err.downcast_ref::<ClientError>().unwrap();
        assert!(matches!(client_err, ClientError::Tls(_)));
        assert!(client_err.hint().is_some());
    }
}
