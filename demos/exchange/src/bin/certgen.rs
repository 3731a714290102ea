//! Certificate Generation Utility
//!
//! Writes a self-signed certificate and private key for the exchange server.
//! The client pins the same certificate file, so copy `server.crt` to every
//! client machine.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tally-exchange-cli --bin certgen
//! cargo run -p tally-exchange-cli --bin certgen -- --name example.org --name 10.0.0.5
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tally_exchange::core::constants::{DEFAULT_CERT_PATH, DEFAULT_HOST, DEFAULT_KEY_PATH};

#[derive(Parser, Debug)]
#[command(name = "certgen")]
#[command(about = "Generate a self-signed server certificate and key")]
struct Args {
    /// Subject alternative names (DNS names or IP addresses)
    #[arg(short, long = "name", default_values_t = [DEFAULT_HOST.to_string(), "127.0.0.1".to_string()])]
    names: Vec<String>,

    /// Certificate output path
    #[arg(long, env = "EXCHANGE_CERT", default_value = DEFAULT_CERT_PATH)]
    cert: PathBuf,

    /// Private key output path
    #[arg(long, env = "EXCHANGE_KEY", default_value = DEFAULT_KEY_PATH)]
    key: PathBuf,

    /// Overwrite existing files
    #[arg(short, long)]
    force: bool,
}

fn refuse_existing(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    refuse_existing(&args.cert, args.force)?;
    refuse_existing(&args.key, args.force)?;

    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(args.names.clone())
            .context("certificate generation failed")?;

    std::fs::write(&args.cert, cert.pem())
        .with_context(|| format!("writing {}", args.cert.display()))?;
    std::fs::write(&args.key, key_pair.serialize_pem())
        .with_context(|| format!("writing {}", args.key.display()))?;

    println!("Certificate: {}", args.cert.display());
    println!("Private key: {} (keep secret)", args.key.display());
    println!("Subject names: {}", args.names.join(", "));
    println!();
    println!("# Server:");
    println!(
        "tally-exchange server --cert {} --key {}",
        args.cert.display(),
        args.key.display()
    );
    println!("# Client (pins the same certificate):");
    println!("tally-exchange client --cert {}", args.cert.display());

    Ok(())
}
