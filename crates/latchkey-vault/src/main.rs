//! Back node binary: listens for a panel and serves commands.

use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use latchkey_core::{SystemClock, TcpLink};
use latchkey_vault::{FileStore, LogAlarm, LogLatch, VaultConfig, VaultError, VaultService};
use tracing_subscriber::EnvFilter;

/// Latchkey back node (credential/actuator side).
#[derive(Debug, Parser)]
#[command(name = "latchkey-vault", about = "Latchkey back node")]
struct Args {
    /// Address to listen on for the panel.
    #[arg(long, default_value = "127.0.0.1:7700")]
    listen: String,

    /// Path of the persistent credential store image.
    #[arg(long, default_value = "latchkey-store.bin")]
    store: PathBuf,

    /// Settle delay after each store byte operation, in milliseconds.
    #[arg(long, default_value_t = 10)]
    settle_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let clock = SystemClock::new();
    let mut store =
        FileStore::open(&args.store, clock, Duration::from_millis(args.settle_ms))?;
    let mut latch = LogLatch;
    let mut alarm = LogAlarm;

    let listener = TcpListener::bind(&args.listen)?;
    tracing::info!(addr = %args.listen, store = %args.store.display(), "vault listening");

    for stream in listener.incoming() {
        let link = TcpLink::new(stream?)?;
        tracing::info!("panel connected");
        let mut service = VaultService::new(
            link,
            &mut store,
            &mut latch,
            &mut alarm,
            clock,
            VaultConfig::default(),
        );
        match service.serve() {
            Ok(()) => {},
            // A desynchronized panel only poisons its own session; the
            // next connection starts a fresh receiver.
            Err(err @ VaultError::Handshake(_)) => {
                tracing::error!(%err, "session failed");
            },
            // Store and actuator failures mean the node can no longer
            // vouch for its own state. Fail closed.
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
