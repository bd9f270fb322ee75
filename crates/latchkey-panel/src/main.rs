//! Front node binary: connects to the vault and runs the panel session.

use clap::Parser;
use latchkey_core::{SystemClock, TcpLink};
use latchkey_panel::{FrontConfig, FrontSession, StdioPanel};
use tracing_subscriber::EnvFilter;

/// Latchkey front node (keypad/display side).
#[derive(Debug, Parser)]
#[command(name = "latchkey-panel", about = "Latchkey front node")]
struct Args {
    /// Address of the vault node.
    #[arg(long, default_value = "127.0.0.1:7700")]
    connect: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!(addr = %args.connect, "connecting to vault");
    let link = TcpLink::connect(&args.connect)?;

    let mut session =
        FrontSession::new(StdioPanel::new(), link, SystemClock::new(), FrontConfig::default());
    session.run()?;
    Ok(())
}
