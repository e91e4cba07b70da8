//! aisbridge daemon
//!
//! Opens a protocol session on the configured serial port and forwards every
//! normalized status update to stdout as one JSON object per line, for a
//! vessel-data host to consume.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use aisbridge_core::config::BridgeConfig;
use aisbridge_core::protocol::{list_ports, ProtocolSession, DEFAULT_BAUD_RATE};

/// AIS transponder bridge
#[derive(Parser, Debug)]
#[command(name = "aisbridge")]
#[command(about = "Bridge between an AIS transponder and a vessel-data host")]
#[command(version)]
struct Args {
    /// JSON configuration file ({"serialPort": "...", "baudRate": ...})
    #[arg(short, long, conflicts_with_all = ["port", "baud"])]
    config: Option<PathBuf>,

    /// Serial port device path (e.g. /dev/ttyUSB0)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate for the serial connection
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Put the transponder in silent (receive-only) mode on startup
    #[arg(long, conflicts_with = "disable_silent_mode")]
    enable_silent_mode: bool,

    /// Take the transponder out of silent mode on startup
    #[arg(long)]
    disable_silent_mode: bool,
}

fn load_config(args: &Args) -> Result<BridgeConfig> {
    if let Some(path) = &args.config {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing configuration file {}", path.display()))?;
        return Ok(config);
    }
    Ok(BridgeConfig {
        serial_port: args.port.clone().unwrap_or_default(),
        baud_rate: args.baud,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,aisbridge_core=debug"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    if args.list_ports {
        for port in list_ports() {
            match port.product {
                Some(product) => println!("{}\t{}", port.name, product),
                None => println!("{}", port.name),
            }
        }
        return Ok(());
    }

    let config = load_config(&args)?;

    let (sink_tx, mut sink_rx) = mpsc::channel(64);
    let session = ProtocolSession::open(&config, sink_tx).context("opening session")?;
    tracing::info!(
        port = %config.serial_port,
        baud = config.baud_rate,
        "session open"
    );

    if args.enable_silent_mode {
        session.enable_silent_mode().await.context("enabling silent mode")?;
    } else if args.disable_silent_mode {
        session.disable_silent_mode().await.context("disabling silent mode")?;
    }

    loop {
        tokio::select! {
            update = sink_rx.recv() => match update {
                Some(update) => println!("{}", serde_json::to_string(&update)?),
                None => {
                    tracing::warn!("session ended");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    session.close().await;
    Ok(())
}
