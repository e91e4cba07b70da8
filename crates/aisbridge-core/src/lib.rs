//! # aisbridge core library
//!
//! Bridges a physical AIS transponder to a vessel-data host over a serial
//! line: issues device-control commands, interprets the device's
//! asynchronous status replies and republishes decoded status as normalized
//! data points.
//!
//! This library provides:
//! - The vendor's proprietary NMEA-like sentence codec
//! - Authorization/command sequencing for privileged commands
//! - The periodic LED status poll
//! - The protocol session state machine owning the transport lifecycle
//!
//! Standard AIS/NMEA sentence types (VDM/VDO, GPS fixes) are out of scope;
//! the bridge only speaks the transponder's control protocol.
//!
//! ## Example
//!
//! ```rust,ignore
//! use aisbridge_core::prelude::*;
//! use tokio::sync::mpsc;
//!
//! let config = BridgeConfig {
//!     serial_port: "/dev/ttyUSB0".to_string(),
//!     baud_rate: 38400,
//! };
//! let (sink_tx, mut sink_rx) = mpsc::channel(64);
//! let session = ProtocolSession::open(&config, sink_tx)?;
//! session.enable_silent_mode().await?;
//! while let Some(update) = sink_rx.recv().await {
//!     println!("{} = {}", update.path, update.value);
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod delta;
pub mod protocol;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::BridgeConfig;
    pub use crate::delta::{StatusSink, StatusUpdate};
    pub use crate::protocol::{
        DeviceStatus, ProtocolError, ProtocolSession, SessionState, StatusSentence,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
