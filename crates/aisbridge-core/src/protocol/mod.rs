//! Transponder protocol
//!
//! Implements the vendor's proprietary NMEA-like command protocol: sentence
//! encode/decode, the authorization/command sequencing discipline, the
//! periodic status poll and the session state machine that ties them to a
//! serial transport.

pub mod commands;
mod error;
mod poller;
mod sequencer;
pub mod sentence;
pub mod serial;
mod session;

pub use error::ProtocolError;
pub use poller::StatusPoller;
pub use sentence::{CommandSentence, DeviceStatus, SentenceType, StatusSentence};
pub use sequencer::CommandSequencer;
pub use serial::{list_ports, open_port, PortInfo};
pub use session::{ProtocolSession, SessionState};

/// Default baud rate for the transponder's serial link
pub const DEFAULT_BAUD_RATE: u32 = 38400;
