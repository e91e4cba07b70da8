//! Protocol errors

use thiserror::Error;

/// Errors that can occur while talking to the transponder
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Invalid or missing configuration; fatal at startup, no session is created
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O failure reported by the transport; logged, the session stays alive
    #[error("transport error: {0}")]
    Transport(String),

    /// A write was attempted while the transport is closed; the operation is
    /// abandoned, not retried
    #[error("transport is not open")]
    TransportNotOpen,

    /// A public operation was invoked outside the `Open` state
    #[error("session is not open")]
    SessionNotOpen,

    /// Sentence content cannot be encoded; fatal to the caller of encode
    #[error("cannot encode sentence: {0}")]
    Encode(String),

    /// An incoming line does not carry a parseable sentence; swallowed by the
    /// session, since arbitrary noise on the line is expected
    #[error("cannot decode sentence: {0}")]
    Decode(String),

    /// A wire constant failed its checksum self-check
    #[error("checksum mismatch in {sentence}: computed {computed:02X}, declared {declared:02X}")]
    ChecksumMismatch {
        /// The offending sentence
        sentence: String,
        /// Checksum computed over the sentence body
        computed: u8,
        /// Checksum declared after the `*` delimiter
        declared: u8,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
