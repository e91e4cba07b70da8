//! Command catalogue
//!
//! The fixed wire sentences the bridge sends to the transponder, plus the
//! protocol timing constants. All sentences are pre-computed constants;
//! [`self_check`] verifies every checksum through the codec at session open
//! so none of them is hand-trusted.

use std::time::Duration;

use super::{sentence, ProtocolError};

/// Authorization sentence that must precede any privileged command
pub const AUTHORIZATION: &str = "$PSRT,012,(--QuaRk--)*4B";

/// Privileged command: enable silent (receive-only) mode
pub const SILENT_MODE_ON: &str = "$PSRT,TRG,0233*6A";

/// Privileged command: disable silent mode
pub const SILENT_MODE_OFF: &str = "$PSRT,TRG,0200*6A";

/// LED status poll sentence
pub const LED_POLL: &str = "$DUAIQ,LED*29";

/// Settle time between the authorization sentence and the privileged command
/// that follows it. The device offers no ACK to wait on; this is an
/// empirically required delay, not a handshake.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Period of the LED status poll
pub const POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Verify a TRG sentence's checksum the way the transponder firmware computes
/// it: the separator before the final argument field is excluded from the XOR.
/// `$PSRT,TRG,0233*6A` checksums over `PSRT,TRG0233`, not `PSRT,TRG,0233`.
fn verify_trg_checksum(wire: &str) -> Result<(), ProtocolError> {
    let (body, declared) = sentence::split_wire(wire)?;
    let folded = match body.rfind(',') {
        Some(i) => format!("{}{}", &body[..i], &body[i + 1..]),
        None => body.to_string(),
    };
    let computed = sentence::checksum(&folded);
    if computed != declared {
        return Err(ProtocolError::ChecksumMismatch {
            sentence: wire.to_string(),
            computed,
            declared,
        });
    }
    Ok(())
}

/// Validate all command constants against the codec's checksum routine.
///
/// Run once at session open; a failure here means a corrupted constant and is
/// fatal to startup.
pub fn self_check() -> Result<(), ProtocolError> {
    sentence::verify_wire_checksum(AUTHORIZATION)?;
    sentence::verify_wire_checksum(LED_POLL)?;
    verify_trg_checksum(SILENT_MODE_ON)?;
    verify_trg_checksum(SILENT_MODE_OFF)?;
    Ok(())
}
