//! Normalized status updates
//!
//! Decoded device status leaves the session as timestamped key/value pairs
//! addressed to the vessel itself; the host sink is an `mpsc` channel whose
//! receiving end belongs to the embedding process. Storage and delivery
//! guarantees are the host's concern.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

/// Context identifier for the vessel the bridge runs on
pub const SELF_CONTEXT: &str = "vessels.self";

/// Source label attached to every update
pub const SOURCE_LABEL: &str = "True Heading AIS controller";

/// Path for the silent-mode status bit
pub const PATH_SILENT_MODE: &str = "ais.status.silentmode";

/// Path for the device-error status bit
pub const PATH_ERROR: &str = "ais.status.error";

/// One normalized status-bit update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    /// Context the value belongs to
    pub context: &'static str,
    /// Label of the producing source
    pub source: &'static str,
    /// Emission time, serialized as ISO-8601
    pub timestamp: DateTime<Utc>,
    /// Data path of the status bit
    pub path: &'static str,
    /// Current value of the bit
    pub value: bool,
}

impl StatusUpdate {
    /// Build an update for the vessel itself, timestamped now
    pub fn new(path: &'static str, value: bool) -> Self {
        Self {
            context: SELF_CONTEXT,
            source: SOURCE_LABEL,
            timestamp: Utc::now(),
            path,
            value,
        }
    }
}

/// Sending side of the host data sink
pub type StatusSink = mpsc::Sender<StatusUpdate>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_addresses_the_own_vessel() {
        let update = StatusUpdate::new(PATH_SILENT_MODE, true);
        assert_eq!(update.context, SELF_CONTEXT);
        assert_eq!(update.source, SOURCE_LABEL);
        assert!(update.value);
    }

    #[test]
    fn serializes_with_iso8601_timestamp() {
        let update = StatusUpdate::new(PATH_ERROR, false);
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains(r#""path":"ais.status.error""#));
        assert!(json.contains(r#""value":false"#));
        // chrono renders DateTime<Utc> in RFC 3339 / ISO-8601 form
        assert!(json.contains('T'));
        assert!(json.contains(r#""timestamp":""#));
    }
}
