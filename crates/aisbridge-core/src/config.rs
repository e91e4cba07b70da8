//! Bridge configuration
//!
//! The port path and baud rate arrive from an external configuration source
//! (a JSON file or CLI flags); this module only validates them. The JSON
//! field names mirror the host's configuration schema, hence the camelCase
//! aliases.

use serde::{Deserialize, Serialize};

use crate::protocol::{ProtocolError, DEFAULT_BAUD_RATE};

/// Baud rates the transponder's serial link supports
pub const SUPPORTED_BAUD_RATES: [u32; 6] = [4800, 9600, 19200, 38400, 57600, 115200];

/// Serial bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Serial port device path (e.g., "/dev/ttyUSB0" or "COM3")
    #[serde(alias = "serialPort")]
    pub serial_port: String,

    /// Baud rate for the serial connection
    #[serde(alias = "baudRate", default = "default_baud_rate")]
    pub baud_rate: u32,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            serial_port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

impl BridgeConfig {
    /// Check that a port is present and the baud rate is one the device
    /// supports. Fails with [`ProtocolError::Config`]; a session is never
    /// created from an invalid configuration.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.serial_port.is_empty() {
            return Err(ProtocolError::Config(
                "serial port not defined".to_string(),
            ));
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(ProtocolError::Config(format!(
                "unsupported baud rate {}, expected one of {:?}",
                self.baud_rate, SUPPORTED_BAUD_RATES
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_uses_device_default_baud() {
        let config = BridgeConfig::default();
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
    }

    #[test]
    fn validate_requires_a_port() {
        let config = BridgeConfig::default();
        assert!(matches!(config.validate(), Err(ProtocolError::Config(_))));
    }

    #[test]
    fn validate_rejects_unsupported_baud() {
        let config = BridgeConfig {
            serial_port: "/dev/ttyUSB0".to_string(),
            baud_rate: 31250,
        };
        assert!(matches!(config.validate(), Err(ProtocolError::Config(_))));
    }

    #[test]
    fn validate_accepts_supported_rates() {
        for baud in SUPPORTED_BAUD_RATES {
            let config = BridgeConfig {
                serial_port: "/dev/ttyUSB0".to_string(),
                baud_rate: baud,
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn deserializes_host_schema_field_names() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"serialPort": "/dev/ttyUSB0", "baudRate": 38400}"#).unwrap();
        assert_eq!(
            config,
            BridgeConfig {
                serial_port: "/dev/ttyUSB0".to_string(),
                baud_rate: 38400,
            }
        );
    }

    #[test]
    fn baud_rate_defaults_when_omitted() {
        let config: BridgeConfig = serde_json::from_str(r#"{"serialPort": "COM3"}"#).unwrap();
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
    }
}
