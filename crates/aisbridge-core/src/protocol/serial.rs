//! Serial port handling
//!
//! Thin infrastructure in front of the protocol session: opens the physical
//! port with the transponder's framing and enumerates candidate ports for
//! the operator.

use serialport::{SerialPortInfo, SerialPortType};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use super::ProtocolError;

/// Information about an available serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyUSB0" or "COM3")
    pub name: String,

    /// Product name (if the OS reports one)
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let product = match info.port_type {
            SerialPortType::UsbPort(usb) => usb.product,
            _ => None,
        };
        Self {
            name: info.port_name,
            product,
        }
    }
}

/// Sort key so ttyACM* ports come first (numerically), then ttyUSB*, then
/// everything else by name
fn port_sort_key(name: &str) -> (u8, usize, String) {
    let basename = name.rsplit('/').next().unwrap_or(name);
    if let Some(rest) = basename.strip_prefix("ttyACM") {
        let num = rest.parse::<usize>().unwrap_or(usize::MAX);
        return (0, num, basename.to_string());
    }
    if let Some(rest) = basename.strip_prefix("ttyUSB") {
        let num = rest.parse::<usize>().unwrap_or(usize::MAX);
        return (1, num, basename.to_string());
    }
    (2, 0, basename.to_string())
}

/// List available serial ports in deterministic order
pub fn list_ports() -> Vec<PortInfo> {
    let mut ports: Vec<PortInfo> = tokio_serial::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(PortInfo::from)
        .collect();
    ports.sort_by_key(|p| port_sort_key(&p.name));
    ports
}

/// Open a serial port for transponder communication (8N1, no flow control)
pub fn open_port(path: &str, baud_rate: u32) -> Result<SerialStream, ProtocolError> {
    #[allow(unused_mut)]
    let mut port = tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()
        .map_err(|e| ProtocolError::Transport(e.to_string()))?;

    #[cfg(unix)]
    port.set_exclusive(false)
        .map_err(|e| ProtocolError::Transport(e.to_string()))?;

    Ok(port)
}
