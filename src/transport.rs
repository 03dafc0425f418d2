//! Byte transport used by the driver, and serial port configuration.

use crate::constants::*;
use crate::error::Result;
use crate::types::WindowLimitMode;
use serde::{Deserialize, Serialize};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

/// Duplex byte channel to the FPGA.
///
/// The driver owns exactly one transport and uses it for one exchange at a
/// time. Sharing a port between callers needs external serialization.
pub trait Transport {
    /// Write bytes to the output buffer
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Block until written bytes have been handed to the device
    fn flush(&mut self) -> Result<()>;

    /// Read one byte, `None` when the read timed out or the channel closed
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Bytes still waiting in the output buffer
    fn bytes_to_write(&mut self) -> Result<u32>;
}

impl Transport for Box<dyn SerialPort> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Write::flush(self)?;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn bytes_to_write(&mut self) -> Result<u32> {
        Ok(SerialPort::bytes_to_write(&**self)?)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn bytes_to_write(&mut self) -> Result<u32> {
        (**self).bytes_to_write()
    }
}

/// Serial link settings and driver defaults.
///
/// Line settings are fixed at 8N1 without flow control; only the values the
/// FPGA board may be built with differently are exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port_name: String,
    pub baud_rate: u32,
    /// Reply read timeout
    pub timeout_ms: u64,
    /// Pause after every transmitted byte
    pub byte_delay_ms: u64,
    pub window_limit: WindowLimitMode,
}

impl SerialConfig {
    pub fn new(port_name: &str) -> Self {
        SerialConfig {
            port_name: port_name.to_string(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn byte_delay(&self) -> Duration {
        Duration::from_millis(self.byte_delay_ms)
    }

    /// Open and configure the serial port
    pub fn open(&self) -> Result<Box<dyn SerialPort>> {
        let port = serialport::new(&self.port_name, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(self.timeout())
            .open()?;
        Ok(port)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port_name: String::new(),
            baud_rate: BAUD_RATE,
            timeout_ms: TIMEOUT_MS,
            byte_delay_ms: BYTE_DELAY_MS,
            window_limit: WindowLimitMode::Advisory,
        }
    }
}
