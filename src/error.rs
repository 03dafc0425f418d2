//! Error types for EOM protocol operations.

use thiserror::Error;

/// Result type alias for EOM operations.
pub type Result<T> = std::result::Result<T, EomError>;

/// Parameter rejected before a frame is built.
///
/// Nothing is written to the transport when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Parameter outside its inclusive range
    #[error("{parameter} must be in the range {min}-{max}, got {value}")]
    OutOfRange {
        parameter: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Pulse must end inside its window
    #[error("pulse width ({pulse_width}) must be less than window width ({window_width})")]
    PulseWidthTooLong { pulse_width: u8, window_width: u8 },

    /// Window number beyond sequence memory (strict mode only)
    #[error("window number {window_number} exceeds the {max_windows} windows available for this width")]
    WindowOutOfBounds { window_number: u8, max_windows: u16 },
}

/// Error types for EOM driver communication.
#[derive(Error, Debug)]
pub enum EomError {
    /// Serial port communication error
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Command parameters rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Frame is not exactly 8 bytes long
    #[error("Invalid frame length: {0} bytes (expected 8)")]
    InvalidFrameLength(usize),

    /// Frame does not begin with the start marker
    #[error("Invalid start byte: {0:#04x}")]
    InvalidStartByte(u8),

    /// Byte does not name a known command
    #[error("Unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    /// Frame checksum validation failed
    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}
