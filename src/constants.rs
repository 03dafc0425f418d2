//! Protocol constants for EOM driver communication.
//!
//! This module defines the command registry used by the FPGA UART protocol:
//! the frame start marker, command opcodes, response codes, parameter bounds,
//! timing parameters, and default serial port configuration.

/// Marker byte that opens every command frame
pub const START_BYTE: u8 = 0x55;

/// Total length of a command frame in bytes
pub const FRAME_LEN: usize = 8;

/// Number of parameter slots in a command frame
pub const PARAM_SLOTS: usize = 5;

/// Start streaming the programmed sequence
pub const START_SEQUENCE: u8 = 0x41;

/// Stop streaming the programmed sequence
pub const STOP_SEQUENCE: u8 = 0x42;

/// Clear the sequence memory
pub const CLEAR_SEQUENCE: u8 = 0x43;

/// Set the sequence period
pub const SEQUENCE_PERIOD: u8 = 0x44;

/// Set the sequence delay relative to the trigger
pub const SEQUENCE_DELAY: u8 = 0x45;

/// Set the laser diode pulse width
pub const LD_PULSE_WIDTH: u8 = 0x46;

/// Set the laser diode pulse delay relative to the trigger
pub const LD_DELAY: u8 = 0x47;

/// Write the channel data of one sequence window
pub const WINDOW_DATA: u8 = 0x52;

// Response codes returned by the FPGA
pub const CHECKSUM_OK: u8 = 0x01;
pub const START_BYTE_ERROR: u8 = 0x02;
pub const CHECKSUM_ERROR: u8 = 0x03;
pub const COMMAND_ERROR: u8 = 0x04;
pub const SUCCESS: u8 = 0x05;

/// Lowest accepted sequence period
pub const SEQUENCE_PERIOD_MIN: u8 = 20;

/// Highest accepted sequence period
pub const SEQUENCE_PERIOD_MAX: u8 = 200;

/// Lowest accepted laser diode pulse width
pub const LD_PULSE_WIDTH_MIN: u8 = 1;

/// Sequence memory size in bytes (1024 x 8 bits)
pub const SEQUENCE_MEMORY_SIZE: u16 = 1024;

/// FPGA system clock (one cycle is ~3.3333 ns)
pub const CLOCK_FREQUENCY_HZ: u32 = 300_000_000;

/// Channel-data bits that must always be set (`0b11xx_xxxx`)
pub const CHANNEL_MARKER_BITS: u8 = 0b1100_0000;

/// Baud rate (115200 bps, 8N1, no flow control)
pub const BAUD_RATE: u32 = 115_200;

/// Read timeout in milliseconds
pub const TIMEOUT_MS: u64 = 1000;

/// Delay after each transmitted byte, throttles input to the FPGA buffer
pub const BYTE_DELAY_MS: u64 = 100;

/// Poll interval while waiting for earlier output to drain
pub const DRAIN_POLL_MS: u64 = 1;
