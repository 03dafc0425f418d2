//! # EOM UART Library
//!
//! A Rust library for driving the FPGA that generates the electro-optical
//! modulator (EOM) timing sequence, over its UART command protocol.
//!
//! ## Features
//!
//! - Encode the eight protocol commands as validated, checksummed 8-byte frames
//! - Reject out-of-range parameters before anything reaches the wire
//! - Paced, one-frame-at-a-time exchange with a single-byte reply
//! - Classify replies into typed outcomes, including timeouts
//! - Program a whole experiment from a serde-loadable configuration
//!
//! All time parameters are counts of the 300 MHz system clock (3.3333 ns).
//!
//! ## Example
//!
//! ```no_run
//! use eom_uart::Eom;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut eom = Eom::new("/dev/ttyUSB0")?;
//!     eom.set_sequence_period(50)?;
//!     let report = eom.write_sequence_window(0, 18, 6, 0b1100_1100)?;
//!     println!("{} (max {} windows)", report.outcome, report.max_windows);
//!     eom.start_sequence()?;
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_transport;

pub use error::{EomError, Result, ValidationError};
pub use frame::{checksum, CommandFrame};
pub use protocol::Eom;
pub use transport::{SerialConfig, Transport};
pub use types::*;
