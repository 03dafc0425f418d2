//! Program Sequence Example
//!
//! Loads an experiment description from a JSON file and programs it in one
//! pass, then starts the sequence.
//!
//! Usage:
//!   cargo run --example program_sequence -- sequence.json
//!
//! Expected file layout:
//!
//! ```json
//! {
//!   "serial": { "port_name": "/dev/ttyUSB0", "byte_delay_ms": 100, "window_limit": "strict" },
//!   "sequence": {
//!     "sequence_period": 50,
//!     "sequence_delay": 10,
//!     "ld_pulse_width": 3,
//!     "ld_delay": 0,
//!     "windows": [
//!       { "window_number": 0, "window_width": 18, "pulse_width": 6, "channels": 204 }
//!     ]
//!   }
//! }
//! ```

use eom_uart::{Eom, SequenceConfig, SerialConfig};
use log::{error, info};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Experiment {
    serial: SerialConfig,
    sequence: SequenceConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: program_sequence <experiment.json>")?;
    let experiment: Experiment = serde_json::from_str(&std::fs::read_to_string(&path)?)?;

    info!("Connecting to EOM driver on {}...", experiment.serial.port_name);
    let mut eom = Eom::open(&experiment.serial)?;

    let expected = 4 + experiment.sequence.windows.len();
    let outcomes = eom.configure(&experiment.sequence)?;
    let acknowledged = outcomes.iter().filter(|o| o.is_positive()).count();
    info!("{}/{} frames acknowledged", acknowledged, expected);

    if acknowledged != expected {
        if let Some(last) = outcomes.last() {
            error!("Programming stopped at frame {}: {}", outcomes.len(), last);
        }
        return Ok(());
    }

    info!("Start sequence: {}", eom.start_sequence()?);
    Ok(())
}
