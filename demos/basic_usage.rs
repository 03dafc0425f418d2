//! Basic Usage Example
//!
//! This example walks through every command of the EOM driver protocol:
//! - Listing and selecting serial ports
//! - Setting sequence and laser diode timing
//! - Programming a short channel sequence window by window
//! - Starting and stopping the sequence
//!
//! Usage:
//!   cargo run --example basic_usage                  # Interactive mode
//!   cargo run --example basic_usage -- COM3          # Specify port
//!   cargo run --example basic_usage -- /dev/ttyUSB0
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug cargo run --example basic_usage

use eom_uart::{ns_to_cycles, Channel, ChannelPattern, Eom, Outcome, Result};
use inquire::Select;
use log::{info, warn};
use std::time::Duration;

/// Interactive serial port selection using inquire
fn select_port() -> Result<String> {
    let ports = Eom::list_ports()?;

    if ports.is_empty() {
        eprintln!("No serial ports found!");
        std::process::exit(1);
    }

    let port_names: Vec<String> = ports
        .iter()
        .map(|p| format!("{} - {:?}", p.port_name, p.port_type))
        .collect();

    let selection = Select::new("Select a serial port:", port_names)
        .prompt()
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Selection cancelled: {}", e),
            )
        })?;

    // Extract just the port name (before " - ")
    let port_name = selection.split(" - ").next().unwrap_or_default().to_string();
    Ok(port_name)
}

fn report(command: &str, outcome: Outcome) {
    if outcome.is_positive() {
        info!("✓ {}: {}", command, outcome);
    } else {
        warn!("✗ {}: {}", command, outcome);
    }
}

fn main() -> Result<()> {
    // Initialize logger with default info level if RUST_LOG is not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Get port name from command line argument or interactive selection
    let port_name = std::env::args()
        .nth(1)
        .map(Ok)
        .unwrap_or_else(select_port)?;

    info!("Connecting to EOM driver on {}...", port_name);
    let mut eom = Eom::new(&port_name)?;
    eom.set_debug_print(true, true);

    info!("=== Timing Parameters ===");
    report("Stop sequence", eom.stop_sequence()?);
    report("Clear sequence", eom.clear_sequence()?);
    report("Sequence period", eom.set_sequence_period(50)?);
    report("Sequence delay", eom.set_sequence_delay(10)?);
    report("LD pulse width", eom.set_ld_pulse_width(3)?);
    report("LD pulse delay", eom.set_ld_pulse_delay(0)?);

    info!("=== Sequence Windows ===");
    // 60 ns windows with a 20 ns pulse
    let window_width = ns_to_cycles(60.0) as u8;
    let pulse_width = ns_to_cycles(20.0) as u8;
    let patterns = [
        ChannelPattern::from_low_channels(&[Channel::Ch11]),
        ChannelPattern::from_low_channels(&[Channel::Ch12, Channel::Ch13]),
        ChannelPattern::from_low_channels(&[Channel::Ch21, Channel::Ch22, Channel::Ch23]),
        ChannelPattern::IDLE,
    ];
    for (number, pattern) in patterns.iter().enumerate() {
        let result =
            eom.write_sequence_window(number as u8, window_width, pulse_width, pattern.as_byte())?;
        info!("Window {} of at most {}", number, result.max_windows);
        report("Window data", result.outcome);
    }

    // Out-of-range values never reach the FPGA
    if let Err(e) = eom.set_sequence_period(10) {
        info!("Rejected locally: {}", e);
    }

    info!("=== Run ===");
    report("Start sequence", eom.start_sequence()?);
    std::thread::sleep(Duration::from_secs(5));
    report("Stop sequence", eom.stop_sequence()?);

    Ok(())
}
