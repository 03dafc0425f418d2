use crate::constants::*;
use crate::error::Result;
use crate::frame::CommandFrame;
use crate::transport::{SerialConfig, Transport};
use crate::types::*;
use log::{debug, log, warn, Level};
use serialport::SerialPort;
use std::thread;
use std::time::Duration;

/// Main EOM driver interface.
///
/// Each command sends one frame and waits for one reply byte. Nothing is
/// retried: negative replies come back as an [`Outcome`] and the caller
/// decides whether to resend.
pub struct Eom<T: Transport = Box<dyn SerialPort>> {
    transport: T,
    byte_delay: Duration,
    window_limit: WindowLimitMode,
    print_tx: bool,
    print_rx: bool,
}

impl Eom {
    /// Open the driver on a serial port with the default board settings
    pub fn new(port_name: &str) -> Result<Self> {
        Self::open(&SerialConfig::new(port_name))
    }

    /// Open the driver with explicit settings
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = config.open()?;
        debug!("Opened {} at {} baud", config.port_name, config.baud_rate);

        let mut eom = Eom::from_transport(port);
        eom.set_byte_delay(config.byte_delay());
        eom.set_window_limit_mode(config.window_limit);
        Ok(eom)
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        Ok(serialport::available_ports()?)
    }
}

impl<T: Transport> Eom<T> {
    /// Wrap an already opened transport
    pub fn from_transport(transport: T) -> Self {
        Eom {
            transport,
            byte_delay: Duration::from_millis(BYTE_DELAY_MS),
            window_limit: WindowLimitMode::default(),
            print_tx: false,
            print_rx: false,
        }
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Pause inserted after every transmitted byte, `Duration::ZERO` disables it
    pub fn set_byte_delay(&mut self, delay: Duration) {
        self.byte_delay = delay;
    }

    pub fn byte_delay(&self) -> Duration {
        self.byte_delay
    }

    pub fn set_window_limit_mode(&mut self, mode: WindowLimitMode) {
        self.window_limit = mode;
    }

    pub fn window_limit_mode(&self) -> WindowLimitMode {
        self.window_limit
    }

    /// Raise TX/RX logging from debug to info level
    pub fn set_debug_print(&mut self, tx: bool, rx: bool) {
        self.print_tx = tx;
        self.print_rx = rx;
    }

    /// Block until earlier output has left the port
    fn wait_for_drain(&mut self) -> Result<()> {
        while self.transport.bytes_to_write()? > 0 {
            thread::sleep(Duration::from_millis(DRAIN_POLL_MS));
        }
        Ok(())
    }

    /// Send a frame byte by byte and classify the reply
    pub fn send_frame(&mut self, frame: &CommandFrame) -> Result<Outcome> {
        self.wait_for_drain()?;

        let level = if self.print_tx { Level::Info } else { Level::Debug };
        log!(level, "Sending:  {}", frame);

        for &byte in frame.as_bytes() {
            self.transport.write_bytes(&[byte])?;
            if !self.byte_delay.is_zero() {
                thread::sleep(self.byte_delay);
            }
        }
        self.transport.flush()?;

        let outcome = match self.transport.read_byte()? {
            Some(byte) => {
                let level = if self.print_rx { Level::Info } else { Level::Debug };
                log!(level, "Received: {:02X}", byte);
                Outcome::Reply(ResponseCode::from(byte))
            }
            None => Outcome::NoReply,
        };

        if !outcome.is_positive() {
            warn!("{:?} command: {}", frame.opcode(), outcome);
        }
        Ok(outcome)
    }

    /// Start streaming the programmed sequence
    pub fn start_sequence(&mut self) -> Result<Outcome> {
        self.send_frame(&CommandFrame::start_sequence())
    }

    /// Stop streaming the programmed sequence
    pub fn stop_sequence(&mut self) -> Result<Outcome> {
        self.send_frame(&CommandFrame::stop_sequence())
    }

    /// Clear the FPGA sequence memory
    pub fn clear_sequence(&mut self) -> Result<Outcome> {
        self.send_frame(&CommandFrame::clear_sequence())
    }

    /// Set the sequence period (20-200)
    pub fn set_sequence_period(&mut self, val: u8) -> Result<Outcome> {
        let frame = CommandFrame::sequence_period(val)?;
        self.send_frame(&frame)
    }

    /// Set the sequence delay relative to the trigger (0-255)
    pub fn set_sequence_delay(&mut self, val: u8) -> Result<Outcome> {
        self.send_frame(&CommandFrame::sequence_delay(val))
    }

    /// Set the laser diode pulse width (1-255)
    pub fn set_ld_pulse_width(&mut self, val: u8) -> Result<Outcome> {
        let frame = CommandFrame::ld_pulse_width(val)?;
        self.send_frame(&frame)
    }

    /// Set the laser diode pulse delay relative to the trigger (0-255)
    pub fn set_ld_pulse_delay(&mut self, val: u8) -> Result<Outcome> {
        self.send_frame(&CommandFrame::ld_pulse_delay(val))
    }

    /// Program one window of the sequence.
    ///
    /// `window_width` and `pulse_width` are in clock cycles (3.3333 ns each)
    /// and `channels_data` is sent verbatim, see [`ChannelPattern`] for the
    /// bit layout.
    pub fn write_sequence_window(
        &mut self,
        window_number: u8,
        window_width: u8,
        pulse_width: u8,
        channels_data: u8,
    ) -> Result<WindowReport> {
        let spec = WindowSpec::new(
            window_number,
            window_width,
            pulse_width,
            ChannelPattern::from_raw(channels_data),
        );
        self.write_window(&spec)
    }

    pub fn write_window(&mut self, spec: &WindowSpec) -> Result<WindowReport> {
        let frame = CommandFrame::window(spec, self.window_limit)?;

        let max_windows = spec.max_windows();
        debug!(
            "Maximal window number for window width {} is {}",
            spec.window_width, max_windows
        );
        if u16::from(spec.window_number) >= max_windows {
            warn!(
                "Window {} lies beyond the {} windows available for width {}",
                spec.window_number, max_windows, spec.window_width
            );
        }
        if !spec.channels.has_marker() {
            warn!(
                "Channel data {:#010b} does not start with the 0b11 marker",
                spec.channels.as_byte()
            );
        }

        let outcome = self.send_frame(&frame)?;
        Ok(WindowReport {
            outcome,
            max_windows,
        })
    }

    /// Program every timing parameter and window of an experiment.
    ///
    /// The whole configuration is validated before the first byte goes out.
    /// Frames are then sent in order until one is not acknowledged; the
    /// outcomes gathered up to that point are returned.
    pub fn configure(&mut self, config: &SequenceConfig) -> Result<Vec<Outcome>> {
        let mut frames = vec![
            CommandFrame::sequence_period(config.sequence_period)?,
            CommandFrame::sequence_delay(config.sequence_delay),
            CommandFrame::ld_pulse_width(config.ld_pulse_width)?,
            CommandFrame::ld_pulse_delay(config.ld_delay),
        ];
        for window in &config.windows {
            frames.push(CommandFrame::window(window, self.window_limit)?);
        }

        let mut outcomes = Vec::with_capacity(frames.len());
        for frame in &frames {
            let outcome = self.send_frame(frame)?;
            outcomes.push(outcome);
            if !outcome.is_positive() {
                break;
            }
        }
        Ok(outcomes)
    }
}
