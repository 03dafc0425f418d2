use crate::constants::*;
use crate::error::EomError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Command identifier carried in byte 1 of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    StartSequence,
    StopSequence,
    ClearSequence,
    SequencePeriod,
    SequenceDelay,
    LdPulseWidth,
    LdDelay,
    WindowData,
}

impl Opcode {
    pub const ALL: [Opcode; 8] = [
        Opcode::StartSequence,
        Opcode::StopSequence,
        Opcode::ClearSequence,
        Opcode::SequencePeriod,
        Opcode::SequenceDelay,
        Opcode::LdPulseWidth,
        Opcode::LdDelay,
        Opcode::WindowData,
    ];

    pub fn as_byte(self) -> u8 {
        match self {
            Opcode::StartSequence => START_SEQUENCE,
            Opcode::StopSequence => STOP_SEQUENCE,
            Opcode::ClearSequence => CLEAR_SEQUENCE,
            Opcode::SequencePeriod => SEQUENCE_PERIOD,
            Opcode::SequenceDelay => SEQUENCE_DELAY,
            Opcode::LdPulseWidth => LD_PULSE_WIDTH,
            Opcode::LdDelay => LD_DELAY,
            Opcode::WindowData => WINDOW_DATA,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = EomError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.as_byte() == byte)
            .ok_or(EomError::UnknownOpcode(byte))
    }
}

/// Single-byte reply from the FPGA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCode {
    ChecksumOk,
    StartByteError,
    ChecksumError,
    CommandError,
    Success,
    /// Any byte outside the defined codes, kept for diagnostics
    Unknown(u8),
}

impl ResponseCode {
    pub fn as_byte(self) -> u8 {
        match self {
            ResponseCode::ChecksumOk => CHECKSUM_OK,
            ResponseCode::StartByteError => START_BYTE_ERROR,
            ResponseCode::ChecksumError => CHECKSUM_ERROR,
            ResponseCode::CommandError => COMMAND_ERROR,
            ResponseCode::Success => SUCCESS,
            ResponseCode::Unknown(raw) => raw,
        }
    }

    /// `ChecksumOk` and `Success` are the two acknowledgements
    pub fn is_positive(self) -> bool {
        matches!(self, ResponseCode::ChecksumOk | ResponseCode::Success)
    }
}

impl From<u8> for ResponseCode {
    fn from(byte: u8) -> Self {
        match byte {
            CHECKSUM_OK => ResponseCode::ChecksumOk,
            START_BYTE_ERROR => ResponseCode::StartByteError,
            CHECKSUM_ERROR => ResponseCode::ChecksumError,
            COMMAND_ERROR => ResponseCode::CommandError,
            SUCCESS => ResponseCode::Success,
            raw => ResponseCode::Unknown(raw),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::ChecksumOk => write!(f, "CHECKSUM OK"),
            ResponseCode::StartByteError => write!(f, "START BYTE ERROR"),
            ResponseCode::ChecksumError => write!(f, "WRONG CHECKSUM"),
            ResponseCode::CommandError => write!(f, "WRONG COMMAND"),
            ResponseCode::Success => write!(f, "SUCCESS"),
            ResponseCode::Unknown(raw) => write!(f, "UNKNOWN ERROR ({:#04x})", raw),
        }
    }
}

/// Result of one frame exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The FPGA answered with a byte
    Reply(ResponseCode),
    /// Read timed out (or the port closed) before a reply arrived
    NoReply,
}

impl Outcome {
    pub fn is_positive(self) -> bool {
        matches!(self, Outcome::Reply(code) if code.is_positive())
    }

    pub fn response(self) -> Option<ResponseCode> {
        match self {
            Outcome::Reply(code) => Some(code),
            Outcome::NoReply => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Reply(code) => code.fmt(f),
            Outcome::NoReply => write!(f, "NO REPLY"),
        }
    }
}

/// Output channel controlled by the window channel data.
///
/// Discriminants are bit positions inside the channel byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Ch11 = 0,
    Ch12 = 1,
    Ch13 = 2,
    Ch21 = 3,
    Ch22 = 4,
    Ch23 = 5,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Ch11,
        Channel::Ch12,
        Channel::Ch13,
        Channel::Ch21,
        Channel::Ch22,
        Channel::Ch23,
    ];

    fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// Channel levels for one window.
///
/// Layout is `0b11` followed by `ch23 ch22 ch21 ch13 ch12 ch11`. Channels use
/// inverted logic: a set bit drives the output LOW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelPattern(u8);

impl ChannelPattern {
    /// All channels HIGH
    pub const IDLE: ChannelPattern = ChannelPattern(CHANNEL_MARKER_BITS);

    /// Use a channel byte exactly as given
    pub fn from_raw(raw: u8) -> Self {
        ChannelPattern(raw)
    }

    /// Marker bits set, the listed channels LOW and every other channel HIGH
    pub fn from_low_channels(low: &[Channel]) -> Self {
        let bits = low.iter().fold(CHANNEL_MARKER_BITS, |acc, ch| acc | ch.mask());
        ChannelPattern(bits)
    }

    pub fn is_low(self, channel: Channel) -> bool {
        self.0 & channel.mask() != 0
    }

    pub fn has_marker(self) -> bool {
        self.0 & CHANNEL_MARKER_BITS == CHANNEL_MARKER_BITS
    }

    pub fn as_byte(self) -> u8 {
        self.0
    }
}

impl Default for ChannelPattern {
    fn default() -> Self {
        ChannelPattern::IDLE
    }
}

/// One time slot of the repeating channel sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub window_number: u8,
    /// Window length in clock cycles
    pub window_width: u8,
    /// Pulse length in clock cycles, must be below `window_width`
    pub pulse_width: u8,
    #[serde(default)]
    pub channels: ChannelPattern,
}

impl WindowSpec {
    pub fn new(window_number: u8, window_width: u8, pulse_width: u8, channels: ChannelPattern) -> Self {
        WindowSpec {
            window_number,
            window_width,
            pulse_width,
            channels,
        }
    }

    pub fn max_windows(&self) -> u16 {
        max_window_count(self.window_width)
    }
}

/// How a window number beyond sequence memory is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowLimitMode {
    /// Report the maximum window count but send the frame anyway
    #[default]
    Advisory,
    /// Reject windows numbered at or past the maximum
    Strict,
}

/// Reply to a window write plus the advisory window count for its width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowReport {
    pub outcome: Outcome,
    pub max_windows: u16,
}

/// Every parameter of one experiment, programmed in a single pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    pub sequence_period: u8,
    pub sequence_delay: u8,
    pub ld_pulse_width: u8,
    pub ld_delay: u8,
    #[serde(default)]
    pub windows: Vec<WindowSpec>,
}

/// Number of windows that fit in sequence memory for a given width.
///
/// A width of zero yields zero.
pub fn max_window_count(window_width: u8) -> u16 {
    if window_width == 0 {
        return 0;
    }
    SEQUENCE_MEMORY_SIZE / window_width as u16
}

/// Convert FPGA clock cycles to nanoseconds
pub fn cycles_to_ns(cycles: u32) -> f64 {
    cycles as f64 * 1e9 / CLOCK_FREQUENCY_HZ as f64
}

/// Convert nanoseconds to the nearest whole number of FPGA clock cycles
pub fn ns_to_cycles(ns: f64) -> u32 {
    (ns * CLOCK_FREQUENCY_HZ as f64 / 1e9).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_codes_classify() {
        assert_eq!(ResponseCode::from(0x01), ResponseCode::ChecksumOk);
        assert_eq!(ResponseCode::from(0x02), ResponseCode::StartByteError);
        assert_eq!(ResponseCode::from(0x03), ResponseCode::ChecksumError);
        assert_eq!(ResponseCode::from(0x04), ResponseCode::CommandError);
        assert_eq!(ResponseCode::from(0x05), ResponseCode::Success);
        assert_eq!(ResponseCode::from(0x09), ResponseCode::Unknown(0x09));
        assert_eq!(ResponseCode::from(0x09).as_byte(), 0x09);
    }

    #[test]
    fn only_acknowledgements_are_positive() {
        for byte in 0..=u8::MAX {
            let code = ResponseCode::from(byte);
            assert_eq!(code.is_positive(), byte == CHECKSUM_OK || byte == SUCCESS);
        }
        assert!(!Outcome::NoReply.is_positive());
        assert!(Outcome::Reply(ResponseCode::Success).is_positive());
    }

    #[test]
    fn opcode_bytes_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::try_from(op.as_byte()).unwrap(), op);
        }
        assert!(matches!(Opcode::try_from(0x48), Err(EomError::UnknownOpcode(0x48))));
    }

    #[test]
    fn channel_pattern_from_low_channels() {
        let pattern = ChannelPattern::from_low_channels(&[Channel::Ch13, Channel::Ch21]);
        assert_eq!(pattern.as_byte(), 0b1100_1100);
        assert!(pattern.has_marker());
        assert!(pattern.is_low(Channel::Ch13));
        assert!(!pattern.is_low(Channel::Ch11));
        assert_eq!(ChannelPattern::from_low_channels(&Channel::ALL).as_byte(), 0xFF);
        assert!(!ChannelPattern::from_raw(0b0000_0001).has_marker());
    }

    #[test]
    fn window_count_uses_floor() {
        assert_eq!(max_window_count(18), 56);
        assert_eq!(max_window_count(20), 51);
        assert_eq!(max_window_count(1), 1024);
        assert_eq!(max_window_count(0), 0);
    }

    #[test]
    fn clock_cycle_conversion() {
        assert_eq!(ns_to_cycles(60.0), 18);
        assert_eq!(cycles_to_ns(18), 60.0);
        assert_eq!(ns_to_cycles(3.3333), 1);
    }

    #[test]
    fn sequence_config_from_json() {
        let json = r#"{
            "sequence_period": 50,
            "sequence_delay": 10,
            "ld_pulse_width": 3,
            "ld_delay": 0,
            "windows": [
                { "window_number": 0, "window_width": 18, "pulse_width": 6, "channels": 204 },
                { "window_number": 1, "window_width": 18, "pulse_width": 6 }
            ]
        }"#;
        let config: SequenceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sequence_period, 50);
        assert_eq!(config.windows[0].channels.as_byte(), 0xCC);
        assert_eq!(config.windows[1].channels, ChannelPattern::IDLE);
    }
}
