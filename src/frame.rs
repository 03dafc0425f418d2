//! Command frame encoding and validation.
//!
//! Every command is an 8-byte frame:
//!
//! ```text
//! [0x55, opcode, p0, p1, p2, p3, p4, checksum]
//! ```
//!
//! Unused parameter slots are zero and the checksum is the 8-bit wrapping sum
//! of the first seven bytes. Constructors validate their parameters, so a
//! `CommandFrame` that exists is always safe to send.

use crate::constants::*;
use crate::error::{EomError, Result, ValidationError};
use crate::types::{max_window_count, Opcode, WindowLimitMode, WindowSpec};
use std::fmt;

/// Calculate checksum for a frame body
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// One encoded command, ready for the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandFrame {
    opcode: Opcode,
    bytes: [u8; FRAME_LEN],
}

impl CommandFrame {
    /// Build a frame from an opcode and its parameter slots
    pub fn new(opcode: Opcode, params: [u8; PARAM_SLOTS]) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = START_BYTE;
        bytes[1] = opcode.as_byte();
        bytes[2..2 + PARAM_SLOTS].copy_from_slice(&params);
        bytes[FRAME_LEN - 1] = checksum(&bytes[..FRAME_LEN - 1]);
        CommandFrame { opcode, bytes }
    }

    fn single(opcode: Opcode, value: u8) -> Self {
        Self::new(opcode, [value, 0, 0, 0, 0])
    }

    pub fn start_sequence() -> Self {
        Self::new(Opcode::StartSequence, [0; PARAM_SLOTS])
    }

    pub fn stop_sequence() -> Self {
        Self::new(Opcode::StopSequence, [0; PARAM_SLOTS])
    }

    pub fn clear_sequence() -> Self {
        Self::new(Opcode::ClearSequence, [0; PARAM_SLOTS])
    }

    /// Sequence period, 20-200
    pub fn sequence_period(value: u8) -> std::result::Result<Self, ValidationError> {
        check_range("sequence period", value, SEQUENCE_PERIOD_MIN, SEQUENCE_PERIOD_MAX)?;
        Ok(Self::single(Opcode::SequencePeriod, value))
    }

    /// Sequence delay relative to the trigger, any byte value
    pub fn sequence_delay(value: u8) -> Self {
        Self::single(Opcode::SequenceDelay, value)
    }

    /// Laser diode pulse width, 1-255
    pub fn ld_pulse_width(value: u8) -> std::result::Result<Self, ValidationError> {
        check_range("LD pulse width", value, LD_PULSE_WIDTH_MIN, u8::MAX)?;
        Ok(Self::single(Opcode::LdPulseWidth, value))
    }

    /// Laser diode pulse delay relative to the trigger, any byte value
    pub fn ld_pulse_delay(value: u8) -> Self {
        Self::single(Opcode::LdDelay, value)
    }

    /// Channel data for one sequence window.
    ///
    /// The pulse must be strictly shorter than the window. In
    /// [`WindowLimitMode::Strict`] the window number must also fall inside
    /// the `floor(1024 / window_width)` windows that fit in sequence memory.
    pub fn window(spec: &WindowSpec, mode: WindowLimitMode) -> std::result::Result<Self, ValidationError> {
        if spec.pulse_width >= spec.window_width {
            return Err(ValidationError::PulseWidthTooLong {
                pulse_width: spec.pulse_width,
                window_width: spec.window_width,
            });
        }

        let max_windows = max_window_count(spec.window_width);
        if mode == WindowLimitMode::Strict && u16::from(spec.window_number) >= max_windows {
            return Err(ValidationError::WindowOutOfBounds {
                window_number: spec.window_number,
                max_windows,
            });
        }

        Ok(Self::new(
            Opcode::WindowData,
            [
                spec.window_number,
                spec.window_width,
                spec.pulse_width,
                spec.channels.as_byte(),
                0,
            ],
        ))
    }

    /// Decode and verify a frame received or captured as raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; FRAME_LEN] = bytes
            .try_into()
            .map_err(|_| EomError::InvalidFrameLength(bytes.len()))?;

        if bytes[0] != START_BYTE {
            return Err(EomError::InvalidStartByte(bytes[0]));
        }
        let opcode = Opcode::try_from(bytes[1])?;

        let expected = checksum(&bytes[..FRAME_LEN - 1]);
        let actual = bytes[FRAME_LEN - 1];
        if expected != actual {
            return Err(EomError::ChecksumMismatch { expected, actual });
        }

        Ok(CommandFrame { opcode, bytes })
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn params(&self) -> [u8; PARAM_SLOTS] {
        let mut params = [0u8; PARAM_SLOTS];
        params.copy_from_slice(&self.bytes[2..2 + PARAM_SLOTS]);
        params
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[FRAME_LEN - 1]
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: Vec<String> = self.bytes.iter().map(|b| format!("{:02X}", b)).collect();
        write!(f, "{}", hex.join(" "))
    }
}

fn check_range(parameter: &'static str, value: u8, min: u8, max: u8) -> std::result::Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            parameter,
            value: value.into(),
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelPattern;

    fn assert_well_formed(frame: &CommandFrame) {
        let bytes = frame.as_bytes();
        assert_eq!(bytes.len(), FRAME_LEN);
        assert_eq!(bytes[0], START_BYTE);
        let sum: u32 = bytes[..7].iter().map(|&b| b as u32).sum();
        assert_eq!(bytes[7] as u32, sum % 256);
    }

    #[test]
    fn start_sequence_bytes() {
        let frame = CommandFrame::start_sequence();
        assert_eq!(frame.as_bytes(), &[0x55, 0x41, 0, 0, 0, 0, 0, 0x96]);
        assert_eq!(frame.to_string(), "55 41 00 00 00 00 00 96");
    }

    #[test]
    fn stop_and_clear_bytes() {
        assert_eq!(CommandFrame::stop_sequence().as_bytes(), &[0x55, 0x42, 0, 0, 0, 0, 0, 0x97]);
        assert_eq!(CommandFrame::clear_sequence().as_bytes(), &[0x55, 0x43, 0, 0, 0, 0, 0, 0x98]);
    }

    #[test]
    fn window_frame_matches_reference() {
        let spec = WindowSpec::new(1, 20, 5, ChannelPattern::from_raw(0b1100_1100));
        let frame = CommandFrame::window(&spec, WindowLimitMode::Advisory).unwrap();
        let sum: u32 = 0x55 + 0x52 + 0x01 + 0x14 + 0x05 + 0xCC;
        assert_eq!(
            frame.as_bytes(),
            &[0x55, 0x52, 0x01, 0x14, 0x05, 0xCC, 0x00, (sum % 256) as u8]
        );
        assert_eq!(frame.checksum(), 0x8D);
    }

    #[test]
    fn sequence_period_boundaries() {
        assert!(CommandFrame::sequence_period(20).is_ok());
        assert!(CommandFrame::sequence_period(200).is_ok());
        assert_eq!(
            CommandFrame::sequence_period(19),
            Err(ValidationError::OutOfRange {
                parameter: "sequence period",
                value: 19,
                min: 20,
                max: 200
            })
        );
        assert!(CommandFrame::sequence_period(201).is_err());
    }

    #[test]
    fn every_valid_single_parameter_is_well_formed() {
        for value in 0..=u8::MAX {
            if let Ok(frame) = CommandFrame::sequence_period(value) {
                assert_well_formed(&frame);
                assert_eq!(frame.params(), [value, 0, 0, 0, 0]);
            } else {
                assert!(!(20..=200).contains(&value));
            }
            assert_well_formed(&CommandFrame::sequence_delay(value));
            assert_well_formed(&CommandFrame::ld_pulse_delay(value));
            match CommandFrame::ld_pulse_width(value) {
                Ok(frame) => assert_well_formed(&frame),
                Err(_) => assert_eq!(value, 0),
            }
        }
    }

    #[test]
    fn pulse_must_be_shorter_than_window() {
        let spec = WindowSpec::new(0, 20, 20, ChannelPattern::IDLE);
        assert_eq!(
            CommandFrame::window(&spec, WindowLimitMode::Advisory),
            Err(ValidationError::PulseWidthTooLong {
                pulse_width: 20,
                window_width: 20
            })
        );
        let spec = WindowSpec::new(0, 0, 0, ChannelPattern::IDLE);
        assert!(CommandFrame::window(&spec, WindowLimitMode::Strict).is_err());
    }

    #[test]
    fn window_bound_only_enforced_in_strict_mode() {
        // 1024 / 18 = 56 windows, numbered 0..=55
        let last = WindowSpec::new(55, 18, 6, ChannelPattern::IDLE);
        let past = WindowSpec::new(56, 18, 6, ChannelPattern::IDLE);
        assert!(CommandFrame::window(&last, WindowLimitMode::Strict).is_ok());
        assert!(CommandFrame::window(&past, WindowLimitMode::Advisory).is_ok());
        assert_eq!(
            CommandFrame::window(&past, WindowLimitMode::Strict),
            Err(ValidationError::WindowOutOfBounds {
                window_number: 56,
                max_windows: 56
            })
        );
    }

    #[test]
    fn checksum_ignores_byte_order() {
        let body = [0x55, 0x52, 0x01, 0x14, 0x05, 0xCC, 0x00];
        let mut reversed = body;
        reversed.reverse();
        let mut rotated = body;
        rotated.rotate_left(3);
        assert_eq!(checksum(&body), checksum(&reversed));
        assert_eq!(checksum(&body), checksum(&rotated));
        assert_eq!(checksum(&[0xFF, 0xFF, 0x02]), 0x00);
    }

    #[test]
    fn from_bytes_verifies_frame() {
        let frame = CommandFrame::sequence_period(50).unwrap();
        let decoded = CommandFrame::from_bytes(frame.as_ref()).unwrap();
        assert_eq!(decoded.opcode(), Opcode::SequencePeriod);
        assert_eq!(decoded.params()[0], 50);

        assert!(matches!(
            CommandFrame::from_bytes(&frame.as_bytes()[..7]),
            Err(EomError::InvalidFrameLength(7))
        ));

        let mut bad = *frame.as_bytes();
        bad[0] = 0xAA;
        assert!(matches!(CommandFrame::from_bytes(&bad), Err(EomError::InvalidStartByte(0xAA))));

        let mut bad = *frame.as_bytes();
        bad[1] = 0x60;
        assert!(matches!(CommandFrame::from_bytes(&bad), Err(EomError::UnknownOpcode(0x60))));

        let mut bad = *frame.as_bytes();
        bad[7] = bad[7].wrapping_add(1);
        assert!(matches!(
            CommandFrame::from_bytes(&bad),
            Err(EomError::ChecksumMismatch { .. })
        ));
    }
}
