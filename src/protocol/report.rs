// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Radar to host reports.
//!
//! Command words with the high bit set are replies to queries, the others are active reports.
//! Both carry the same payload and are decoded into the same [`Report`].

use super::{Frame, MAX_PRODUCT_INFO_LEN, ProtocolError, SceneMode, control};
use log::debug;
use strum::{Display, FromRepr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum MotionStatus {
    None = 0,
    Motionless = 1,
    Active = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum KeepAway {
    None = 0,
    Close = 1,
    Away = 2,
}

/// Bundled underlying open function report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnderlyingValues {
    pub static_value: u8,
    /// Meters
    pub presence_distance: f32,
    pub motion_value: u8,
    /// Meters
    pub motion_distance: f32,
    /// Meters per second, negative when approaching
    pub motion_speed: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Report {
    Heartbeat,
    ResetAck,
    ProductModel(String),
    ProductId(String),
    HardwareModel(String),
    FirmwareVersion(String),
    InitStatus(u8),
    SceneMode(SceneMode),
    Presence(bool),
    MotionStatus(MotionStatus),
    MovementSigns(u8),
    KeepAway(KeepAway),
    UnderlyingOpen(bool),
    Underlying(UnderlyingValues),
    StaticValue(u8),
    MotionValue(u8),
    PresenceDistance(f32),
    MotionDistance(f32),
    MotionSpeed(f32),
    /// Known report without a published entity, e.g. threshold and timer settings.
    Ignored { control: u8, command: u8 },
    Unsupported { control: u8, command: u8 },
}

impl TryFrom<&Frame> for Report {
    type Error = ProtocolError;

    fn try_from(frame: &Frame) -> Result<Self, Self::Error> {
        let ignored = Report::Ignored {
            control: frame.control,
            command: frame.command,
        };
        let unsupported = Report::Unsupported {
            control: frame.control,
            command: frame.command,
        };

        let report = match (frame.control, frame.command) {
            (control::SYSTEM, 0x01) => Report::Heartbeat,
            (control::SYSTEM, 0x02) => Report::ResetAck,

            (control::PRODUCT_INFO, 0xA1) => Report::ProductModel(product_info(frame)?),
            (control::PRODUCT_INFO, 0xA2) => Report::ProductId(product_info(frame)?),
            (control::PRODUCT_INFO, 0xA3) => Report::HardwareModel(product_info(frame)?),
            (control::PRODUCT_INFO, 0xA4) => Report::FirmwareVersion(product_info(frame)?),

            (control::WORK_STATUS, 0x01 | 0x81) => Report::InitStatus(byte(frame, 0)?),
            (control::WORK_STATUS, 0x07 | 0x87) => {
                let value = byte(frame, 0)?;
                Report::SceneMode(SceneMode::from_repr(value).ok_or(invalid(frame, value))?)
            }
            (control::WORK_STATUS, 0x08 | 0x09 | 0x88 | 0x89) => ignored,

            (control::HUMAN_INFO, 0x01 | 0x81) => Report::Presence(byte(frame, 0)? != 0),
            (control::HUMAN_INFO, 0x02 | 0x82) => {
                let value = byte(frame, 0)?;
                Report::MotionStatus(MotionStatus::from_repr(value).ok_or(invalid(frame, value))?)
            }
            (control::HUMAN_INFO, 0x03 | 0x83) => Report::MovementSigns(byte(frame, 0)?),
            (control::HUMAN_INFO, 0x0A | 0x8A) => ignored,
            (control::HUMAN_INFO, 0x0B | 0x8B) => keep_away(frame)?,

            (control::UNDERLYING, 0x00 | 0x80) => Report::UnderlyingOpen(byte(frame, 0)? != 0),
            (control::UNDERLYING, 0x01) => {
                require(frame, 5)?;
                let data = &frame.payload;
                Report::Underlying(UnderlyingValues {
                    static_value: data[0],
                    presence_distance: half_meters(data[1]),
                    motion_value: data[2],
                    motion_distance: half_meters(data[3]),
                    motion_speed: speed(data[4]),
                })
            }
            (control::UNDERLYING, 0x06 | 0x86) => keep_away(frame)?,
            (control::UNDERLYING, 0x07 | 0x87) => Report::MovementSigns(byte(frame, 0)?),
            (control::UNDERLYING, 0x81) => Report::StaticValue(byte(frame, 0)?),
            (control::UNDERLYING, 0x82) => Report::MotionValue(byte(frame, 0)?),
            (control::UNDERLYING, 0x83) => Report::PresenceDistance(half_meters(byte(frame, 0)?)),
            (control::UNDERLYING, 0x84) => Report::MotionDistance(half_meters(byte(frame, 0)?)),
            (control::UNDERLYING, 0x85) => Report::MotionSpeed(speed(byte(frame, 0)?)),
            (control::UNDERLYING, 0x08..=0x0E | 0x88..=0x8E) => ignored,

            _ => unsupported,
        };

        Ok(report)
    }
}

fn require(frame: &Frame, len: usize) -> Result<(), ProtocolError> {
    if frame.payload.len() < len {
        return Err(ProtocolError::ShortPayload {
            control: frame.control,
            command: frame.command,
            expected: len,
            actual: frame.payload.len(),
        });
    }
    Ok(())
}

fn byte(frame: &Frame, index: usize) -> Result<u8, ProtocolError> {
    require(frame, index + 1)?;
    Ok(frame.payload[index])
}

fn invalid(frame: &Frame, value: u8) -> ProtocolError {
    ProtocolError::InvalidValue {
        control: frame.control,
        command: frame.command,
        value,
    }
}

fn keep_away(frame: &Frame) -> Result<Report, ProtocolError> {
    let value = byte(frame, 0)?;
    KeepAway::from_repr(value)
        .map(Report::KeepAway)
        .ok_or(invalid(frame, value))
}

fn half_meters(value: u8) -> f32 {
    f32::from(value) * 0.5
}

fn speed(value: u8) -> f32 {
    (f32::from(value) - 10.0) * 0.5
}

fn product_info(frame: &Frame) -> Result<String, ProtocolError> {
    if frame.payload.len() >= MAX_PRODUCT_INFO_LEN {
        debug!(
            "Product information {:#04x} too long: {}",
            frame.command,
            frame.payload.len()
        );
        return Err(ProtocolError::PayloadTooLong {
            control: frame.control,
            command: frame.command,
            max: MAX_PRODUCT_INFO_LEN - 1,
            actual: frame.payload.len(),
        });
    }
    let text = String::from_utf8_lossy(&frame.payload);
    Ok(text.trim_end_matches('\0').trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn report(control: u8, command: u8, payload: &[u8]) -> Result<Report, ProtocolError> {
        Report::try_from(&Frame::new(control, command, payload.to_vec()))
    }

    #[rstest]
    #[case(0x01, 0x01, &[0x0F], Report::Heartbeat)]
    #[case(0x01, 0x02, &[0x0F], Report::ResetAck)]
    #[case(0x80, 0x01, &[0x01], Report::Presence(true))]
    #[case(0x80, 0x81, &[0x00], Report::Presence(false))]
    #[case(0x80, 0x82, &[0x02], Report::MotionStatus(MotionStatus::Active))]
    #[case(0x80, 0x03, &[0x21], Report::MovementSigns(0x21))]
    #[case(0x80, 0x8B, &[0x01], Report::KeepAway(KeepAway::Close))]
    #[case(0x08, 0x86, &[0x02], Report::KeepAway(KeepAway::Away))]
    #[case(0x08, 0x80, &[0x01], Report::UnderlyingOpen(true))]
    #[case(0x08, 0x00, &[0x00], Report::UnderlyingOpen(false))]
    #[case(0x08, 0x83, &[0x04], Report::PresenceDistance(2.0))]
    #[case(0x08, 0x84, &[0x03], Report::MotionDistance(1.5))]
    #[case(0x08, 0x85, &[0x06], Report::MotionSpeed(-2.0))]
    #[case(0x05, 0x87, &[0x02], Report::SceneMode(SceneMode::Bedroom))]
    #[case(0x05, 0x81, &[0x01], Report::InitStatus(1))]
    fn decode_single_value_reports(
        #[case] control: u8,
        #[case] command: u8,
        #[case] payload: &[u8],
        #[case] expected: Report,
    ) {
        assert_eq!(Ok(expected), report(control, command, payload));
    }

    #[test]
    fn decode_underlying_bundle() {
        let result = report(0x08, 0x01, &[0x10, 0x02, 0x30, 0x05, 0x0C]);

        assert_eq!(
            Ok(Report::Underlying(UnderlyingValues {
                static_value: 0x10,
                presence_distance: 1.0,
                motion_value: 0x30,
                motion_distance: 2.5,
                motion_speed: 1.0,
            })),
            result
        );
    }

    #[test]
    fn decode_product_model_trims_padding() {
        assert_eq!(
            Ok(Report::ProductModel("MR24HPC1".into())),
            report(0x02, 0xA1, b"MR24HPC1\0\0")
        );
    }

    #[test]
    fn too_long_product_info_is_rejected() {
        assert_eq!(
            Err(ProtocolError::PayloadTooLong {
                control: 0x02,
                command: 0xA4,
                max: 31,
                actual: 32,
            }),
            report(0x02, 0xA4, &[b'1'; 32])
        );
        assert!(report(0x02, 0xA4, &[b'1'; 31]).is_ok());
    }

    #[rstest]
    #[case(0x80, 0x82, 3)]
    #[case(0x80, 0x0B, 7)]
    #[case(0x05, 0x07, 0)]
    #[case(0x05, 0x87, 5)]
    fn out_of_range_enum_values_are_invalid(
        #[case] control: u8,
        #[case] command: u8,
        #[case] value: u8,
    ) {
        assert_eq!(
            Err(ProtocolError::InvalidValue {
                control,
                command,
                value
            }),
            report(control, command, &[value])
        );
    }

    #[test]
    fn empty_payload_is_short() {
        assert!(matches!(
            report(0x80, 0x81, &[]),
            Err(ProtocolError::ShortPayload { expected: 1, .. })
        ));
        assert!(matches!(
            report(0x08, 0x01, &[1, 2, 3]),
            Err(ProtocolError::ShortPayload {
                expected: 5,
                actual: 3,
                ..
            })
        ));
    }

    #[rstest]
    #[case(0x08, 0x8C, true)]
    #[case(0x05, 0x88, true)]
    #[case(0x80, 0x8A, true)]
    #[case(0x42, 0x01, false)]
    #[case(0x80, 0x7F, false)]
    fn ignored_and_unsupported_reports(
        #[case] control: u8,
        #[case] command: u8,
        #[case] known: bool,
    ) {
        let result = report(control, command, &[0x00]).unwrap();
        if known {
            assert_eq!(Report::Ignored { control, command }, result);
        } else {
            assert_eq!(Report::Unsupported { control, command }, result);
        }
    }
}
