// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Host to radar commands.

use super::{Frame, QUERY_PAYLOAD, control};
use strum::{Display, EnumIter, EnumString, FromRepr};

/// Scene mode of the radar. The discriminant is the wire value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter, FromRepr)]
#[repr(u8)]
pub enum SceneMode {
    #[strum(serialize = "Living Room")]
    LivingRoom = 1,
    #[strum(serialize = "Bedroom")]
    Bedroom = 2,
    #[strum(serialize = "Washroom")]
    Washroom = 3,
    #[strum(serialize = "Area Detection")]
    AreaDetection = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    QueryHeartbeat,
    Reset,
    QueryProductModel,
    QueryProductId,
    QueryHardwareModel,
    QueryFirmwareVersion,
    SetSceneMode(SceneMode),
    QueryPresence,
    QueryKeepAway,
    SetUnderlyingOpen(bool),
    QueryUnderlyingOpen,
}

impl Command {
    pub fn to_frame(self) -> Frame {
        let (ctrl, cmd, payload) = match self {
            Command::QueryHeartbeat => (control::SYSTEM, 0x01, QUERY_PAYLOAD),
            Command::Reset => (control::SYSTEM, 0x02, QUERY_PAYLOAD),
            Command::QueryProductModel => (control::PRODUCT_INFO, 0xA1, QUERY_PAYLOAD),
            Command::QueryProductId => (control::PRODUCT_INFO, 0xA2, QUERY_PAYLOAD),
            Command::QueryHardwareModel => (control::PRODUCT_INFO, 0xA3, QUERY_PAYLOAD),
            Command::QueryFirmwareVersion => (control::PRODUCT_INFO, 0xA4, QUERY_PAYLOAD),
            Command::SetSceneMode(mode) => (control::WORK_STATUS, 0x07, mode as u8),
            Command::QueryPresence => (control::HUMAN_INFO, 0x81, QUERY_PAYLOAD),
            Command::QueryKeepAway => (control::HUMAN_INFO, 0x8B, QUERY_PAYLOAD),
            Command::SetUnderlyingOpen(on) => (control::UNDERLYING, 0x00, u8::from(on)),
            Command::QueryUnderlyingOpen => (control::UNDERLYING, 0x80, QUERY_PAYLOAD),
        };
        Frame::new(ctrl, cmd, vec![payload])
    }
}

impl From<Command> for Frame {
    fn from(value: Command) -> Self {
        value.to_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(Command::Reset, [0x53, 0x59, 0x01, 0x02, 0x00, 0x01, 0x0F, 0xBF, 0x54, 0x43])]
    #[case(Command::QueryHeartbeat, [0x53, 0x59, 0x01, 0x01, 0x00, 0x01, 0x0F, 0xBE, 0x54, 0x43])]
    #[case(Command::SetUnderlyingOpen(true), [0x53, 0x59, 0x08, 0x00, 0x00, 0x01, 0x01, 0xB6, 0x54, 0x43])]
    #[case(Command::SetUnderlyingOpen(false), [0x53, 0x59, 0x08, 0x00, 0x00, 0x01, 0x00, 0xB5, 0x54, 0x43])]
    #[case(Command::QueryProductModel, [0x53, 0x59, 0x02, 0xA1, 0x00, 0x01, 0x0F, 0x5F, 0x54, 0x43])]
    fn command_wire_format(#[case] cmd: Command, #[case] expected: [u8; 10]) {
        assert_eq!(&expected[..], &Frame::from(cmd).to_bytes()[..]);
    }

    #[test]
    fn scene_mode_uses_mode_as_payload() {
        let frame = Command::SetSceneMode(SceneMode::Washroom).to_frame();
        assert_eq!(0x05, frame.control);
        assert_eq!(0x07, frame.command);
        assert_eq!(&[0x03][..], &frame.payload[..]);
    }

    #[rstest]
    #[case("Living Room", SceneMode::LivingRoom)]
    #[case("Bedroom", SceneMode::Bedroom)]
    #[case("Washroom", SceneMode::Washroom)]
    #[case("Area Detection", SceneMode::AreaDetection)]
    fn scene_mode_option_names(#[case] name: &str, #[case] mode: SceneMode) {
        assert_eq!(Ok(mode), SceneMode::from_str(name));
        assert_eq!(name, mode.to_string());
    }

    #[test]
    fn unknown_scene_mode_is_rejected() {
        assert!(SceneMode::from_str("None").is_err());
        assert_eq!(None, SceneMode::from_repr(0));
    }
}
