// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! MR24HPC1 UART frame protocol.
//!
//! Every frame, in both directions, has the same layout:
//!
//! ```text
//! 0x53 0x59 | control | command | len_h len_l | payload[len] | checksum | 0x54 0x43
//! ```
//!
//! The checksum is the low byte of the sum of all bytes preceding it.

mod codec;
mod command;
mod frame;
mod report;

pub use codec::FrameCodec;
pub use command::{Command, SceneMode};
pub use frame::{Frame, checksum};
pub use report::{KeepAway, MotionStatus, Report, UnderlyingValues};

use derive_more::Display;

pub const FRAME_HEADER: [u8; 2] = [0x53, 0x59];
pub const FRAME_TAIL: [u8; 2] = [0x54, 0x43];

/// Header, control word, command word and the two length bytes.
pub const FRAME_PREFIX_LEN: usize = 6;
/// Checksum and tail.
pub const FRAME_SUFFIX_LEN: usize = 3;
/// Largest payload the radar ever sends.
pub const MAX_PAYLOAD_LEN: usize = 32;
/// Product information strings must be shorter than this.
pub const MAX_PRODUCT_INFO_LEN: usize = 32;

/// Payload byte of all query commands.
pub const QUERY_PAYLOAD: u8 = 0x0F;

pub mod control {
    pub const SYSTEM: u8 = 0x01;
    pub const PRODUCT_INFO: u8 = 0x02;
    pub const WORK_STATUS: u8 = 0x05;
    pub const UNDERLYING: u8 = 0x08;
    pub const HUMAN_INFO: u8 = 0x80;
}

#[derive(Debug, Display, PartialEq)]
pub enum ProtocolError {
    #[display("io error: {_0}")]
    Io(String),

    #[display(
        "payload of frame {control:#04x}/{command:#04x} too short: expected {expected} bytes, got {actual}"
    )]
    ShortPayload {
        control: u8,
        command: u8,
        expected: usize,
        actual: usize,
    },

    #[display(
        "payload of frame {control:#04x}/{command:#04x} too long: at most {max} bytes allowed, got {actual}"
    )]
    PayloadTooLong {
        control: u8,
        command: u8,
        max: usize,
        actual: usize,
    },

    #[display("invalid value {value:#04x} in frame {control:#04x}/{command:#04x}")]
    InvalidValue { control: u8, command: u8, value: u8 },
}

impl std::error::Error for ProtocolError {}

impl From<std::io::Error> for ProtocolError {
    fn from(e: std::io::Error) -> Self {
        ProtocolError::Io(e.to_string())
    }
}

/// Format bytes as space separated upper case hex, e.g. `53 59 01 01`.
pub fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
