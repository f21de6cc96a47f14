// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use super::{FRAME_HEADER, FRAME_PREFIX_LEN, FRAME_SUFFIX_LEN, FRAME_TAIL, MAX_PAYLOAD_LEN};
use bytes::{BufMut, Bytes, BytesMut};

/// A checksum verified radar frame without header, length, checksum and tail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub control: u8,
    pub command: u8,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(control: u8, command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            control,
            command,
            payload: payload.into(),
        }
    }

    /// Total number of bytes of the encoded frame.
    pub fn encoded_len(&self) -> usize {
        FRAME_PREFIX_LEN + self.payload.len() + FRAME_SUFFIX_LEN
    }

    /// Append the wire representation including checksum and tail.
    pub fn encode_to(&self, dst: &mut BytesMut) {
        debug_assert!(
            self.payload.len() <= MAX_PAYLOAD_LEN,
            "frame payload too long: {}",
            self.payload.len()
        );
        let start = dst.len();
        dst.reserve(self.encoded_len());
        dst.put_slice(&FRAME_HEADER);
        dst.put_u8(self.control);
        dst.put_u8(self.command);
        dst.put_u16(self.payload.len() as u16);
        dst.put_slice(&self.payload);
        let sum = checksum(&dst[start..]);
        dst.put_u8(sum);
        dst.put_slice(&FRAME_TAIL);
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_to(&mut buf);
        buf.freeze()
    }
}

/// Low byte of the sum of all given bytes.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}
