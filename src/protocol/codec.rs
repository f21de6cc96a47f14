// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Byte stream framing for the radar UART.
//!
//! The decoder never fails on line noise or corrupt frames: it logs the rejected candidate and
//! resynchronises on the next frame header. Only transport errors are returned.

use super::{
    FRAME_HEADER, FRAME_PREFIX_LEN, FRAME_SUFFIX_LEN, FRAME_TAIL, Frame, MAX_PAYLOAD_LEN,
    ProtocolError, checksum, hex_dump,
};
use actix_codec::{Decoder, Encoder};
use bytes::{Buf, Bytes, BytesMut};
use log::debug;

#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Log every frame in hex.
    tracing: bool,
    rejected: usize,
}

impl FrameCodec {
    pub fn with_tracing(tracing: bool) -> Self {
        Self {
            tracing,
            rejected: 0,
        }
    }

    /// Number of rejected frame candidates since creation.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Drop everything before the next frame header.
    ///
    /// Returns false if no complete header is buffered. A trailing first header byte is kept.
    fn skip_to_header(src: &mut BytesMut) -> bool {
        match src.windows(2).position(|w| w == FRAME_HEADER) {
            Some(pos) => {
                src.advance(pos);
                true
            }
            None => {
                let keep = usize::from(src.last() == Some(&FRAME_HEADER[0]));
                let len = src.len();
                src.advance(len - keep);
                false
            }
        }
    }

    fn reject(&mut self, src: &mut BytesMut, reason: &str) {
        self.rejected += 1;
        debug!("Rejecting frame: {reason}");
        // skip the header to find the next candidate
        src.advance(1);
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if !Self::skip_to_header(src) || src.len() < FRAME_PREFIX_LEN {
                return Ok(None);
            }

            let len_h = src[4];
            if len_h > 4 {
                self.reject(src, &format!("invalid length high byte {len_h:#04x}"));
                continue;
            }
            let payload_len = usize::from(len_h) * 256 + usize::from(src[5]);
            if payload_len > MAX_PAYLOAD_LEN {
                self.reject(src, &format!("payload length {payload_len} too long"));
                continue;
            }

            let frame_len = FRAME_PREFIX_LEN + payload_len + FRAME_SUFFIX_LEN;
            if src.len() < frame_len {
                src.reserve(frame_len - src.len());
                return Ok(None);
            }

            if src[frame_len - 2..frame_len] != FRAME_TAIL {
                self.reject(
                    src,
                    &format!("invalid tail {}", hex_dump(&src[frame_len - 2..frame_len])),
                );
                continue;
            }

            let data = src.split_to(frame_len);
            if self.tracing {
                debug!("<- FRAME: {}", hex_dump(&data));
            }
            let sum = checksum(&data[..frame_len - FRAME_SUFFIX_LEN]);
            if sum != data[frame_len - FRAME_SUFFIX_LEN] {
                self.rejected += 1;
                debug!(
                    "Frame checksum failure: expected {sum:#04x}, got {:#04x}",
                    data[frame_len - FRAME_SUFFIX_LEN]
                );
                continue;
            }

            let payload =
                Bytes::copy_from_slice(&data[FRAME_PREFIX_LEN..FRAME_PREFIX_LEN + payload_len]);
            return Ok(Some(Frame::new(data[2], data[3], payload)));
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let start = dst.len();
        item.encode_to(dst);
        if self.tracing {
            debug!("-> FRAME: {}", hex_dump(&dst[start..]));
        }
        Ok(())
    }
}
