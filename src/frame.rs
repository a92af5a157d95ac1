//! Decoder for the fixed 24-bit SSI frame.
//!
//! Layout, MSB first: 14 bits of raw angle, 4 bits of diagnostics, 6 bits
//! of CRC covering the preceding 18 bits.

use crate::bus::FRAME_LEN;
use crate::cache::Sample;
use crate::crc6::Crc6;
use crate::diagnostics::Diagnostics;

/// Counts per revolution of the 14-bit angle field.
pub const ANGLE_RESOLUTION: u32 = 16384;

const PAYLOAD_MASK: u32 = 0x0003_FFFF;
const CRC_MASK: u32 = 0x3F;
const RAW_ANGLE_MASK: u32 = 0x3FFF;

#[allow(clippy::cast_precision_loss)]
const RAD_PER_LSB: f32 = core::f32::consts::TAU / ANGLE_RESOLUTION as f32;

/// Assemble the 24-bit frame from the received bytes, MSB first.
pub(crate) fn frame_from_bytes(bytes: [u8; FRAME_LEN]) -> u32 {
    (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2])
}

/// Validate and decode one frame.
///
/// Returns `None` when the received check value does not match the
/// recomputed one; the frame carries bit-level evidence of corruption and
/// is discarded whole.
pub(crate) fn decode<C: Crc6>(crc: &C, frame24: u32) -> Option<Sample> {
    let received = (frame24 & CRC_MASK) as u8;
    let computed = crc.checksum((frame24 >> 6) & PAYLOAD_MASK);
    if received != computed {
        return None;
    }

    let raw_angle = (frame24 >> 10) & RAW_ANGLE_MASK;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let angle_rad = raw_angle as f32 * RAD_PER_LSB;
    let diagnostics = Diagnostics::new(((frame24 >> 6) & 0x0F) as u8);

    Some(Sample {
        angle_rad,
        diagnostics,
    })
}
