//! CRC-6 integrity check over the 18-bit frame payload.

/// 6-bit checksum over an 18-bit input.
///
/// The check value covers the angle and diagnostic fields of a frame; the
/// decoder recomputes it and compares against the received low 6 bits.
pub trait Crc6: Send + Sync {
    /// Compute the 6-bit check value of the low 18 bits of `payload`.
    fn checksum(&self, payload: u32) -> u8;
}

/// The MT6701 datasheet algorithm: polynomial x^6 + x + 1, initial value
/// zero, fed MSB first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Crc6Mt6701;

impl Crc6 for Crc6Mt6701 {
    fn checksum(&self, payload: u32) -> u8 {
        let mut crc: u8 = 0;
        for i in (0..18).rev() {
            let fed = (((payload >> i) & 1) as u8) ^ (crc >> 5);
            crc = ((crc << 1) & 0x3F) ^ if fed != 0 { 0x03 } else { 0x00 };
        }
        crc
    }
}
