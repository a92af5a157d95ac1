//! Diagnostic field reported alongside every MT6701 angle reading.

/// The 4-bit diagnostic nibble from an SSI frame.
///
/// Bit 3 flags overspeed, bit 2 a mechanical push on the magnet, and the
/// low 2 bits encode the magnetic field strength (0 = normal, 1 = too
/// strong, 2 = too weak).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    raw: u8,
}

impl Diagnostics {
    /// Wrap a raw diagnostic nibble. Bits above the low 4 are discarded
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self { raw: raw & 0x0F }
    }

    /// Get the raw diagnostic nibble
    #[must_use]
    pub const fn raw(&self) -> u8 {
        self.raw
    }

    /// The rotation speed exceeded the tracking limit
    ///
    /// Angle data may lag the shaft while this is set
    #[must_use]
    pub const fn overspeed(&self) -> bool {
        self.raw & 0x08 != 0
    }

    /// The magnet was pushed towards the sensor
    #[must_use]
    pub const fn push_detected(&self) -> bool {
        self.raw & 0x04 != 0
    }

    /// Get the 2-bit magnetic field strength code
    ///
    /// 0 means the field is in the recommended range
    #[must_use]
    pub const fn field_strength(&self) -> u8 {
        self.raw & 0x03
    }

    /// Magnetic field above the recommended range
    ///
    /// The sensor keeps reporting angles but accuracy may suffer
    #[must_use]
    pub const fn field_too_strong(&self) -> bool {
        self.field_strength() == 1
    }

    /// Magnetic field below the recommended range
    ///
    /// The sensor keeps reporting angles but accuracy may suffer
    #[must_use]
    pub const fn field_too_weak(&self) -> bool {
        self.field_strength() == 2
    }

    /// Check that the magnetic field strength is within acceptable range
    #[must_use]
    pub const fn field_ok(&self) -> bool {
        self.field_strength() == 0
    }
}

impl From<u8> for Diagnostics {
    fn from(raw: u8) -> Self {
        Self::new(raw)
    }
}
