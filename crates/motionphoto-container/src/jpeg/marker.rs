//! JPEG marker codes.

/// The second byte of a JPEG marker (the first is always `0xFF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker(pub u8);

impl Marker {
    pub const TEM: Self = Self(0x01);
    pub const SOF0: Self = Self(0xC0);
    pub const SOF2: Self = Self(0xC2);
    pub const DHT: Self = Self(0xC4);
    pub const RST0: Self = Self(0xD0);
    pub const RST7: Self = Self(0xD7);
    pub const SOI: Self = Self(0xD8);
    pub const EOI: Self = Self(0xD9);
    pub const SOS: Self = Self(0xDA);
    pub const DQT: Self = Self(0xDB);
    pub const DRI: Self = Self(0xDD);
    pub const APP0: Self = Self(0xE0);
    pub const APP1: Self = Self(0xE1);
    pub const APP2: Self = Self(0xE2);
    pub const COM: Self = Self(0xFE);

    /// Create from the marker code byte.
    pub fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Restart markers RST0..RST7.
    pub fn is_restart(&self) -> bool {
        (Self::RST0.0..=Self::RST7.0).contains(&self.0)
    }

    /// Markers that are not followed by a length field.
    pub fn is_standalone(&self) -> bool {
        *self == Self::TEM || *self == Self::SOI || *self == Self::EOI || self.is_restart()
    }

    /// Application segments APP0..APP15.
    pub fn is_app(&self) -> bool {
        (0xE0..=0xEF).contains(&self.0)
    }

    /// Short mnemonic for diagnostics.
    pub fn name(&self) -> &'static str {
        match self.0 {
            0x01 => "TEM",
            0xC0 => "SOF0",
            0xC1 => "SOF1",
            0xC2 => "SOF2",
            0xC4 => "DHT",
            0xD0..=0xD7 => "RST",
            0xD8 => "SOI",
            0xD9 => "EOI",
            0xDA => "SOS",
            0xDB => "DQT",
            0xDD => "DRI",
            0xE0..=0xEF => "APP",
            0xFE => "COM",
            _ => "marker",
        }
    }

    /// The two bytes as they appear in the stream.
    pub fn to_bytes(&self) -> [u8; 2] {
        [0xFF, self.0]
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_app() {
            write!(f, "APP{} (0xFF{:02X})", self.0 - 0xE0, self.0)
        } else {
            write!(f, "{} (0xFF{:02X})", self.name(), self.0)
        }
    }
}
