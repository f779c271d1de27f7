//! Lightweight MP4 box sniffing for embedded video payloads.
//!
//! This is a sanity hint, not a demuxer: it reads top-level box headers and
//! never descends into them.

/// Four-character box type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtomType(pub [u8; 4]);

impl AtomType {
    pub const FTYP: Self = Self(*b"ftyp");
    pub const MOOV: Self = Self(*b"moov");
    pub const MDAT: Self = Self(*b"mdat");

    /// Box types accepted as evidence of an MP4/QuickTime payload.
    pub const SIGNATURES: [Self; 3] = [Self::FTYP, Self::MOOV, Self::MDAT];

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get the 4-char code as a string.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    fn is_printable(&self) -> bool {
        self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ')
    }
}

impl std::fmt::Display for AtomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Top-level box header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    /// Box type code.
    pub atom_type: AtomType,
    /// Offset of the header within the payload.
    pub offset: u64,
    /// Box size including header.
    pub size: u64,
    /// Size of the header (8 or 16 bytes).
    pub header_size: u8,
}

/// Bytes examined by the fallback signature search.
pub const SIGNATURE_WINDOW: usize = 64;

/// Walk top-level box headers. Stops at the first header that is truncated,
/// undersized or not a printable four-character code.
pub fn top_level_atoms(data: &[u8]) -> Vec<Atom> {
    let mut atoms = Vec::new();
    let end = data.len() as u64;
    let mut pos = 0u64;

    while end.saturating_sub(pos) >= 8 {
        let p = pos as usize;
        let size = u32::from_be_bytes([data[p], data[p + 1], data[p + 2], data[p + 3]]) as u64;
        let atom_type = AtomType::from_bytes([data[p + 4], data[p + 5], data[p + 6], data[p + 7]]);
        if !atom_type.is_printable() {
            break;
        }

        let (actual_size, header_size) = if size == 1 {
            // 64-bit extended size
            if end - pos < 16 {
                break;
            }
            let mut ext = [0u8; 8];
            ext.copy_from_slice(&data[p + 8..p + 16]);
            (u64::from_be_bytes(ext), 16u8)
        } else if size == 0 {
            // Box extends to end of payload
            (end - pos, 8u8)
        } else {
            (size, 8u8)
        };

        if actual_size < header_size as u64 {
            break;
        }

        atoms.push(Atom {
            atom_type,
            offset: pos,
            size: actual_size,
            header_size,
        });

        pos = pos.saturating_add(actual_size);
    }

    atoms
}

/// Find an MP4 signature box in the leading bytes of a video payload.
///
/// The first box header is checked directly; failing that, the first
/// [`SIGNATURE_WINDOW`] bytes are searched for `ftyp`, `moov` or `mdat`.
pub fn sniff_signature(data: &[u8]) -> Option<AtomType> {
    if let Some(first) = top_level_atoms(data).first() {
        if AtomType::SIGNATURES.contains(&first.atom_type) {
            return Some(first.atom_type);
        }
    }

    let window = &data[..data.len().min(SIGNATURE_WINDOW)];
    window
        .windows(4)
        .find_map(|w| AtomType::SIGNATURES.iter().find(|sig| &sig.0[..] == w).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp4_header() -> Vec<u8> {
        let mut data = vec![
            0x00, 0x00, 0x00, 0x14, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm', 0x00, 0x00,
            0x02, 0x00, b'm', b'p', b'4', b'1',
        ];
        data.extend([0x00, 0x00, 0x00, 0x10, b'm', b'd', b'a', b't']);
        data.extend([0xAA; 8]);
        data
    }

    #[test]
    fn test_top_level_atoms() {
        let atoms = top_level_atoms(&mp4_header());
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].atom_type, AtomType::FTYP);
        assert_eq!(atoms[0].size, 20);
        assert_eq!(atoms[1].atom_type, AtomType::MDAT);
        assert_eq!(atoms[1].offset, 20);
    }

    #[test]
    fn test_extended_size() {
        let mut data = vec![0x00, 0x00, 0x00, 0x01, b'm', b'd', b'a', b't'];
        data.extend(24u64.to_be_bytes());
        data.extend([0u8; 8]);
        let atoms = top_level_atoms(&data);
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].header_size, 16);
        assert_eq!(atoms[0].size, 24);
    }

    #[test]
    fn test_sniff_first_box() {
        assert_eq!(sniff_signature(&mp4_header()), Some(AtomType::FTYP));
    }

    #[test]
    fn test_sniff_falls_back_to_window() {
        let mut data = vec![0xFF; 10];
        data.extend(b"moov");
        assert_eq!(sniff_signature(&data), Some(AtomType::MOOV));
    }

    #[test]
    fn test_sniff_rejects_random_bytes() {
        assert_eq!(sniff_signature(&[0x5A; 200]), None);
        assert_eq!(sniff_signature(&[]), None);
    }

    #[test]
    fn test_signature_outside_window_not_found() {
        let mut data = vec![0x00; SIGNATURE_WINDOW];
        data.extend(b"ftyp");
        assert_eq!(sniff_signature(&data), None);
    }
}
