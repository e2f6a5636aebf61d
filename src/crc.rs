//! CRC-32 engine for PSI/SI sections.
//!
//! Sections carrying a CRC use the MPEG-2 variant defined in ISO/IEC 13818-1
//! Annex A: polynomial 0x04C11DB7, initial value 0xFFFFFFFF, no reflection
//! and no final xor.

use crc::{CRC_32_MPEG_2, Crc};

/// Size of the CRC field appended to a section.
pub const CRC_LEN: usize = 4;

/// MPEG-2 CRC-32 algorithm instance.
pub const MPEG_2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// Calculates the CRC-32 checksum of `data`.
pub fn calculate_crc(data: &[u8]) -> u32 {
    MPEG_2.checksum(data)
}

/// Returns true if `expected_crc` is the checksum of `data`.
pub fn validate_crc(data: &[u8], expected_crc: u32) -> bool {
    calculate_crc(data) == expected_crc
}

/// Appends the big-endian CRC of the current contents to `buffer`.
pub fn append_crc(buffer: &mut Vec<u8>) {
    let crc = calculate_crc(buffer);
    buffer.extend_from_slice(&crc.to_be_bytes());
}

/// Validates the CRC-32 trailer of a complete section.
///
/// The CRC is taken from the last 4 bytes of the buffer (big-endian) and
/// checked against the checksum of the preceding bytes. Buffers shorter
/// than the CRC field never validate.
///
/// # Example
///
/// ```rust
/// use dvb_si::crc::{append_crc, validate_section_crc};
///
/// let mut section = vec![0x72, 0x70, 0x01, 0xFF];
/// append_crc(&mut section);
/// assert!(validate_section_crc(&section));
/// ```
pub fn validate_section_crc(buffer: &[u8]) -> bool {
    if buffer.len() < CRC_LEN {
        return false;
    }
    let (data, trailer) = buffer.split_at(buffer.len() - CRC_LEN);
    let stored_crc = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    validate_crc(data, stored_crc)
}
