//! Finalized sections and the common section header.

use crate::crc::{self, CRC_LEN};
use crate::encoding::ByteWriter;
use crate::error::{SiError, SiResult, check_bits};

#[cfg(feature = "serde")]
use serde::Serialize;

/// table_id, flags and section_length.
pub const SHORT_HEADER_LEN: usize = 3;

/// Short header plus table_id_extension, version byte, section_number and
/// last_section_number.
pub const LONG_HEADER_LEN: usize = 8;

/// Largest value the 12-bit `section_length` field can carry.
pub const MAX_SECTION_LENGTH_FIELD: usize = 0xFFF;

/// Header fields shared by every section of a long-form table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SectionHeader {
    pub table_id: u8,
    /// The bit following `section_syntax_indicator`. DVB SI tables set it
    /// (`reserved_future_use`), the PAT, CAT and PMT clear it.
    pub private_indicator: bool,
    pub table_id_extension: u16,
    pub version_number: u8,
    pub current_next_indicator: bool,
}

impl SectionHeader {
    pub fn new(table_id: u8, private_indicator: bool, table_id_extension: u16) -> Self {
        Self {
            table_id,
            private_indicator,
            table_id_extension,
            version_number: 0,
            current_next_indicator: true,
        }
    }

    /// Writes the 8 header bytes with a zero `section_length`.
    fn encode(&self, writer: &mut ByteWriter, section_number: u8, last_section_number: u8) -> SiResult<()> {
        // table_id (8 bits)
        writer.write_u8(self.table_id)?;
        // section_syntax_indicator (1 bit), private bit, reserved (2 bits)
        writer.write_flag(true)?;
        writer.write_flag(self.private_indicator)?;
        writer.write_reserved(2)?;
        // section_length (12 bits), patched once the payload is known
        writer.write_bits("section_length", 0, 12)?;
        writer.write_u16(self.table_id_extension)?;
        writer.write_reserved(2)?;
        writer.write_bits("version_number", u64::from(self.version_number), 5)?;
        writer.write_flag(self.current_next_indicator)?;
        writer.write_u8(section_number)?;
        writer.write_u8(last_section_number)
    }
}

/// One complete, immutable section as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Section {
    table_id: u8,
    section_number: u8,
    last_section_number: u8,
    has_crc: bool,
    bytes: Vec<u8>,
}

impl Section {
    /// Assembles a long-form section around `body` (the bytes following
    /// `last_section_number`) and appends its CRC.
    pub fn long(
        header: &SectionHeader,
        section_number: u8,
        last_section_number: u8,
        body: &[u8],
    ) -> SiResult<Self> {
        let mut writer = ByteWriter::with_capacity(LONG_HEADER_LEN + body.len() + CRC_LEN);
        header.encode(&mut writer, section_number, last_section_number)?;
        writer.write_bytes(body)?;
        Self::finalize(writer, header.table_id, section_number, last_section_number, true)
    }

    /// Assembles a short-form section: table_id, flags, section_length and
    /// `body`, optionally followed by a CRC.
    pub fn short(
        table_id: u8,
        section_syntax_indicator: bool,
        private_indicator: bool,
        body: &[u8],
        with_crc: bool,
    ) -> SiResult<Self> {
        let mut writer = ByteWriter::with_capacity(SHORT_HEADER_LEN + body.len() + CRC_LEN);
        writer.write_u8(table_id)?;
        writer.write_flag(section_syntax_indicator)?;
        writer.write_flag(private_indicator)?;
        writer.write_reserved(2)?;
        writer.write_bits("section_length", 0, 12)?;
        writer.write_bytes(body)?;
        Self::finalize(writer, table_id, 0, 0, with_crc)
    }

    fn finalize(
        mut writer: ByteWriter,
        table_id: u8,
        section_number: u8,
        last_section_number: u8,
        with_crc: bool,
    ) -> SiResult<Self> {
        let trailer = if with_crc { CRC_LEN } else { 0 };
        let section_length = writer.len() - SHORT_HEADER_LEN + trailer;
        if section_length > MAX_SECTION_LENGTH_FIELD {
            return Err(SiError::ValueTooLarge {
                field: "section_length",
                bits: 12,
                value: section_length as u64,
            });
        }
        writer.patch_length12(1, section_length)?;

        let mut bytes = writer.finish();
        if with_crc {
            crc::append_crc(&mut bytes);
        }
        Ok(Self {
            table_id,
            section_number,
            last_section_number,
            has_crc: with_crc,
            bytes,
        })
    }

    pub fn table_id(&self) -> u8 {
        self.table_id
    }

    pub fn section_number(&self) -> u8 {
        self.section_number
    }

    pub fn last_section_number(&self) -> u8 {
        self.last_section_number
    }

    /// Value of the 12-bit `section_length` field.
    pub fn section_length(&self) -> usize {
        (usize::from(self.bytes[1] & 0x0F) << 8) | usize::from(self.bytes[2])
    }

    /// The trailing CRC-32, if this section carries one.
    pub fn crc32(&self) -> Option<u32> {
        if !self.has_crc {
            return None;
        }
        let tail = &self.bytes[self.bytes.len() - CRC_LEN..];
        Some(u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]]))
    }

    /// Header and payload, without the CRC.
    pub fn without_crc(&self) -> &[u8] {
        let trailer = if self.has_crc { CRC_LEN } else { 0 };
        &self.bytes[..self.bytes.len() - trailer]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Upper-case hex rendering of the section bytes.
    #[cfg(feature = "base64")]
    pub fn to_hex(&self) -> String {
        data_encoding::HEXUPPER.encode(&self.bytes)
    }

    /// Base64 rendering of the section bytes.
    #[cfg(feature = "base64")]
    pub fn to_base64(&self) -> String {
        data_encoding::BASE64.encode(&self.bytes)
    }
}

impl AsRef<[u8]> for Section {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Checks a version number against its 5-bit field.
pub(crate) fn check_version(version_number: u8) -> SiResult<()> {
    check_bits("version_number", u64::from(version_number), 5)
}
