//! Time and date table and time offset table.

use super::{MAX_PSI_SECTION_LEN, Table, TableCore, TableState, descriptors_len};
use crate::crc::CRC_LEN;
use crate::descriptors::Descriptor;
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult};
use crate::section::{SHORT_HEADER_LEN, Section, SectionHeader};
use crate::time::UtcTime;
use crate::types::pid;

/// Time and date table (table_id 0x70): a single UTC time, no CRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tdt {
    core: TableCore,
    utc_time: UtcTime,
}

impl Tdt {
    pub const TABLE_ID: u8 = 0x70;

    pub fn new(utc_time: UtcTime) -> Self {
        Self {
            core: TableCore::new(SectionHeader::new(Self::TABLE_ID, true, 0), SHORT_HEADER_LEN + 5),
            utc_time,
        }
    }

    pub fn utc_time(&self) -> UtcTime {
        self.utc_time
    }

    pub fn set_utc_time(&mut self, utc_time: UtcTime) -> SiResult<()> {
        self.core.ensure_building()?;
        self.utc_time = utc_time;
        Ok(())
    }
}

impl Table for Tdt {
    const PID: u16 = pid::TDT_TOT;

    fn table_id(&self) -> u8 {
        self.core.table_id()
    }

    fn state(&self) -> TableState {
        self.core.state()
    }

    fn build_sections(&mut self) -> SiResult<Vec<Section>> {
        self.core.seal();
        let body = self.utc_time.encode_to_vec()?;
        Ok(vec![Section::short(Self::TABLE_ID, false, true, &body, false)?])
    }
}

/// Time offset table (table_id 0x73): UTC time plus descriptors, usually a
/// local time offset descriptor. Carried in one CRC protected section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tot {
    core: TableCore,
    utc_time: UtcTime,
    descriptors: Vec<Descriptor>,
}

impl Tot {
    pub const TABLE_ID: u8 = 0x73;

    /// UTC time and descriptors_loop_length.
    const FIXED_LEN: usize = 7;

    pub fn new(utc_time: UtcTime) -> Self {
        Self {
            core: TableCore::new(SectionHeader::new(Self::TABLE_ID, true, 0), MAX_PSI_SECTION_LEN),
            utc_time,
            descriptors: Vec::new(),
        }
    }

    pub fn utc_time(&self) -> UtcTime {
        self.utc_time
    }

    pub fn set_utc_time(&mut self, utc_time: UtcTime) -> SiResult<()> {
        self.core.ensure_building()?;
        self.utc_time = utc_time;
        Ok(())
    }

    /// Bytes still free for descriptors.
    pub fn remaining(&self) -> usize {
        let used = SHORT_HEADER_LEN + Self::FIXED_LEN + descriptors_len(&self.descriptors) + CRC_LEN;
        self.core.max_section_len().saturating_sub(used)
    }

    /// Appends a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SiError::TableFull`] when the descriptor would push the
    /// section past 1024 bytes.
    pub fn add_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> SiResult<()> {
        self.core.ensure_building()?;
        let descriptor = descriptor.into();
        let needed = descriptor.encoded_size();
        let available = self.remaining();
        if needed > available {
            return Err(SiError::TableFull {
                table_id: Self::TABLE_ID,
                needed,
                available,
            });
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }
}

impl Table for Tot {
    const PID: u16 = pid::TDT_TOT;

    fn table_id(&self) -> u8 {
        self.core.table_id()
    }

    fn state(&self) -> TableState {
        self.core.state()
    }

    fn build_sections(&mut self) -> SiResult<Vec<Section>> {
        self.core.seal();
        let mut writer = ByteWriter::with_capacity(Self::FIXED_LEN + descriptors_len(&self.descriptors));
        self.utc_time.encode(&mut writer)?;
        // reserved (4 bits), descriptors_loop_length (12 bits)
        super::write_descriptor_loop(&mut writer, &self.descriptors)?;
        Ok(vec![Section::short(Self::TABLE_ID, false, true, &writer.finish(), true)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc;
    use crate::descriptors::{LocalTimeOffsetDescriptor, StuffingDescriptor};

    fn time() -> UtcTime {
        UtcTime::new(1993, 10, 13, 12, 45, 0).unwrap()
    }

    #[test]
    fn test_tdt_encoding() {
        let mut tdt = Tdt::new(time());
        let sections = tdt.build_sections().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].as_bytes(),
            &[0x70, 0x70, 0x05, 0xC0, 0x79, 0x12, 0x45, 0x00]
        );
        assert!(tdt.set_utc_time(time()).is_err());
    }

    #[test]
    fn test_tot_encoding() {
        let mut tot = Tot::new(time());
        let mut offsets = LocalTimeOffsetDescriptor::new();
        offsets
            .add_offset("DEU", 0, false, 60, UtcTime::new(1994, 3, 27, 1, 0, 0).unwrap(), 120)
            .unwrap();
        tot.add_descriptor(offsets).unwrap();

        let sections = tot.build_sections().unwrap();
        let bytes = sections[0].as_bytes();
        assert_eq!(&bytes[..10], &[0x73, 0x70, 0x1A, 0xC0, 0x79, 0x12, 0x45, 0x00, 0xF0, 0x0F]);
        assert_eq!(bytes.len(), 3 + 0x1A);
        assert_eq!(bytes[10], LocalTimeOffsetDescriptor::TAG);
        assert!(crc::validate_section_crc(bytes));
    }

    #[test]
    fn test_tot_full() {
        let mut tot = Tot::new(time());
        // 1024 - 3 - 7 - 4 leaves 1010 bytes for descriptors
        assert_eq!(tot.remaining(), 1010);
        for _ in 0..3 {
            tot.add_descriptor(StuffingDescriptor::filled(255, 0xFF).unwrap())
                .unwrap();
        }
        assert_eq!(tot.remaining(), 239);
        let err = tot
            .add_descriptor(StuffingDescriptor::filled(238, 0xFF).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            SiError::TableFull {
                table_id: 0x73,
                needed: 240,
                available: 239
            }
        );
        tot.add_descriptor(StuffingDescriptor::filled(237, 0xFF).unwrap())
            .unwrap();
        let sections = tot.build_sections().unwrap();
        assert_eq!(sections[0].len(), 1024);
    }
}
