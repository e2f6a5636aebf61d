//! PSI/SI tables.
//!
//! Every table owns its rows and their descriptors. Tables are filled
//! through typed setters, then [`Table::build_sections`] seals them and
//! produces the sections. A sealed table rejects further changes with
//! [`SiError::TableSealed`].

use tracing::warn;

use crate::crc::CRC_LEN;
use crate::descriptors::Descriptor;
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult};
use crate::section::{LONG_HEADER_LEN, Section, SectionHeader, check_version};
use crate::splitter::SectionSplitter;

pub mod cat;
pub mod eit;
pub mod nit;
pub mod pat;
pub mod pmt;
pub mod rst;
pub mod sdt;
pub mod stuffing;
pub mod tdt;

pub use cat::Cat;
pub use eit::{Eit, EitEvent, EitKind};
pub use nit::{Bat, Nit, NitKind, TransportStreamEntry};
pub use pat::Pat;
pub use pmt::{ElementaryStream, Pmt};
pub use rst::{Rst, RunningStatusEntry};
pub use sdt::{Sdt, SdtKind, SdtService};
pub use stuffing::StuffingTable;
pub use tdt::{Tdt, Tot};

/// Largest section of a PSI table or a DVB SI table other than the EIT and ST.
pub const MAX_PSI_SECTION_LEN: usize = 1024;

/// Largest EIT or stuffing section.
pub const MAX_PRIVATE_SECTION_LEN: usize = 4096;

/// Lifecycle of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableState {
    /// Rows and settings may still change.
    Building,
    /// Sections have been produced; the table is read-only.
    Serialized,
}

/// Common interface of all tables.
pub trait Table {
    /// PID the table is carried on.
    const PID: u16;

    fn table_id(&self) -> u8;

    fn state(&self) -> TableState;

    /// Seals the table and encodes it.
    ///
    /// Calling this again returns byte-identical sections.
    ///
    /// # Errors
    ///
    /// Returns a capacity error when a row cannot fit in an empty section or
    /// the table needs more than 256 sections. The table stays sealed.
    fn build_sections(&mut self) -> SiResult<Vec<Section>>;
}

/// State shared by all tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableCore {
    header: SectionHeader,
    limit: usize,
    max_section_len: usize,
    reserved_len: usize,
    state: TableState,
}

impl TableCore {
    /// Smallest payload a section must be able to carry.
    const MIN_PAYLOAD: usize = 1;

    pub(crate) fn new(header: SectionHeader, limit: usize) -> Self {
        Self {
            header,
            limit,
            max_section_len: limit,
            reserved_len: 0,
            state: TableState::Building,
        }
    }

    /// Long-form core with a validated version number.
    pub(crate) fn versioned(
        table_id: u8,
        private_indicator: bool,
        table_id_extension: u16,
        version_number: u8,
        limit: usize,
    ) -> SiResult<Self> {
        check_version(version_number)?;
        let mut header = SectionHeader::new(table_id, private_indicator, table_id_extension);
        header.version_number = version_number;
        Ok(Self::new(header, limit))
    }

    pub(crate) fn header(&self) -> &SectionHeader {
        &self.header
    }

    pub(crate) fn table_id(&self) -> u8 {
        self.header.table_id
    }

    pub(crate) fn state(&self) -> TableState {
        self.state
    }

    pub(crate) fn max_section_len(&self) -> usize {
        self.max_section_len
    }

    pub(crate) fn reserved_len(&self) -> usize {
        self.reserved_len
    }

    pub(crate) fn ensure_building(&self) -> SiResult<()> {
        if self.state == TableState::Serialized {
            warn!(table_id = self.header.table_id, "modification of a serialized table rejected");
            return Err(SiError::TableSealed {
                table_id: self.header.table_id,
            });
        }
        Ok(())
    }

    pub(crate) fn seal(&mut self) {
        self.state = TableState::Serialized;
    }

    pub(crate) fn set_version(&mut self, version_number: u8) -> SiResult<()> {
        self.ensure_building()?;
        check_version(version_number)?;
        self.header.version_number = version_number;
        Ok(())
    }

    pub(crate) fn set_current_next(&mut self, current_next_indicator: bool) -> SiResult<()> {
        self.ensure_building()?;
        self.header.current_next_indicator = current_next_indicator;
        Ok(())
    }

    fn overhead(&self) -> usize {
        LONG_HEADER_LEN + CRC_LEN + Self::MIN_PAYLOAD
    }

    pub(crate) fn set_max_section_len(&mut self, max_section_len: usize) -> SiResult<()> {
        self.ensure_building()?;
        let min = self.overhead() + self.reserved_len;
        if !(min..=self.limit).contains(&max_section_len) {
            return Err(SiError::InvalidConfig {
                setting: "max_section_len",
                value: max_section_len,
                min,
                max: self.limit,
            });
        }
        self.max_section_len = max_section_len;
        Ok(())
    }

    pub(crate) fn set_reserved_len(&mut self, reserved_len: usize) -> SiResult<()> {
        self.ensure_building()?;
        let max = self.max_section_len - self.overhead();
        if reserved_len > max {
            return Err(SiError::InvalidConfig {
                setting: "reserved_len",
                value: reserved_len,
                min: 0,
                max,
            });
        }
        self.reserved_len = reserved_len;
        Ok(())
    }

    pub(crate) fn splitter(&self) -> SectionSplitter<'_> {
        SectionSplitter::new(&self.header, self.max_section_len).reserved_len(self.reserved_len)
    }
}

/// Writes 4 reserved bits, a 12-bit length and the descriptors.
pub(crate) fn write_descriptor_loop(writer: &mut ByteWriter, descriptors: &[Descriptor]) -> SiResult<()> {
    writer.write_reserved(4)?;
    writer.write_bits("descriptors_loop_length", descriptors_len(descriptors) as u64, 12)?;
    descriptors.encode(writer)
}

pub(crate) fn descriptors_len(descriptors: &[Descriptor]) -> usize {
    descriptors.iter().map(Encodable::encoded_size).sum()
}

/// Generates the accessors every long-form table shares and its
/// [`Table`] implementation. The table must have a `core: TableCore` field
/// and an `encode_sections(&self)` method.
macro_rules! long_table {
    ($table:ty, $pid:expr) => {
        impl $table {
            pub fn version(&self) -> u8 {
                self.core.header().version_number
            }

            /// Sets the 5-bit version number.
            pub fn set_version(&mut self, version_number: u8) -> $crate::error::SiResult<()> {
                self.core.set_version(version_number)
            }

            pub fn current_next(&self) -> bool {
                self.core.header().current_next_indicator
            }

            pub fn set_current_next(&mut self, current_next_indicator: bool) -> $crate::error::SiResult<()> {
                self.core.set_current_next(current_next_indicator)
            }

            pub fn table_id_extension(&self) -> u16 {
                self.core.header().table_id_extension
            }

            pub fn max_section_len(&self) -> usize {
                self.core.max_section_len()
            }

            /// Limits the size of every produced section, header and CRC included.
            ///
            /// # Errors
            ///
            /// Fails with `InvalidConfig` above the table's standard maximum or
            /// when no payload byte would be left.
            pub fn set_max_section_len(&mut self, max_section_len: usize) -> $crate::error::SiResult<()> {
                self.core.set_max_section_len(max_section_len)
            }

            pub fn reserved_len(&self) -> usize {
                self.core.reserved_len()
            }

            /// Keeps `reserved_len` bytes free at the end of every section.
            pub fn set_reserved_len(&mut self, reserved_len: usize) -> $crate::error::SiResult<()> {
                self.core.set_reserved_len(reserved_len)
            }

            pub fn with_version(mut self, version_number: u8) -> $crate::error::SiResult<Self> {
                self.set_version(version_number)?;
                Ok(self)
            }

            pub fn with_max_section_len(mut self, max_section_len: usize) -> $crate::error::SiResult<Self> {
                self.set_max_section_len(max_section_len)?;
                Ok(self)
            }
        }

        impl $crate::tables::Table for $table {
            const PID: u16 = $pid;

            fn table_id(&self) -> u8 {
                self.core.table_id()
            }

            fn state(&self) -> $crate::tables::TableState {
                self.core.state()
            }

            fn build_sections(&mut self) -> $crate::error::SiResult<Vec<$crate::section::Section>> {
                self.core.seal();
                self.encode_sections()
            }
        }
    };
}

pub(crate) use long_table;

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> TableCore {
        TableCore::versioned(0x42, true, 1, 0, MAX_PSI_SECTION_LEN).unwrap()
    }

    #[test]
    fn test_version_validation() {
        assert!(TableCore::versioned(0x42, true, 1, 32, MAX_PSI_SECTION_LEN).is_err());
        let mut core = core();
        core.set_version(31).unwrap();
        assert_eq!(core.header().version_number, 31);
        assert!(core.set_version(32).is_err());
    }

    #[test]
    fn test_max_section_len_bounds() {
        let mut core = core();
        assert_eq!(
            core.set_max_section_len(1025),
            Err(SiError::InvalidConfig {
                setting: "max_section_len",
                value: 1025,
                min: 13,
                max: 1024
            })
        );
        assert!(core.set_max_section_len(12).is_err());
        core.set_max_section_len(13).unwrap();
        assert_eq!(core.max_section_len(), 13);
    }

    #[test]
    fn test_reserved_len_bounds() {
        let mut core = core();
        core.set_reserved_len(1011).unwrap();
        assert!(core.set_reserved_len(1012).is_err());
        assert!(core.set_max_section_len(100).is_err());
        core.set_reserved_len(0).unwrap();
        core.set_max_section_len(100).unwrap();
    }

    #[test]
    fn test_sealed_core_rejects_changes() {
        let mut core = core();
        core.seal();
        assert_eq!(core.state(), TableState::Serialized);
        let err = core.set_version(1).unwrap_err();
        assert_eq!(err, SiError::TableSealed { table_id: 0x42 });
        assert_eq!(err.kind(), crate::error::ErrorKind::State);
        assert!(core.set_reserved_len(4).is_err());
    }
}
