//! Stuffing table.

use super::{MAX_PRIVATE_SECTION_LEN, Table, TableCore, TableState};
use crate::error::{SiError, SiResult};
use crate::section::{SHORT_HEADER_LEN, Section, SectionHeader};
use crate::types::pid;

/// Stuffing table (table_id 0x72). Its section may replace a section of any
/// other SI table, so [`Table::PID`] only names the TDT/TOT PID as a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuffingTable {
    core: TableCore,
    section_syntax_indicator: bool,
    data: Vec<u8>,
}

impl StuffingTable {
    pub const TABLE_ID: u8 = 0x72;

    /// Largest amount of stuffing a section can carry.
    pub const MAX_DATA_LEN: usize = MAX_PRIVATE_SECTION_LEN - SHORT_HEADER_LEN;

    pub fn new(section_syntax_indicator: bool) -> Self {
        Self {
            core: TableCore::new(SectionHeader::new(Self::TABLE_ID, true, 0), MAX_PRIVATE_SECTION_LEN),
            section_syntax_indicator,
            data: Vec::new(),
        }
    }

    /// Replaces the stuffing bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SiError::TableFull`] for more than 4093 bytes.
    pub fn set_data(&mut self, data: Vec<u8>) -> SiResult<()> {
        self.core.ensure_building()?;
        if data.len() > Self::MAX_DATA_LEN {
            return Err(SiError::TableFull {
                table_id: Self::TABLE_ID,
                needed: data.len(),
                available: Self::MAX_DATA_LEN,
            });
        }
        self.data = data;
        Ok(())
    }

    /// Fills the table with `len` copies of `byte`.
    pub fn fill(&mut self, len: usize, byte: u8) -> SiResult<()> {
        self.set_data(vec![byte; len])
    }

    pub fn set_section_syntax_indicator(&mut self, section_syntax_indicator: bool) -> SiResult<()> {
        self.core.ensure_building()?;
        self.section_syntax_indicator = section_syntax_indicator;
        Ok(())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Table for StuffingTable {
    const PID: u16 = pid::TDT_TOT;

    fn table_id(&self) -> u8 {
        self.core.table_id()
    }

    fn state(&self) -> TableState {
        self.core.state()
    }

    fn build_sections(&mut self) -> SiResult<Vec<Section>> {
        self.core.seal();
        Ok(vec![Section::short(
            Self::TABLE_ID,
            self.section_syntax_indicator,
            true,
            &self.data,
            false,
        )?])
    }
}
