//! Running status table.

use super::{MAX_PSI_SECTION_LEN, Table, TableCore, TableState};
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult};
use crate::section::{SHORT_HEADER_LEN, Section, SectionHeader};
use crate::types::{RunningStatus, pid};

/// Running status of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningStatusEntry {
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    pub service_id: u16,
    pub event_id: u16,
    pub running_status: RunningStatus,
}

impl Encodable for RunningStatusEntry {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.transport_stream_id)?;
        writer.write_u16(self.original_network_id)?;
        writer.write_u16(self.service_id)?;
        writer.write_u16(self.event_id)?;
        // reserved_future_use (5 bits), running_status (3 bits)
        writer.write_reserved(5)?;
        writer.write_bits("running_status", u64::from(self.running_status.id()), 3)
    }

    fn encoded_size(&self) -> usize {
        9
    }
}

/// Running status table (table_id 0x71), a single section without CRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rst {
    core: TableCore,
    entries: Vec<RunningStatusEntry>,
}

impl Default for Rst {
    fn default() -> Self {
        Self::new()
    }
}

impl Rst {
    pub const TABLE_ID: u8 = 0x71;

    pub fn new() -> Self {
        Self {
            core: TableCore::new(SectionHeader::new(Self::TABLE_ID, true, 0), MAX_PSI_SECTION_LEN),
            entries: Vec::new(),
        }
    }

    fn remaining(&self) -> usize {
        let used = SHORT_HEADER_LEN + self.entries.encoded_size();
        self.core.max_section_len().saturating_sub(used)
    }

    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`SiError::TableFull`] once the section holds 113 entries.
    pub fn add_entry(&mut self, entry: RunningStatusEntry) -> SiResult<()> {
        self.core.ensure_building()?;
        let available = self.remaining();
        if entry.encoded_size() > available {
            return Err(SiError::TableFull {
                table_id: Self::TABLE_ID,
                needed: entry.encoded_size(),
                available,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[RunningStatusEntry] {
        &self.entries
    }
}

impl Table for Rst {
    const PID: u16 = pid::RST;

    fn table_id(&self) -> u8 {
        self.core.table_id()
    }

    fn state(&self) -> TableState {
        self.core.state()
    }

    fn build_sections(&mut self) -> SiResult<Vec<Section>> {
        self.core.seal();
        let body = self.entries.encode_to_vec()?;
        Ok(vec![Section::short(Self::TABLE_ID, false, true, &body, false)?])
    }
}
