//! Conditional access table.

use super::{MAX_PSI_SECTION_LEN, TableCore, long_table};
use crate::descriptors::Descriptor;
use crate::error::SiResult;
use crate::section::Section;
use crate::splitter::LoopSpec;
use crate::types::pid;

/// Conditional access table (table_id 0x01), a plain list of descriptors,
/// usually CA descriptors pointing at EMM streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cat {
    core: TableCore,
    descriptors: Vec<Descriptor>,
}

impl Cat {
    pub const TABLE_ID: u8 = 0x01;

    pub fn new(version_number: u8) -> SiResult<Self> {
        Ok(Self {
            core: TableCore::versioned(Self::TABLE_ID, false, 0xFFFF, version_number, MAX_PSI_SECTION_LEN)?,
            descriptors: Vec::new(),
        })
    }

    pub fn add_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> SiResult<()> {
        self.core.ensure_building()?;
        self.descriptors.push(descriptor.into());
        Ok(())
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    fn encode_sections(&self) -> SiResult<Vec<Section>> {
        self.core.splitter().push_loop(LoopSpec::bare(&self.descriptors)).split()
    }
}

long_table!(Cat, pid::CAT);
