//! Network information table and bouquet association table.
//!
//! Both tables share one layout: a length-prefixed loop of table level
//! descriptors followed by a length-prefixed transport stream loop.

use super::{
    MAX_PSI_SECTION_LEN, TableCore, descriptors_len, long_table, write_descriptor_loop,
};
use crate::descriptors::Descriptor;
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult};
use crate::section::Section;
use crate::splitter::LoopSpec;
use crate::types::pid;

/// A transport stream together with its descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportStreamEntry {
    transport_stream_id: u16,
    original_network_id: u16,
    descriptors: Vec<Descriptor>,
}

impl TransportStreamEntry {
    pub fn new(transport_stream_id: u16, original_network_id: u16) -> Self {
        Self {
            transport_stream_id,
            original_network_id,
            descriptors: Vec::new(),
        }
    }

    pub fn add_descriptor(&mut self, descriptor: impl Into<Descriptor>) {
        self.descriptors.push(descriptor.into());
    }

    pub fn with_descriptor(mut self, descriptor: impl Into<Descriptor>) -> Self {
        self.add_descriptor(descriptor);
        self
    }

    pub fn transport_stream_id(&self) -> u16 {
        self.transport_stream_id
    }

    pub fn original_network_id(&self) -> u16 {
        self.original_network_id
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    fn matches(&self, transport_stream_id: u16, original_network_id: u16) -> bool {
        self.transport_stream_id == transport_stream_id && self.original_network_id == original_network_id
    }
}

impl Encodable for TransportStreamEntry {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.transport_stream_id)?;
        writer.write_u16(self.original_network_id)?;
        // reserved_future_use (4 bits), transport_descriptors_length (12 bits)
        write_descriptor_loop(writer, &self.descriptors)
    }

    fn encoded_size(&self) -> usize {
        6 + descriptors_len(&self.descriptors)
    }
}

/// Rows and descriptors common to the NIT and the BAT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TransportStreamLoops {
    descriptors: Vec<Descriptor>,
    streams: Vec<TransportStreamEntry>,
}

impl TransportStreamLoops {
    fn add_stream_descriptor(
        &mut self,
        transport_stream_id: u16,
        original_network_id: u16,
        descriptor: Descriptor,
    ) -> SiResult<()> {
        let entry = self
            .streams
            .iter_mut()
            .find(|entry| entry.matches(transport_stream_id, original_network_id))
            .ok_or_else(|| {
                SiError::invalid(
                    "transport_stream_id",
                    format!("no transport stream {transport_stream_id:#06x}/{original_network_id:#06x}"),
                )
            })?;
        entry.add_descriptor(descriptor);
        Ok(())
    }

    fn encode_sections(&self, core: &TableCore) -> SiResult<Vec<Section>> {
        core.splitter()
            .push_loop(LoopSpec::prefixed(&self.descriptors))
            .push_loop(LoopSpec::prefixed(&self.streams))
            .split()
    }
}

/// Which network a NIT describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NitKind {
    Actual,
    Other,
}

impl NitKind {
    pub fn table_id(self) -> u8 {
        match self {
            NitKind::Actual => 0x40,
            NitKind::Other => 0x41,
        }
    }
}

/// Network information table (table_id 0x40 / 0x41).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nit {
    core: TableCore,
    loops: TransportStreamLoops,
}

impl Nit {
    pub fn new(kind: NitKind, network_id: u16, version_number: u8) -> SiResult<Self> {
        Ok(Self {
            core: TableCore::versioned(kind.table_id(), true, network_id, version_number, MAX_PSI_SECTION_LEN)?,
            loops: TransportStreamLoops::default(),
        })
    }

    pub fn network_id(&self) -> u16 {
        self.core.header().table_id_extension
    }

    /// Adds a descriptor to the network descriptor loop.
    pub fn add_network_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> SiResult<()> {
        self.core.ensure_building()?;
        self.loops.descriptors.push(descriptor.into());
        Ok(())
    }

    pub fn add_transport_stream(&mut self, entry: TransportStreamEntry) -> SiResult<()> {
        self.core.ensure_building()?;
        self.loops.streams.push(entry);
        Ok(())
    }

    /// Adds a descriptor to an already added transport stream.
    pub fn add_transport_stream_descriptor(
        &mut self,
        transport_stream_id: u16,
        original_network_id: u16,
        descriptor: impl Into<Descriptor>,
    ) -> SiResult<()> {
        self.core.ensure_building()?;
        self.loops
            .add_stream_descriptor(transport_stream_id, original_network_id, descriptor.into())
    }

    pub fn transport_streams(&self) -> &[TransportStreamEntry] {
        &self.loops.streams
    }

    fn encode_sections(&self) -> SiResult<Vec<Section>> {
        self.loops.encode_sections(&self.core)
    }
}

long_table!(Nit, pid::NIT);

/// Bouquet association table (table_id 0x4A).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bat {
    core: TableCore,
    loops: TransportStreamLoops,
}

impl Bat {
    pub const TABLE_ID: u8 = 0x4A;

    pub fn new(bouquet_id: u16, version_number: u8) -> SiResult<Self> {
        Ok(Self {
            core: TableCore::versioned(Self::TABLE_ID, true, bouquet_id, version_number, MAX_PSI_SECTION_LEN)?,
            loops: TransportStreamLoops::default(),
        })
    }

    pub fn bouquet_id(&self) -> u16 {
        self.core.header().table_id_extension
    }

    pub fn add_bouquet_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> SiResult<()> {
        self.core.ensure_building()?;
        self.loops.descriptors.push(descriptor.into());
        Ok(())
    }

    pub fn add_transport_stream(&mut self, entry: TransportStreamEntry) -> SiResult<()> {
        self.core.ensure_building()?;
        self.loops.streams.push(entry);
        Ok(())
    }

    pub fn add_transport_stream_descriptor(
        &mut self,
        transport_stream_id: u16,
        original_network_id: u16,
        descriptor: impl Into<Descriptor>,
    ) -> SiResult<()> {
        self.core.ensure_building()?;
        self.loops
            .add_stream_descriptor(transport_stream_id, original_network_id, descriptor.into())
    }

    pub fn transport_streams(&self) -> &[TransportStreamEntry] {
        &self.loops.streams
    }

    fn encode_sections(&self) -> SiResult<Vec<Section>> {
        self.loops.encode_sections(&self.core)
    }
}

long_table!(Bat, pid::SDT_BAT);
