//! Network topology descriptors carried in the NIT transport stream loop:
//! frequency and cell lists, cell/frequency links and announcement support.

use super::{DescriptorBody, check_payload};
use crate::encoding::ByteWriter;
use crate::error::{SiError, SiResult, check_bits};
use crate::types::{AnnouncementType, FrequencyCoding};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Frequency list descriptor (tag 0x62).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FrequencyListDescriptor {
    coding_type: FrequencyCoding,
    frequencies: Vec<u32>,
}

impl FrequencyListDescriptor {
    pub const TAG: u8 = 0x62;

    pub fn new(coding_type: FrequencyCoding) -> Self {
        Self {
            coding_type,
            frequencies: Vec::new(),
        }
    }

    /// Appends a centre frequency, coded as `coding_type` says.
    pub fn add_frequency(&mut self, centre_frequency: u32) -> SiResult<()> {
        check_payload(Self::TAG, self.payload_len() + 4)?;
        self.frequencies.push(centre_frequency);
        Ok(())
    }

    pub fn frequencies(&self) -> &[u32] {
        &self.frequencies
    }
}

impl DescriptorBody for FrequencyListDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1 + self.frequencies.len() * 4
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_reserved(6)?;
        writer.write_bits("coding_type", u64::from(self.coding_type.id()), 2)?;
        for frequency in &self.frequencies {
            writer.write_u32(*frequency)?;
        }
        Ok(())
    }
}

/// A rectangle given by its south-west corner and its extent, in the units
/// of the cell list descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CellArea {
    pub latitude: i16,
    pub longitude: i16,
    /// 12 bits.
    pub extent_of_latitude: u16,
    /// 12 bits.
    pub extent_of_longitude: u16,
}

impl CellArea {
    fn check(&self) -> SiResult<()> {
        check_bits("extent_of_latitude", u64::from(self.extent_of_latitude), 12)?;
        check_bits("extent_of_longitude", u64::from(self.extent_of_longitude), 12)
    }

    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.latitude as u16)?;
        writer.write_u16(self.longitude as u16)?;
        writer.write_bits("extent_of_latitude", u64::from(self.extent_of_latitude), 12)?;
        writer.write_bits("extent_of_longitude", u64::from(self.extent_of_longitude), 12)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct Cell {
    cell_id: u16,
    area: CellArea,
    subcells: Vec<(u8, CellArea)>,
}

const CELL_LEN: usize = 10;
const SUBCELL_LEN: usize = 8;

/// Cell list descriptor (tag 0x6C).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CellListDescriptor {
    cells: Vec<Cell>,
}

impl CellListDescriptor {
    pub const TAG: u8 = 0x6C;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cell(&mut self, cell_id: u16, area: CellArea) -> SiResult<()> {
        area.check()?;
        check_payload(Self::TAG, self.payload_len() + CELL_LEN)?;
        self.cells.push(Cell {
            cell_id,
            area,
            subcells: Vec::new(),
        });
        Ok(())
    }

    /// Adds a subcell to the first cell with `cell_id`.
    pub fn add_subcell(&mut self, cell_id: u16, cell_id_extension: u8, area: CellArea) -> SiResult<()> {
        area.check()?;
        check_payload(Self::TAG, self.payload_len() + SUBCELL_LEN)?;
        let cell = self
            .cells
            .iter_mut()
            .find(|cell| cell.cell_id == cell_id)
            .ok_or_else(|| SiError::invalid("cell_id", format!("no cell {cell_id:#06x}")))?;
        cell.subcells.push((cell_id_extension, area));
        Ok(())
    }
}

impl DescriptorBody for CellListDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| CELL_LEN + cell.subcells.len() * SUBCELL_LEN)
            .sum()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for cell in &self.cells {
            writer.write_u16(cell.cell_id)?;
            cell.area.encode(writer)?;
            writer.write_bits("subcell_info_loop_length", (cell.subcells.len() * SUBCELL_LEN) as u64, 8)?;
            for (extension, area) in &cell.subcells {
                writer.write_u8(*extension)?;
                area.encode(writer)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct CellLink {
    cell_id: u16,
    frequency: u32,
    subcells: Vec<(u8, u32)>,
}

const LINK_LEN: usize = 7;
const LINK_SUBCELL_LEN: usize = 5;

/// Cell frequency link descriptor (tag 0x6D).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CellFrequencyLinkDescriptor {
    links: Vec<CellLink>,
}

impl CellFrequencyLinkDescriptor {
    pub const TAG: u8 = 0x6D;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_link(&mut self, cell_id: u16, frequency: u32) -> SiResult<()> {
        check_payload(Self::TAG, self.payload_len() + LINK_LEN)?;
        self.links.push(CellLink {
            cell_id,
            frequency,
            subcells: Vec::new(),
        });
        Ok(())
    }

    /// Adds a transposer to the first link of `cell_id`.
    pub fn add_subcell(&mut self, cell_id: u16, cell_id_extension: u8, transposer_frequency: u32) -> SiResult<()> {
        check_payload(Self::TAG, self.payload_len() + LINK_SUBCELL_LEN)?;
        let link = self
            .links
            .iter_mut()
            .find(|link| link.cell_id == cell_id)
            .ok_or_else(|| SiError::invalid("cell_id", format!("no link for cell {cell_id:#06x}")))?;
        link.subcells.push((cell_id_extension, transposer_frequency));
        Ok(())
    }
}

impl DescriptorBody for CellFrequencyLinkDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.links
            .iter()
            .map(|link| LINK_LEN + link.subcells.len() * LINK_SUBCELL_LEN)
            .sum()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for link in &self.links {
            writer.write_u16(link.cell_id)?;
            writer.write_u32(link.frequency)?;
            writer.write_bits(
                "subcell_info_loop_length",
                (link.subcells.len() * LINK_SUBCELL_LEN) as u64,
                8,
            )?;
            for (extension, frequency) in &link.subcells {
                writer.write_u8(*extension)?;
                writer.write_u32(*frequency)?;
            }
        }
        Ok(())
    }
}

/// Service component an announcement is carried in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AnnouncementSource {
    pub original_network_id: u16,
    pub transport_stream_id: u16,
    pub service_id: u16,
    pub component_tag: u8,
}

/// Where an announcement can be found (reference_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum AnnouncementReference {
    /// In the usual audio stream of the service.
    ServiceAudioStream,
    /// In a separate audio stream of the service.
    SeparateAudioStream(AnnouncementSource),
    /// In a different service of the same transport stream.
    DifferentService(AnnouncementSource),
    /// In a different service of a different transport stream.
    DifferentTransportStream(AnnouncementSource),
}

impl AnnouncementReference {
    fn id(&self) -> u8 {
        match self {
            AnnouncementReference::ServiceAudioStream => 0,
            AnnouncementReference::SeparateAudioStream(_) => 1,
            AnnouncementReference::DifferentService(_) => 2,
            AnnouncementReference::DifferentTransportStream(_) => 3,
        }
    }

    fn source(&self) -> Option<&AnnouncementSource> {
        match self {
            AnnouncementReference::ServiceAudioStream => None,
            AnnouncementReference::SeparateAudioStream(source)
            | AnnouncementReference::DifferentService(source)
            | AnnouncementReference::DifferentTransportStream(source) => Some(source),
        }
    }

    fn encoded_len(&self) -> usize {
        if self.source().is_some() { 8 } else { 1 }
    }
}

/// Announcement support descriptor (tag 0x6E).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AnnouncementSupportDescriptor {
    announcement_support_indicator: u16,
    announcements: Vec<(AnnouncementType, AnnouncementReference)>,
}

impl AnnouncementSupportDescriptor {
    pub const TAG: u8 = 0x6E;

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an announcement and sets its bit in announcement_support_indicator.
    pub fn add_announcement(
        &mut self,
        announcement_type: AnnouncementType,
        reference: AnnouncementReference,
    ) -> SiResult<()> {
        check_payload(Self::TAG, self.payload_len() + reference.encoded_len())?;
        self.announcement_support_indicator |= 1 << announcement_type.id();
        self.announcements.push((announcement_type, reference));
        Ok(())
    }

    pub fn announcement_support_indicator(&self) -> u16 {
        self.announcement_support_indicator
    }
}

impl DescriptorBody for AnnouncementSupportDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        2 + self
            .announcements
            .iter()
            .map(|(_, reference)| reference.encoded_len())
            .sum::<usize>()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.announcement_support_indicator)?;
        for (announcement_type, reference) in &self.announcements {
            writer.write_bits("announcement_type", u64::from(announcement_type.id()), 4)?;
            writer.write_reserved(1)?;
            writer.write_bits("reference_type", u64::from(reference.id()), 3)?;
            if let Some(source) = reference.source() {
                writer.write_u16(source.original_network_id)?;
                writer.write_u16(source.transport_stream_id)?;
                writer.write_u16(source.service_id)?;
                writer.write_u8(source.component_tag)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::Descriptor;
    use crate::encoding::Encodable;

    fn encode(descriptor: impl Into<Descriptor>) -> Vec<u8> {
        descriptor.into().encode_to_vec().unwrap()
    }

    #[test]
    fn test_frequency_list() {
        let mut list = FrequencyListDescriptor::new(FrequencyCoding::Terrestrial);
        list.add_frequency(0x0403_5F9C).unwrap();
        assert_eq!(encode(list), vec![0x62, 0x05, 0xFF, 0x04, 0x03, 0x5F, 0x9C]);

        let mut full = FrequencyListDescriptor::new(FrequencyCoding::Cable);
        for frequency in 0..63 {
            full.add_frequency(frequency).unwrap();
        }
        assert!(full.add_frequency(63).is_err());
        assert_eq!(full.frequencies().len(), 63);
    }

    #[test]
    fn test_cell_list() {
        let area = CellArea {
            latitude: -2,
            longitude: 0x0102,
            extent_of_latitude: 0x123,
            extent_of_longitude: 0x456,
        };
        let mut cells = CellListDescriptor::new();
        cells.add_cell(0x0001, area).unwrap();
        cells.add_subcell(0x0001, 0x07, area).unwrap();
        assert_eq!(
            encode(cells.clone()),
            vec![
                0x6C, 0x12, // tag, length
                0x00, 0x01, 0xFF, 0xFE, 0x01, 0x02, 0x12, 0x34, 0x56, 0x08, // cell
                0x07, 0xFF, 0xFE, 0x01, 0x02, 0x12, 0x34, 0x56, // subcell
            ]
        );
        assert!(cells.add_subcell(0x0002, 0, area).is_err());

        let wide = CellArea {
            extent_of_latitude: 0x1000,
            ..area
        };
        assert!(cells.add_cell(2, wide).is_err());
    }

    #[test]
    fn test_cell_frequency_link() {
        let mut links = CellFrequencyLinkDescriptor::new();
        links.add_link(0x0010, 0x0403_5F9C).unwrap();
        links.add_subcell(0x0010, 0x01, 0x0403_6000).unwrap();
        assert_eq!(
            encode(links),
            vec![
                0x6D, 0x0C, 0x00, 0x10, 0x04, 0x03, 0x5F, 0x9C, 0x05, 0x01, 0x04, 0x03, 0x60, 0x00,
            ]
        );
    }

    #[test]
    fn test_announcement_support() {
        let mut support = AnnouncementSupportDescriptor::new();
        support
            .add_announcement(AnnouncementType::EmergencyAlarm, AnnouncementReference::ServiceAudioStream)
            .unwrap();
        support
            .add_announcement(
                AnnouncementType::NewsFlash,
                AnnouncementReference::DifferentService(AnnouncementSource {
                    original_network_id: 0x0001,
                    transport_stream_id: 0x0002,
                    service_id: 0x0003,
                    component_tag: 0x04,
                }),
            )
            .unwrap();
        assert_eq!(support.announcement_support_indicator(), 0x0011);
        assert_eq!(
            encode(support),
            vec![
                0x6E, 0x0B, 0x00, 0x11, // indicator
                0x08, // emergency alarm, service audio stream
                0x4A, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x04,
            ]
        );
    }
}
