//! Service description table.

use super::{MAX_PSI_SECTION_LEN, TableCore, descriptors_len, long_table};
use crate::descriptors::Descriptor;
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult};
use crate::section::Section;
use crate::splitter::LoopSpec;
use crate::types::{RunningStatus, pid};

/// One service row of the SDT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdtService {
    service_id: u16,
    eit_schedule: bool,
    eit_present_following: bool,
    running_status: RunningStatus,
    free_ca_mode: bool,
    descriptors: Vec<Descriptor>,
}

impl SdtService {
    /// A running, free to air service without EIT flags.
    pub fn new(service_id: u16) -> Self {
        Self {
            service_id,
            eit_schedule: false,
            eit_present_following: false,
            running_status: RunningStatus::Running,
            free_ca_mode: false,
            descriptors: Vec::new(),
        }
    }

    pub fn with_eit_schedule(mut self, present: bool) -> Self {
        self.eit_schedule = present;
        self
    }

    pub fn with_eit_present_following(mut self, present: bool) -> Self {
        self.eit_present_following = present;
        self
    }

    pub fn with_running_status(mut self, running_status: RunningStatus) -> Self {
        self.running_status = running_status;
        self
    }

    pub fn with_free_ca_mode(mut self, scrambled: bool) -> Self {
        self.free_ca_mode = scrambled;
        self
    }

    pub fn with_descriptor(mut self, descriptor: impl Into<Descriptor>) -> Self {
        self.add_descriptor(descriptor);
        self
    }

    pub fn add_descriptor(&mut self, descriptor: impl Into<Descriptor>) {
        self.descriptors.push(descriptor.into());
    }

    pub fn service_id(&self) -> u16 {
        self.service_id
    }

    pub fn running_status(&self) -> RunningStatus {
        self.running_status
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }
}

impl Encodable for SdtService {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.service_id)?;
        // reserved_future_use (6 bits), EIT_schedule_flag, EIT_present_following_flag
        writer.write_reserved(6)?;
        writer.write_flag(self.eit_schedule)?;
        writer.write_flag(self.eit_present_following)?;
        // running_status (3 bits), free_CA_mode (1 bit), descriptors_loop_length (12 bits)
        writer.write_bits("running_status", u64::from(self.running_status.id()), 3)?;
        writer.write_flag(self.free_ca_mode)?;
        writer.write_bits("descriptors_loop_length", descriptors_len(&self.descriptors) as u64, 12)?;
        self.descriptors.encode(writer)
    }

    fn encoded_size(&self) -> usize {
        5 + descriptors_len(&self.descriptors)
    }
}

/// Which transport stream an SDT describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdtKind {
    Actual,
    Other,
}

impl SdtKind {
    pub fn table_id(self) -> u8 {
        match self {
            SdtKind::Actual => 0x42,
            SdtKind::Other => 0x46,
        }
    }
}

/// Service description table (table_id 0x42 / 0x46).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sdt {
    core: TableCore,
    original_network_id: u16,
    services: Vec<SdtService>,
}

impl Sdt {
    pub fn new(
        kind: SdtKind,
        transport_stream_id: u16,
        original_network_id: u16,
        version_number: u8,
    ) -> SiResult<Self> {
        Ok(Self {
            core: TableCore::versioned(
                kind.table_id(),
                true,
                transport_stream_id,
                version_number,
                MAX_PSI_SECTION_LEN,
            )?,
            original_network_id,
            services: Vec::new(),
        })
    }

    pub fn transport_stream_id(&self) -> u16 {
        self.core.header().table_id_extension
    }

    pub fn original_network_id(&self) -> u16 {
        self.original_network_id
    }

    pub fn add_service(&mut self, service: SdtService) -> SiResult<()> {
        self.core.ensure_building()?;
        self.services.push(service);
        Ok(())
    }

    /// Adds a descriptor to the first service with `service_id`.
    pub fn add_service_descriptor(&mut self, service_id: u16, descriptor: impl Into<Descriptor>) -> SiResult<()> {
        self.core.ensure_building()?;
        let service = self
            .services
            .iter_mut()
            .find(|service| service.service_id == service_id)
            .ok_or_else(|| SiError::invalid("service_id", format!("no service {service_id:#06x}")))?;
        service.add_descriptor(descriptor);
        Ok(())
    }

    pub fn services(&self) -> &[SdtService] {
        &self.services
    }

    fn encode_sections(&self) -> SiResult<Vec<Section>> {
        let mut prefix = ByteWriter::with_capacity(3);
        prefix.write_u16(self.original_network_id)?;
        // reserved_future_use (8 bits)
        prefix.write_reserved(8)?;

        self.core
            .splitter()
            .prefix(prefix.finish())
            .push_loop(LoopSpec::bare(&self.services))
            .split()
    }
}

long_table!(Sdt, pid::SDT_BAT);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc;
    use crate::descriptors::{ServiceDescriptor, StuffingDescriptor};
    use crate::error::ErrorKind;
    use crate::tables::{Table, TableState};
    use crate::types::ServiceType;

    #[test]
    fn test_sdt_encoding() {
        let mut sdt = Sdt::new(SdtKind::Actual, 0x0001, 0x0002, 1).unwrap();
        sdt.add_service(
            SdtService::new(0x0010)
                .with_eit_present_following(true)
                .with_free_ca_mode(true)
                .with_descriptor(ServiceDescriptor::new(ServiceType::DigitalTelevision, "P", "S").unwrap()),
        )
        .unwrap();

        let sections = sdt.build_sections().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].without_crc(),
            &[
                0x42, 0xF0, 0x18, 0x00, 0x01, 0xC3, 0x00, 0x00, // header
                0x00, 0x02, 0xFF, // original_network_id, reserved
                0x00, 0x10, 0xFD, 0x90, 0x07, // service row
                0x48, 0x05, 0x01, 0x01, b'P', 0x01, b'S',
            ]
        );
        assert!(crc::validate_section_crc(sections[0].as_bytes()));
    }

    #[test]
    fn test_sdt_service_descriptor_lookup() {
        let mut sdt = Sdt::new(SdtKind::Other, 1, 1, 0).unwrap();
        sdt.add_service(SdtService::new(5)).unwrap();
        sdt.add_service_descriptor(5, ServiceDescriptor::new(ServiceType::Teletext, "", "TXT").unwrap())
            .unwrap();
        assert_eq!(sdt.services()[0].descriptors().len(), 1);
        let err = sdt
            .add_service_descriptor(6, ServiceDescriptor::new(ServiceType::Teletext, "", "").unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
    }

    /// A service row of exactly `total` bytes. The SDT leaves 1009 bytes for rows.
    fn row_of(total: usize, service_id: u16) -> SdtService {
        let mut service = SdtService::new(service_id);
        let mut remaining = total - 5;
        while remaining > 0 {
            let chunk = remaining.min(257);
            service.add_descriptor(StuffingDescriptor::filled(chunk - 2, 0xFF).unwrap());
            remaining -= chunk;
        }
        service
    }

    #[test]
    fn test_sdt_row_boundaries() {
        let mut fits = Sdt::new(SdtKind::Actual, 1, 1, 0).unwrap();
        fits.add_service(row_of(1009, 1)).unwrap();
        let sections = fits.build_sections().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].len(), 1024);

        let mut shared = Sdt::new(SdtKind::Actual, 1, 1, 0).unwrap();
        shared.add_service(row_of(1002, 1)).unwrap();
        shared.add_service(row_of(7, 2)).unwrap();
        assert_eq!(shared.build_sections().unwrap().len(), 1);

        let mut split = Sdt::new(SdtKind::Actual, 1, 1, 0).unwrap();
        split.add_service(row_of(1003, 1)).unwrap();
        split.add_service(row_of(7, 2)).unwrap();
        let sections = split.build_sections().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].last_section_number(), 1);

        let mut oversize = Sdt::new(SdtKind::Actual, 1, 1, 0).unwrap();
        oversize.add_service(row_of(1010, 1)).unwrap();
        assert_eq!(
            oversize.build_sections(),
            Err(SiError::EntryTooLarge {
                needed: 1010,
                available: 1009
            })
        );
        assert_eq!(oversize.state(), TableState::Serialized);
    }

    #[test]
    fn test_sdt_row_over_descriptor_loop_limit() {
        // 20 x 257 bytes of descriptors overflows the 12-bit loop length too
        let mut service = SdtService::new(1);
        for _ in 0..20 {
            service.add_descriptor(StuffingDescriptor::filled(255, 0xFF).unwrap());
        }
        let mut sdt = Sdt::new(SdtKind::Actual, 1, 1, 0).unwrap();
        sdt.add_service(service).unwrap();
        let err = sdt.build_sections().unwrap_err();
        assert_eq!(
            err,
            SiError::EntryTooLarge {
                needed: 5 + 20 * 257,
                available: 1009
            }
        );
        assert_eq!(err.kind(), ErrorKind::Capacity);
    }

    #[test]
    fn test_sdt_rebuild_is_identical_and_sealed() {
        let mut sdt = Sdt::new(SdtKind::Actual, 1, 1, 4).unwrap();
        for id in 0..200 {
            sdt.add_service(SdtService::new(id).with_descriptor(
                ServiceDescriptor::new(ServiceType::DigitalTelevision, "Provider", "Service").unwrap(),
            ))
            .unwrap();
        }
        let first = sdt.build_sections().unwrap();
        let second = sdt.build_sections().unwrap();
        assert_eq!(first, second);
        assert!(first.len() > 1);
        assert!(sdt.add_service(SdtService::new(999)).is_err());
        assert!(sdt.set_max_section_len(512).is_err());
    }
}
