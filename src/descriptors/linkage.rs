//! Linkage descriptor (tag 0x4A) and its specialised forms.
//!
//! The linkage types that change the payload layout (mobile hand-over,
//! system software update and SSU scan) have their own types. The generic
//! [`LinkageDescriptor`] refuses them.

use super::{DescriptorBody, check_payload};
use crate::encoding::ByteWriter;
use crate::error::{SiError, SiResult, check_bits};
use crate::types::{HandOverType, LinkageType, OriginType, SsuTableType};

#[cfg(feature = "serde")]
use serde::Serialize;

pub const LINKAGE_TAG: u8 = 0x4A;

/// transport_stream_id, original_network_id, service_id, linkage_type
const LINKAGE_BASE_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct LinkageTarget {
    transport_stream_id: u16,
    original_network_id: u16,
    service_id: u16,
}

impl LinkageTarget {
    fn encode(&self, writer: &mut ByteWriter, linkage_type: LinkageType) -> SiResult<()> {
        writer.write_u16(self.transport_stream_id)?;
        writer.write_u16(self.original_network_id)?;
        writer.write_u16(self.service_id)?;
        writer.write_u8(linkage_type.id())
    }
}

/// Generic linkage descriptor with optional private data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LinkageDescriptor {
    target: LinkageTarget,
    linkage_type: LinkageType,
    private_data: Vec<u8>,
}

impl LinkageDescriptor {
    pub const TAG: u8 = LINKAGE_TAG;

    /// Creates a linkage descriptor.
    ///
    /// # Errors
    /// Mobile hand-over, SSU and SSU scan linkages are rejected; use
    /// [`MobileHandoverLinkageDescriptor`], [`SsuLinkageDescriptor`] or
    /// [`SsuScanLinkageDescriptor`] instead.
    pub fn new(
        transport_stream_id: u16,
        original_network_id: u16,
        service_id: u16,
        linkage_type: LinkageType,
    ) -> SiResult<Self> {
        if matches!(
            linkage_type,
            LinkageType::MobileHandOver
                | LinkageType::SystemSoftwareUpdateService
                | LinkageType::TsContainingSsuBatOrNit
        ) {
            return Err(SiError::invalid(
                "linkage_type",
                format!("0x{:02x} needs its dedicated descriptor type", linkage_type.id()),
            ));
        }
        Ok(Self {
            target: LinkageTarget {
                transport_stream_id,
                original_network_id,
                service_id,
            },
            linkage_type,
            private_data: Vec::new(),
        })
    }

    pub fn linkage_type(&self) -> LinkageType {
        self.linkage_type
    }

    pub fn set_private_data(&mut self, data: Vec<u8>) -> SiResult<()> {
        check_payload(Self::TAG, LINKAGE_BASE_LEN + data.len())?;
        self.private_data = data;
        Ok(())
    }
}

impl DescriptorBody for LinkageDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        LINKAGE_BASE_LEN + self.private_data.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        self.target.encode(writer, self.linkage_type)?;
        writer.write_bytes(&self.private_data)
    }
}

/// Mobile hand-over linkage (linkage type 0x08).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MobileHandoverLinkageDescriptor {
    target: LinkageTarget,
    hand_over_type: HandOverType,
    origin_type: OriginType,
    network_id: u16,
    initial_service_id: u16,
    private_data: Vec<u8>,
}

impl MobileHandoverLinkageDescriptor {
    pub const TAG: u8 = LINKAGE_TAG;

    /// `network_id` is only written for hand-over types 1 to 3, and
    /// `initial_service_id` only when the origin is the NIT.
    pub fn new(
        transport_stream_id: u16,
        original_network_id: u16,
        service_id: u16,
        hand_over_type: HandOverType,
        origin_type: OriginType,
        network_id: u16,
        initial_service_id: u16,
    ) -> Self {
        Self {
            target: LinkageTarget {
                transport_stream_id,
                original_network_id,
                service_id,
            },
            hand_over_type,
            origin_type,
            network_id,
            initial_service_id,
            private_data: Vec::new(),
        }
    }

    fn has_network_id(&self) -> bool {
        self.hand_over_type != HandOverType::Reserved
    }

    fn has_initial_service_id(&self) -> bool {
        self.origin_type == OriginType::Nit
    }

    fn fixed_len(&self) -> usize {
        LINKAGE_BASE_LEN
            + 1
            + if self.has_network_id() { 2 } else { 0 }
            + if self.has_initial_service_id() { 2 } else { 0 }
    }

    pub fn set_private_data(&mut self, data: Vec<u8>) -> SiResult<()> {
        check_payload(Self::TAG, self.fixed_len() + data.len())?;
        self.private_data = data;
        Ok(())
    }
}

impl DescriptorBody for MobileHandoverLinkageDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.fixed_len() + self.private_data.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        self.target.encode(writer, LinkageType::MobileHandOver)?;
        writer.write_bits("hand_over_type", u64::from(self.hand_over_type.id()), 4)?;
        writer.write_reserved(3)?;
        writer.write_bits("origin_type", u64::from(self.origin_type.id()), 1)?;
        if self.has_network_id() {
            writer.write_u16(self.network_id)?;
        }
        if self.has_initial_service_id() {
            writer.write_u16(self.initial_service_id)?;
        }
        writer.write_bytes(&self.private_data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct SsuOui {
    oui: u32,
    selector: Vec<u8>,
}

/// System software update linkage (linkage type 0x09).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SsuLinkageDescriptor {
    target: LinkageTarget,
    ouis: Vec<SsuOui>,
    private_data: Vec<u8>,
}

impl SsuLinkageDescriptor {
    pub const TAG: u8 = LINKAGE_TAG;

    pub fn new(transport_stream_id: u16, original_network_id: u16, service_id: u16) -> Self {
        Self {
            target: LinkageTarget {
                transport_stream_id,
                original_network_id,
                service_id,
            },
            ouis: Vec::new(),
            private_data: Vec::new(),
        }
    }

    fn oui_data_len(&self) -> usize {
        self.ouis.iter().map(|o| 4 + o.selector.len()).sum()
    }

    /// Adds an OUI entry with its selector bytes.
    pub fn add_oui(&mut self, oui: u32, selector: Vec<u8>) -> SiResult<()> {
        check_bits("oui", u64::from(oui), 24)?;
        check_payload(Self::TAG, self.payload_len() + 4 + selector.len())?;
        self.ouis.push(SsuOui { oui, selector });
        Ok(())
    }

    pub fn set_private_data(&mut self, data: Vec<u8>) -> SiResult<()> {
        check_payload(Self::TAG, LINKAGE_BASE_LEN + 1 + self.oui_data_len() + data.len())?;
        self.private_data = data;
        Ok(())
    }
}

impl DescriptorBody for SsuLinkageDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        LINKAGE_BASE_LEN + 1 + self.oui_data_len() + self.private_data.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        self.target.encode(writer, LinkageType::SystemSoftwareUpdateService)?;
        writer.write_bits("oui_data_length", self.oui_data_len() as u64, 8)?;
        for entry in &self.ouis {
            writer.write_u24("oui", entry.oui)?;
            writer.write_string8("selector", &entry.selector)?;
        }
        writer.write_bytes(&self.private_data)
    }
}

/// Linkage to a transport stream carrying SSU BAT or NIT (linkage type 0x0A).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SsuScanLinkageDescriptor {
    target: LinkageTarget,
    table_type: SsuTableType,
}

impl SsuScanLinkageDescriptor {
    pub const TAG: u8 = LINKAGE_TAG;

    pub fn new(
        transport_stream_id: u16,
        original_network_id: u16,
        service_id: u16,
        table_type: SsuTableType,
    ) -> Self {
        Self {
            target: LinkageTarget {
                transport_stream_id,
                original_network_id,
                service_id,
            },
            table_type,
        }
    }
}

impl DescriptorBody for SsuScanLinkageDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        LINKAGE_BASE_LEN + 1
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        self.target.encode(writer, LinkageType::TsContainingSsuBatOrNit)?;
        writer.write_u8(self.table_type.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::Descriptor;
    use crate::encoding::Encodable;
    use crate::error::ErrorKind;

    fn encode(descriptor: impl Into<Descriptor>) -> Vec<u8> {
        descriptor.into().encode_to_vec().unwrap()
    }

    #[test]
    fn test_generic_linkage() {
        let mut linkage = LinkageDescriptor::new(0x0001, 0x0002, 0x0003, LinkageType::ServiceReplacementService)
            .unwrap();
        linkage.set_private_data(vec![0xAB, 0xCD]).unwrap();
        assert_eq!(
            encode(linkage),
            vec![0x4A, 0x09, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x05, 0xAB, 0xCD]
        );
    }

    #[test]
    fn test_generic_linkage_rejects_special_types() {
        for linkage_type in [
            LinkageType::MobileHandOver,
            LinkageType::SystemSoftwareUpdateService,
            LinkageType::TsContainingSsuBatOrNit,
        ] {
            let err = LinkageDescriptor::new(1, 2, 3, linkage_type).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Construction);
        }
    }

    #[test]
    fn test_private_data_limit() {
        let mut linkage = LinkageDescriptor::new(1, 2, 3, LinkageType::EpgService).unwrap();
        assert!(linkage.set_private_data(vec![0; 248]).is_ok());
        assert!(linkage.set_private_data(vec![0; 249]).is_err());
        // A failed setter leaves the previous value in place.
        assert_eq!(Descriptor::from(linkage).payload_len(), 255);
    }

    #[test]
    fn test_mobile_handover_optional_fields() {
        let full = MobileHandoverLinkageDescriptor::new(
            1,
            2,
            3,
            HandOverType::LocalVariation,
            OriginType::Nit,
            0x1111,
            0x2222,
        );
        assert_eq!(
            encode(full),
            vec![0x4A, 0x0C, 0, 1, 0, 2, 0, 3, 0x08, 0x2E, 0x11, 0x11, 0x22, 0x22]
        );

        let bare = MobileHandoverLinkageDescriptor::new(
            1,
            2,
            3,
            HandOverType::Reserved,
            OriginType::Sdt,
            0x1111,
            0x2222,
        );
        assert_eq!(encode(bare), vec![0x4A, 0x08, 0, 1, 0, 2, 0, 3, 0x08, 0x0F]);
    }

    #[test]
    fn test_ssu_linkage() {
        let mut ssu = SsuLinkageDescriptor::new(0x0001, 0x0002, 0x0003);
        ssu.add_oui(0x00015A, vec![0x01, 0x02]).unwrap();
        ssu.set_private_data(vec![0xEE]).unwrap();
        assert_eq!(
            encode(ssu),
            vec![
                0x4A, 0x0F, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x09, // header
                0x06, // OUI_data_length
                0x00, 0x01, 0x5A, 0x02, 0x01, 0x02, // OUI entry
                0xEE, // private data
            ]
        );
    }

    #[test]
    fn test_ssu_linkage_limits() {
        let mut ssu = SsuLinkageDescriptor::new(1, 2, 3);
        assert!(ssu.add_oui(0x0100_0000, vec![]).is_err());
        ssu.add_oui(0x00015A, vec![0; 240]).unwrap();
        // 8 + 244 = 252 bytes used
        assert!(ssu.add_oui(0x00015A, vec![]).is_err());
        assert!(ssu.set_private_data(vec![0; 3]).is_ok());
        assert!(ssu.set_private_data(vec![0; 4]).is_err());
    }

    #[test]
    fn test_ssu_scan_linkage() {
        let scan = SsuScanLinkageDescriptor::new(1, 2, 3, SsuTableType::Nit);
        assert_eq!(encode(scan), vec![0x4A, 0x08, 0, 1, 0, 2, 0, 3, 0x0A, 0x01]);
    }
}
