//! Data broadcast (tag 0x64) and data broadcast id (tag 0x66) descriptors,
//! including the system software update form defined by TS 102 006.

use super::{DescriptorBody, check_payload, code3};
use crate::encoding::ByteWriter;
use crate::error::{SiResult, check_bits};

#[cfg(feature = "serde")]
use serde::Serialize;

pub const DATA_BROADCAST_ID_TAG: u8 = 0x66;

/// `data_broadcast_id` value of a system software update service.
pub const SSU_DATA_BROADCAST_ID: u16 = 0x000A;

/// Data broadcast id descriptor with raw selector bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DataBroadcastIdDescriptor {
    data_broadcast_id: u16,
    selector: Vec<u8>,
}

impl DataBroadcastIdDescriptor {
    pub const TAG: u8 = DATA_BROADCAST_ID_TAG;

    pub fn new(data_broadcast_id: u16, selector: Vec<u8>) -> SiResult<Self> {
        check_payload(Self::TAG, 2 + selector.len())?;
        Ok(Self {
            data_broadcast_id,
            selector,
        })
    }

    pub fn set_selector(&mut self, selector: Vec<u8>) -> SiResult<()> {
        check_payload(Self::TAG, 2 + selector.len())?;
        self.selector = selector;
        Ok(())
    }
}

impl DescriptorBody for DataBroadcastIdDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        2 + self.selector.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.data_broadcast_id)?;
        writer.write_bytes(&self.selector)
    }
}

/// Data broadcast descriptor (tag 0x64), announcing a data service in the SDT or EIT.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DataBroadcastDescriptor {
    data_broadcast_id: u16,
    component_tag: u8,
    selector: Vec<u8>,
    language: [u8; 3],
    text: String,
}

impl DataBroadcastDescriptor {
    pub const TAG: u8 = 0x64;

    pub fn new(
        data_broadcast_id: u16,
        component_tag: u8,
        selector: Vec<u8>,
        language: &str,
        text: &str,
    ) -> SiResult<Self> {
        let descriptor = Self {
            data_broadcast_id,
            component_tag,
            selector,
            language: code3("ISO_639_language_code", language)?,
            text: text.to_owned(),
        };
        check_payload(Self::TAG, descriptor.payload_len())?;
        Ok(descriptor)
    }
}

impl DescriptorBody for DataBroadcastDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        8 + self.selector.len() + self.text.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.data_broadcast_id)?;
        writer.write_u8(self.component_tag)?;
        writer.write_string8("selector_length", &self.selector)?;
        writer.write_bytes(&self.language)?;
        writer.write_string8("text_length", self.text.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct UpdateOui {
    oui: u32,
    update_type: u8,
    update_version: Option<u8>,
    selector: Vec<u8>,
}

impl UpdateOui {
    /// OUI, update type, versioning, selector_length
    const BASE_LEN: usize = 6;

    fn len(&self) -> usize {
        Self::BASE_LEN + self.selector.len()
    }
}

/// System software update data broadcast id descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SsuDataBroadcastIdDescriptor {
    ouis: Vec<UpdateOui>,
    private_data: Vec<u8>,
}

impl SsuDataBroadcastIdDescriptor {
    pub const TAG: u8 = DATA_BROADCAST_ID_TAG;

    pub fn new() -> Self {
        Self::default()
    }

    fn oui_data_len(&self) -> usize {
        self.ouis.iter().map(UpdateOui::len).sum()
    }

    /// Adds an OUI entry. A `Some` update version sets the
    /// `update_versioning_flag`.
    pub fn add_oui(
        &mut self,
        oui: u32,
        update_type: u8,
        update_version: Option<u8>,
        selector: Vec<u8>,
    ) -> SiResult<()> {
        check_bits("oui", u64::from(oui), 24)?;
        check_bits("update_type", u64::from(update_type), 4)?;
        if let Some(version) = update_version {
            check_bits("update_version", u64::from(version), 5)?;
        }
        let entry = UpdateOui {
            oui,
            update_type,
            update_version,
            selector,
        };
        check_payload(Self::TAG, self.payload_len() + entry.len())?;
        self.ouis.push(entry);
        Ok(())
    }

    pub fn set_private_data(&mut self, data: Vec<u8>) -> SiResult<()> {
        check_payload(Self::TAG, 3 + self.oui_data_len() + data.len())?;
        self.private_data = data;
        Ok(())
    }
}

impl DescriptorBody for SsuDataBroadcastIdDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        3 + self.oui_data_len() + self.private_data.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(SSU_DATA_BROADCAST_ID)?;
        writer.write_bits("oui_data_length", self.oui_data_len() as u64, 8)?;
        for entry in &self.ouis {
            writer.write_u24("oui", entry.oui)?;
            writer.write_reserved(4)?;
            writer.write_bits("update_type", u64::from(entry.update_type), 4)?;
            writer.write_reserved(2)?;
            writer.write_flag(entry.update_version.is_some())?;
            writer.write_bits("update_version", u64::from(entry.update_version.unwrap_or(0)), 5)?;
            writer.write_string8("selector", &entry.selector)?;
        }
        writer.write_bytes(&self.private_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::Descriptor;
    use crate::encoding::Encodable;

    #[test]
    fn test_data_broadcast_id() {
        let descriptor = DataBroadcastIdDescriptor::new(0x0005, vec![0x01, 0x02]).unwrap();
        let bytes = Descriptor::from(descriptor).encode_to_vec().unwrap();
        assert_eq!(bytes, vec![0x66, 0x04, 0x00, 0x05, 0x01, 0x02]);
        assert!(DataBroadcastIdDescriptor::new(0x0005, vec![0; 254]).is_err());
    }

    #[test]
    fn test_data_broadcast() {
        let descriptor = DataBroadcastDescriptor::new(0x0106, 0x21, vec![0xAB], "fra", "MHP").unwrap();
        let bytes = Descriptor::from(descriptor).encode_to_vec().unwrap();
        assert_eq!(
            bytes,
            vec![0x64, 0x0C, 0x01, 0x06, 0x21, 0x01, 0xAB, b'f', b'r', b'a', 0x03, b'M', b'H', b'P']
        );
        assert!(DataBroadcastDescriptor::new(1, 0, vec![0; 200], "fra", &"x".repeat(48)).is_err());
        assert!(DataBroadcastDescriptor::new(1, 0, vec![], "fr", "").is_err());
    }

    #[test]
    fn test_ssu_data_broadcast_id() {
        let mut descriptor = SsuDataBroadcastIdDescriptor::new();
        descriptor.add_oui(0x00015A, 0x1, Some(3), vec![]).unwrap();
        descriptor.add_oui(0x000000, 0x2, None, vec![0xAA]).unwrap();
        descriptor.set_private_data(vec![0x99]).unwrap();
        let bytes = Descriptor::from(descriptor).encode_to_vec().unwrap();
        assert_eq!(
            bytes,
            vec![
                0x66, 0x11, 0x00, 0x0A, // tag, length, data_broadcast_id
                0x0D, // OUI_data_length
                0x00, 0x01, 0x5A, 0xF1, 0xE3, 0x00, // first OUI
                0x00, 0x00, 0x00, 0xF2, 0xC0, 0x01, 0xAA, // second OUI
                0x99, // private data
            ]
        );
    }

    #[test]
    fn test_ssu_data_broadcast_id_validation() {
        let mut descriptor = SsuDataBroadcastIdDescriptor::new();
        assert!(descriptor.add_oui(0x00015A, 0x10, None, vec![]).is_err());
        assert!(descriptor.add_oui(0x00015A, 0x1, Some(32), vec![]).is_err());
        assert!(descriptor.add_oui(0x00015A, 0x1, None, vec![0; 246]).is_ok());
        assert!(descriptor.set_private_data(vec![0; 1]).is_err());
    }
}
