//! Network, bouquet and service level descriptors (NIT, BAT and SDT loops).

use super::{DescriptorBody, check_payload, code3, text8};
use crate::encoding::ByteWriter;
use crate::error::SiResult;
use crate::types::ServiceType;

#[cfg(feature = "serde")]
use serde::Serialize;

macro_rules! name_descriptor {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(Serialize))]
        pub struct $name {
            name: String,
        }

        impl $name {
            pub const TAG: u8 = $tag;

            pub fn new(name: &str) -> SiResult<Self> {
                check_payload(Self::TAG, name.len())?;
                Ok(Self {
                    name: name.to_owned(),
                })
            }

            pub fn name(&self) -> &str {
                &self.name
            }
        }

        impl DescriptorBody for $name {
            fn tag(&self) -> u8 {
                Self::TAG
            }

            fn payload_len(&self) -> usize {
                self.name.len()
            }

            fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
                writer.write_bytes(self.name.as_bytes())
            }
        }
    };
}

name_descriptor! {
    /// Network name descriptor (tag 0x40).
    NetworkNameDescriptor, 0x40
}

name_descriptor! {
    /// Bouquet name descriptor (tag 0x47).
    BouquetNameDescriptor, 0x47
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct ServiceListEntry {
    service_id: u16,
    service_type: ServiceType,
}

/// Service list descriptor (tag 0x41).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ServiceListDescriptor {
    services: Vec<ServiceListEntry>,
}

impl ServiceListDescriptor {
    pub const TAG: u8 = 0x41;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_service(&mut self, service_id: u16, service_type: ServiceType) -> SiResult<()> {
        check_payload(Self::TAG, self.payload_len() + 3)?;
        self.services.push(ServiceListEntry {
            service_id,
            service_type,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl DescriptorBody for ServiceListDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.services.len() * 3
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for entry in &self.services {
            writer.write_u16(entry.service_id)?;
            writer.write_u8(entry.service_type.id())?;
        }
        Ok(())
    }
}

/// Stuffing descriptor (tag 0x42).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StuffingDescriptor {
    data: Vec<u8>,
}

impl StuffingDescriptor {
    pub const TAG: u8 = 0x42;

    pub fn new(data: Vec<u8>) -> SiResult<Self> {
        check_payload(Self::TAG, data.len())?;
        Ok(Self { data })
    }

    /// Creates a stuffing descriptor of `length` repetitions of `byte`.
    pub fn filled(length: usize, byte: u8) -> SiResult<Self> {
        Self::new(vec![byte; length])
    }
}

impl DescriptorBody for StuffingDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.data.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_bytes(&self.data)
    }
}

/// Service descriptor (tag 0x48).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ServiceDescriptor {
    service_type: ServiceType,
    provider_name: String,
    service_name: String,
}

impl ServiceDescriptor {
    pub const TAG: u8 = 0x48;

    pub fn new(service_type: ServiceType, provider_name: &str, service_name: &str) -> SiResult<Self> {
        let descriptor = Self {
            service_type,
            provider_name: text8("service_provider_name", provider_name)?,
            service_name: text8("service_name", service_name)?,
        };
        check_payload(Self::TAG, descriptor.payload_len())?;
        Ok(descriptor)
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl DescriptorBody for ServiceDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        3 + self.provider_name.len() + self.service_name.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u8(self.service_type.id())?;
        writer.write_string8("service_provider_name", self.provider_name.as_bytes())?;
        writer.write_string8("service_name", self.service_name.as_bytes())
    }
}

/// Country availability descriptor (tag 0x49).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CountryAvailabilityDescriptor {
    available: bool,
    countries: Vec<[u8; 3]>,
}

impl CountryAvailabilityDescriptor {
    pub const TAG: u8 = 0x49;

    pub fn new(available: bool) -> Self {
        Self {
            available,
            countries: Vec::new(),
        }
    }

    pub fn add_country(&mut self, country_code: &str) -> SiResult<()> {
        let code = code3("country_code", country_code)?;
        check_payload(Self::TAG, self.payload_len() + 3)?;
        self.countries.push(code);
        Ok(())
    }
}

impl DescriptorBody for CountryAvailabilityDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1 + self.countries.len() * 3
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_flag(self.available)?;
        writer.write_reserved(7)?;
        for code in &self.countries {
            writer.write_bytes(code)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct NvodEntry {
    transport_stream_id: u16,
    original_network_id: u16,
    service_id: u16,
}

/// NVOD reference descriptor (tag 0x4B).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NvodReferenceDescriptor {
    entries: Vec<NvodEntry>,
}

impl NvodReferenceDescriptor {
    pub const TAG: u8 = 0x4B;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_service(
        &mut self,
        transport_stream_id: u16,
        original_network_id: u16,
        service_id: u16,
    ) -> SiResult<()> {
        check_payload(Self::TAG, self.payload_len() + 6)?;
        self.entries.push(NvodEntry {
            transport_stream_id,
            original_network_id,
            service_id,
        });
        Ok(())
    }
}

impl DescriptorBody for NvodReferenceDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.entries.len() * 6
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for entry in &self.entries {
            writer.write_u16(entry.transport_stream_id)?;
            writer.write_u16(entry.original_network_id)?;
            writer.write_u16(entry.service_id)?;
        }
        Ok(())
    }
}

/// Time shifted service descriptor (tag 0x4C).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimeShiftedServiceDescriptor {
    reference_service_id: u16,
}

impl TimeShiftedServiceDescriptor {
    pub const TAG: u8 = 0x4C;

    pub fn new(reference_service_id: u16) -> Self {
        Self {
            reference_service_id,
        }
    }
}

impl DescriptorBody for TimeShiftedServiceDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        2
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.reference_service_id)
    }
}

/// CA identifier descriptor (tag 0x53).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CaIdentifierDescriptor {
    ca_system_ids: Vec<u16>,
}

impl CaIdentifierDescriptor {
    pub const TAG: u8 = 0x53;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ca_system_id(&mut self, ca_system_id: u16) -> SiResult<()> {
        check_payload(Self::TAG, self.payload_len() + 2)?;
        self.ca_system_ids.push(ca_system_id);
        Ok(())
    }
}

impl DescriptorBody for CaIdentifierDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.ca_system_ids.len() * 2
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for id in &self.ca_system_ids {
            writer.write_u16(*id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct LocalizedName {
    language: [u8; 3],
    name: String,
}

/// Multilingual network name (tag 0x5B) or bouquet name (tag 0x5C) descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MultilingualNameDescriptor {
    tag: u8,
    names: Vec<LocalizedName>,
}

impl MultilingualNameDescriptor {
    pub const NETWORK_TAG: u8 = 0x5B;
    pub const BOUQUET_TAG: u8 = 0x5C;

    /// Multilingual network name descriptor.
    pub fn network() -> Self {
        Self {
            tag: Self::NETWORK_TAG,
            names: Vec::new(),
        }
    }

    /// Multilingual bouquet name descriptor.
    pub fn bouquet() -> Self {
        Self {
            tag: Self::BOUQUET_TAG,
            names: Vec::new(),
        }
    }

    pub fn add_name(&mut self, language: &str, name: &str) -> SiResult<()> {
        let language = code3("iso_639_language_code", language)?;
        let name = text8("name", name)?;
        check_payload(self.tag, self.payload_len() + 4 + name.len())?;
        self.names.push(LocalizedName { language, name });
        Ok(())
    }
}

impl DescriptorBody for MultilingualNameDescriptor {
    fn tag(&self) -> u8 {
        self.tag
    }

    fn payload_len(&self) -> usize {
        self.names.iter().map(|n| 4 + n.name.len()).sum()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for entry in &self.names {
            writer.write_bytes(&entry.language)?;
            writer.write_string8("name", entry.name.as_bytes())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct LocalizedServiceName {
    language: [u8; 3],
    provider_name: String,
    service_name: String,
}

/// Multilingual service name descriptor (tag 0x5D).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MultilingualServiceNameDescriptor {
    names: Vec<LocalizedServiceName>,
}

impl MultilingualServiceNameDescriptor {
    pub const TAG: u8 = 0x5D;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_name(&mut self, language: &str, provider_name: &str, service_name: &str) -> SiResult<()> {
        let entry = LocalizedServiceName {
            language: code3("iso_639_language_code", language)?,
            provider_name: text8("service_provider_name", provider_name)?,
            service_name: text8("service_name", service_name)?,
        };
        check_payload(
            Self::TAG,
            self.payload_len() + 5 + entry.provider_name.len() + entry.service_name.len(),
        )?;
        self.names.push(entry);
        Ok(())
    }
}

impl DescriptorBody for MultilingualServiceNameDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.names
            .iter()
            .map(|n| 5 + n.provider_name.len() + n.service_name.len())
            .sum()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for entry in &self.names {
            writer.write_bytes(&entry.language)?;
            writer.write_string8("service_provider_name", entry.provider_name.as_bytes())?;
            writer.write_string8("service_name", entry.service_name.as_bytes())?;
        }
        Ok(())
    }
}

/// Private data specifier descriptor (tag 0x5F).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PrivateDataSpecifierDescriptor {
    private_data_specifier: u32,
}

impl PrivateDataSpecifierDescriptor {
    pub const TAG: u8 = 0x5F;

    pub fn new(private_data_specifier: u32) -> Self {
        Self {
            private_data_specifier,
        }
    }
}

impl DescriptorBody for PrivateDataSpecifierDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        4
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u32(self.private_data_specifier)
    }
}
