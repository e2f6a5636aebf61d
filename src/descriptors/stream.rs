//! Elementary stream descriptors carried in the PMT ES loop.

use super::{DescriptorBody, check_payload, code3};
use crate::encoding::ByteWriter;
use crate::error::{SiResult, check_bits};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Stream identifier descriptor (tag 0x52).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StreamIdentifierDescriptor {
    component_tag: u8,
}

impl StreamIdentifierDescriptor {
    pub const TAG: u8 = 0x52;

    pub fn new(component_tag: u8) -> Self {
        Self { component_tag }
    }
}

impl DescriptorBody for StreamIdentifierDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u8(self.component_tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct TeletextPage {
    language: [u8; 3],
    teletext_type: u8,
    magazine_number: u8,
    page_number: u8,
}

/// Teletext descriptor (tag 0x56).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TeletextDescriptor {
    pages: Vec<TeletextPage>,
}

impl TeletextDescriptor {
    pub const TAG: u8 = 0x56;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_teletext(
        &mut self,
        language: &str,
        teletext_type: u8,
        magazine_number: u8,
        page_number: u8,
    ) -> SiResult<()> {
        let language = code3("iso_639_language_code", language)?;
        check_bits("teletext_type", u64::from(teletext_type), 5)?;
        check_bits("teletext_magazine_number", u64::from(magazine_number), 3)?;
        check_payload(Self::TAG, self.payload_len() + 5)?;
        self.pages.push(TeletextPage {
            language,
            teletext_type,
            magazine_number,
            page_number,
        });
        Ok(())
    }
}

impl DescriptorBody for TeletextDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.pages.len() * 5
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for page in &self.pages {
            writer.write_bytes(&page.language)?;
            writer.write_bits("teletext_type", u64::from(page.teletext_type), 5)?;
            writer.write_bits("teletext_magazine_number", u64::from(page.magazine_number), 3)?;
            writer.write_u8(page.page_number)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct Subtitle {
    language: [u8; 3],
    subtitling_type: u8,
    composition_page_id: u16,
    ancillary_page_id: u16,
}

/// Subtitling descriptor (tag 0x59).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SubtitlingDescriptor {
    subtitles: Vec<Subtitle>,
}

impl SubtitlingDescriptor {
    pub const TAG: u8 = 0x59;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_subtitling(
        &mut self,
        language: &str,
        subtitling_type: u8,
        composition_page_id: u16,
        ancillary_page_id: u16,
    ) -> SiResult<()> {
        let language = code3("iso_639_language_code", language)?;
        check_payload(Self::TAG, self.payload_len() + 8)?;
        self.subtitles.push(Subtitle {
            language,
            subtitling_type,
            composition_page_id,
            ancillary_page_id,
        });
        Ok(())
    }
}

impl DescriptorBody for SubtitlingDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.subtitles.len() * 8
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for subtitle in &self.subtitles {
            writer.write_bytes(&subtitle.language)?;
            writer.write_u8(subtitle.subtitling_type)?;
            writer.write_u16(subtitle.composition_page_id)?;
            writer.write_u16(subtitle.ancillary_page_id)?;
        }
        Ok(())
    }
}

/// AC-3 descriptor (tag 0x6A).
///
/// Each optional field sets its flag in the leading byte when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Ac3Descriptor {
    component_type: Option<u8>,
    bsid: Option<u8>,
    mainid: Option<u8>,
    asvc: Option<u8>,
    additional_info: Vec<u8>,
}

impl Ac3Descriptor {
    pub const TAG: u8 = 0x6A;

    pub fn new() -> Self {
        Self::default()
    }

    fn fixed_len(&self) -> usize {
        1 + [self.component_type, self.bsid, self.mainid, self.asvc]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }

    fn set_field(&mut self, select: fn(&mut Self) -> &mut Option<u8>, value: u8) -> SiResult<()> {
        let added = usize::from(select(self).is_none());
        check_payload(Self::TAG, self.payload_len() + added)?;
        *select(self) = Some(value);
        Ok(())
    }

    pub fn set_component_type(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.component_type, value)
    }

    pub fn set_bsid(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.bsid, value)
    }

    pub fn set_mainid(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.mainid, value)
    }

    pub fn set_asvc(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.asvc, value)
    }

    pub fn set_additional_info(&mut self, info: Vec<u8>) -> SiResult<()> {
        check_payload(Self::TAG, self.fixed_len() + info.len())?;
        self.additional_info = info;
        Ok(())
    }
}

impl DescriptorBody for Ac3Descriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.fixed_len() + self.additional_info.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        let values = [self.component_type, self.bsid, self.mainid, self.asvc];
        for value in &values {
            writer.write_flag(value.is_some())?;
        }
        writer.write_reserved(4)?;
        for value in values.iter().flatten() {
            writer.write_u8(*value)?;
        }
        writer.write_bytes(&self.additional_info)
    }
}

/// Enhanced AC-3 descriptor (tag 0x7A).
///
/// Unlike the other optional fields, `mixinfoexists` is a bare flag with no
/// value byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EnhancedAc3Descriptor {
    component_type: Option<u8>,
    bsid: Option<u8>,
    mainid: Option<u8>,
    asvc: Option<u8>,
    mix_info_exists: bool,
    substream1: Option<u8>,
    substream2: Option<u8>,
    substream3: Option<u8>,
    additional_info: Vec<u8>,
}

impl EnhancedAc3Descriptor {
    pub const TAG: u8 = 0x7A;

    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> [Option<u8>; 7] {
        [
            self.component_type,
            self.bsid,
            self.mainid,
            self.asvc,
            self.substream1,
            self.substream2,
            self.substream3,
        ]
    }

    fn fixed_len(&self) -> usize {
        1 + self.values().iter().filter(|v| v.is_some()).count()
    }

    fn set_field(&mut self, select: fn(&mut Self) -> &mut Option<u8>, value: u8) -> SiResult<()> {
        let added = usize::from(select(self).is_none());
        check_payload(Self::TAG, self.payload_len() + added)?;
        *select(self) = Some(value);
        Ok(())
    }

    pub fn set_component_type(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.component_type, value)
    }

    pub fn set_bsid(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.bsid, value)
    }

    pub fn set_mainid(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.mainid, value)
    }

    pub fn set_asvc(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.asvc, value)
    }

    pub fn set_mix_info_exists(&mut self, exists: bool) -> SiResult<()> {
        self.mix_info_exists = exists;
        Ok(())
    }

    pub fn set_substream1(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.substream1, value)
    }

    pub fn set_substream2(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.substream2, value)
    }

    pub fn set_substream3(&mut self, value: u8) -> SiResult<()> {
        self.set_field(|d| &mut d.substream3, value)
    }

    pub fn set_additional_info(&mut self, info: Vec<u8>) -> SiResult<()> {
        check_payload(Self::TAG, self.fixed_len() + info.len())?;
        self.additional_info = info;
        Ok(())
    }
}

impl DescriptorBody for EnhancedAc3Descriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.fixed_len() + self.additional_info.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_flag(self.component_type.is_some())?;
        writer.write_flag(self.bsid.is_some())?;
        writer.write_flag(self.mainid.is_some())?;
        writer.write_flag(self.asvc.is_some())?;
        writer.write_flag(self.mix_info_exists)?;
        writer.write_flag(self.substream1.is_some())?;
        writer.write_flag(self.substream2.is_some())?;
        writer.write_flag(self.substream3.is_some())?;
        for value in self.values().iter().flatten() {
            writer.write_u8(*value)?;
        }
        writer.write_bytes(&self.additional_info)
    }
}

/// Ancillary data descriptor (tag 0x6B).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AncillaryDataDescriptor {
    ancillary_data_identifier: u8,
}

impl AncillaryDataDescriptor {
    pub const TAG: u8 = 0x6B;

    pub fn new(ancillary_data_identifier: u8) -> Self {
        Self {
            ancillary_data_identifier,
        }
    }
}

impl DescriptorBody for AncillaryDataDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u8(self.ancillary_data_identifier)
    }
}
