//! Event level descriptors (EIT loops) and the local time offset descriptor
//! carried in the TOT.

use super::{DescriptorBody, check_payload, code3, text8};
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult, check_bits};
use crate::time::{UtcTime, to_bcd};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Short event descriptor (tag 0x4D).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ShortEventDescriptor {
    language: [u8; 3],
    event_name: String,
    text: String,
}

impl ShortEventDescriptor {
    pub const TAG: u8 = 0x4D;

    pub fn new(language: &str, event_name: &str, text: &str) -> SiResult<Self> {
        let descriptor = Self {
            language: code3("iso_639_language_code", language)?,
            event_name: text8("event_name", event_name)?,
            text: text8("text", text)?,
        };
        check_payload(Self::TAG, descriptor.payload_len())?;
        Ok(descriptor)
    }
}

impl DescriptorBody for ShortEventDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        5 + self.event_name.len() + self.text.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_bytes(&self.language)?;
        writer.write_string8("event_name", self.event_name.as_bytes())?;
        writer.write_string8("text", self.text.as_bytes())
    }
}

/// Component descriptor (tag 0x50).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ComponentDescriptor {
    stream_content: u8,
    component_type: u8,
    component_tag: u8,
    language: [u8; 3],
    text: String,
}

impl ComponentDescriptor {
    pub const TAG: u8 = 0x50;

    pub fn new(
        stream_content: u8,
        component_type: u8,
        component_tag: u8,
        language: &str,
        text: &str,
    ) -> SiResult<Self> {
        check_bits("stream_content", u64::from(stream_content), 4)?;
        check_payload(Self::TAG, 6 + text.len())?;
        Ok(Self {
            stream_content,
            component_type,
            component_tag,
            language: code3("iso_639_language_code", language)?,
            text: text.to_owned(),
        })
    }
}

impl DescriptorBody for ComponentDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        6 + self.text.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_reserved(4)?;
        writer.write_bits("stream_content", u64::from(self.stream_content), 4)?;
        writer.write_u8(self.component_type)?;
        writer.write_u8(self.component_tag)?;
        writer.write_bytes(&self.language)?;
        writer.write_bytes(self.text.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct ContentNibbles {
    level_1: u8,
    level_2: u8,
    user_byte: u8,
}

/// Content descriptor (tag 0x54).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ContentDescriptor {
    entries: Vec<ContentNibbles>,
}

impl ContentDescriptor {
    pub const TAG: u8 = 0x54;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_content(&mut self, level_1: u8, level_2: u8, user_byte: u8) -> SiResult<()> {
        check_bits("content_nibble_level_1", u64::from(level_1), 4)?;
        check_bits("content_nibble_level_2", u64::from(level_2), 4)?;
        check_payload(Self::TAG, self.payload_len() + 2)?;
        self.entries.push(ContentNibbles {
            level_1,
            level_2,
            user_byte,
        });
        Ok(())
    }
}

impl DescriptorBody for ContentDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.entries.len() * 2
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for entry in &self.entries {
            writer.write_bits("content_nibble_level_1", u64::from(entry.level_1), 4)?;
            writer.write_bits("content_nibble_level_2", u64::from(entry.level_2), 4)?;
            writer.write_u8(entry.user_byte)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct Rating {
    country: [u8; 3],
    rating: u8,
}

/// Parental rating descriptor (tag 0x55).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ParentalRatingDescriptor {
    ratings: Vec<Rating>,
}

impl ParentalRatingDescriptor {
    pub const TAG: u8 = 0x55;

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rating. Values 0x01..=0x0F mean a minimum age of `rating + 3`.
    pub fn add_rating(&mut self, country_code: &str, rating: u8) -> SiResult<()> {
        let country = code3("country_code", country_code)?;
        check_payload(Self::TAG, self.payload_len() + 4)?;
        self.ratings.push(Rating { country, rating });
        Ok(())
    }
}

impl DescriptorBody for ParentalRatingDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.ratings.len() * 4
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for entry in &self.ratings {
            writer.write_bytes(&entry.country)?;
            writer.write_u8(entry.rating)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct TimeOffset {
    country: [u8; 3],
    region_id: u8,
    negative: bool,
    offset_minutes: u16,
    time_of_change: UtcTime,
    next_offset_minutes: u16,
}

/// Local time offset descriptor (tag 0x58).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LocalTimeOffsetDescriptor {
    offsets: Vec<TimeOffset>,
}

const TIME_OFFSET_LEN: usize = 13;

fn check_offset(field: &'static str, minutes: u16) -> SiResult<()> {
    if minutes / 60 > 23 {
        return Err(SiError::invalid(field, format!("{minutes} minutes is not below 24h")));
    }
    Ok(())
}

fn write_offset(writer: &mut ByteWriter, minutes: u16) -> SiResult<()> {
    writer.write_u8(to_bcd("offset_hours", (minutes / 60) as u8)?)?;
    writer.write_u8(to_bcd("offset_minutes", (minutes % 60) as u8)?)
}

impl LocalTimeOffsetDescriptor {
    pub const TAG: u8 = 0x58;

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Offsets are given in minutes; `negative` selects the
    /// `local_time_offset_polarity`.
    pub fn add_offset(
        &mut self,
        country_code: &str,
        region_id: u8,
        negative: bool,
        offset_minutes: u16,
        time_of_change: UtcTime,
        next_offset_minutes: u16,
    ) -> SiResult<()> {
        let country = code3("country_code", country_code)?;
        check_bits("country_region_id", u64::from(region_id), 6)?;
        check_offset("local_time_offset", offset_minutes)?;
        check_offset("next_time_offset", next_offset_minutes)?;
        check_payload(Self::TAG, self.payload_len() + TIME_OFFSET_LEN)?;
        self.offsets.push(TimeOffset {
            country,
            region_id,
            negative,
            offset_minutes,
            time_of_change,
            next_offset_minutes,
        });
        Ok(())
    }
}

impl DescriptorBody for LocalTimeOffsetDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.offsets.len() * TIME_OFFSET_LEN
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for entry in &self.offsets {
            writer.write_bytes(&entry.country)?;
            writer.write_bits("country_region_id", u64::from(entry.region_id), 6)?;
            writer.write_reserved(1)?;
            writer.write_flag(entry.negative)?;
            write_offset(writer, entry.offset_minutes)?;
            entry.time_of_change.encode(writer)?;
            write_offset(writer, entry.next_offset_minutes)?;
        }
        Ok(())
    }
}

/// Extended event descriptor (tag 0x4E).
///
/// Long event texts are carried in a numbered run of up to 16 descriptors;
/// [`ExtendedEventDescriptor::from_long_text`] cuts a text into such a run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ExtendedEventDescriptor {
    descriptor_number: u8,
    last_descriptor_number: u8,
    language: [u8; 3],
    items: Vec<EventItem>,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct EventItem {
    description: String,
    item: String,
}

impl ExtendedEventDescriptor {
    pub const TAG: u8 = 0x4E;

    /// Text bytes left in a descriptor without items.
    pub const MAX_TEXT_LEN: usize = 249;

    pub fn new(descriptor_number: u8, last_descriptor_number: u8, language: &str, text: &str) -> SiResult<Self> {
        check_bits("descriptor_number", u64::from(descriptor_number), 4)?;
        check_bits("last_descriptor_number", u64::from(last_descriptor_number), 4)?;
        let descriptor = Self {
            descriptor_number,
            last_descriptor_number,
            language: code3("iso_639_language_code", language)?,
            items: Vec::new(),
            text: text8("text", text)?,
        };
        check_payload(Self::TAG, descriptor.payload_len())?;
        Ok(descriptor)
    }

    /// Splits `text` over as many descriptors as needed, numbering them
    /// 0..=last. Cuts fall on character boundaries.
    pub fn from_long_text(language: &str, text: &str) -> SiResult<Vec<Self>> {
        let mut chunks = Vec::new();
        let mut rest = text;
        loop {
            let mut end = rest.len().min(Self::MAX_TEXT_LEN);
            while !rest.is_char_boundary(end) {
                end -= 1;
            }
            let (chunk, tail) = rest.split_at(end);
            chunks.push(chunk);
            rest = tail;
            if rest.is_empty() {
                break;
            }
        }
        if chunks.len() > 16 {
            return Err(SiError::invalid(
                "text",
                format!("{} bytes need {} descriptors, at most 16 allowed", text.len(), chunks.len()),
            ));
        }
        let last = (chunks.len() - 1) as u8;
        chunks
            .into_iter()
            .zip(0u8..)
            .map(|(chunk, number)| Self::new(number, last, language, chunk))
            .collect()
    }

    pub fn set_last_descriptor_number(&mut self, last_descriptor_number: u8) -> SiResult<()> {
        check_bits("last_descriptor_number", u64::from(last_descriptor_number), 4)?;
        self.last_descriptor_number = last_descriptor_number;
        Ok(())
    }

    /// Appends an item description / item pair.
    pub fn add_item(&mut self, description: &str, item: &str) -> SiResult<()> {
        let entry = EventItem {
            description: text8("item_description", description)?,
            item: text8("item", item)?,
        };
        check_payload(Self::TAG, self.payload_len() + 2 + description.len() + item.len())?;
        self.items.push(entry);
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn items_len(&self) -> usize {
        self.items
            .iter()
            .map(|entry| 2 + entry.description.len() + entry.item.len())
            .sum()
    }
}

impl DescriptorBody for ExtendedEventDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        6 + self.items_len() + self.text.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_bits("descriptor_number", u64::from(self.descriptor_number), 4)?;
        writer.write_bits("last_descriptor_number", u64::from(self.last_descriptor_number), 4)?;
        writer.write_bytes(&self.language)?;
        writer.write_bits("length_of_items", self.items_len() as u64, 8)?;
        for entry in &self.items {
            writer.write_string8("item_description", entry.description.as_bytes())?;
            writer.write_string8("item", entry.item.as_bytes())?;
        }
        writer.write_string8("text", self.text.as_bytes())
    }
}

/// Time shifted event descriptor (tag 0x4F).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimeShiftedEventDescriptor {
    reference_service_id: u16,
    reference_event_id: u16,
}

impl TimeShiftedEventDescriptor {
    pub const TAG: u8 = 0x4F;

    pub fn new(reference_service_id: u16, reference_event_id: u16) -> Self {
        Self {
            reference_service_id,
            reference_event_id,
        }
    }
}

impl DescriptorBody for TimeShiftedEventDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        4
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.reference_service_id)?;
        writer.write_u16(self.reference_event_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct ComponentText {
    language: [u8; 3],
    text: String,
}

/// Multilingual component descriptor (tag 0x5E).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MultilingualComponentDescriptor {
    component_tag: u8,
    texts: Vec<ComponentText>,
}

impl MultilingualComponentDescriptor {
    pub const TAG: u8 = 0x5E;

    pub fn new(component_tag: u8) -> Self {
        Self {
            component_tag,
            texts: Vec::new(),
        }
    }

    pub fn add_text(&mut self, language: &str, text: &str) -> SiResult<()> {
        let entry = ComponentText {
            language: code3("iso_639_language_code", language)?,
            text: text8("text_description", text)?,
        };
        check_payload(Self::TAG, self.payload_len() + 4 + entry.text.len())?;
        self.texts.push(entry);
        Ok(())
    }
}

impl DescriptorBody for MultilingualComponentDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1 + self.texts.iter().map(|t| 4 + t.text.len()).sum::<usize>()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u8(self.component_tag)?;
        for entry in &self.texts {
            writer.write_bytes(&entry.language)?;
            writer.write_string8("text_description", entry.text.as_bytes())?;
        }
        Ok(())
    }
}

/// Short smoothing buffer descriptor (tag 0x61).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ShortSmoothingBufferDescriptor {
    sb_size: u8,
    sb_leak_rate: u8,
    dvb_reserved: Vec<u8>,
}

impl ShortSmoothingBufferDescriptor {
    pub const TAG: u8 = 0x61;

    pub fn new(sb_size: u8, sb_leak_rate: u8, dvb_reserved: Vec<u8>) -> SiResult<Self> {
        check_bits("sb_size", u64::from(sb_size), 2)?;
        check_bits("sb_leak_rate", u64::from(sb_leak_rate), 6)?;
        check_payload(Self::TAG, 1 + dvb_reserved.len())?;
        Ok(Self {
            sb_size,
            sb_leak_rate,
            dvb_reserved,
        })
    }
}

impl DescriptorBody for ShortSmoothingBufferDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1 + self.dvb_reserved.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_bits("sb_size", u64::from(self.sb_size), 2)?;
        writer.write_bits("sb_leak_rate", u64::from(self.sb_leak_rate), 6)?;
        writer.write_bytes(&self.dvb_reserved)
    }
}

/// PDC descriptor (tag 0x69).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PdcDescriptor {
    programme_identification_label: u32,
}

impl PdcDescriptor {
    pub const TAG: u8 = 0x69;

    /// Takes the raw 20-bit programme identification label.
    pub fn new(programme_identification_label: u32) -> SiResult<Self> {
        check_bits(
            "programme_identification_label",
            u64::from(programme_identification_label),
            20,
        )?;
        Ok(Self {
            programme_identification_label,
        })
    }

    /// Builds the label from its day (5 bits), month (4 bits), hour (5 bits)
    /// and minute (6 bits) parts.
    pub fn from_parts(day: u8, month: u8, hour: u8, minute: u8) -> SiResult<Self> {
        check_bits("day", u64::from(day), 5)?;
        check_bits("month", u64::from(month), 4)?;
        check_bits("hour", u64::from(hour), 5)?;
        check_bits("minute", u64::from(minute), 6)?;
        Self::new(
            (u32::from(day) << 15) | (u32::from(month) << 11) | (u32::from(hour) << 6) | u32::from(minute),
        )
    }
}

impl DescriptorBody for PdcDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        3
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_reserved(4)?;
        writer.write_bits(
            "programme_identification_label",
            u64::from(self.programme_identification_label),
            20,
        )
    }
}
