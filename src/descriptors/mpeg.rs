//! Descriptors defined by ISO/IEC 13818-1, used mostly in the PMT and CAT.

use super::{DescriptorBody, check_payload, code3};
use crate::encoding::ByteWriter;
use crate::error::{SiError, SiResult, check_bits};
use crate::types::HierarchyType;

#[cfg(feature = "serde")]
use serde::Serialize;

/// MPEG-2 specific part of the video stream descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Mpeg2VideoFields {
    pub profile_and_level_indication: u8,
    pub chroma_format: u8,
    pub frame_rate_extension: bool,
}

/// Video stream descriptor (tag 0x02).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VideoStreamDescriptor {
    multiple_frame_rate: bool,
    frame_rate_code: u8,
    constrained_parameter: bool,
    still_picture: bool,
    /// `None` when the stream is MPEG-1 only.
    mpeg2: Option<Mpeg2VideoFields>,
}

impl VideoStreamDescriptor {
    pub const TAG: u8 = 0x02;

    /// Creates the descriptor. Unless `mpeg1_only` is set, the MPEG-2 fields
    /// default to profile/level 0, 4:2:0 chroma and no frame rate extension.
    pub fn new(
        multiple_frame_rate: bool,
        frame_rate_code: u8,
        mpeg1_only: bool,
        constrained_parameter: bool,
        still_picture: bool,
    ) -> SiResult<Self> {
        check_bits("frame_rate_code", u64::from(frame_rate_code), 4)?;
        let mpeg2 = (!mpeg1_only).then_some(Mpeg2VideoFields {
            profile_and_level_indication: 0,
            chroma_format: 1,
            frame_rate_extension: false,
        });
        Ok(Self {
            multiple_frame_rate,
            frame_rate_code,
            constrained_parameter,
            still_picture,
            mpeg2,
        })
    }

    /// Sets the MPEG-2 fields. Fails on an MPEG-1 only descriptor.
    pub fn set_mpeg2_fields(&mut self, fields: Mpeg2VideoFields) -> SiResult<()> {
        check_bits("chroma_format", u64::from(fields.chroma_format), 2)?;
        match self.mpeg2.as_mut() {
            Some(current) => {
                *current = fields;
                Ok(())
            }
            None => Err(SiError::invalid("mpeg2", "descriptor is MPEG-1 only")),
        }
    }
}

impl DescriptorBody for VideoStreamDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        if self.mpeg2.is_some() { 3 } else { 1 }
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_flag(self.multiple_frame_rate)?;
        writer.write_bits("frame_rate_code", u64::from(self.frame_rate_code), 4)?;
        writer.write_flag(self.mpeg2.is_none())?;
        writer.write_flag(self.constrained_parameter)?;
        writer.write_flag(self.still_picture)?;
        if let Some(mpeg2) = &self.mpeg2 {
            writer.write_u8(mpeg2.profile_and_level_indication)?;
            writer.write_bits("chroma_format", u64::from(mpeg2.chroma_format), 2)?;
            writer.write_flag(mpeg2.frame_rate_extension)?;
            writer.write_reserved(5)?;
        }
        Ok(())
    }
}

/// Audio stream descriptor (tag 0x03).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AudioStreamDescriptor {
    free_format: bool,
    id: bool,
    layer: u8,
    variable_rate_audio: bool,
}

impl AudioStreamDescriptor {
    pub const TAG: u8 = 0x03;

    pub fn new(free_format: bool, id: bool, layer: u8, variable_rate_audio: bool) -> SiResult<Self> {
        check_bits("layer", u64::from(layer), 2)?;
        Ok(Self {
            free_format,
            id,
            layer,
            variable_rate_audio,
        })
    }
}

impl DescriptorBody for AudioStreamDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_flag(self.free_format)?;
        writer.write_flag(self.id)?;
        writer.write_bits("layer", u64::from(self.layer), 2)?;
        writer.write_flag(self.variable_rate_audio)?;
        writer.write_reserved(3)
    }
}

/// Registration descriptor (tag 0x05).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RegistrationDescriptor {
    format_identifier: u32,
    additional_identification_info: Vec<u8>,
}

impl RegistrationDescriptor {
    pub const TAG: u8 = 0x05;

    pub fn new(format_identifier: u32, additional_identification_info: Vec<u8>) -> SiResult<Self> {
        check_payload(Self::TAG, 4 + additional_identification_info.len())?;
        Ok(Self {
            format_identifier,
            additional_identification_info,
        })
    }
}

impl DescriptorBody for RegistrationDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        4 + self.additional_identification_info.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u32(self.format_identifier)?;
        writer.write_bytes(&self.additional_identification_info)
    }
}

/// Data stream alignment descriptor (tag 0x06).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DataStreamAlignmentDescriptor {
    alignment_type: u8,
}

impl DataStreamAlignmentDescriptor {
    pub const TAG: u8 = 0x06;

    pub fn new(alignment_type: u8) -> Self {
        Self { alignment_type }
    }
}

impl DescriptorBody for DataStreamAlignmentDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u8(self.alignment_type)
    }
}

/// Conditional access descriptor (tag 0x09), carried in the CAT and PMT.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CaDescriptor {
    ca_system_id: u16,
    ca_pid: u16,
    private_data: Vec<u8>,
}

impl CaDescriptor {
    pub const TAG: u8 = 0x09;

    pub fn new(ca_system_id: u16, ca_pid: u16, private_data: Vec<u8>) -> SiResult<Self> {
        check_bits("ca_pid", u64::from(ca_pid), 13)?;
        check_payload(Self::TAG, 4 + private_data.len())?;
        Ok(Self {
            ca_system_id,
            ca_pid,
            private_data,
        })
    }

    pub fn set_private_data(&mut self, data: Vec<u8>) -> SiResult<()> {
        check_payload(Self::TAG, 4 + data.len())?;
        self.private_data = data;
        Ok(())
    }
}

impl DescriptorBody for CaDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        4 + self.private_data.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.ca_system_id)?;
        writer.write_reserved(3)?;
        writer.write_bits("ca_pid", u64::from(self.ca_pid), 13)?;
        writer.write_bytes(&self.private_data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct LanguageEntry {
    code: [u8; 3],
    audio_type: u8,
}

/// ISO 639 language descriptor (tag 0x0A).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Iso639LanguageDescriptor {
    languages: Vec<LanguageEntry>,
}

impl Iso639LanguageDescriptor {
    pub const TAG: u8 = 0x0A;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_language(&mut self, code: &str, audio_type: u8) -> SiResult<()> {
        let code = code3("iso_639_language_code", code)?;
        check_payload(Self::TAG, self.payload_len() + 4)?;
        self.languages.push(LanguageEntry { code, audio_type });
        Ok(())
    }
}

impl DescriptorBody for Iso639LanguageDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.languages.len() * 4
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for entry in &self.languages {
            writer.write_bytes(&entry.code)?;
            writer.write_u8(entry.audio_type)?;
        }
        Ok(())
    }
}

/// System clock descriptor (tag 0x0B).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SystemClockDescriptor {
    external_clock_reference: bool,
    clock_accuracy_integer: u8,
    clock_accuracy_exponent: u8,
}

impl SystemClockDescriptor {
    pub const TAG: u8 = 0x0B;

    pub fn new(
        external_clock_reference: bool,
        clock_accuracy_integer: u8,
        clock_accuracy_exponent: u8,
    ) -> SiResult<Self> {
        check_bits("clock_accuracy_integer", u64::from(clock_accuracy_integer), 6)?;
        check_bits("clock_accuracy_exponent", u64::from(clock_accuracy_exponent), 3)?;
        Ok(Self {
            external_clock_reference,
            clock_accuracy_integer,
            clock_accuracy_exponent,
        })
    }
}

impl DescriptorBody for SystemClockDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        2
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_flag(self.external_clock_reference)?;
        writer.write_reserved(1)?;
        writer.write_bits("clock_accuracy_integer", u64::from(self.clock_accuracy_integer), 6)?;
        writer.write_bits("clock_accuracy_exponent", u64::from(self.clock_accuracy_exponent), 3)?;
        writer.write_reserved(5)
    }
}

/// Maximum bitrate descriptor (tag 0x0E), in units of 50 bytes/second.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MaximumBitrateDescriptor {
    maximum_bitrate: u32,
}

impl MaximumBitrateDescriptor {
    pub const TAG: u8 = 0x0E;

    pub fn new(maximum_bitrate: u32) -> SiResult<Self> {
        check_bits("maximum_bitrate", u64::from(maximum_bitrate), 22)?;
        Ok(Self { maximum_bitrate })
    }
}

impl DescriptorBody for MaximumBitrateDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        3
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_reserved(2)?;
        writer.write_bits("maximum_bitrate", u64::from(self.maximum_bitrate), 22)
    }
}

/// Smoothing buffer descriptor (tag 0x10).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SmoothingBufferDescriptor {
    sb_leak_rate: u32,
    sb_size: u32,
}

impl SmoothingBufferDescriptor {
    pub const TAG: u8 = 0x10;

    pub fn new(sb_leak_rate: u32, sb_size: u32) -> SiResult<Self> {
        check_bits("sb_leak_rate", u64::from(sb_leak_rate), 22)?;
        check_bits("sb_size", u64::from(sb_size), 22)?;
        Ok(Self {
            sb_leak_rate,
            sb_size,
        })
    }
}

impl DescriptorBody for SmoothingBufferDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        6
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_reserved(2)?;
        writer.write_bits("sb_leak_rate", u64::from(self.sb_leak_rate), 22)?;
        writer.write_reserved(2)?;
        writer.write_bits("sb_size", u64::from(self.sb_size), 22)
    }
}

/// STD descriptor (tag 0x11).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StdDescriptor {
    leak_valid: bool,
}

impl StdDescriptor {
    pub const TAG: u8 = 0x11;

    pub fn new(leak_valid: bool) -> Self {
        Self { leak_valid }
    }
}

impl DescriptorBody for StdDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_reserved(7)?;
        writer.write_flag(self.leak_valid)
    }
}

/// Hierarchy descriptor (tag 0x04).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HierarchyDescriptor {
    hierarchy_type: HierarchyType,
    layer_index: u8,
    embedded_layer_index: u8,
    channel: u8,
}

impl HierarchyDescriptor {
    pub const TAG: u8 = 0x04;

    /// Layer indices and the channel are 6-bit values.
    pub fn new(hierarchy_type: HierarchyType, layer_index: u8, embedded_layer_index: u8, channel: u8) -> SiResult<Self> {
        check_bits("hierarchy_layer_index", u64::from(layer_index), 6)?;
        check_bits("hierarchy_embedded_layer_index", u64::from(embedded_layer_index), 6)?;
        check_bits("hierarchy_channel", u64::from(channel), 6)?;
        Ok(Self {
            hierarchy_type,
            layer_index,
            embedded_layer_index,
            channel,
        })
    }
}

impl DescriptorBody for HierarchyDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        4
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_reserved(4)?;
        writer.write_bits("hierarchy_type", u64::from(self.hierarchy_type.id()), 4)?;
        writer.write_reserved(2)?;
        writer.write_bits("hierarchy_layer_index", u64::from(self.layer_index), 6)?;
        writer.write_reserved(2)?;
        writer.write_bits("hierarchy_embedded_layer_index", u64::from(self.embedded_layer_index), 6)?;
        writer.write_reserved(2)?;
        writer.write_bits("hierarchy_channel", u64::from(self.channel), 6)
    }
}

/// Target background grid (tag 0x07) and video window (tag 0x08)
/// descriptors share one layout: two 14-bit values and a 4-bit value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DisplayGeometryDescriptor {
    tag: u8,
    horizontal: u16,
    vertical: u16,
    low_nibble: u8,
}

impl DisplayGeometryDescriptor {
    pub const TARGET_BACKGROUND_GRID_TAG: u8 = 0x07;
    pub const VIDEO_WINDOW_TAG: u8 = 0x08;

    fn checked(tag: u8, horizontal: u16, vertical: u16, low_nibble: u8, names: [&'static str; 3]) -> SiResult<Self> {
        check_bits(names[0], u64::from(horizontal), 14)?;
        check_bits(names[1], u64::from(vertical), 14)?;
        check_bits(names[2], u64::from(low_nibble), 4)?;
        Ok(Self {
            tag,
            horizontal,
            vertical,
            low_nibble,
        })
    }

    /// Target background grid descriptor.
    pub fn target_background_grid(horizontal_size: u16, vertical_size: u16, aspect_ratio_information: u8) -> SiResult<Self> {
        Self::checked(
            Self::TARGET_BACKGROUND_GRID_TAG,
            horizontal_size,
            vertical_size,
            aspect_ratio_information,
            ["horizontal_size", "vertical_size", "aspect_ratio_information"],
        )
    }

    /// Video window descriptor.
    pub fn video_window(horizontal_offset: u16, vertical_offset: u16, window_priority: u8) -> SiResult<Self> {
        Self::checked(
            Self::VIDEO_WINDOW_TAG,
            horizontal_offset,
            vertical_offset,
            window_priority,
            ["horizontal_offset", "vertical_offset", "window_priority"],
        )
    }
}

impl DescriptorBody for DisplayGeometryDescriptor {
    fn tag(&self) -> u8 {
        self.tag
    }

    fn payload_len(&self) -> usize {
        4
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_bits("horizontal", u64::from(self.horizontal), 14)?;
        writer.write_bits("vertical", u64::from(self.vertical), 14)?;
        writer.write_bits("low_nibble", u64::from(self.low_nibble), 4)
    }
}

/// Multiplex buffer utilization descriptor (tag 0x0C).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MultiplexBufferUtilizationDescriptor {
    /// LTW offset lower and upper bound, 15 bits each.
    bounds: Option<(u16, u16)>,
}

impl MultiplexBufferUtilizationDescriptor {
    pub const TAG: u8 = 0x0C;

    /// A descriptor with bound_valid_flag cleared.
    pub fn unbounded() -> Self {
        Self { bounds: None }
    }

    pub fn new(ltw_offset_lower_bound: u16, ltw_offset_upper_bound: u16) -> SiResult<Self> {
        check_bits("LTW_offset_lower_bound", u64::from(ltw_offset_lower_bound), 15)?;
        check_bits("LTW_offset_upper_bound", u64::from(ltw_offset_upper_bound), 15)?;
        Ok(Self {
            bounds: Some((ltw_offset_lower_bound, ltw_offset_upper_bound)),
        })
    }
}

impl DescriptorBody for MultiplexBufferUtilizationDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        4
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        let (lower, upper) = self.bounds.unwrap_or((0, 0));
        writer.write_flag(self.bounds.is_some())?;
        writer.write_bits("LTW_offset_lower_bound", u64::from(lower), 15)?;
        writer.write_reserved(1)?;
        writer.write_bits("LTW_offset_upper_bound", u64::from(upper), 15)
    }
}

/// Copyright descriptor (tag 0x0D).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CopyrightDescriptor {
    copyright_identifier: u32,
    additional_info: Vec<u8>,
}

impl CopyrightDescriptor {
    pub const TAG: u8 = 0x0D;

    pub fn new(copyright_identifier: u32, additional_info: Vec<u8>) -> SiResult<Self> {
        check_payload(Self::TAG, 4 + additional_info.len())?;
        Ok(Self {
            copyright_identifier,
            additional_info,
        })
    }
}

impl DescriptorBody for CopyrightDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        4 + self.additional_info.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u32(self.copyright_identifier)?;
        writer.write_bytes(&self.additional_info)
    }
}

/// Private data indicator descriptor (tag 0x0F).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PrivateDataIndicatorDescriptor {
    private_data_indicator: u32,
}

impl PrivateDataIndicatorDescriptor {
    pub const TAG: u8 = 0x0F;

    pub fn new(private_data_indicator: u32) -> Self {
        Self { private_data_indicator }
    }
}

impl DescriptorBody for PrivateDataIndicatorDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        4
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u32(self.private_data_indicator)
    }
}

/// IBP descriptor (tag 0x12).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct IbpDescriptor {
    closed_gop: bool,
    identical_gop: bool,
    max_gop_length: u16,
}

impl IbpDescriptor {
    pub const TAG: u8 = 0x12;

    pub fn new(closed_gop: bool, identical_gop: bool, max_gop_length: u16) -> SiResult<Self> {
        check_bits("max_gop_length", u64::from(max_gop_length), 14)?;
        Ok(Self {
            closed_gop,
            identical_gop,
            max_gop_length,
        })
    }
}

impl DescriptorBody for IbpDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        2
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_flag(self.closed_gop)?;
        writer.write_flag(self.identical_gop)?;
        writer.write_bits("max_gop_length", u64::from(self.max_gop_length), 14)
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
    fn test_video_stream() {
        let mpeg1 = VideoStreamDescriptor::new(true, 3, true, false, true).unwrap();
        // 1 0011 1 0 1
        assert_eq!(encode(mpeg1), vec![0x02, 0x01, 0b1001_1101]);

        let mut mpeg2 = VideoStreamDescriptor::new(false, 4, false, false, false).unwrap();
        mpeg2
            .set_mpeg2_fields(Mpeg2VideoFields {
                profile_and_level_indication: 0x48,
                chroma_format: 1,
                frame_rate_extension: false,
            })
            .unwrap();
        assert_eq!(encode(mpeg2), vec![0x02, 0x03, 0x20, 0x48, 0x5F]);

        assert!(VideoStreamDescriptor::new(false, 16, true, false, false).is_err());
    }

    #[test]
    fn test_mpeg1_only_rejects_mpeg2_fields() {
        let mut mpeg1 = VideoStreamDescriptor::new(false, 3, true, false, false).unwrap();
        let fields = Mpeg2VideoFields {
            profile_and_level_indication: 0x48,
            chroma_format: 1,
            frame_rate_extension: false,
        };
        assert!(mpeg1.set_mpeg2_fields(fields).is_err());
    }

    #[test]
    fn test_ca_descriptor() {
        let ca = CaDescriptor::new(0x0B00, 0x0100, vec![0xAB]).unwrap();
        assert_eq!(encode(ca), vec![0x09, 0x05, 0x0B, 0x00, 0xE1, 0x00, 0xAB]);
        assert!(CaDescriptor::new(0x0B00, 0x2000, vec![]).is_err());
        assert!(CaDescriptor::new(0x0B00, 0x0100, vec![0; 252]).is_err());
    }

    #[test]
    fn test_iso639_language() {
        let mut languages = Iso639LanguageDescriptor::new();
        languages.add_language("eng", 0).unwrap();
        languages.add_language("fra", 3).unwrap();
        assert_eq!(
            encode(languages),
            vec![0x0A, 0x08, b'e', b'n', b'g', 0x00, b'f', b'r', b'a', 0x03]
        );
    }

    #[test]
    fn test_iso639_language_capacity() {
        let mut languages = Iso639LanguageDescriptor::new();
        for _ in 0..63 {
            languages.add_language("eng", 0).unwrap();
        }
        assert!(matches!(
            languages.add_language("eng", 0),
            Err(SiError::DescriptorTooLong { tag: 0x0A, length: 256 })
        ));
    }

    #[test]
    fn test_system_clock() {
        let clock = SystemClockDescriptor::new(true, 0x05, 0x02).unwrap();
        assert_eq!(encode(clock), vec![0x0B, 0x02, 0b1100_0101, 0b0101_1111]);
        assert!(SystemClockDescriptor::new(false, 64, 0).is_err());
        assert!(SystemClockDescriptor::new(false, 0, 8).is_err());
    }

    #[test]
    fn test_smoothing_buffer_and_std() {
        let sb = SmoothingBufferDescriptor::new(0x3FFFFF, 0x000001).unwrap();
        assert_eq!(encode(sb), vec![0x10, 0x06, 0xFF, 0xFF, 0xFF, 0xC0, 0x00, 0x01]);
        assert!(SmoothingBufferDescriptor::new(0x400000, 0).is_err());

        assert_eq!(encode(StdDescriptor::new(true)), vec![0x11, 0x01, 0xFF]);
        assert_eq!(encode(StdDescriptor::new(false)), vec![0x11, 0x01, 0xFE]);
    }

    #[test]
    fn test_maximum_bitrate() {
        let bitrate = MaximumBitrateDescriptor::new(0x012345).unwrap();
        assert_eq!(encode(bitrate), vec![0x0E, 0x03, 0xC1, 0x23, 0x45]);
    }

    #[test]
    fn test_hierarchy() {
        let hierarchy = HierarchyDescriptor::new(HierarchyType::SpatialScalability, 1, 2, 3).unwrap();
        assert_eq!(encode(hierarchy), vec![0x04, 0x04, 0xF1, 0xC1, 0xC2, 0xC3]);
        assert!(HierarchyDescriptor::new(HierarchyType::BaseLayer, 64, 0, 0).is_err());
    }

    #[test]
    fn test_display_geometry() {
        let grid = DisplayGeometryDescriptor::target_background_grid(720, 576, 2).unwrap();
        assert_eq!(encode(grid), vec![0x07, 0x04, 0x0B, 0x40, 0x24, 0x02]);
        let window = DisplayGeometryDescriptor::video_window(1, 1, 0xF).unwrap();
        assert_eq!(encode(window), vec![0x08, 0x04, 0x00, 0x04, 0x00, 0x1F]);
        assert!(DisplayGeometryDescriptor::video_window(0x4000, 0, 0).is_err());
    }

    #[test]
    fn test_multiplex_buffer_utilization() {
        let bounded = MultiplexBufferUtilizationDescriptor::new(0x0001, 0x7FFF).unwrap();
        assert_eq!(encode(bounded), vec![0x0C, 0x04, 0x80, 0x01, 0xFF, 0xFF]);
        let unbounded = MultiplexBufferUtilizationDescriptor::unbounded();
        assert_eq!(encode(unbounded), vec![0x0C, 0x04, 0x00, 0x00, 0x80, 0x00]);
        assert!(MultiplexBufferUtilizationDescriptor::new(0x8000, 0).is_err());
    }

    #[test]
    fn test_copyright_private_indicator_ibp() {
        let copyright = CopyrightDescriptor::new(0x4142_4344, vec![0x01]).unwrap();
        assert_eq!(encode(copyright), vec![0x0D, 0x05, 0x41, 0x42, 0x43, 0x44, 0x01]);
        assert!(CopyrightDescriptor::new(0, vec![0; 252]).is_err());

        let indicator = PrivateDataIndicatorDescriptor::new(0x0000_0028);
        assert_eq!(encode(indicator), vec![0x0F, 0x04, 0x00, 0x00, 0x00, 0x28]);

        let ibp = IbpDescriptor::new(true, false, 15).unwrap();
        assert_eq!(encode(ibp), vec![0x12, 0x02, 0x80, 0x0F]);
        assert!(IbpDescriptor::new(false, false, 0x4000).is_err());
    }
}
