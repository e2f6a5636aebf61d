//! SI descriptors.
//!
//! Every descriptor is a tag-length-value record. The concrete kinds live in
//! the submodules and implement [`DescriptorBody`]; the closed [`Descriptor`]
//! enum wraps them for storage in tables and performs the common
//! `descriptor_tag` / `descriptor_length` framing.
//!
//! The length byte is never stored. It is computed from the fields when the
//! descriptor is serialized, so setters only have to keep the payload within
//! the 255 byte limit.

mod delivery;
mod eacem;
mod event;
mod linkage;
mod mpeg;
mod network;
mod service;
mod ssu;
mod stream;

pub use delivery::*;
pub use eacem::*;
pub use event::*;
pub use linkage::*;
pub use mpeg::*;
pub use network::*;
pub use service::*;
pub use ssu::*;
pub use stream::*;

use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Largest payload a descriptor can carry.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Size of the tag and length header.
pub const HEADER_LEN: usize = 2;

/// Capability shared by all descriptor kinds.
pub trait DescriptorBody {
    /// The `descriptor_tag` value.
    fn tag(&self) -> u8;

    /// Number of payload bytes `encode_payload` writes.
    fn payload_len(&self) -> usize;

    /// Writes the payload, excluding tag and length.
    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()>;
}

/// Fails with [`SiError::DescriptorTooLong`] if `length` exceeds the payload limit.
pub(crate) fn check_payload(tag: u8, length: usize) -> SiResult<()> {
    if length > MAX_PAYLOAD_LEN {
        return Err(SiError::DescriptorTooLong { tag, length });
    }
    Ok(())
}

/// Validates an ISO 639-2 language (or ISO 3166 country) code.
pub(crate) fn code3(field: &'static str, code: &str) -> SiResult<[u8; 3]> {
    match code.as_bytes() {
        &[a, b, c] if code.is_ascii() => Ok([a, b, c]),
        _ => Err(SiError::invalid(field, format!("{code:?} is not a 3 letter code"))),
    }
}

/// Checks a string that is prefixed with an 8-bit length.
pub(crate) fn text8(field: &'static str, text: &str) -> SiResult<String> {
    if text.len() > MAX_PAYLOAD_LEN {
        return Err(SiError::ValueTooLarge {
            field,
            bits: 8,
            value: text.len() as u64,
        });
    }
    Ok(text.to_owned())
}

/// A descriptor with a caller supplied tag and raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PrivateDescriptor {
    tag: u8,
    data: Vec<u8>,
}

impl PrivateDescriptor {
    pub fn new(tag: u8, data: impl Into<Vec<u8>>) -> SiResult<Self> {
        let data = data.into();
        check_payload(tag, data.len())?;
        Ok(Self { tag, data })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl DescriptorBody for PrivateDescriptor {
    fn tag(&self) -> u8 {
        self.tag
    }

    fn payload_len(&self) -> usize {
        self.data.len()
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_bytes(&self.data)
    }
}

macro_rules! descriptor_enum {
    ($( $(#[$vmeta:meta])* $variant:ident($ty:ty) ),+ $(,)?) => {
        /// Any descriptor that can be attached to a table.
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(Serialize))]
        #[non_exhaustive]
        pub enum Descriptor {
            $( $(#[$vmeta])* $variant($ty), )+
        }

        impl Descriptor {
            fn body(&self) -> &dyn DescriptorBody {
                match self {
                    $( Descriptor::$variant(d) => d, )+
                }
            }
        }

        $(
            impl From<$ty> for Descriptor {
                fn from(descriptor: $ty) -> Self {
                    Descriptor::$variant(descriptor)
                }
            }
        )+
    };
}

descriptor_enum! {
    // ISO/IEC 13818-1
    VideoStream(VideoStreamDescriptor),
    AudioStream(AudioStreamDescriptor),
    Hierarchy(HierarchyDescriptor),
    Registration(RegistrationDescriptor),
    DataStreamAlignment(DataStreamAlignmentDescriptor),
    /// Target background grid or video window.
    DisplayGeometry(DisplayGeometryDescriptor),
    Ca(CaDescriptor),
    Iso639Language(Iso639LanguageDescriptor),
    SystemClock(SystemClockDescriptor),
    MultiplexBufferUtilization(MultiplexBufferUtilizationDescriptor),
    Copyright(CopyrightDescriptor),
    MaximumBitrate(MaximumBitrateDescriptor),
    PrivateDataIndicator(PrivateDataIndicatorDescriptor),
    SmoothingBuffer(SmoothingBufferDescriptor),
    Std(StdDescriptor),
    Ibp(IbpDescriptor),
    // EN 300 468
    NetworkName(NetworkNameDescriptor),
    ServiceList(ServiceListDescriptor),
    Stuffing(StuffingDescriptor),
    SatelliteDeliverySystem(SatelliteDeliverySystemDescriptor),
    CableDeliverySystem(CableDeliverySystemDescriptor),
    BouquetName(BouquetNameDescriptor),
    Service(ServiceDescriptor),
    CountryAvailability(CountryAvailabilityDescriptor),
    Linkage(LinkageDescriptor),
    MobileHandoverLinkage(MobileHandoverLinkageDescriptor),
    SsuLinkage(SsuLinkageDescriptor),
    SsuScanLinkage(SsuScanLinkageDescriptor),
    NvodReference(NvodReferenceDescriptor),
    TimeShiftedService(TimeShiftedServiceDescriptor),
    ShortEvent(ShortEventDescriptor),
    ExtendedEvent(ExtendedEventDescriptor),
    TimeShiftedEvent(TimeShiftedEventDescriptor),
    Component(ComponentDescriptor),
    StreamIdentifier(StreamIdentifierDescriptor),
    CaIdentifier(CaIdentifierDescriptor),
    Content(ContentDescriptor),
    ParentalRating(ParentalRatingDescriptor),
    Teletext(TeletextDescriptor),
    LocalTimeOffset(LocalTimeOffsetDescriptor),
    Subtitling(SubtitlingDescriptor),
    TerrestrialDeliverySystem(TerrestrialDeliverySystemDescriptor),
    MultilingualName(MultilingualNameDescriptor),
    MultilingualServiceName(MultilingualServiceNameDescriptor),
    MultilingualComponent(MultilingualComponentDescriptor),
    PrivateDataSpecifier(PrivateDataSpecifierDescriptor),
    ShortSmoothingBuffer(ShortSmoothingBufferDescriptor),
    FrequencyList(FrequencyListDescriptor),
    DataBroadcast(DataBroadcastDescriptor),
    DataBroadcastId(DataBroadcastIdDescriptor),
    SsuDataBroadcastId(SsuDataBroadcastIdDescriptor),
    Ac3(Ac3Descriptor),
    AncillaryData(AncillaryDataDescriptor),
    Pdc(PdcDescriptor),
    CellList(CellListDescriptor),
    CellFrequencyLink(CellFrequencyLinkDescriptor),
    AnnouncementSupport(AnnouncementSupportDescriptor),
    EnhancedAc3(EnhancedAc3Descriptor),
    // EACEM
    LogicalChannel(LogicalChannelDescriptor),
    EacemStreamIdentifier(EacemStreamIdentifierDescriptor),
    /// Any other tag, carried as raw bytes.
    Private(PrivateDescriptor),
}

impl Descriptor {
    /// The `descriptor_tag` value.
    pub fn tag(&self) -> u8 {
        self.body().tag()
    }

    /// Payload length, which is also the value of the `descriptor_length` field.
    pub fn payload_len(&self) -> usize {
        self.body().payload_len()
    }
}

impl Encodable for Descriptor {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        let body = self.body();
        let length = body.payload_len();
        check_payload(body.tag(), length)?;

        // descriptor_tag (8 bits)
        writer.write_u8(body.tag())?;
        // descriptor_length (8 bits)
        writer.write_u8(length as u8)?;

        let start = writer.len();
        body.encode_payload(writer)?;
        debug_assert_eq!(
            writer.len() - start,
            length,
            "descriptor 0x{:02x} wrote a payload different from its declared length",
            body.tag()
        );
        Ok(())
    }

    fn encoded_size(&self) -> usize {
        HEADER_LEN + self.payload_len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::time::UtcTime;
    use crate::types::*;

    /// One instance of every kind, with optional parts populated.
    pub(crate) fn sample_descriptors() -> Vec<Descriptor> {
        let mut ssu = SsuLinkageDescriptor::new(1, 2, 3);
        ssu.add_oui(0x00015A, vec![0x01, 0x02]).unwrap();
        ssu.set_private_data(vec![0xAA]).unwrap();

        let mut ssu_dbi = SsuDataBroadcastIdDescriptor::new();
        ssu_dbi
            .add_oui(0x00015A, 1, Some(3), vec![0x10])
            .unwrap();
        ssu_dbi.set_private_data(vec![0xBB, 0xCC]).unwrap();

        let mut eac3 = EnhancedAc3Descriptor::new();
        eac3.set_component_type(0x42).unwrap();
        eac3.set_mix_info_exists(true).unwrap();
        eac3.set_substream1(0x01).unwrap();
        eac3.set_substream3(0x03).unwrap();

        let mut ac3 = Ac3Descriptor::new();
        ac3.set_bsid(8).unwrap();
        ac3.set_additional_info(vec![1, 2, 3]).unwrap();

        let mut service_list = ServiceListDescriptor::new();
        service_list.add_service(0x0101, ServiceType::DigitalTelevision).unwrap();

        let mut subtitling = SubtitlingDescriptor::new();
        subtitling.add_subtitling("eng", 0x10, 1, 1).unwrap();

        let mut teletext = TeletextDescriptor::new();
        teletext.add_teletext("deu", 1, 1, 0x00).unwrap();

        let mut offsets = LocalTimeOffsetDescriptor::new();
        offsets
            .add_offset(
                "ESP",
                0,
                false,
                60,
                UtcTime::new(2024, 3, 31, 1, 0, 0).unwrap(),
                120,
            )
            .unwrap();

        let mut frequencies = FrequencyListDescriptor::new(FrequencyCoding::Terrestrial);
        frequencies.add_frequency(474_000_000 / 10).unwrap();

        let area = CellArea {
            latitude: -100,
            longitude: 200,
            extent_of_latitude: 10,
            extent_of_longitude: 20,
        };
        let mut cells = CellListDescriptor::new();
        cells.add_cell(1, area).unwrap();
        cells.add_subcell(1, 1, area).unwrap();

        let mut links = CellFrequencyLinkDescriptor::new();
        links.add_link(1, 47_400_000).unwrap();
        links.add_subcell(1, 1, 48_200_000).unwrap();

        let mut announcements = AnnouncementSupportDescriptor::new();
        announcements
            .add_announcement(AnnouncementType::NewsFlash, AnnouncementReference::ServiceAudioStream)
            .unwrap();
        announcements
            .add_announcement(
                AnnouncementType::WeatherFlash,
                AnnouncementReference::DifferentService(AnnouncementSource {
                    original_network_id: 1,
                    transport_stream_id: 2,
                    service_id: 3,
                    component_tag: 4,
                }),
            )
            .unwrap();

        let mut extended = ExtendedEventDescriptor::new(0, 0, "eng", "Text").unwrap();
        extended.add_item("Cast", "Ann").unwrap();

        let mut multilingual = MultilingualComponentDescriptor::new(1);
        multilingual.add_text("eng", "Audio").unwrap();

        let mut lcn = LogicalChannelDescriptor::new();
        lcn.add_channel(0x0101, 1, true).unwrap();

        vec![
            VideoStreamDescriptor::new(false, 3, false, false, false)
                .unwrap()
                .into(),
            AudioStreamDescriptor::new(false, false, 2, false).unwrap().into(),
            RegistrationDescriptor::new(0x41432D33, vec![]).unwrap().into(),
            DataStreamAlignmentDescriptor::new(1).into(),
            CaDescriptor::new(0x0B00, 0x0100, vec![0x01]).unwrap().into(),
            SystemClockDescriptor::new(false, 0, 0).unwrap().into(),
            MaximumBitrateDescriptor::new(30_000).unwrap().into(),
            SmoothingBufferDescriptor::new(1000, 2000).unwrap().into(),
            StdDescriptor::new(true).into(),
            NetworkNameDescriptor::new("Network").unwrap().into(),
            service_list.into(),
            StuffingDescriptor::new(vec![0xFF; 4]).unwrap().into(),
            SatelliteDeliverySystemDescriptor::new(
                11954000,
                192,
                false,
                Polarization::LinearHorizontal,
                SatelliteModulation::Qpsk,
                27500,
                FecInner::Rate3_4,
            )
            .unwrap()
            .into(),
            CableDeliverySystemDescriptor::new(
                346000,
                FecOuter::None,
                CableModulation::Qam64,
                6900,
                FecInner::Undefined,
            )
            .unwrap()
            .into(),
            BouquetNameDescriptor::new("Bouquet").unwrap().into(),
            ServiceDescriptor::new(ServiceType::DigitalTelevision, "Provider", "Service")
                .unwrap()
                .into(),
            LinkageDescriptor::new(1, 2, 3, LinkageType::EpgService).unwrap().into(),
            MobileHandoverLinkageDescriptor::new(
                1,
                2,
                3,
                HandOverType::IdenticalService,
                OriginType::Nit,
                0x1234,
                0x5678,
            )
            .into(),
            ssu.into(),
            SsuScanLinkageDescriptor::new(1, 2, 3, SsuTableType::Bat).into(),
            TimeShiftedServiceDescriptor::new(7).into(),
            ShortEventDescriptor::new("eng", "Name", "Text").unwrap().into(),
            ComponentDescriptor::new(1, 3, 0x01, "eng", "Video").unwrap().into(),
            StreamIdentifierDescriptor::new(5).into(),
            subtitling.into(),
            teletext.into(),
            offsets.into(),
            TerrestrialDeliverySystemDescriptor::new(
                474_000_000 / 10,
                0,
                2,
                0,
                2,
                0,
                0,
                1,
                false,
            )
            .unwrap()
            .into(),
            PrivateDataSpecifierDescriptor::new(0x0000_0028).into(),
            DataBroadcastIdDescriptor::new(0x0005, vec![0x01]).unwrap().into(),
            ssu_dbi.into(),
            ac3.into(),
            AncillaryDataDescriptor::new(0x01).into(),
            eac3.into(),
            HierarchyDescriptor::new(HierarchyType::BaseLayer, 0, 0, 1).unwrap().into(),
            DisplayGeometryDescriptor::video_window(10, 20, 1).unwrap().into(),
            MultiplexBufferUtilizationDescriptor::new(1, 2).unwrap().into(),
            CopyrightDescriptor::new(1, vec![2]).unwrap().into(),
            PrivateDataIndicatorDescriptor::new(3).into(),
            IbpDescriptor::new(true, true, 12).unwrap().into(),
            extended.into(),
            TimeShiftedEventDescriptor::new(1, 2).into(),
            multilingual.into(),
            ShortSmoothingBufferDescriptor::new(1, 2, vec![]).unwrap().into(),
            frequencies.into(),
            DataBroadcastDescriptor::new(0x0106, 1, vec![], "eng", "App").unwrap().into(),
            PdcDescriptor::from_parts(1, 2, 3, 4).unwrap().into(),
            cells.into(),
            links.into(),
            announcements.into(),
            lcn.into(),
            EacemStreamIdentifierDescriptor::default().into(),
            PrivateDescriptor::new(0xF3, vec![1, 2, 3]).unwrap().into(),
        ]
    }

    #[test]
    fn test_length_byte_matches_payload() {
        for descriptor in sample_descriptors() {
            let bytes = descriptor.encode_to_vec().unwrap();
            assert_eq!(bytes[0], descriptor.tag());
            assert_eq!(bytes[1] as usize, descriptor.payload_len(), "tag 0x{:02x}", descriptor.tag());
            assert_eq!(bytes.len() - HEADER_LEN, descriptor.payload_len());
            assert_eq!(bytes.len(), descriptor.encoded_size());
        }
    }

    #[test]
    fn test_private_descriptor() {
        let descriptor: Descriptor = PrivateDescriptor::new(0xF0, vec![0xDE, 0xAD]).unwrap().into();
        assert_eq!(descriptor.encode_to_vec().unwrap(), vec![0xF0, 0x02, 0xDE, 0xAD]);
    }

    #[test]
    fn test_private_descriptor_too_long() {
        assert_eq!(
            PrivateDescriptor::new(0xF0, vec![0; 256]),
            Err(SiError::DescriptorTooLong {
                tag: 0xF0,
                length: 256
            })
        );
        assert!(PrivateDescriptor::new(0xF0, vec![0; 255]).is_ok());
    }

    #[test]
    fn test_code3() {
        assert_eq!(code3("lang", "eng").unwrap(), *b"eng");
        assert!(code3("lang", "en").is_err());
        assert!(code3("lang", "engl").is_err());
        assert!(code3("lang", "é1").is_err());
    }
}
