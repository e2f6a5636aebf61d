//! Enumerated field values defined by EN 300 468 and ISO/IEC 13818-1.
//!
//! Each enumeration converts from its raw coded value with `TryFrom<u8>`,
//! rejecting values outside the standard's closed set, and back with `id()`.

use std::hash::{Hash, Hasher};

use crate::error::SiError;

#[cfg(feature = "serde")]
use serde::Serialize;

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize))]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Returns the coded value of this variant.
            pub fn id(&self) -> u8 {
                match self {
                    $( $name::$variant => $value ),+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = SiError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok($name::$variant), )+
                    other => Err(SiError::invalid(
                        $field,
                        format!("0x{other:02x} is not a defined value"),
                    )),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.id()
            }
        }
    };
}

coded_enum! {
    /// Satellite polarization (2 bits).
    Polarization, "polarization" {
        LinearHorizontal = 0,
        LinearVertical = 1,
        CircularLeft = 2,
        CircularRight = 3,
    }
}

coded_enum! {
    /// Satellite modulation type (5 bits).
    SatelliteModulation, "modulation" {
        Undefined = 0,
        Qpsk = 1,
    }
}

coded_enum! {
    /// Inner FEC scheme (4 bits).
    FecInner, "fec_inner" {
        Undefined = 0,
        Rate1_2 = 1,
        Rate2_3 = 2,
        Rate3_4 = 3,
        Rate5_6 = 4,
        Rate7_8 = 5,
        NoConvolutionalCoding = 15,
    }
}

coded_enum! {
    /// Outer FEC scheme for cable delivery (4 bits).
    FecOuter, "fec_outer" {
        Undefined = 0,
        None = 1,
        ReedSolomon = 2,
    }
}

coded_enum! {
    /// Cable modulation (8 bits).
    CableModulation, "modulation" {
        Undefined = 0,
        Qam16 = 1,
        Qam32 = 2,
        Qam64 = 3,
        Qam128 = 4,
        Qam256 = 5,
    }
}

coded_enum! {
    /// Running status of a service or event (3 bits).
    RunningStatus, "running_status" {
        Undefined = 0,
        NotRunning = 1,
        StartsInAFewSeconds = 2,
        Pausing = 3,
        Running = 4,
        ServiceOffAir = 5,
    }
}

coded_enum! {
    /// Linkage type carried in the linkage descriptor.
    LinkageType, "linkage_type" {
        Reserved = 0x00,
        InformationService = 0x01,
        EpgService = 0x02,
        CaReplacementService = 0x03,
        CompleteNetworkBouquetSi = 0x04,
        ServiceReplacementService = 0x05,
        DataBroadcastService = 0x06,
        RcsMap = 0x07,
        MobileHandOver = 0x08,
        SystemSoftwareUpdateService = 0x09,
        TsContainingSsuBatOrNit = 0x0A,
        IpMacNotificationService = 0x0B,
        TsContainingIntBatOrNit = 0x0C,
    }
}

coded_enum! {
    /// Hand-over type of a mobile hand-over linkage (4 bits).
    HandOverType, "hand_over_type" {
        Reserved = 0,
        IdenticalService = 1,
        LocalVariation = 2,
        AssociatedService = 3,
    }
}

coded_enum! {
    /// Table the origin of a mobile hand-over linkage was found in.
    OriginType, "origin_type" {
        Nit = 0,
        Sdt = 1,
    }
}

coded_enum! {
    /// Table type signalled by an SSU scan linkage.
    SsuTableType, "table_type" {
        Undefined = 0,
        Nit = 1,
        Bat = 2,
    }
}

coded_enum! {
    /// Coding of the centre frequencies in a frequency list descriptor (2 bits).
    FrequencyCoding, "coding_type" {
        Undefined = 0,
        Satellite = 1,
        Cable = 2,
        Terrestrial = 3,
    }
}

coded_enum! {
    /// Announcement type of the announcement support descriptor (4 bits).
    AnnouncementType, "announcement_type" {
        EmergencyAlarm = 0,
        RoadTrafficFlash = 1,
        PublicTransportFlash = 2,
        WarningMessage = 3,
        NewsFlash = 4,
        WeatherFlash = 5,
        EventAnnouncement = 6,
        PersonalCall = 7,
    }
}

coded_enum! {
    /// Hierarchy type of the hierarchy descriptor (4 bits).
    HierarchyType, "hierarchy_type" {
        Reserved = 0,
        SpatialScalability = 1,
        SnrScalability = 2,
        TemporalScalability = 3,
        DataPartitioning = 4,
        ExtensionBitstream = 5,
        PrivateStream = 6,
        MultiViewProfile = 7,
        BaseLayer = 15,
    }
}

/// Service type values for the service and service list descriptors.
///
/// All 8-bit values are legal on the wire; unnamed ones are carried as
/// `Other`. Equality and hashing follow the coded value, so
/// `Other(0x01) == DigitalTelevision`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ServiceType {
    DigitalTelevision,
    DigitalRadioSound,
    Teletext,
    NvodReference,
    NvodTimeShifted,
    Mosaic,
    FmRadio,
    DataBroadcast,
    AdvancedCodecHdTelevision,
    Other(u8),
}

impl ServiceType {
    pub fn id(&self) -> u8 {
        match self {
            ServiceType::DigitalTelevision => 0x01,
            ServiceType::DigitalRadioSound => 0x02,
            ServiceType::Teletext => 0x03,
            ServiceType::NvodReference => 0x04,
            ServiceType::NvodTimeShifted => 0x05,
            ServiceType::Mosaic => 0x06,
            ServiceType::FmRadio => 0x07,
            ServiceType::DataBroadcast => 0x0C,
            ServiceType::AdvancedCodecHdTelevision => 0x19,
            ServiceType::Other(value) => *value,
        }
    }
}

impl From<u8> for ServiceType {
    fn from(value: u8) -> Self {
        match value {
            0x01 => ServiceType::DigitalTelevision,
            0x02 => ServiceType::DigitalRadioSound,
            0x03 => ServiceType::Teletext,
            0x04 => ServiceType::NvodReference,
            0x05 => ServiceType::NvodTimeShifted,
            0x06 => ServiceType::Mosaic,
            0x07 => ServiceType::FmRadio,
            0x0C => ServiceType::DataBroadcast,
            0x19 => ServiceType::AdvancedCodecHdTelevision,
            other => ServiceType::Other(other),
        }
    }
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// Stream types used in the PMT elementary stream loop.
pub mod stream_type {
    pub const MPEG1_VIDEO: u8 = 0x01;
    pub const MPEG2_VIDEO: u8 = 0x02;
    pub const MPEG1_AUDIO: u8 = 0x03;
    pub const MPEG2_AUDIO: u8 = 0x04;
    pub const PRIVATE_SECTIONS: u8 = 0x05;
    pub const PES_PRIVATE_DATA: u8 = 0x06;
    pub const DSMCC_TYPE_B: u8 = 0x0B;
    pub const ADTS_AUDIO: u8 = 0x0F;
    pub const H264_VIDEO: u8 = 0x1B;
    pub const HEVC_VIDEO: u8 = 0x24;
}

/// Well known PIDs.
pub mod pid {
    pub const PAT: u16 = 0x0000;
    pub const CAT: u16 = 0x0001;
    pub const NIT: u16 = 0x0010;
    pub const SDT_BAT: u16 = 0x0011;
    pub const EIT: u16 = 0x0012;
    pub const RST: u16 = 0x0013;
    pub const TDT_TOT: u16 = 0x0014;
    pub const NULL: u16 = 0x1FFF;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coded_enum_round_trip_ids() {
        assert_eq!(Polarization::try_from(2).unwrap(), Polarization::CircularLeft);
        assert_eq!(FecInner::try_from(15).unwrap(), FecInner::NoConvolutionalCoding);
        assert_eq!(u8::from(LinkageType::SystemSoftwareUpdateService), 0x09);
        assert_eq!(LinkageType::ServiceReplacementService.id(), 0x05);
    }

    #[test]
    fn test_service_type_compares_by_value() {
        assert_eq!(ServiceType::Other(0x01), ServiceType::DigitalTelevision);
        assert_eq!(ServiceType::from(0x19), ServiceType::AdvancedCodecHdTelevision);
        assert_ne!(ServiceType::Other(0x80), ServiceType::Teletext);

        let mut seen = std::collections::HashSet::new();
        seen.insert(ServiceType::Mosaic);
        assert!(seen.contains(&ServiceType::Other(0x06)));
    }

    #[test]
    fn test_coded_enum_rejects_unknown() {
        assert!(Polarization::try_from(4).is_err());
        assert!(SatelliteModulation::try_from(2).is_err());
        assert!(FecInner::try_from(6).is_err());
        let err = LinkageType::try_from(0x0D).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Construction);
    }

    #[test]
    fn test_service_type_other() {
        assert_eq!(ServiceType::from(0x01), ServiceType::DigitalTelevision);
        assert_eq!(ServiceType::from(0x80), ServiceType::Other(0x80));
        assert_eq!(ServiceType::Other(0x80).id(), 0x80);
    }
}
