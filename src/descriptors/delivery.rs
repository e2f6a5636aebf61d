//! Delivery system descriptors, carried in the NIT transport stream loop.

use super::DescriptorBody;
use crate::encoding::ByteWriter;
use crate::error::{SiResult, check_bits};
use crate::types::{CableModulation, FecInner, FecOuter, Polarization, SatelliteModulation};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Satellite delivery system descriptor (tag 0x43).
///
/// `frequency`, `orbital_position` and `symbol_rate` are written exactly as
/// given. Callers that follow EN 300 468 to the letter pass them already
/// BCD coded (for example `0x01195400` for 11.954 GHz).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SatelliteDeliverySystemDescriptor {
    frequency: u32,
    orbital_position: u16,
    west_east: bool,
    polarization: Polarization,
    modulation: SatelliteModulation,
    symbol_rate: u32,
    fec_inner: FecInner,
}

impl SatelliteDeliverySystemDescriptor {
    pub const TAG: u8 = 0x43;

    /// Creates the descriptor.
    ///
    /// # Errors
    /// Fails if `symbol_rate` does not fit its 28-bit field.
    pub fn new(
        frequency: u32,
        orbital_position: u16,
        west_east: bool,
        polarization: Polarization,
        modulation: SatelliteModulation,
        symbol_rate: u32,
        fec_inner: FecInner,
    ) -> SiResult<Self> {
        check_bits("symbol_rate", u64::from(symbol_rate), 28)?;
        Ok(Self {
            frequency,
            orbital_position,
            west_east,
            polarization,
            modulation,
            symbol_rate,
            fec_inner,
        })
    }

    /// Creates the descriptor from raw coded values, validating each
    /// enumeration.
    pub fn from_raw(
        frequency: u32,
        orbital_position: u16,
        west_east: bool,
        polarization: u8,
        modulation: u8,
        symbol_rate: u32,
        fec_inner: u8,
    ) -> SiResult<Self> {
        Self::new(
            frequency,
            orbital_position,
            west_east,
            Polarization::try_from(polarization)?,
            SatelliteModulation::try_from(modulation)?,
            symbol_rate,
            FecInner::try_from(fec_inner)?,
        )
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn orbital_position(&self) -> u16 {
        self.orbital_position
    }

    pub fn symbol_rate(&self) -> u32 {
        self.symbol_rate
    }

    pub fn polarization(&self) -> Polarization {
        self.polarization
    }
}

impl DescriptorBody for SatelliteDeliverySystemDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        11
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u32(self.frequency)?;
        writer.write_u16(self.orbital_position)?;
        writer.write_flag(self.west_east)?;
        writer.write_bits("polarization", u64::from(self.polarization.id()), 2)?;
        writer.write_bits("modulation", u64::from(self.modulation.id()), 5)?;
        writer.write_bits("symbol_rate", u64::from(self.symbol_rate), 28)?;
        writer.write_bits("fec_inner", u64::from(self.fec_inner.id()), 4)
    }
}

/// Cable delivery system descriptor (tag 0x44).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CableDeliverySystemDescriptor {
    frequency: u32,
    fec_outer: FecOuter,
    modulation: CableModulation,
    symbol_rate: u32,
    fec_inner: FecInner,
}

impl CableDeliverySystemDescriptor {
    pub const TAG: u8 = 0x44;

    pub fn new(
        frequency: u32,
        fec_outer: FecOuter,
        modulation: CableModulation,
        symbol_rate: u32,
        fec_inner: FecInner,
    ) -> SiResult<Self> {
        check_bits("symbol_rate", u64::from(symbol_rate), 28)?;
        Ok(Self {
            frequency,
            fec_outer,
            modulation,
            symbol_rate,
            fec_inner,
        })
    }
}

impl DescriptorBody for CableDeliverySystemDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        11
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u32(self.frequency)?;
        writer.write_reserved(12)?;
        writer.write_bits("fec_outer", u64::from(self.fec_outer.id()), 4)?;
        writer.write_u8(self.modulation.id())?;
        writer.write_bits("symbol_rate", u64::from(self.symbol_rate), 28)?;
        writer.write_bits("fec_inner", u64::from(self.fec_inner.id()), 4)
    }
}

/// Terrestrial delivery system descriptor (tag 0x5A).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TerrestrialDeliverySystemDescriptor {
    centre_frequency: u32,
    bandwidth: u8,
    constellation: u8,
    hierarchy_information: u8,
    code_rate_hp_stream: u8,
    code_rate_lp_stream: u8,
    guard_interval: u8,
    transmission_mode: u8,
    other_frequency: bool,
}

impl TerrestrialDeliverySystemDescriptor {
    pub const TAG: u8 = 0x5A;

    /// Creates the descriptor. `centre_frequency` is in units of 10 Hz.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        centre_frequency: u32,
        bandwidth: u8,
        constellation: u8,
        hierarchy_information: u8,
        code_rate_hp_stream: u8,
        code_rate_lp_stream: u8,
        guard_interval: u8,
        transmission_mode: u8,
        other_frequency: bool,
    ) -> SiResult<Self> {
        check_bits("bandwidth", u64::from(bandwidth), 3)?;
        check_bits("constellation", u64::from(constellation), 2)?;
        check_bits("hierarchy_information", u64::from(hierarchy_information), 3)?;
        check_bits("code_rate_hp_stream", u64::from(code_rate_hp_stream), 3)?;
        check_bits("code_rate_lp_stream", u64::from(code_rate_lp_stream), 3)?;
        check_bits("guard_interval", u64::from(guard_interval), 2)?;
        check_bits("transmission_mode", u64::from(transmission_mode), 2)?;
        Ok(Self {
            centre_frequency,
            bandwidth,
            constellation,
            hierarchy_information,
            code_rate_hp_stream,
            code_rate_lp_stream,
            guard_interval,
            transmission_mode,
            other_frequency,
        })
    }
}

impl DescriptorBody for TerrestrialDeliverySystemDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        11
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u32(self.centre_frequency)?;
        writer.write_bits("bandwidth", u64::from(self.bandwidth), 3)?;
        writer.write_reserved(5)?;
        writer.write_bits("constellation", u64::from(self.constellation), 2)?;
        writer.write_bits("hierarchy_information", u64::from(self.hierarchy_information), 3)?;
        writer.write_bits("code_rate_hp_stream", u64::from(self.code_rate_hp_stream), 3)?;
        writer.write_bits("code_rate_lp_stream", u64::from(self.code_rate_lp_stream), 3)?;
        writer.write_bits("guard_interval", u64::from(self.guard_interval), 2)?;
        writer.write_bits("transmission_mode", u64::from(self.transmission_mode), 2)?;
        writer.write_flag(self.other_frequency)?;
        writer.write_reserved(32)
    }
}
