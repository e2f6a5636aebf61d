//! EACEM private descriptors, valid after a private data specifier
//! descriptor carrying [`EACEM_PRIVATE_DATA_SPECIFIER`].

use super::{DescriptorBody, PrivateDataSpecifierDescriptor, check_payload};
use crate::encoding::ByteWriter;
use crate::error::{SiResult, check_bits};

#[cfg(feature = "serde")]
use serde::Serialize;

pub const EACEM_PRIVATE_DATA_SPECIFIER: u32 = 0x0000_0028;

impl PrivateDataSpecifierDescriptor {
    /// Private data specifier descriptor announcing EACEM descriptors.
    pub fn eacem() -> Self {
        Self::new(EACEM_PRIVATE_DATA_SPECIFIER)
    }
}

/// EACEM stream identifier descriptor (tag 0x86).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EacemStreamIdentifierDescriptor {
    version: u8,
}

impl EacemStreamIdentifierDescriptor {
    pub const TAG: u8 = 0x86;

    pub fn new(version: u8) -> Self {
        Self { version }
    }
}

impl Default for EacemStreamIdentifierDescriptor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl DescriptorBody for EacemStreamIdentifierDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        1
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u8(self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
struct LogicalChannel {
    service_id: u16,
    visible: bool,
    number: u16,
}

/// Logical channel descriptor (tag 0x83).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LogicalChannelDescriptor {
    channels: Vec<LogicalChannel>,
}

impl LogicalChannelDescriptor {
    pub const TAG: u8 = 0x83;
    const ENTRY_LEN: usize = 4;

    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a 10-bit channel number to a service. Number 0 marks a
    /// service that cannot be selected by number.
    pub fn add_channel(&mut self, service_id: u16, number: u16, visible: bool) -> SiResult<()> {
        check_bits("logical_channel_number", u64::from(number), 10)?;
        check_payload(Self::TAG, self.payload_len() + Self::ENTRY_LEN)?;
        self.channels.push(LogicalChannel {
            service_id,
            visible,
            number,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl DescriptorBody for LogicalChannelDescriptor {
    fn tag(&self) -> u8 {
        Self::TAG
    }

    fn payload_len(&self) -> usize {
        self.channels.len() * Self::ENTRY_LEN
    }

    fn encode_payload(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for channel in &self.channels {
            writer.write_u16(channel.service_id)?;
            writer.write_flag(channel.visible)?;
            writer.write_reserved(5)?;
            writer.write_bits("logical_channel_number", u64::from(channel.number), 10)?;
        }
        Ok(())
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
    fn test_logical_channel() {
        let mut lcn = LogicalChannelDescriptor::new();
        lcn.add_channel(0x1000, 0x10, true).unwrap();
        lcn.add_channel(0x1001, 0x11, false).unwrap();
        lcn.add_channel(0x1003, 0, true).unwrap();
        assert_eq!(
            encode(lcn),
            vec![
                0x83, 0x0C, //
                0x10, 0x00, 0xFC, 0x10, //
                0x10, 0x01, 0x7C, 0x11, //
                0x10, 0x03, 0xFC, 0x00,
            ]
        );
    }

    #[test]
    fn test_logical_channel_limits() {
        let mut lcn = LogicalChannelDescriptor::new();
        assert!(lcn.add_channel(1, 0x400, true).is_err());
        for service_id in 0..63 {
            lcn.add_channel(service_id, 1, true).unwrap();
        }
        assert!(lcn.add_channel(63, 1, true).is_err());
        assert_eq!(lcn.len(), 63);
    }

    #[test]
    fn test_eacem_stream_identifier_and_specifier() {
        assert_eq!(encode(EacemStreamIdentifierDescriptor::default()), vec![0x86, 0x01, 0x01]);
        assert_eq!(
            encode(PrivateDataSpecifierDescriptor::eacem()),
            vec![0x5F, 0x04, 0x00, 0x00, 0x00, 0x28]
        );
    }
}
