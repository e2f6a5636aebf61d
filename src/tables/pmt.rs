//! Program map table.

use super::{
    MAX_PSI_SECTION_LEN, TableCore, descriptors_len, long_table, write_descriptor_loop,
};
use crate::descriptors::Descriptor;
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult, check_bits};
use crate::section::Section;
use crate::splitter::LoopSpec;

/// One elementary stream of a program with its ES_info descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementaryStream {
    stream_type: u8,
    elementary_pid: u16,
    descriptors: Vec<Descriptor>,
}

impl ElementaryStream {
    pub fn new(stream_type: u8, elementary_pid: u16) -> SiResult<Self> {
        check_bits("elementary_PID", u64::from(elementary_pid), 13)?;
        Ok(Self {
            stream_type,
            elementary_pid,
            descriptors: Vec::new(),
        })
    }

    pub fn add_descriptor(&mut self, descriptor: impl Into<Descriptor>) {
        self.descriptors.push(descriptor.into());
    }

    pub fn with_descriptor(mut self, descriptor: impl Into<Descriptor>) -> Self {
        self.add_descriptor(descriptor);
        self
    }

    pub fn stream_type(&self) -> u8 {
        self.stream_type
    }

    pub fn elementary_pid(&self) -> u16 {
        self.elementary_pid
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }
}

impl Encodable for ElementaryStream {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        // stream_type (8 bits)
        writer.write_u8(self.stream_type)?;
        // reserved (3 bits), elementary_PID (13 bits)
        writer.write_reserved(3)?;
        writer.write_bits("elementary_PID", u64::from(self.elementary_pid), 13)?;
        // reserved (4 bits), ES_info_length (12 bits), descriptors
        write_descriptor_loop(writer, &self.descriptors)
    }

    fn encoded_size(&self) -> usize {
        5 + descriptors_len(&self.descriptors)
    }
}

/// Program map table (table_id 0x02).
///
/// The PID a PMT travels on is announced by the PAT, so [`Pmt::PID`] is
/// only a conventional default.
///
/// [`Pmt::PID`]: crate::tables::Table::PID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pmt {
    core: TableCore,
    pcr_pid: u16,
    program_descriptors: Vec<Descriptor>,
    streams: Vec<ElementaryStream>,
}

impl Pmt {
    pub const TABLE_ID: u8 = 0x02;

    pub fn new(program_number: u16, pcr_pid: u16, version_number: u8) -> SiResult<Self> {
        check_bits("PCR_PID", u64::from(pcr_pid), 13)?;
        Ok(Self {
            core: TableCore::versioned(
                Self::TABLE_ID,
                false,
                program_number,
                version_number,
                MAX_PSI_SECTION_LEN,
            )?,
            pcr_pid,
            program_descriptors: Vec::new(),
            streams: Vec::new(),
        })
    }

    pub fn set_pcr_pid(&mut self, pcr_pid: u16) -> SiResult<()> {
        self.core.ensure_building()?;
        check_bits("PCR_PID", u64::from(pcr_pid), 13)?;
        self.pcr_pid = pcr_pid;
        Ok(())
    }

    /// Adds a descriptor to the program_info loop.
    pub fn add_program_descriptor(&mut self, descriptor: impl Into<Descriptor>) -> SiResult<()> {
        self.core.ensure_building()?;
        self.program_descriptors.push(descriptor.into());
        Ok(())
    }

    pub fn add_stream(&mut self, stream: ElementaryStream) -> SiResult<()> {
        self.core.ensure_building()?;
        self.streams.push(stream);
        Ok(())
    }

    /// Adds a descriptor to the first stream carried on `elementary_pid`.
    pub fn add_stream_descriptor(
        &mut self,
        elementary_pid: u16,
        descriptor: impl Into<Descriptor>,
    ) -> SiResult<()> {
        self.core.ensure_building()?;
        let stream = self
            .streams
            .iter_mut()
            .find(|stream| stream.elementary_pid == elementary_pid)
            .ok_or_else(|| SiError::invalid("elementary_PID", format!("no stream on PID {elementary_pid:#06x}")))?;
        stream.add_descriptor(descriptor);
        Ok(())
    }

    pub fn streams(&self) -> &[ElementaryStream] {
        &self.streams
    }

    fn encode_sections(&self) -> SiResult<Vec<Section>> {
        let mut prefix = ByteWriter::with_capacity(2);
        prefix.write_reserved(3)?;
        prefix.write_bits("PCR_PID", u64::from(self.pcr_pid), 13)?;

        self.core
            .splitter()
            .prefix(prefix.finish())
            .push_loop(LoopSpec::prefixed(&self.program_descriptors))
            .push_loop(LoopSpec::bare(&self.streams))
            .split()
    }
}

long_table!(Pmt, 0x0100);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::{Iso639LanguageDescriptor, RegistrationDescriptor, StreamIdentifierDescriptor};
    use crate::tables::Table;
    use crate::types::stream_type;

    #[test]
    fn test_pmt_encoding() {
        let mut pmt = Pmt::new(0x0001, 0x0100, 0).unwrap();
        pmt.add_program_descriptor(RegistrationDescriptor::new(0x48444D56, vec![]).unwrap())
            .unwrap();
        pmt.add_stream(ElementaryStream::new(stream_type::MPEG2_VIDEO, 0x0100).unwrap())
            .unwrap();
        let mut language = Iso639LanguageDescriptor::new();
        language.add_language("eng", 0).unwrap();
        pmt.add_stream(
            ElementaryStream::new(stream_type::MPEG1_AUDIO, 0x0101)
                .unwrap()
                .with_descriptor(language),
        )
        .unwrap();

        let sections = pmt.build_sections().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].without_crc(),
            &[
                0x02, 0xB0, 0x23, 0x00, 0x01, 0xC1, 0x00, 0x00, // header
                0xE1, 0x00, // PCR PID
                0xF0, 0x06, 0x05, 0x04, b'H', b'D', b'M', b'V', // program info
                0x02, 0xE1, 0x00, 0xF0, 0x00, // video
                0x03, 0xE1, 0x01, 0xF0, 0x06, 0x0A, 0x04, b'e', b'n', b'g', 0x00, // audio
            ]
        );
    }

    #[test]
    fn test_pmt_stream_descriptor_lookup() {
        let mut pmt = Pmt::new(1, 0x1FFF, 0).unwrap();
        pmt.add_stream(ElementaryStream::new(stream_type::H264_VIDEO, 0x200).unwrap())
            .unwrap();
        pmt.add_stream_descriptor(0x200, StreamIdentifierDescriptor::new(1))
            .unwrap();
        assert_eq!(pmt.streams()[0].descriptors().len(), 1);
        assert!(pmt.add_stream_descriptor(0x201, StreamIdentifierDescriptor::new(2)).is_err());
        assert!(Pmt::new(1, 0x2000, 0).is_err());
        assert!(ElementaryStream::new(0x02, 0x2000).is_err());
    }

    #[test]
    fn test_pmt_stream_too_large() {
        let mut pmt = Pmt::new(1, 0x100, 0).unwrap();
        let mut stream = ElementaryStream::new(stream_type::MPEG2_VIDEO, 0x100).unwrap();
        // 4 * 257 descriptor bytes plus the 5 byte row header
        for _ in 0..4 {
            stream.add_descriptor(RegistrationDescriptor::new(0, vec![0; 251]).unwrap());
        }
        pmt.add_stream(stream).unwrap();
        let err = pmt.build_sections().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Capacity);
        assert!(pmt.add_stream(ElementaryStream::new(2, 0x101).unwrap()).is_err());
    }
}
