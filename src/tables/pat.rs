//! Program association table.

use super::{MAX_PSI_SECTION_LEN, TableCore, long_table};
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiResult, check_bits};
use crate::section::Section;
use crate::splitter::LoopSpec;
use crate::types::pid;

#[cfg(feature = "serde")]
use serde::Serialize;

/// One program_number / PID pair. Program 0 points at the network PID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Program {
    pub program_number: u16,
    pub pid: u16,
}

impl Encodable for Program {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.program_number)?;
        writer.write_reserved(3)?;
        writer.write_bits("pid", u64::from(self.pid), 13)
    }

    fn encoded_size(&self) -> usize {
        4
    }
}

/// Program association table (table_id 0x00).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pat {
    core: TableCore,
    programs: Vec<Program>,
}

impl Pat {
    pub const TABLE_ID: u8 = 0x00;

    pub fn new(transport_stream_id: u16, version_number: u8) -> SiResult<Self> {
        Ok(Self {
            core: TableCore::versioned(
                Self::TABLE_ID,
                false,
                transport_stream_id,
                version_number,
                MAX_PSI_SECTION_LEN,
            )?,
            programs: Vec::new(),
        })
    }

    /// Maps `program_number` to the PID carrying its PMT.
    pub fn add_program(&mut self, program_number: u16, pmt_pid: u16) -> SiResult<()> {
        self.core.ensure_building()?;
        check_bits("program_map_PID", u64::from(pmt_pid), 13)?;
        self.programs.push(Program {
            program_number,
            pid: pmt_pid,
        });
        Ok(())
    }

    /// Adds the program 0 entry announcing the NIT PID.
    pub fn add_network_pid(&mut self, network_pid: u16) -> SiResult<()> {
        self.add_program(0, network_pid)
    }

    /// Announces the NIT on its standard PID.
    pub fn add_default_network_pid(&mut self) -> SiResult<()> {
        self.add_network_pid(pid::NIT)
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    fn encode_sections(&self) -> SiResult<Vec<Section>> {
        self.core.splitter().push_loop(LoopSpec::bare(&self.programs)).split()
    }
}

long_table!(Pat, pid::PAT);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc;
    use crate::error::SiError;
    use crate::tables::{Table, TableState};

    #[test]
    fn test_pat_encoding() {
        let mut pat = Pat::new(0x0001, 0).unwrap();
        pat.add_network_pid(0x0010).unwrap();
        pat.add_program(0x0001, 0x0100).unwrap();

        let sections = pat.build_sections().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].without_crc(),
            &[
                0x00, 0xB0, 0x11, 0x00, 0x01, 0xC1, 0x00, 0x00, // header
                0x00, 0x00, 0xE0, 0x10, // network PID
                0x00, 0x01, 0xE1, 0x00, // program 1
            ]
        );
        assert!(crc::validate_section_crc(sections[0].as_bytes()));
    }

    #[test]
    fn test_pat_pid_range() {
        let mut pat = Pat::new(1, 0).unwrap();
        assert!(matches!(
            pat.add_program(1, 0x2000),
            Err(SiError::ValueTooLarge { bits: 13, .. })
        ));
        assert!(pat.programs().is_empty());
    }

    #[test]
    fn test_pat_split_and_idempotence() {
        let mut pat = Pat::new(7, 3).unwrap();
        // 1012 payload bytes per section hold 253 programs
        for number in 1..=300 {
            pat.add_program(number, 0x0100 + number).unwrap();
        }
        let first = pat.build_sections().unwrap();
        let second = pat.build_sections().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].len(), 8 + 253 * 4 + 4);
        assert_eq!(first[1].section_number(), 1);
        assert_eq!(first[1].last_section_number(), 1);
    }

    #[test]
    fn test_pat_sealed_after_build() {
        let mut pat = Pat::new(1, 0).unwrap();
        pat.build_sections().unwrap();
        assert_eq!(pat.state(), TableState::Serialized);
        assert_eq!(
            pat.add_program(1, 0x100),
            Err(SiError::TableSealed { table_id: 0x00 })
        );
        assert!(pat.set_version(2).is_err());
    }
}
