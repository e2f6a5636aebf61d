//! Distributes the rows of a long-form table over as many sections as needed.
//!
//! The splitter works on atomic items (a row together with its descriptors,
//! or a single top-level descriptor). Every item is sized before anything is
//! encoded. Items are never cut in two: an item that does not fit in the
//! current section closes it.

use tracing::{debug, trace};

use std::fmt;

use crate::crc::CRC_LEN;
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult};
use crate::section::{LONG_HEADER_LEN, Section, SectionHeader};

/// A table may carry at most this many sections (section_number is 8 bits).
pub const MAX_SECTIONS: usize = 256;

/// One loop of a section payload.
#[derive(Clone, Default)]
pub struct LoopSpec<'a> {
    length_prefixed: bool,
    one_per_section: bool,
    items: Vec<&'a dyn Encodable>,
}

impl<'a> LoopSpec<'a> {
    /// A loop preceded by 4 reserved bits and a 12-bit byte count.
    pub fn prefixed<T: Encodable>(items: &'a [T]) -> Self {
        Self {
            length_prefixed: true,
            one_per_section: false,
            items: Self::collect(items),
        }
    }

    /// A loop that runs to the end of the section.
    pub fn bare<T: Encodable>(items: &'a [T]) -> Self {
        Self {
            length_prefixed: false,
            one_per_section: false,
            items: Self::collect(items),
        }
    }

    fn collect<T: Encodable>(items: &'a [T]) -> Vec<&'a dyn Encodable> {
        items.iter().map(|item| item as &dyn Encodable).collect()
    }

    /// Closes the section after every item of this loop.
    pub fn one_per_section(mut self) -> Self {
        self.one_per_section = true;
        self
    }

    fn field_len(&self) -> usize {
        if self.length_prefixed { 2 } else { 0 }
    }
}

impl fmt::Debug for LoopSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopSpec")
            .field("length_prefixed", &self.length_prefixed)
            .field("one_per_section", &self.one_per_section)
            .field("items", &self.items.len())
            .finish()
    }
}

/// Greedy section builder for one table.
#[derive(Debug, Clone)]
pub struct SectionSplitter<'a> {
    header: &'a SectionHeader,
    max_section_len: usize,
    reserved_len: usize,
    prefix: Vec<u8>,
    last_section_slot: Option<usize>,
    loops: Vec<LoopSpec<'a>>,
}

impl<'a> SectionSplitter<'a> {
    pub fn new(header: &'a SectionHeader, max_section_len: usize) -> Self {
        Self {
            header,
            max_section_len,
            reserved_len: 0,
            prefix: Vec::new(),
            last_section_slot: None,
            loops: Vec::new(),
        }
    }

    /// Bytes kept free at the end of every section.
    pub fn reserved_len(mut self, reserved_len: usize) -> Self {
        self.reserved_len = reserved_len;
        self
    }

    /// Fixed bytes repeated at the start of every section payload.
    pub fn prefix(mut self, prefix: Vec<u8>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Copies last_section_number into the prefix byte at `offset` of every
    /// section once the section count is known.
    pub fn last_section_number_at(mut self, offset: usize) -> Self {
        self.last_section_slot = Some(offset);
        self
    }

    pub fn push_loop(mut self, spec: LoopSpec<'a>) -> Self {
        self.loops.push(spec);
        self
    }

    /// Payload bytes per section: everything between the header and the CRC.
    pub fn capacity(&self) -> usize {
        self.max_section_len
            .saturating_sub(LONG_HEADER_LEN + CRC_LEN + self.reserved_len)
    }

    /// Room left for items once the prefix and loop length fields are written.
    pub fn item_capacity(&self) -> usize {
        let fixed = self.prefix.len() + self.loops.iter().map(LoopSpec::field_len).sum::<usize>();
        self.capacity().saturating_sub(fixed)
    }

    /// Sizes every item against an empty section before any is encoded.
    fn check_items(&self) -> SiResult<usize> {
        let fixed = self.prefix.len() + self.loops.iter().map(LoopSpec::field_len).sum::<usize>();
        let capacity = self.capacity();
        if fixed > capacity {
            return Err(SiError::EntryTooLarge {
                needed: fixed,
                available: capacity,
            });
        }
        let available = capacity - fixed;
        for item in self.loops.iter().flat_map(|spec| spec.items.iter()) {
            let needed = item.encoded_size();
            if needed > available {
                return Err(SiError::EntryTooLarge { needed, available });
            }
        }
        Ok(available)
    }

    /// Splits the items into section payloads and assembles the sections.
    pub fn split(self) -> SiResult<Vec<Section>> {
        let available = self.check_items()?;
        let table_id = self.header.table_id;

        let mut next = vec![0usize; self.loops.len()];
        let mut bodies: Vec<Vec<u8>> = Vec::new();
        loop {
            let mut writer = ByteWriter::with_capacity(self.capacity());
            writer.write_bytes(&self.prefix)?;
            let mut room = available;
            let mut closed = false;

            for (index, spec) in self.loops.iter().enumerate() {
                let length_offset = writer.len();
                if spec.length_prefixed {
                    writer.write_reserved(4)?;
                    writer.write_bits("loop_length", 0, 12)?;
                }
                let start = writer.len();
                while !closed && next[index] < spec.items.len() {
                    let item = spec.items[next[index]];
                    let size = item.encoded_size();
                    if size > room {
                        closed = true;
                        break;
                    }
                    item.encode(&mut writer)?;
                    room -= size;
                    next[index] += 1;
                    if spec.one_per_section {
                        closed = true;
                    }
                }
                if spec.length_prefixed {
                    writer.patch_length12(length_offset, writer.len() - start)?;
                }
            }

            let body = writer.finish();
            trace!(
                table_id,
                section_number = bodies.len(),
                payload_len = body.len(),
                "section closed"
            );
            bodies.push(body);

            let exhausted = self
                .loops
                .iter()
                .zip(&next)
                .all(|(spec, &done)| done == spec.items.len());
            if exhausted {
                break;
            }
            if bodies.len() > MAX_SECTIONS {
                break;
            }
        }

        if bodies.len() > MAX_SECTIONS {
            return Err(SiError::TooManySections {
                table_id,
                sections: bodies.len(),
            });
        }

        let last_section_number = (bodies.len() - 1) as u8;
        if let Some(offset) = self.last_section_slot {
            for body in &mut bodies {
                let slot = body.get_mut(offset).ok_or_else(|| {
                    SiError::invalid("prefix", format!("no byte at offset {offset} for last_section_number"))
                })?;
                *slot = last_section_number;
            }
        }
        let sections = bodies
            .iter()
            .enumerate()
            .map(|(number, body)| Section::long(self.header, number as u8, last_section_number, body))
            .collect::<SiResult<Vec<_>>>()?;
        debug!(
            table_id,
            table_id_extension = self.header.table_id_extension,
            sections = sections.len(),
            "table split into sections"
        );
        Ok(sections)
    }
}
