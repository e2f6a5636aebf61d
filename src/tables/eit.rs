//! Event information table, present/following and schedule.

use tracing::debug;

use super::{MAX_PRIVATE_SECTION_LEN, TableCore, descriptors_len, long_table};
use crate::descriptors::Descriptor;
use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult};
use crate::section::Section;
use crate::splitter::LoopSpec;
use crate::time::{BcdDuration, UtcTime};
use crate::types::{RunningStatus, pid};

/// Flavour of an EIT, which fixes its table_id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EitKind {
    /// Present/following, actual transport stream (0x4E).
    PresentFollowingActual,
    /// Present/following, other transport stream (0x4F).
    PresentFollowingOther,
    /// Schedule, actual transport stream (0x50 + index).
    ScheduleActual(u8),
    /// Schedule, other transport stream (0x60 + index).
    ScheduleOther(u8),
}

impl EitKind {
    /// Returns the table_id, rejecting schedule indices above 15.
    pub fn table_id(self) -> SiResult<u8> {
        match self {
            EitKind::PresentFollowingActual => Ok(0x4E),
            EitKind::PresentFollowingOther => Ok(0x4F),
            EitKind::ScheduleActual(index) => Ok(0x50 + Self::check_index(index)?),
            EitKind::ScheduleOther(index) => Ok(0x60 + Self::check_index(index)?),
        }
    }

    pub fn is_present_following(self) -> bool {
        matches!(self, EitKind::PresentFollowingActual | EitKind::PresentFollowingOther)
    }

    fn check_index(index: u8) -> SiResult<u8> {
        if index > 0x0F {
            return Err(SiError::invalid("table_id", format!("schedule index {index} is above 15")));
        }
        Ok(index)
    }
}

/// One event row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EitEvent {
    event_id: u16,
    start_time: UtcTime,
    duration: BcdDuration,
    running_status: RunningStatus,
    free_ca_mode: bool,
    descriptors: Vec<Descriptor>,
}

impl EitEvent {
    pub fn new(event_id: u16, start_time: UtcTime, duration: BcdDuration) -> Self {
        Self {
            event_id,
            start_time,
            duration,
            running_status: RunningStatus::Undefined,
            free_ca_mode: false,
            descriptors: Vec::new(),
        }
    }

    pub fn with_running_status(mut self, running_status: RunningStatus) -> Self {
        self.running_status = running_status;
        self
    }

    pub fn with_free_ca_mode(mut self, scrambled: bool) -> Self {
        self.free_ca_mode = scrambled;
        self
    }

    pub fn with_descriptor(mut self, descriptor: impl Into<Descriptor>) -> Self {
        self.add_descriptor(descriptor);
        self
    }

    pub fn add_descriptor(&mut self, descriptor: impl Into<Descriptor>) {
        self.descriptors.push(descriptor.into());
    }

    pub fn event_id(&self) -> u16 {
        self.event_id
    }

    pub fn start_time(&self) -> UtcTime {
        self.start_time
    }

    pub fn duration(&self) -> BcdDuration {
        self.duration
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }
}

impl Encodable for EitEvent {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.event_id)?;
        // start_time (40 bits), duration (24 bits)
        self.start_time.encode(writer)?;
        self.duration.encode(writer)?;
        writer.write_bits("running_status", u64::from(self.running_status.id()), 3)?;
        writer.write_flag(self.free_ca_mode)?;
        writer.write_bits("descriptors_loop_length", descriptors_len(&self.descriptors) as u64, 12)?;
        self.descriptors.encode(writer)
    }

    fn encoded_size(&self) -> usize {
        12 + descriptors_len(&self.descriptors)
    }
}

/// Event information table.
///
/// A present/following table always produces two sections: section 0
/// carries the present event and section 1 the following event. Either may
/// be empty. A schedule table splits its events over as many sections as
/// needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eit {
    core: TableCore,
    kind: EitKind,
    transport_stream_id: u16,
    original_network_id: u16,
    last_table_id: u8,
    present: Option<EitEvent>,
    following: Option<EitEvent>,
    events: Vec<EitEvent>,
}

impl Eit {
    /// Offset of segment_last_section_number within the fixed prefix.
    const SEGMENT_LAST_OFFSET: usize = 4;

    /// last_section_number of a present/following table.
    const FOLLOWING_SECTION: u8 = 1;

    pub fn new(
        kind: EitKind,
        service_id: u16,
        transport_stream_id: u16,
        original_network_id: u16,
        version_number: u8,
    ) -> SiResult<Self> {
        let table_id = kind.table_id()?;
        Ok(Self {
            core: TableCore::versioned(table_id, true, service_id, version_number, MAX_PRIVATE_SECTION_LEN)?,
            kind,
            transport_stream_id,
            original_network_id,
            last_table_id: table_id,
            present: None,
            following: None,
            events: Vec::new(),
        })
    }

    pub fn kind(&self) -> EitKind {
        self.kind
    }

    pub fn service_id(&self) -> u16 {
        self.core.header().table_id_extension
    }

    pub fn last_table_id(&self) -> u8 {
        self.last_table_id
    }

    /// Sets the last table_id used by this service's schedule.
    ///
    /// A present/following table only accepts its own table_id. A schedule
    /// table accepts its own id up to the last id of the same actual or
    /// other range (0x5F or 0x6F).
    pub fn set_last_table_id(&mut self, last_table_id: u8) -> SiResult<()> {
        self.core.ensure_building()?;
        let table_id = self.core.table_id();
        let range_end = match self.kind {
            EitKind::PresentFollowingActual | EitKind::PresentFollowingOther => table_id,
            EitKind::ScheduleActual(_) => 0x5F,
            EitKind::ScheduleOther(_) => 0x6F,
        };
        if !(table_id..=range_end).contains(&last_table_id) {
            return Err(SiError::invalid(
                "last_table_id",
                format!("{last_table_id:#04x} outside {table_id:#04x}..={range_end:#04x}"),
            ));
        }
        self.last_table_id = last_table_id;
        Ok(())
    }

    /// Appends an event.
    ///
    /// On a present/following table this fills the present slot first and
    /// the following slot second.
    ///
    /// # Errors
    ///
    /// A present/following table returns [`SiError::TableFull`] once both
    /// slots are taken.
    pub fn add_event(&mut self, event: EitEvent) -> SiResult<()> {
        self.core.ensure_building()?;
        if !self.kind.is_present_following() {
            self.events.push(event);
            return Ok(());
        }
        if self.present.is_none() {
            self.present = Some(event);
            return Ok(());
        }
        self.add_following_event(event)
    }

    /// Sets the event carried in section 0 of a present/following table.
    pub fn add_present_event(&mut self, event: EitEvent) -> SiResult<()> {
        self.core.ensure_building()?;
        let table_id = self.core.table_id();
        let slot = self.pf_slot(0)?;
        Self::fill_slot(slot, event, table_id)
    }

    /// Sets the event carried in section 1 of a present/following table.
    pub fn add_following_event(&mut self, event: EitEvent) -> SiResult<()> {
        self.core.ensure_building()?;
        let table_id = self.core.table_id();
        let slot = self.pf_slot(1)?;
        Self::fill_slot(slot, event, table_id)
    }

    fn pf_slot(&mut self, section_number: u8) -> SiResult<&mut Option<EitEvent>> {
        if !self.kind.is_present_following() {
            return Err(SiError::invalid(
                "table_id",
                "schedule tables have no present/following events",
            ));
        }
        Ok(if section_number == 0 {
            &mut self.present
        } else {
            &mut self.following
        })
    }

    fn fill_slot(slot: &mut Option<EitEvent>, event: EitEvent, table_id: u8) -> SiResult<()> {
        if slot.is_some() {
            return Err(SiError::TableFull {
                table_id,
                needed: event.encoded_size(),
                available: 0,
            });
        }
        *slot = Some(event);
        Ok(())
    }

    /// Adds a descriptor to the first event with `event_id`.
    pub fn add_event_descriptor(&mut self, event_id: u16, descriptor: impl Into<Descriptor>) -> SiResult<()> {
        self.core.ensure_building()?;
        let event = self
            .present
            .iter_mut()
            .chain(self.following.iter_mut())
            .chain(self.events.iter_mut())
            .find(|event| event.event_id == event_id)
            .ok_or_else(|| SiError::invalid("event_id", format!("no event {event_id:#06x}")))?;
        event.add_descriptor(descriptor);
        Ok(())
    }

    pub fn present_event(&self) -> Option<&EitEvent> {
        self.present.as_ref()
    }

    pub fn following_event(&self) -> Option<&EitEvent> {
        self.following.as_ref()
    }

    /// All events, present and following first.
    pub fn events(&self) -> impl Iterator<Item = &EitEvent> {
        self.present
            .iter()
            .chain(self.following.iter())
            .chain(self.events.iter())
    }

    fn prefix(&self) -> SiResult<Vec<u8>> {
        let mut prefix = ByteWriter::with_capacity(6);
        prefix.write_u16(self.transport_stream_id)?;
        prefix.write_u16(self.original_network_id)?;
        // segment_last_section_number, filled in once the section count is known
        prefix.write_u8(0)?;
        prefix.write_u8(self.last_table_id)?;
        Ok(prefix.finish())
    }

    fn encode_sections(&self) -> SiResult<Vec<Section>> {
        if self.kind.is_present_following() {
            return self.encode_present_following();
        }
        self.core
            .splitter()
            .prefix(self.prefix()?)
            .last_section_number_at(Self::SEGMENT_LAST_OFFSET)
            .push_loop(LoopSpec::bare(&self.events))
            .split()
    }

    fn encode_present_following(&self) -> SiResult<Vec<Section>> {
        let mut prefix = self.prefix()?;
        prefix[Self::SEGMENT_LAST_OFFSET] = Self::FOLLOWING_SECTION;

        let available = self.core.splitter().prefix(prefix.clone()).item_capacity();
        let slots = [&self.present, &self.following];
        for event in slots.into_iter().flatten() {
            let needed = event.encoded_size();
            if needed > available {
                return Err(SiError::EntryTooLarge { needed, available });
            }
        }

        let sections = slots
            .into_iter()
            .zip(0u8..)
            .map(|(slot, section_number)| {
                let mut body = ByteWriter::with_capacity(prefix.len() + available);
                body.write_bytes(&prefix)?;
                if let Some(event) = slot {
                    event.encode(&mut body)?;
                }
                Section::long(
                    self.core.header(),
                    section_number,
                    Self::FOLLOWING_SECTION,
                    &body.finish(),
                )
            })
            .collect::<SiResult<Vec<_>>>()?;
        debug!(
            table_id = self.core.table_id(),
            service_id = self.service_id(),
            present = self.present.is_some(),
            following = self.following.is_some(),
            "present/following sections built"
        );
        Ok(sections)
    }
}

long_table!(Eit, pid::EIT);
