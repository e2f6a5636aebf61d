//! Error types shared by the writer, descriptors and tables.

use thiserror::Error;

/// Result type for every fallible operation in this crate.
pub type SiResult<T> = Result<T, SiError>;

/// Broad classification of an [`SiError`].
///
/// - `Construction`: a parameter lies outside its enumeration or bit width.
/// - `State`: a table was mutated after serialization started.
/// - `Capacity`: content cannot be placed in the available section space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Construction,
    State,
    Capacity,
}

/// Errors that can occur while building descriptors, tables and sections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiError {
    /// Value exceeds the maximum allowed for its bit width.
    #[error("value {value:#x} does not fit in {bits}-bit field `{field}`")]
    ValueTooLarge {
        /// Name of the field.
        field: &'static str,
        /// Width of the field in bits.
        bits: u8,
        /// Value that was supplied.
        value: u64,
    },

    /// Value is representable but not part of the field's enumeration.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A descriptor payload would exceed the 255 byte limit.
    #[error("descriptor 0x{tag:02x} payload of {length} bytes exceeds 255")]
    DescriptorTooLong {
        /// Descriptor tag.
        tag: u8,
        /// Resulting payload length.
        length: usize,
    },

    /// A table setting is outside its allowed range.
    #[error("invalid configuration for `{setting}`: {value} (allowed {min}..={max})")]
    InvalidConfig {
        /// Name of the setting.
        setting: &'static str,
        /// Requested value.
        value: usize,
        /// Smallest allowed value.
        min: usize,
        /// Largest allowed value.
        max: usize,
    },

    /// The table was already serialized and can no longer be changed.
    #[error("table 0x{table_id:02x} has been serialized and can no longer be modified")]
    TableSealed {
        /// Table id of the sealed table.
        table_id: u8,
    },

    /// A single row (or top-level descriptor) does not fit in an empty section.
    #[error("entry of {needed} bytes cannot fit in a section with {available} bytes of room")]
    EntryTooLarge {
        /// Bytes the entry needs.
        needed: usize,
        /// Bytes available in an otherwise empty section.
        available: usize,
    },

    /// A single-section table has no room for more data.
    #[error("table 0x{table_id:02x} is full: {needed} more bytes requested, {available} left")]
    TableFull {
        /// Table id.
        table_id: u8,
        /// Bytes requested.
        needed: usize,
        /// Bytes still available.
        available: usize,
    },

    /// The table needs more than 256 sections.
    #[error("table 0x{table_id:02x} needs {sections} sections, at most 256 are allowed")]
    TooManySections {
        /// Table id.
        table_id: u8,
        /// Number of sections that would be required.
        sections: usize,
    },
}

impl SiError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SiError::ValueTooLarge { .. }
            | SiError::InvalidValue { .. }
            | SiError::DescriptorTooLong { .. }
            | SiError::InvalidConfig { .. } => ErrorKind::Construction,
            SiError::TableSealed { .. } => ErrorKind::State,
            SiError::EntryTooLarge { .. }
            | SiError::TableFull { .. }
            | SiError::TooManySections { .. } => ErrorKind::Capacity,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SiError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Fails with [`SiError::ValueTooLarge`] when `value` needs more than `bits` bits.
pub(crate) fn check_bits(field: &'static str, value: u64, bits: u8) -> SiResult<()> {
    if bits < 64 && value >> bits != 0 {
        return Err(SiError::ValueTooLarge { field, bits, value });
    }
    Ok(())
}
