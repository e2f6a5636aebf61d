//! Trait definitions for encodable types.

use super::writer::ByteWriter;
use crate::error::SiResult;

/// Trait for types that can be encoded to DVB/MPEG-2 binary format.
pub trait Encodable {
    /// Encode the structure into the writer.
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()>;

    /// Calculate the encoded size in bytes.
    ///
    /// This should return the exact number of bytes that will be written
    /// when `encode` is called. Tables use it to plan section splits.
    fn encoded_size(&self) -> usize;

    /// Convenience method to encode to a new byte vector.
    fn encode_to_vec(&self) -> SiResult<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.encoded_size());
        self.encode(&mut writer)?;
        Ok(writer.finish())
    }
}

impl<T: Encodable> Encodable for [T] {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        for item in self {
            item.encode(writer)?;
        }
        Ok(())
    }

    fn encoded_size(&self) -> usize {
        self.iter().map(Encodable::encoded_size).sum()
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        self.as_slice().encode(writer)
    }

    fn encoded_size(&self) -> usize {
        self.as_slice().encoded_size()
    }
}
