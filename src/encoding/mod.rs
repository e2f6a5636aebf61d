//! Binary encoding support for SI sections and descriptors.
//!
//! This module provides the bit-level writer every descriptor and table
//! serializes through, and the [`Encodable`] trait they implement.

/// Bit-level writer for encoding binary data.
pub mod writer;

/// Trait definitions for encodable types.
pub mod traits;

pub use traits::Encodable;
pub use writer::ByteWriter;
