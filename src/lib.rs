//! # dvb-si
//!
//! A library for building DVB (EN 300 468) and MPEG-2 systems (ISO/IEC
//! 13818-1) PSI/SI tables and serializing them into bit-exact sections.
//!
//! Tables own their rows and descriptors. Filling a table is done through
//! typed constructors and setters which validate every field up front;
//! [`Table::build_sections`] then splits the table over as many sections as
//! it needs, computes every length field and appends the CRC-32.
//!
//! ## Example
//!
//! ```rust
//! use dvb_si::descriptors::ServiceDescriptor;
//! use dvb_si::tables::{Sdt, SdtKind, SdtService, Table};
//! use dvb_si::types::ServiceType;
//!
//! let mut sdt = Sdt::new(SdtKind::Actual, 0x0001, 0x0002, 0)?;
//! sdt.add_service(
//!     SdtService::new(0x0010)
//!         .with_eit_present_following(true)
//!         .with_descriptor(ServiceDescriptor::new(
//!             ServiceType::DigitalTelevision,
//!             "Provider",
//!             "Channel",
//!         )?),
//! )?;
//!
//! let sections = sdt.build_sections()?;
//! assert_eq!(sections.len(), 1);
//! assert!(dvb_si::crc::validate_section_crc(sections[0].as_bytes()));
//! # Ok::<(), dvb_si::SiError>(())
//! ```
//!
//! ## Features
//!
//! - `serde`: derives `Serialize` for descriptors, sections and time values
//! - `base64`: hex and base64 renderings of sections

pub mod crc;
pub mod descriptors;
pub mod encoding;
pub mod error;
pub mod section;
pub mod splitter;
pub mod tables;
pub mod time;
pub mod types;

pub use descriptors::Descriptor;
pub use encoding::{ByteWriter, Encodable};
pub use error::{ErrorKind, SiError, SiResult};
pub use section::{Section, SectionHeader};
pub use tables::{Table, TableState};
pub use time::{BcdDuration, UtcTime};
