//! UTC and duration codecs used by the EIT, TDT, TOT and local time offset
//! descriptor.
//!
//! Times are carried as 16 bits of Modified Julian Date followed by six
//! BCD digits (hhmmss). Durations are six BCD digits.

use crate::encoding::{ByteWriter, Encodable};
use crate::error::{SiError, SiResult};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};

#[cfg(feature = "serde")]
use serde::Serialize;

/// First date whose MJD fits the 16-bit field with the EN 300 468 formula.
const MJD_MIN: i64 = 15079; // 1900-03-01

fn mjd_epoch() -> NaiveDate {
    // 1858-11-17 is always a valid date.
    NaiveDate::from_ymd_opt(1858, 11, 17).unwrap_or(NaiveDate::MIN)
}

/// Converts a calendar date to its Modified Julian Date.
///
/// Equivalent to the EN 300 468 Annex C formula
/// `14956 + D + int((Y - L) * 365.25) + int((M + 1 + L * 12) * 30.6001)`
/// over its whole valid range.
pub fn date_to_mjd(date: NaiveDate) -> SiResult<u16> {
    let mjd = date.signed_duration_since(mjd_epoch()).num_days();
    if !(MJD_MIN..=i64::from(u16::MAX)).contains(&mjd) {
        return Err(SiError::invalid(
            "date",
            format!("{date} is outside the 16-bit MJD range"),
        ));
    }
    Ok(mjd as u16)
}

/// Converts a value in 0..=99 to packed BCD.
pub fn to_bcd(field: &'static str, value: u8) -> SiResult<u8> {
    if value > 99 {
        return Err(SiError::invalid(field, format!("{value} needs more than two BCD digits")));
    }
    Ok(((value / 10) << 4) | (value % 10))
}

/// A UTC instant encoded as MJD + BCD time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct UtcTime {
    datetime: NaiveDateTime,
    mjd: u16,
}

impl UtcTime {
    /// Builds a UTC time from calendar parts.
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> SiResult<Self> {
        let datetime = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .ok_or_else(|| {
                SiError::invalid(
                    "utc_time",
                    format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02} is not a valid time"),
                )
            })?;
        Self::from_naive(datetime)
    }

    /// Builds a UTC time from a naive date and time taken as UTC.
    pub fn from_naive(datetime: NaiveDateTime) -> SiResult<Self> {
        let mjd = date_to_mjd(datetime.date())?;
        Ok(Self { datetime, mjd })
    }

    /// Builds a UTC time from a `chrono` UTC timestamp. Sub-second precision
    /// is dropped.
    pub fn from_datetime(datetime: DateTime<Utc>) -> SiResult<Self> {
        Self::from_naive(datetime.naive_utc())
    }

    /// Current system time.
    pub fn now() -> SiResult<Self> {
        Self::from_datetime(Utc::now())
    }

    pub fn mjd(&self) -> u16 {
        self.mjd
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn year(&self) -> i32 {
        self.datetime.year()
    }
}

impl Encodable for UtcTime {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u16(self.mjd)?;
        writer.write_u8(to_bcd("hour", self.datetime.hour() as u8)?)?;
        writer.write_u8(to_bcd("minute", self.datetime.minute() as u8)?)?;
        // Leap seconds are reported by chrono as second 59.
        writer.write_u8(to_bcd("second", self.datetime.second() as u8)?)
    }

    fn encoded_size(&self) -> usize {
        5
    }
}

/// A duration of up to 99:59:59, encoded as six BCD digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BcdDuration {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl BcdDuration {
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> SiResult<Self> {
        if hours > 99 {
            return Err(SiError::invalid("hours", format!("{hours} > 99")));
        }
        if minutes > 59 {
            return Err(SiError::invalid("minutes", format!("{minutes} > 59")));
        }
        if seconds > 59 {
            return Err(SiError::invalid("seconds", format!("{seconds} > 59")));
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Splits a number of seconds into hours, minutes and seconds.
    pub fn from_secs(total: u32) -> SiResult<Self> {
        let hours = total / 3600;
        if hours > 99 {
            return Err(SiError::invalid("duration", format!("{total}s exceeds 99:59:59")));
        }
        Self::new(hours as u8, ((total / 60) % 60) as u8, (total % 60) as u8)
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }
}

impl Encodable for BcdDuration {
    fn encode(&self, writer: &mut ByteWriter) -> SiResult<()> {
        writer.write_u8(to_bcd("hours", self.hours)?)?;
        writer.write_u8(to_bcd("minutes", self.minutes)?)?;
        writer.write_u8(to_bcd("seconds", self.seconds)?)
    }

    fn encoded_size(&self) -> usize {
        3
    }
}
