//! Windows timestamp conversions.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use chrono::{Local, NaiveDate, TimeZone};

/// 100-ns ticks per second.
const WINDOWS_TICK: u64 = 10_000_000;

/// Seconds between 1601-01-01 (the FILETIME epoch) and the Unix epoch.
const SEC_TO_UNIX_EPOCH: i64 = 11_644_473_600;

/// Convert a FILETIME tick count to seconds since the Unix epoch,
/// truncated into `u32` like the rest of the summary's timestamps.
pub(crate) fn filetime_to_epoch(ticks: u64) -> u32 {
    ((ticks / WINDOWS_TICK) as i64 - SEC_TO_UNIX_EPOCH) as u32
}

/// The 16-byte broken-down time record Oblivion embeds (eight u16 fields).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WinSystemTime {
    pub year: u16,
    pub month: u16,
    /// Present in the record, ignored by the conversion.
    #[allow(dead_code)]
    pub day_of_week: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    /// Present in the record, ignored by the conversion.
    #[allow(dead_code)]
    pub millisecond: u16,
}

impl WinSystemTime {
    /// Unix seconds for the recorded wall-clock instant.
    ///
    /// The engine records local time, so the conversion goes through the
    /// local timezone (on a DST fold the earlier instant wins).
    /// Unrepresentable dates yield 0, which hands the field over to the
    /// file-mtime fallback.
    pub(crate) fn to_epoch(self) -> u32 {
        let naive = NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        });
        let Some(naive) = naive else {
            return 0;
        };
        match Local.from_local_datetime(&naive).earliest() {
            Some(instant) => instant.timestamp() as u32,
            None => 0,
        }
    }
}
