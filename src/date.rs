use anyhow::{anyhow, bail, Result};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, Time};

/// Closed `[start, end]` interval of epoch seconds used to gate posts by `created_utc`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: i64, // inclusive
    pub end: i64,   // inclusive
}

impl DateWindow {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if start > end {
            bail!("date window start ({start}) is after end ({end})");
        }
        Ok(Self { start, end })
    }

    /// Midnight UTC of `start` through midnight UTC of `end` (not end of day).
    pub fn from_dates(start: Date, end: Date) -> Result<Self> {
        Self::new(midnight_utc(start), midnight_utc(end))
    }

    /// Everything, for listings where only the target count matters.
    pub fn unbounded() -> Self {
        Self { start: i64::MIN, end: i64::MAX }
    }

    #[inline]
    pub fn contains(&self, ts: i64) -> bool {
        self.start <= ts && ts <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |ts: i64| epoch_to_rfc3339(ts).unwrap_or_else(|_| ts.to_string());
        write!(f, "[{} ..= {}]", show(self.start), show(self.end))
    }
}

pub fn midnight_utc(date: Date) -> i64 {
    date.with_time(Time::MIDNIGHT).assume_utc().unix_timestamp()
}

/// Render epoch seconds as an RFC3339 UTC timestamp, e.g. `2022-03-01T12:00:00Z`.
pub fn epoch_to_rfc3339(ts: i64) -> Result<String> {
    let dt = OffsetDateTime::from_unix_timestamp(ts)
        .map_err(|e| anyhow!("timestamp {ts} out of range: {e}"))?;
    Ok(dt.format(&Rfc3339)?)
}
