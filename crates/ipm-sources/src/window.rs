use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{SourceError, SourceResult};

/// Half-open measurement window `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = SourceError;

    fn try_from(raw: RawWindow) -> SourceResult<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> SourceResult<Self> {
        if end <= start {
            return Err(SourceError::InvalidWindow {
                what: format!("end {end} is not after start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length of the window; the historian averages over one interval of this size.
    pub fn seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Date used to pick well tests and reservoir pressures.
    pub fn as_of(&self) -> NaiveDate {
        self.end.date()
    }
}
