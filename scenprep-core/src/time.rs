use std::{fmt::Display, str::FromStr};

use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

use crate::DocumentError;

pub const SECONDS_PER_DAY: u32 = 86_400;

/// whole seconds since midnight, or since a trip's first departure when used
/// as a route offset. rendered as zero-padded `HH:MM:SS` where the hours field
/// may exceed 23 for service running past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(pub u32);

impl ClockTime {
    pub const ZERO: ClockTime = ClockTime(0);

    /// panics on overflow, use [`ClockTime::checked_from_hms`] for input values.
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> ClockTime {
        ClockTime(hours * 3600 + minutes * 60 + seconds)
    }

    /// None when the total number of seconds does not fit.
    pub fn checked_from_hms(hours: u32, minutes: u32, seconds: u32) -> Option<ClockTime> {
        hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)
            .map(ClockTime)
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// the same instant folded back into a single day.
    pub fn time_of_day(&self) -> ClockTime {
        ClockTime(self.0 % SECONDS_PER_DAY)
    }

    pub fn checked_add(&self, other: ClockTime) -> Option<ClockTime> {
        self.0.checked_add(other.0).map(ClockTime)
    }
}

/// elapsed time from `earlier` to `later`, both read as times of day. when
/// `later` is smaller than `earlier` it is taken to occur on the following day.
pub fn elapsed_with_rollover(earlier: ClockTime, later: ClockTime) -> ClockTime {
    let (e, l) = (earlier.time_of_day().0, later.time_of_day().0);
    if l < e {
        ClockTime(l + SECONDS_PER_DAY - e)
    } else {
        ClockTime(l - e)
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl FromStr for ClockTime {
    type Err = DocumentError;

    /// accepts `HH:MM:SS` and `HH:MM`. fractional seconds are truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DocumentError::InvalidTime(s.to_string());
        let parts = s.trim().split(':').collect::<Vec<_>>();
        let (h, m, sec) = match parts.as_slice() {
            [h, m] => (*h, *m, "0"),
            [h, m, sec] => (*h, *m, *sec),
            _ => return Err(invalid()),
        };
        let hours = h.parse::<u32>().map_err(|_| invalid())?;
        let minutes = m.parse::<u32>().map_err(|_| invalid())?;
        let seconds = match sec.parse::<u32>() {
            Ok(v) => v,
            Err(_) => {
                let v = sec.parse::<f64>().map_err(|_| invalid())?;
                if !v.is_finite() || v < 0.0 {
                    return Err(invalid());
                }
                v.trunc() as u32
            }
        };
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }
        ClockTime::checked_from_hms(hours, minutes, seconds).ok_or_else(invalid)
    }
}

impl Serialize for ClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ClockTime::from_str(&s).map_err(|e| D::Error::custom(e.to_string()))
    }
}
