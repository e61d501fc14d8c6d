use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "now". Swapped out in tests to pin the reference date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Timezone the reference date is computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceZone {
    /// The process's local timezone.
    #[default]
    Local,
    Named(Tz),
}

impl FromStr for ReferenceZone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("local") {
            return Ok(ReferenceZone::Local);
        }
        s.parse::<Tz>().map(ReferenceZone::Named).map_err(|_| {
            Error::ConfigValidation(format!(
                "unknown timezone: {s} (expected an IANA name such as UTC or America/New_York, or \"local\")"
            ))
        })
    }
}

impl ReferenceZone {
    /// `now` as a `YYYY-MM-DD` date in this zone.
    pub fn today(&self, now: DateTime<Utc>) -> String {
        match self {
            ReferenceZone::Local => now.with_timezone(&Local).format(DATE_FORMAT).to_string(),
            ReferenceZone::Named(tz) => now.with_timezone(tz).format(DATE_FORMAT).to_string(),
        }
    }
}
