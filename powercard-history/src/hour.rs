use std::fmt::{Debug, Display, Formatter};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Instant at which a local calendar hour begins.
///
/// Computed by stepping back by the local minutes and seconds, so two
/// physical hours never share a key, even across a daylight-saving switch.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, derive_more::Into)]
#[must_use]
pub struct HourStart(DateTime<Local>);

impl HourStart {
    pub fn floor(at: DateTime<Local>) -> Self {
        Self(floor_hour(at))
    }

    /// Hour that started `n_hours` physical hours earlier, if it is representable.
    #[must_use]
    pub fn hours_before(self, n_hours: u32) -> Option<Self> {
        self.0.checked_sub_signed(TimeDelta::hours(i64::from(n_hours))).map(Self)
    }

    #[must_use]
    pub const fn as_datetime(self) -> DateTime<Local> {
        self.0
    }

    #[must_use]
    pub fn timestamp_millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn from_timestamp_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|at| Self::floor(at.with_timezone(&Local)))
    }

    /// Local wall-clock label, for example `14:00`.
    #[must_use]
    pub fn label(self) -> String {
        hour_label(&self.0)
    }
}

impl Debug for HourStart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M%:z"))
    }
}

impl Display for HourStart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M"))
    }
}

impl Serialize for HourStart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.timestamp_millis())
    }
}

impl<'de> Deserialize<'de> for HourStart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        Self::from_timestamp_millis(millis)
            .ok_or_else(|| de::Error::custom(format!("timestamp `{millis}` is out of range")))
    }
}

/// Local midnight of the day containing `now`.
///
/// Falls back to the first existing local hour of the day when midnight was
/// skipped by a daylight-saving switch.
pub fn start_of_day(now: DateTime<Local>) -> DateTime<Local> {
    day_start(&now)
}

fn floor_hour<Tz: TimeZone>(at: DateTime<Tz>) -> DateTime<Tz> {
    let into_hour = TimeDelta::seconds(i64::from(at.minute() * 60 + at.second()))
        + TimeDelta::nanoseconds(i64::from(at.nanosecond()));
    at.clone().checked_sub_signed(into_hour).unwrap_or(at)
}

fn day_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let date = now.date_naive();
    (0..24)
        .find_map(|hour| {
            date.and_hms_opt(hour, 0, 0)?.and_local_timezone(now.timezone()).earliest()
        })
        .unwrap_or_else(|| floor_hour(now.clone()))
}

fn hour_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%H:%M").to_string()
}
