//! Shift definition model and related types.
//!
//! This module defines the [`ShiftDefinition`] struct together with the
//! [`ShiftTime`] wall-clock type and the [`DayCode`] weekday codes used to
//! restrict a shift to particular days.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Number of minutes in a day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// A wall-clock time of day at minute granularity, written as `HH:MM`.
///
/// # Examples
///
/// ```
/// use shift_attendance::models::ShiftTime;
///
/// let time: ShiftTime = "17:30".parse().unwrap();
/// assert_eq!(time.minutes(), 17 * 60 + 30);
/// assert_eq!(time.to_string(), "17:30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShiftTime(u32);

impl ShiftTime {
    /// Creates a time from an hour and minute, returning `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    /// Creates a time from minutes since midnight, wrapping at 24 hours.
    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes % MINUTES_PER_DAY)
    }

    /// Returns the number of minutes since midnight.
    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Returns this time as a [`NaiveTime`].
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.0 / 60, self.0 % 60, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for ShiftTime {
    fn from(time: NaiveTime) -> Self {
        Self(time.hour() * 60 + time.minute())
    }
}

impl From<NaiveDateTime> for ShiftTime {
    fn from(datetime: NaiveDateTime) -> Self {
        datetime.time().into()
    }
}

impl fmt::Display for ShiftTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for ShiftTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got '{}'", s))?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(format!("expected HH:MM, got '{}'", s));
        }
        let hour: u32 = hour
            .parse()
            .map_err(|_| format!("invalid hour in '{}'", s))?;
        let minute: u32 = minute
            .parse()
            .map_err(|_| format!("invalid minute in '{}'", s))?;
        Self::from_hm(hour, minute).ok_or_else(|| format!("time out of range: '{}'", s))
    }
}

impl TryFrom<String> for ShiftTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShiftTime> for String {
    fn from(time: ShiftTime) -> Self {
        time.to_string()
    }
}

/// A weekday code used to restrict the days a shift runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayCode {
    /// Monday.
    Mon,
    /// Tuesday.
    Tue,
    /// Wednesday.
    Wed,
    /// Thursday.
    Thu,
    /// Friday.
    Fri,
    /// Saturday.
    Sat,
    /// Sunday.
    Sun,
}

impl From<Weekday> for DayCode {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayCode::Mon,
            Weekday::Tue => DayCode::Tue,
            Weekday::Wed => DayCode::Wed,
            Weekday::Thu => DayCode::Thu,
            Weekday::Fri => DayCode::Fri,
            Weekday::Sat => DayCode::Sat,
            Weekday::Sun => DayCode::Sun,
        }
    }
}

/// A named, time-windowed shift that staff can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDefinition {
    /// Unique identifier for the shift.
    pub id: String,
    /// Unique display name, 2-50 characters.
    pub name: String,
    /// Nominal start time.
    pub start_time: ShiftTime,
    /// Nominal end time. Earlier than `start_time` for overnight shifts.
    pub end_time: ShiftTime,
    /// Tolerance in minutes before start and after end (0-60).
    #[serde(default)]
    pub grace_period_minutes: u32,
    /// Days the shift runs on. `None` means every day.
    #[serde(default)]
    pub days_of_week: Option<BTreeSet<DayCode>>,
    /// Inactive shifts admit nobody.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// When the definition was created.
    pub created_at: NaiveDateTime,
    /// When the definition was last edited.
    pub updated_at: NaiveDateTime,
}

fn default_active() -> bool {
    true
}

impl ShiftDefinition {
    /// Returns true if the shift's end time is earlier than its start time.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_attendance::models::{ShiftDefinition, ShiftTime};
    /// use chrono::NaiveDateTime;
    ///
    /// let created = NaiveDateTime::parse_from_str("2026-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let night = ShiftDefinition {
    ///     id: "shift_night".to_string(),
    ///     name: "Night".to_string(),
    ///     start_time: "22:00".parse().unwrap(),
    ///     end_time: "06:00".parse().unwrap(),
    ///     grace_period_minutes: 0,
    ///     days_of_week: None,
    ///     is_active: true,
    ///     created_at: created,
    ///     updated_at: created,
    /// };
    /// assert!(night.is_overnight());
    /// ```
    pub fn is_overnight(&self) -> bool {
        self.start_time > self.end_time
    }

    /// Returns the nominal length of the shift in minutes, accounting for wraparound.
    pub fn duration_minutes(&self) -> u32 {
        (self.end_time.minutes() + MINUTES_PER_DAY - self.start_time.minutes()) % MINUTES_PER_DAY
    }

    /// Returns true if the shift runs on the given weekday.
    pub fn runs_on(&self, weekday: Weekday) -> bool {
        match &self.days_of_week {
            Some(days) => days.contains(&DayCode::from(weekday)),
            None => true,
        }
    }
}
