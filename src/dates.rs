//! Canonical calendar date at the system boundary. External `"M/D/YYYY"`
//! strings (storage keys, extraction output) are parsed into a `DateKey`
//! immediately and rendered back only when a document is written.

use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub(crate) const MONTHS_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub(crate) const WEEKDAYS_ABBR: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 1-12.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month_name(&self) -> &'static str {
        MONTHS[self.0.month0() as usize]
    }

    pub(crate) fn month_abbr(&self) -> &'static str {
        MONTHS_ABBR[self.0.month0() as usize]
    }

    pub(crate) fn weekday_abbr(&self) -> &'static str {
        WEEKDAYS_ABBR[self.0.weekday().num_days_from_sunday() as usize]
    }
}

impl FromStr for DateKey {
    type Err = CoreError;

    /// Accepts both the storage form (`3/4/2024`) and the extraction form
    /// (`03/04/2024`). Out-of-range day or month is rejected, not clamped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CoreError::Validation(format!("Invalid date: {:?}", s));
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(bad());
        }
        let month: u32 = parts[0].parse().map_err(|_| bad())?;
        let day: u32 = parts[1].parse().map_err(|_| bad())?;
        let year: i32 = parts[2].parse().map_err(|_| bad())?;
        Self::from_ymd(year, month, day).ok_or_else(bad)
    }
}

impl fmt::Display for DateKey {
    /// Storage form, no zero padding: `3/4/2024`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.month(), self.day(), self.year())
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
