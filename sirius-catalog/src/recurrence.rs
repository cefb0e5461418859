use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How often a recurring course repeats.
///
/// Anything other than the three known values parses to `Other` instead of
/// failing, so an old or hand-edited draft still loads and bills one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Other,
}

impl RecurrenceFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceFrequency::Weekly => "weekly",
            RecurrenceFrequency::Biweekly => "biweekly",
            RecurrenceFrequency::Monthly => "monthly",
            RecurrenceFrequency::Other => "other",
        }
    }

    /// Sessions per calendar month, `None` when the frequency is not billable per month.
    fn sessions_per_month(&self) -> Option<i64> {
        match self {
            RecurrenceFrequency::Weekly => Some(4),
            RecurrenceFrequency::Biweekly => Some(2),
            RecurrenceFrequency::Monthly => Some(1),
            RecurrenceFrequency::Other => None,
        }
    }
}

impl FromStr for RecurrenceFrequency {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => RecurrenceFrequency::Weekly,
            "biweekly" => RecurrenceFrequency::Biweekly,
            "monthly" => RecurrenceFrequency::Monthly,
            _ => RecurrenceFrequency::Other,
        })
    }
}

impl fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecurrenceFrequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecurrenceFrequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(RecurrenceFrequency::Other))
    }
}

/// Start, end and cadence of a recurring booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrencePlan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub frequency: Option<RecurrenceFrequency>,
}

impl RecurrencePlan {
    pub fn new(start: NaiveDate, end: NaiveDate, frequency: Option<RecurrenceFrequency>) -> Self {
        Self { start, end, frequency }
    }

    /// Whole calendar months between start and end. Days are ignored, so
    /// Jan 31 -> Feb 1 counts as one month and Jan 1 -> Jan 31 as zero.
    pub fn months(&self) -> i64 {
        (self.end.year() as i64 - self.start.year() as i64) * 12
            + (self.end.month() as i64 - self.start.month() as i64)
    }

    /// Raw occurrence count. May be zero or negative when the end date does
    /// not reach a later month.
    pub fn occurrences(&self) -> i64 {
        match self.frequency.and_then(|f| f.sessions_per_month()) {
            Some(per_month) => self.months() * per_month,
            None => 1,
        }
    }

    /// Occurrences actually billed: never fewer than one session.
    pub fn billable_occurrences(&self) -> u32 {
        self.occurrences().clamp(1, u32::MAX as i64) as u32
    }
}
