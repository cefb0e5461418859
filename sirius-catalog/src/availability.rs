use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar entry for a reservation type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateAvailability {
    pub date: NaiveDate,
    pub available: bool,
}

impl DateAvailability {
    pub fn open(date: NaiveDate) -> Self {
        Self { date, available: true }
    }

    pub fn closed(date: NaiveDate) -> Self {
        Self { date, available: false }
    }
}

/// Why a date cannot be booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DateRejection {
    #[error("date is in the past")]
    InPast,

    #[error("date is not offered for this reservation type")]
    Unlisted,

    #[error("date is fully booked")]
    Unavailable,
}

/// Availability for a single reservation type.
///
/// Only dates listed with `available: true` can be booked. Unlisted dates are
/// treated as unavailable. A date listed twice keeps the later entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityCalendar {
    entries: BTreeMap<NaiveDate, bool>,
}

impl AvailabilityCalendar {
    pub fn new(entries: &[DateAvailability]) -> Self {
        Self {
            entries: entries.iter().map(|e| (e.date, e.available)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dates explicitly listed as unavailable, ascending.
    pub fn disabled_dates(&self) -> Vec<NaiveDate> {
        self.entries
            .iter()
            .filter(|(_, available)| !**available)
            .map(|(date, _)| *date)
            .collect()
    }

    /// Dates explicitly listed as available, ascending.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.entries
            .iter()
            .filter(|(_, available)| **available)
            .map(|(date, _)| *date)
            .collect()
    }

    /// What a date picker should grey out: listed-unavailable or unlisted.
    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        !self.entries.get(&date).copied().unwrap_or(false)
    }

    pub fn check(&self, date: NaiveDate, today: NaiveDate) -> Result<(), DateRejection> {
        if date < today {
            return Err(DateRejection::InPast);
        }

        match self.entries.get(&date) {
            None => Err(DateRejection::Unlisted),
            Some(false) => Err(DateRejection::Unavailable),
            Some(true) => Ok(()),
        }
    }

    pub fn is_bookable(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.check(date, today).is_ok()
    }
}
