use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use sirius_catalog::{AvailabilityCalendar, DateRejection};
use std::fmt;
use std::sync::OnceLock;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PHONE_LEN: usize = 10;

/// A message attached to one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every problem found in one validation pass, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record `result` against `field` when it failed.
    pub fn check(&mut self, field: &'static str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// First message recorded for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)+$",
        )
        .expect("email pattern compiles")
    })
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err("Name must be at least 2 characters.".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if !email_regex().is_match(email.trim()) {
        return Err("Please enter a valid email address.".to_string());
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.trim().chars().count() < MIN_PHONE_LEN {
        return Err("Please enter a valid phone number.".to_string());
    }
    Ok(())
}

pub fn validate_people(people: u32) -> Result<(), String> {
    if people < 1 {
        return Err("Please enter the number of people.".to_string());
    }
    Ok(())
}

/// A booking date must be today or later and listed as available for the type.
pub fn validate_booking_date(
    calendar: &AvailabilityCalendar,
    date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), String> {
    let Some(date) = date else {
        return Err("Please select a date.".to_string());
    };

    calendar.check(date, today).map_err(|rejection| match rejection {
        DateRejection::InPast => "The selected date is in the past.".to_string(),
        DateRejection::Unlisted => "The selected date is not offered for this reservation.".to_string(),
        DateRejection::Unavailable => "The selected date is not available.".to_string(),
    })
}

/// Departure must fall strictly after arrival; zero or negative stays are rejected, not corrected.
pub fn validate_stay_range(arrival: NaiveDate, departure: NaiveDate) -> Result<(), String> {
    if departure <= arrival {
        return Err("Departure date must be after the arrival date.".to_string());
    }
    Ok(())
}

pub fn validate_recurrence_end(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), String> {
    match end {
        None => Err("Please select when the recurring booking ends.".to_string()),
        Some(end) if end <= start => {
            Err("The recurring booking must end after its first session.".to_string())
        }
        Some(_) => Ok(()),
    }
}
