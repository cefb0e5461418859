use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sirius_catalog::PriceBreakdown;

/// Where a reservation stands after the guest presses submit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    New,
    Draft,
    Confirmed,
}

/// Client-side record of an accepted reservation.
///
/// Nothing stores it; the presentation layer shows it once and resets the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub reference: String,
    pub status: ReservationStatus,
    pub reservation_type: String,
    pub activity: Option<String>,
    pub date: Option<NaiveDate>,
    pub people: u32,
    pub breakdown: PriceBreakdown,
    pub confirmed_at: DateTime<Utc>,
}

impl BookingConfirmation {
    pub fn new(
        reference: String,
        reservation_type: String,
        activity: Option<String>,
        date: Option<NaiveDate>,
        people: u32,
        breakdown: PriceBreakdown,
    ) -> Self {
        Self {
            reference,
            status: ReservationStatus::Confirmed,
            reservation_type,
            activity,
            date,
            people,
            breakdown: breakdown.rounded(),
            confirmed_at: Utc::now(),
        }
    }
}
