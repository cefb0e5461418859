use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sirius_catalog::{
    CatalogRepository, PricingConfig, QuoteRequest, RecurrenceFrequency, RecurrencePlan, ReservationCategory,
};
use sirius_core::validation::{
    validate_booking_date, validate_email, validate_name, validate_people, validate_phone,
    validate_recurrence_end, validate_stay_range,
};
use sirius_core::ValidationErrors;
use sirius_shared::Masked;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notifications {
    pub email: bool,
    pub sms: bool,
}

impl Default for Notifications {
    fn default() -> Self {
        Self { email: true, sms: false }
    }
}

/// Every value the reservation form collects.
///
/// This is also the draft format: field names are camelCase and dates are
/// ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationForm {
    pub name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,

    /// Arrival day for stays, session day (or first session) for courses
    #[serde(with = "iso_date")]
    pub date: Option<NaiveDate>,
    #[serde(with = "iso_date")]
    pub departure_date: Option<NaiveDate>,

    #[serde(deserialize_with = "non_empty")]
    pub reservation_type: Option<String>,
    #[serde(deserialize_with = "non_empty")]
    pub activity: Option<String>,
    #[serde(deserialize_with = "head_count")]
    pub people: u32,
    #[serde(deserialize_with = "non_empty")]
    pub message: Option<String>,

    pub is_recurring: bool,
    #[serde(deserialize_with = "frequency")]
    pub recurrence_frequency: Option<RecurrenceFrequency>,
    #[serde(with = "iso_date")]
    pub recurrence_end_date: Option<NaiveDate>,

    #[serde(deserialize_with = "non_empty")]
    pub payment_method: Option<String>,
    #[serde(deserialize_with = "non_empty")]
    pub coupon_code: Option<String>,
    pub additional_services: Vec<String>,
    pub save_as_draft: bool,
    pub notifications: Notifications,
}

impl Default for ReservationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: Masked::default(),
            phone: Masked::default(),
            date: None,
            departure_date: None,
            reservation_type: None,
            activity: None,
            people: 1,
            message: None,
            is_recurring: false,
            recurrence_frequency: None,
            recurrence_end_date: None,
            payment_method: None,
            coupon_code: None,
            additional_services: Vec::new(),
            save_as_draft: false,
            notifications: Notifications::default(),
        }
    }
}

impl ReservationForm {
    /// The recurring series, when the flag and all its fields are filled in.
    pub fn recurrence_plan(&self) -> Option<RecurrencePlan> {
        if !self.is_recurring {
            return None;
        }
        match (self.date, self.recurrence_end_date, self.recurrence_frequency) {
            (Some(start), Some(end), Some(frequency)) => Some(RecurrencePlan::new(start, end, Some(frequency))),
            _ => None,
        }
    }

    pub fn quote_request(&self) -> QuoteRequest<'_> {
        QuoteRequest {
            reservation_type: self.reservation_type.as_deref(),
            activity: self.activity.as_deref(),
            people: Some(self.people),
            arrival: self.date,
            departure: self.departure_date,
            recurrence: self.recurrence_plan(),
            services: &self.additional_services,
            coupon_code: self.coupon_code.as_deref(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Field-level checks run before a submission is accepted.
    pub fn validate<C: CatalogRepository + ?Sized>(
        &self,
        catalog: &C,
        pricing: &PricingConfig,
        today: NaiveDate,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("name", validate_name(&self.name));
        errors.check("email", validate_email(self.email.expose()));
        errors.check("phone", validate_phone(self.phone.expose()));

        let type_id = match self.reservation_type.as_deref() {
            None => {
                errors.add("reservationType", "Please select a reservation type.");
                None
            }
            Some(id) if catalog.reservation_type(id).is_none() => {
                errors.add("reservationType", "This reservation type is not offered.");
                None
            }
            Some(id) => Some(id),
        };

        match (type_id, self.activity.as_deref()) {
            (_, None) => errors.add("activity", "Please select an activity."),
            (Some(t), Some(a)) if catalog.activity(t, a).is_none() => {
                errors.add("activity", "This activity is not offered for the selected reservation type.")
            }
            _ => {}
        }

        errors.check("people", validate_people(self.people));

        if let Some(t) = type_id {
            errors.check("date", validate_booking_date(&catalog.availability(t), self.date, today));

            if pricing.category(t) == ReservationCategory::Stay {
                if let (Some(arrival), Some(departure)) = (self.date, self.departure_date) {
                    errors.check("departureDate", validate_stay_range(arrival, departure));
                }
            }

            if self.is_recurring {
                if !pricing.allows_recurring(t) {
                    errors.add("isRecurring", "Recurring bookings are not offered for this reservation type.");
                }
                if self.recurrence_frequency.is_none() {
                    errors.add("recurrenceFrequency", "Please select how often the booking repeats.");
                }
                if let Some(start) = self.date {
                    errors.check("recurrenceEndDate", validate_recurrence_end(start, self.recurrence_end_date));
                }
            }
        } else if self.date.is_none() {
            errors.add("date", "Please select a date.");
        }

        errors.into_result()
    }
}

/// Dates travel as `YYYY-MM-DD`. Full RFC 3339 timestamps are accepted on
/// read and cut to the date in their own offset.
mod iso_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            return Ok(Some(date));
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.date_naive()))
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", raw, e)))
    }
}

fn non_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn frequency<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<RecurrenceFrequency>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse().unwrap_or(RecurrenceFrequency::Other)))
}

/// Head-count arrives as a number or, from older drafts, a numeric string.
/// Anything unreadable counts as one person.
fn head_count<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
        Other(serde_json::Value),
    }

    let count = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => u32::try_from(n).ok(),
        Raw::Text(s) => s.trim().parse::<u32>().ok(),
        Raw::Other(_) => None,
    };
    Ok(count.unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sirius_catalog::StaticCatalog;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn valid_stay() -> ReservationForm {
        ReservationForm {
            name: "Lucía".to_string(),
            email: Masked::from("lucia@example.com"),
            phone: Masked::from("+34 600 111 222"),
            date: Some(day(10)),
            departure_date: Some(day(13)),
            reservation_type: Some("stay".to_string()),
            activity: Some("deluxe".to_string()),
            people: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_stay_passes() {
        let catalog = StaticCatalog::seeded();
        let result = valid_stay().validate(&catalog, &PricingConfig::default(), day(1));
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_departure_not_after_arrival_is_rejected() {
        let catalog = StaticCatalog::seeded();
        let form = ReservationForm {
            departure_date: Some(day(10)),
            ..valid_stay()
        };

        let errors = form.validate(&catalog, &PricingConfig::default(), day(1)).unwrap_err();
        assert!(errors.get("departureDate").is_some());
    }

    #[test]
    fn test_unavailable_and_past_dates_are_rejected() {
        let catalog = StaticCatalog::seeded();
        let pricing = PricingConfig::default();

        let closed = ReservationForm { date: Some(day(15)), departure_date: Some(day(17)), ..valid_stay() };
        assert!(closed.validate(&catalog, &pricing, day(1)).unwrap_err().get("date").is_some());

        let unlisted = ReservationForm { date: Some(day(20)), departure_date: Some(day(21)), ..valid_stay() };
        assert!(unlisted.validate(&catalog, &pricing, day(1)).unwrap_err().get("date").is_some());

        let past = valid_stay();
        assert!(past.validate(&catalog, &pricing, day(11)).unwrap_err().get("date").is_some());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let catalog = StaticCatalog::seeded();
        let errors = ReservationForm::default()
            .validate(&catalog, &PricingConfig::default(), day(1))
            .unwrap_err();

        for field in ["name", "email", "phone", "reservationType", "activity", "date"] {
            assert!(errors.get(field).is_some(), "missing error for {}", field);
        }
    }

    #[test]
    fn test_recurring_requires_allowed_type_and_fields() {
        let catalog = StaticCatalog::seeded();
        let pricing = PricingConfig::default();

        let form = ReservationForm { is_recurring: true, ..valid_stay() };
        let errors = form.validate(&catalog, &pricing, day(1)).unwrap_err();
        assert!(errors.get("isRecurring").is_some());
        assert!(errors.get("recurrenceFrequency").is_some());
        assert!(errors.get("recurrenceEndDate").is_some());

        let course = ReservationForm {
            reservation_type: Some("culinary".to_string()),
            activity: Some("baking".to_string()),
            date: Some(day(12)),
            departure_date: None,
            is_recurring: true,
            recurrence_frequency: Some(RecurrenceFrequency::Monthly),
            recurrence_end_date: Some(NaiveDate::from_ymd_opt(2025, 9, 12).unwrap()),
            ..valid_stay()
        };
        assert!(course.validate(&catalog, &pricing, day(1)).is_ok());
    }

    #[test]
    fn test_recurrence_plan_needs_every_field() {
        let mut form = ReservationForm {
            date: Some(day(12)),
            is_recurring: true,
            recurrence_frequency: Some(RecurrenceFrequency::Weekly),
            ..Default::default()
        };
        assert!(form.recurrence_plan().is_none());

        form.recurrence_end_date = Some(NaiveDate::from_ymd_opt(2025, 8, 12).unwrap());
        assert_eq!(form.recurrence_plan().unwrap().occurrences(), 8);

        form.is_recurring = false;
        assert!(form.recurrence_plan().is_none());
    }

    #[test]
    fn test_draft_format() {
        let form = valid_stay();
        let json = form.to_json().unwrap();

        assert!(json.contains("\"date\":\"2025-06-10\""));
        assert!(json.contains("\"reservationType\":\"stay\""));
        assert!(json.contains("lucia@example.com"));
        assert_eq!(ReservationForm::from_json(&json).unwrap(), form);
    }

    #[test]
    fn test_reads_browser_style_draft() {
        let raw = r#"{
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "600111222333",
            "date": "2025-06-12T00:00:00.000Z",
            "reservationType": "culinary",
            "activity": "",
            "people": "3",
            "isRecurring": false,
            "recurrenceFrequency": "",
            "couponCode": "welcome10",
            "additionalServices": ["meal"],
            "saveAsDraft": true,
            "notifications": { "email": true, "sms": true }
        }"#;

        let form = ReservationForm::from_json(raw).unwrap();
        assert_eq!(form.date, Some(day(12)));
        assert_eq!(form.activity, None);
        assert_eq!(form.people, 3);
        assert!(form.notifications.sms);
        assert_eq!(form.recurrence_end_date, None);
        assert_eq!(form.recurrence_frequency, None);
    }

    #[test]
    fn test_unreadable_head_count_defaults_to_one() {
        let form = ReservationForm::from_json(r#"{ "people": "lots" }"#).unwrap();
        assert_eq!(form.people, 1);

        let form = ReservationForm::from_json(r#"{ "people": null }"#).unwrap();
        assert_eq!(form.people, 1);
    }

    #[test]
    fn test_rejects_garbage_dates() {
        assert!(ReservationForm::from_json(r#"{ "date": "next tuesday" }"#).is_err());
    }
}
