use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::ReservationCategory;
use crate::recurrence::RecurrencePlan;
use crate::repository::CatalogRepository;

/// Pricing knobs that differ between deployments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    /// Reservation types billed per session instead of per night
    pub course_types: Vec<String>,

    /// Reservation types that may be booked as a recurring series
    pub recurring_types: Vec<String>,

    /// Multiply course prices by head-count
    pub courses_bill_per_attendee: bool,

    /// Factor applied to a recurring series (0.9 = 10 % off)
    pub recurring_discount_factor: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            course_types: vec!["workshop".to_string(), "culinary".to_string()],
            recurring_types: vec!["workshop".to_string(), "culinary".to_string()],
            courses_bill_per_attendee: true,
            recurring_discount_factor: 0.9,
        }
    }
}

impl PricingConfig {
    pub fn category(&self, type_id: &str) -> ReservationCategory {
        if self.course_types.iter().any(|t| t == type_id) {
            ReservationCategory::Course
        } else {
            ReservationCategory::Stay
        }
    }

    pub fn allows_recurring(&self, type_id: &str) -> bool {
        self.recurring_types.iter().any(|t| t == type_id)
    }
}

/// Snapshot of the form fields the calculator reads
#[derive(Debug, Clone, Default)]
pub struct QuoteRequest<'a> {
    pub reservation_type: Option<&'a str>,
    pub activity: Option<&'a str>,
    pub people: Option<u32>,
    pub arrival: Option<NaiveDate>,
    pub departure: Option<NaiveDate>,
    /// Only set when the guest asked for a recurring series
    pub recurrence: Option<RecurrencePlan>,
    pub services: &'a [String],
    pub coupon_code: Option<&'a str>,
}

/// Price components, unrounded. Round with [`PriceBreakdown::rounded`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub estimated: f64,
    pub additional_services: f64,
    pub discount: f64,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
}

impl PriceBreakdown {
    pub fn rounded(&self) -> Self {
        Self {
            estimated: round_minor(self.estimated),
            additional_services: round_minor(self.additional_services),
            discount: round_minor(self.discount),
            total: round_minor(self.total),
            ..*self
        }
    }
}

impl fmt::Display for PriceBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.rounded();
        write!(
            f,
            "{:.2} + {:.2} - {:.2} = {:.2}",
            r.estimated, r.additional_services, r.discount, r.total
        )
    }
}

/// Round to the currency's minor unit (cents).
pub fn round_minor(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Render an amount with a currency symbol, e.g. `$556.25`.
pub fn format_amount(amount: f64, symbol: &str) -> String {
    format!("{}{:.2}", symbol, round_minor(amount))
}

/// Stateless reservation price calculator
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Nights between two dates, at least one. Missing dates count as one night.
    pub fn nights(arrival: Option<NaiveDate>, departure: Option<NaiveDate>) -> u32 {
        match (arrival, departure) {
            (Some(a), Some(d)) => {
                let days = (d - a).num_days().unsigned_abs();
                days.clamp(1, u32::MAX as u64) as u32
            }
            _ => 1,
        }
    }

    /// Price before add-ons and discount. Unknown types price at zero and
    /// unknown activities at multiplier 1.
    fn estimate<C: CatalogRepository + ?Sized>(
        &self,
        catalog: &C,
        request: &QuoteRequest<'_>,
    ) -> (f64, Option<u32>, Option<u32>) {
        let Some(type_id) = request.reservation_type else {
            return (0.0, None, None);
        };
        let Some(reservation_type) = catalog.reservation_type(type_id) else {
            return (0.0, None, None);
        };

        let multiplier = request
            .activity
            .and_then(|activity_id| catalog.activity(type_id, activity_id))
            .map(|a| a.price_multiplier)
            .unwrap_or(1.0);
        let unit_price = reservation_type.base_price * multiplier;

        if let Some(plan) = request.recurrence.filter(|_| self.config.allows_recurring(type_id)) {
            let occurrences = plan.billable_occurrences();
            let price = unit_price * occurrences as f64 * self.config.recurring_discount_factor;
            return (price, None, Some(occurrences));
        }

        match self.config.category(type_id) {
            ReservationCategory::Course => {
                let attendees = if self.config.courses_bill_per_attendee {
                    request.people.unwrap_or(1).max(1)
                } else {
                    1
                };
                (unit_price * attendees as f64, None, None)
            }
            ReservationCategory::Stay => {
                let nights = Self::nights(request.arrival, request.departure);
                (unit_price * nights as f64, Some(nights), None)
            }
        }
    }

    /// Flat sum of the selected add-ons. Unknown ids contribute nothing.
    pub fn additional_services_total<C: CatalogRepository + ?Sized>(&self, catalog: &C, services: &[String]) -> f64 {
        services
            .iter()
            .filter_map(|id| catalog.service(id))
            .map(|s| s.price)
            .sum()
    }

    /// Coupon discount against the estimated price. Unknown or empty codes give zero.
    pub fn discount_amount<C: CatalogRepository + ?Sized>(&self, catalog: &C, code: Option<&str>, estimated: f64) -> f64 {
        code.filter(|c| !c.trim().is_empty())
            .and_then(|c| catalog.coupon(c))
            .map(|coupon| coupon.discount_for(estimated))
            .unwrap_or(0.0)
    }

    /// Full breakdown in dependency order: estimate, add-ons, discount, total.
    pub fn quote<C: CatalogRepository + ?Sized>(&self, catalog: &C, request: &QuoteRequest<'_>) -> PriceBreakdown {
        let (estimated, nights, occurrences) = self.estimate(catalog, request);
        let additional_services = self.additional_services_total(catalog, request.services);
        let discount = self.discount_amount(catalog, request.coupon_code, estimated);
        let total = (estimated + additional_services - discount).max(0.0);

        tracing::debug!(
            reservation_type = request.reservation_type.unwrap_or(""),
            estimated,
            additional_services,
            discount,
            total,
            "Recomputed reservation price"
        );

        PriceBreakdown {
            estimated,
            additional_services,
            discount,
            total,
            nights,
            occurrences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::RecurrenceFrequency;
    use crate::repository::StaticCatalog;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_stay_with_service_and_coupon() {
        let engine = PricingEngine::default();
        let catalog = StaticCatalog::seeded();
        let services = vec!["transport".to_string()];

        let mut request = QuoteRequest {
            reservation_type: Some("stay"),
            activity: Some("deluxe"),
            arrival: Some(day(1)),
            departure: Some(day(4)),
            services: &services,
            ..Default::default()
        };

        let quote = engine.quote(&catalog, &request);
        assert_eq!(quote.estimated, 675.0);
        assert_eq!(quote.additional_services, 50.0);
        assert_eq!(quote.total, 725.0);
        assert_eq!(quote.nights, Some(3));

        request.coupon_code = Some("SUMMER25");
        let quote = engine.quote(&catalog, &request);
        assert_eq!(quote.discount, 168.75);
        assert_eq!(quote.total, 556.25);
    }

    #[test]
    fn test_foreign_activity_uses_multiplier_one() {
        let engine = PricingEngine::default();
        let catalog = StaticCatalog::seeded();

        for t in catalog.types() {
            for (other, activities) in [("venue", catalog.activities("venue")), ("stay", catalog.activities("stay"))] {
                if other == t.id {
                    continue;
                }
                for a in activities {
                    let request = QuoteRequest {
                        reservation_type: Some(t.id.as_str()),
                        activity: Some(a.id.as_str()),
                        ..Default::default()
                    };
                    let quote = engine.quote(&catalog, &request);
                    assert!(approx(quote.estimated, t.base_price), "{} / {}", t.id, a.id);
                }
            }
        }
    }

    #[test]
    fn test_unknown_type_prices_at_zero() {
        let engine = PricingEngine::default();
        let catalog = StaticCatalog::seeded();
        let services = vec!["spa".to_string()];

        let request = QuoteRequest {
            reservation_type: Some("glamping"),
            activity: Some("standard"),
            services: &services,
            ..Default::default()
        };

        let quote = engine.quote(&catalog, &request);
        assert_eq!(quote.estimated, 0.0);
        assert_eq!(quote.total, 120.0);
    }

    #[test]
    fn test_course_bills_per_attendee() {
        let engine = PricingEngine::default();
        let catalog = StaticCatalog::seeded();

        let request = QuoteRequest {
            reservation_type: Some("culinary"),
            activity: Some("advanced"),
            people: Some(3),
            ..Default::default()
        };
        assert!(approx(engine.quote(&catalog, &request).estimated, 120.0 * 1.3 * 3.0));

        let request = QuoteRequest { people: Some(0), ..request };
        assert!(approx(engine.quote(&catalog, &request).estimated, 120.0 * 1.3));
    }

    #[test]
    fn test_course_flat_when_per_attendee_disabled() {
        let engine = PricingEngine::new(PricingConfig {
            courses_bill_per_attendee: false,
            ..Default::default()
        });
        let catalog = StaticCatalog::seeded();

        let request = QuoteRequest {
            reservation_type: Some("workshop"),
            people: Some(5),
            ..Default::default()
        };
        assert_eq!(engine.quote(&catalog, &request).estimated, 75.0);
    }

    #[test]
    fn test_nights_minimum_and_absolute() {
        assert_eq!(PricingEngine::nights(Some(day(1)), Some(day(4))), 3);
        assert_eq!(PricingEngine::nights(Some(day(4)), Some(day(1))), 3);
        assert_eq!(PricingEngine::nights(Some(day(4)), Some(day(4))), 1);
        assert_eq!(PricingEngine::nights(Some(day(4)), None), 1);
    }

    #[test]
    fn test_recurring_series_replaces_base_price() {
        let engine = PricingEngine::default();
        let catalog = StaticCatalog::seeded();
        let start = day(12);
        let end = NaiveDate::from_ymd_opt(2025, 9, 12).unwrap();

        for (frequency, occurrences) in [
            (RecurrenceFrequency::Monthly, 3u32),
            (RecurrenceFrequency::Weekly, 12),
            (RecurrenceFrequency::Biweekly, 6),
        ] {
            let request = QuoteRequest {
                reservation_type: Some("culinary"),
                activity: Some("baking"),
                people: Some(1),
                recurrence: Some(RecurrencePlan::new(start, end, Some(frequency))),
                ..Default::default()
            };

            let quote = engine.quote(&catalog, &request);
            assert_eq!(quote.occurrences, Some(occurrences));
            assert!(approx(quote.estimated, 120.0 * 1.2 * occurrences as f64 * 0.9));
        }
    }

    #[test]
    fn test_recurrence_ignored_for_stays() {
        let engine = PricingEngine::default();
        let catalog = StaticCatalog::seeded();

        let request = QuoteRequest {
            reservation_type: Some("stay"),
            recurrence: Some(RecurrencePlan::new(day(1), day(1), Some(RecurrenceFrequency::Monthly))),
            ..Default::default()
        };

        let quote = engine.quote(&catalog, &request);
        assert_eq!(quote.estimated, 150.0);
        assert_eq!(quote.occurrences, None);
    }

    #[test]
    fn test_total_never_negative() {
        let engine = PricingEngine::default();
        let catalog = StaticCatalog::seeded();

        // FARM50 is larger than any estimate on an unknown type
        let request = QuoteRequest {
            reservation_type: Some("glamping"),
            coupon_code: Some("farm50"),
            ..Default::default()
        };

        let quote = engine.quote(&catalog, &request);
        assert_eq!(quote.discount, 50.0);
        assert_eq!(quote.total, 0.0);
    }

    #[test]
    fn test_percentage_discount_on_estimate_only() {
        let engine = PricingEngine::default();
        let catalog = StaticCatalog::seeded();

        assert_eq!(engine.discount_amount(&catalog, Some("WELCOME10"), 1000.0), 100.0);
        assert_eq!(engine.discount_amount(&catalog, Some("BOGUS"), 1000.0), 0.0);
        assert_eq!(engine.discount_amount(&catalog, Some("   "), 1000.0), 0.0);
        assert_eq!(engine.discount_amount(&catalog, None, 1000.0), 0.0);
    }

    #[test]
    fn test_unknown_services_are_ignored() {
        let engine = PricingEngine::default();
        let catalog = StaticCatalog::seeded();
        let services = vec!["guided".to_string(), "helicopter".to_string(), "meal".to_string()];

        assert_eq!(engine.additional_services_total(&catalog, &services), 110.0);
    }

    #[test]
    fn test_rounding_happens_at_presentation() {
        let breakdown = PriceBreakdown {
            estimated: 97.2,
            additional_services: 0.0,
            discount: 9.72,
            total: 87.48000000000002,
            nights: None,
            occurrences: Some(1),
        };

        assert_eq!(breakdown.rounded().total, 87.48);
        assert_eq!(breakdown.to_string(), "97.20 + 0.00 - 9.72 = 87.48");
        assert_eq!(format_amount(556.25, "$"), "$556.25");
    }
}
