pub mod catalog;
pub mod availability;
pub mod recurrence;
pub mod pricing;
pub mod repository;
mod seed;

pub use catalog::{
    normalize_coupon_code, Activity, AdditionalService, CatalogError, Coupon, DiscountKind,
    ReservationCategory, ReservationType,
};
pub use availability::{AvailabilityCalendar, DateAvailability, DateRejection};
pub use recurrence::{RecurrenceFrequency, RecurrencePlan};
pub use pricing::{format_amount, round_minor, PriceBreakdown, PricingConfig, PricingEngine, QuoteRequest};
pub use repository::{CatalogDocument, CatalogRepository, StaticCatalog};
