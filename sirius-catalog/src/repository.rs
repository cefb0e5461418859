use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use crate::availability::{AvailabilityCalendar, DateAvailability};
use crate::catalog::{
    normalize_coupon_code, Activity, AdditionalService, CatalogError, Coupon, ReservationType,
};
use crate::seed;

/// Read-only query shape over the reservation catalog.
///
/// Lookups return `Option`; callers supply the documented default
/// (multiplier 1, discount 0, empty activity list).
pub trait CatalogRepository {
    fn types(&self) -> &[ReservationType];

    fn reservation_type(&self, id: &str) -> Option<&ReservationType> {
        self.types().iter().find(|t| t.id == id)
    }

    /// Activities offered under a type. Unknown types have none.
    fn activities(&self, type_id: &str) -> &[Activity];

    fn activity(&self, type_id: &str, activity_id: &str) -> Option<&Activity> {
        self.activities(type_id).iter().find(|a| a.id == activity_id)
    }

    fn availability(&self, type_id: &str) -> AvailabilityCalendar;

    fn services(&self) -> &[AdditionalService];

    fn service(&self, id: &str) -> Option<&AdditionalService> {
        self.services().iter().find(|s| s.id == id)
    }

    /// Case-insensitive coupon lookup.
    fn coupon(&self, code: &str) -> Option<&Coupon>;
}

impl<T: CatalogRepository + ?Sized> CatalogRepository for &T {
    fn types(&self) -> &[ReservationType] {
        (**self).types()
    }

    fn activities(&self, type_id: &str) -> &[Activity] {
        (**self).activities(type_id)
    }

    fn availability(&self, type_id: &str) -> AvailabilityCalendar {
        (**self).availability(type_id)
    }

    fn services(&self) -> &[AdditionalService] {
        (**self).services()
    }

    fn coupon(&self, code: &str) -> Option<&Coupon> {
        (**self).coupon(code)
    }
}

impl<T: CatalogRepository + ?Sized> CatalogRepository for Arc<T> {
    fn types(&self) -> &[ReservationType] {
        (**self).types()
    }

    fn activities(&self, type_id: &str) -> &[Activity] {
        (**self).activities(type_id)
    }

    fn availability(&self, type_id: &str) -> AvailabilityCalendar {
        (**self).availability(type_id)
    }

    fn services(&self) -> &[AdditionalService] {
        (**self).services()
    }

    fn coupon(&self, code: &str) -> Option<&Coupon> {
        (**self).coupon(code)
    }
}

/// Serialized catalog layout, also used by the compiled-in seed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub reservation_types: Vec<ReservationType>,
    #[serde(default)]
    pub activities_by_type: HashMap<String, Vec<Activity>>,
    #[serde(default)]
    pub available_dates: HashMap<String, Vec<DateAvailability>>,
    #[serde(default)]
    pub additional_services: Vec<AdditionalService>,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
}

/// In-memory catalog built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    types: Vec<ReservationType>,
    activities: HashMap<String, Vec<Activity>>,
    availability: HashMap<String, AvailabilityCalendar>,
    services: Vec<AdditionalService>,
    coupons: HashMap<String, Coupon>,
}

impl StaticCatalog {
    /// The farm's built-in tables.
    pub fn seeded() -> Self {
        // Seed validity is asserted by `test_seed_is_valid`.
        Self::build(seed::default_document())
    }

    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        validate(&document)?;
        Ok(Self::build(document))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(raw)?;
        Self::from_document(document)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            types = catalog.types.len(),
            "Loaded catalog from file"
        );
        Ok(catalog)
    }

    fn build(document: CatalogDocument) -> Self {
        let availability = document
            .available_dates
            .iter()
            .map(|(type_id, entries)| (type_id.clone(), AvailabilityCalendar::new(entries)))
            .collect();

        let coupons = document
            .coupons
            .into_iter()
            .map(|c| (normalize_coupon_code(&c.code), c))
            .collect();

        Self {
            types: document.reservation_types,
            activities: document.activities_by_type,
            availability,
            services: document.additional_services,
            coupons,
        }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl CatalogRepository for StaticCatalog {
    fn types(&self) -> &[ReservationType] {
        &self.types
    }

    fn activities(&self, type_id: &str) -> &[Activity] {
        self.activities.get(type_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn availability(&self, type_id: &str) -> AvailabilityCalendar {
        self.availability.get(type_id).cloned().unwrap_or_default()
    }

    fn services(&self) -> &[AdditionalService] {
        &self.services
    }

    fn coupon(&self, code: &str) -> Option<&Coupon> {
        self.coupons.get(&normalize_coupon_code(code))
    }
}

fn validate(document: &CatalogDocument) -> Result<(), CatalogError> {
    let mut type_ids = HashSet::new();
    for t in &document.reservation_types {
        if !type_ids.insert(t.id.as_str()) {
            return Err(CatalogError::Invalid(format!("duplicate reservation type '{}'", t.id)));
        }
        if !(t.base_price >= 0.0 && t.base_price.is_finite()) {
            return Err(CatalogError::Invalid(format!("negative base price for '{}'", t.id)));
        }
    }

    for (type_id, activities) in &document.activities_by_type {
        let mut ids = HashSet::new();
        for a in activities {
            if !ids.insert(a.id.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate activity '{}' under '{}'",
                    a.id, type_id
                )));
            }
            if !(a.price_multiplier > 0.0 && a.price_multiplier.is_finite()) {
                return Err(CatalogError::Invalid(format!(
                    "multiplier for '{}' under '{}' must be positive",
                    a.id, type_id
                )));
            }
        }
    }

    let mut service_ids = HashSet::new();
    for s in &document.additional_services {
        if !service_ids.insert(s.id.as_str()) {
            return Err(CatalogError::Invalid(format!("duplicate service '{}'", s.id)));
        }
        if !(s.price >= 0.0 && s.price.is_finite()) {
            return Err(CatalogError::Invalid(format!("negative price for service '{}'", s.id)));
        }
    }

    let mut codes = HashSet::new();
    for c in &document.coupons {
        if !codes.insert(normalize_coupon_code(&c.code)) {
            return Err(CatalogError::Invalid(format!("duplicate coupon '{}'", c.code)));
        }
        if !(c.discount > 0.0 && c.discount.is_finite()) {
            return Err(CatalogError::Invalid(format!("coupon '{}' must discount a positive amount", c.code)));
        }
    }

    Ok(())
}
