use chrono::NaiveDate;
use serde::Serialize;
use sirius_catalog::{
    normalize_coupon_code, Activity, CatalogRepository, PriceBreakdown, PricingConfig, PricingEngine,
    RecurrenceFrequency, ReservationCategory,
};
use sirius_core::ValidationErrors;
use tracing::debug;

use crate::form::{Notifications, ReservationForm};

/// Addressable form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Date,
    DepartureDate,
    ReservationType,
    Activity,
    People,
    Message,
    IsRecurring,
    RecurrenceFrequency,
    RecurrenceEndDate,
    PaymentMethod,
    CouponCode,
    AdditionalServices,
    SaveAsDraft,
    Notifications,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Date => "date",
            Field::DepartureDate => "departureDate",
            Field::ReservationType => "reservationType",
            Field::Activity => "activity",
            Field::People => "people",
            Field::Message => "message",
            Field::IsRecurring => "isRecurring",
            Field::RecurrenceFrequency => "recurrenceFrequency",
            Field::RecurrenceEndDate => "recurrenceEndDate",
            Field::PaymentMethod => "paymentMethod",
            Field::CouponCode => "couponCode",
            Field::AdditionalServices => "additionalServices",
            Field::SaveAsDraft => "saveAsDraft",
            Field::Notifications => "notifications",
        }
    }

    /// Fields the price breakdown is computed from. Dates count because
    /// they drive nights and recurrence spans.
    pub fn affects_price(&self) -> bool {
        matches!(
            self,
            Field::ReservationType
                | Field::Activity
                | Field::People
                | Field::Date
                | Field::DepartureDate
                | Field::IsRecurring
                | Field::RecurrenceFrequency
                | Field::RecurrenceEndDate
                | Field::CouponCode
                | Field::AdditionalServices
        )
    }
}

/// One edit coming from the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Name(String),
    Email(String),
    Phone(String),
    Date(Option<NaiveDate>),
    DepartureDate(Option<NaiveDate>),
    ReservationType(Option<String>),
    Activity(Option<String>),
    People(u32),
    Message(Option<String>),
    IsRecurring(bool),
    RecurrenceFrequency(Option<RecurrenceFrequency>),
    RecurrenceEndDate(Option<NaiveDate>),
    PaymentMethod(Option<String>),
    /// Stored trimmed and uppercased; blank clears the code
    CouponCode(Option<String>),
    AdditionalServices(Vec<String>),
    /// Add the service when absent, remove it when present
    ToggleService(String),
    SaveAsDraft(bool),
    Notifications(Notifications),
}

impl FieldChange {
    pub fn field(&self) -> Field {
        match self {
            FieldChange::Name(_) => Field::Name,
            FieldChange::Email(_) => Field::Email,
            FieldChange::Phone(_) => Field::Phone,
            FieldChange::Date(_) => Field::Date,
            FieldChange::DepartureDate(_) => Field::DepartureDate,
            FieldChange::ReservationType(_) => Field::ReservationType,
            FieldChange::Activity(_) => Field::Activity,
            FieldChange::People(_) => Field::People,
            FieldChange::Message(_) => Field::Message,
            FieldChange::IsRecurring(_) => Field::IsRecurring,
            FieldChange::RecurrenceFrequency(_) => Field::RecurrenceFrequency,
            FieldChange::RecurrenceEndDate(_) => Field::RecurrenceEndDate,
            FieldChange::PaymentMethod(_) => Field::PaymentMethod,
            FieldChange::CouponCode(_) => Field::CouponCode,
            FieldChange::AdditionalServices(_) | FieldChange::ToggleService(_) => Field::AdditionalServices,
            FieldChange::SaveAsDraft(_) => Field::SaveAsDraft,
            FieldChange::Notifications(_) => Field::Notifications,
        }
    }

    /// Write the change into `form`. Returns false, leaving `form` untouched,
    /// when the field already holds the value.
    fn write(self, form: &mut ReservationForm) -> bool {
        fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
            if *slot == value {
                return false;
            }
            *slot = value;
            true
        }

        match self {
            FieldChange::Name(v) => set(&mut form.name, v),
            FieldChange::Email(v) => set(&mut form.email, v.into()),
            FieldChange::Phone(v) => set(&mut form.phone, v.into()),
            FieldChange::Date(v) => set(&mut form.date, v),
            FieldChange::DepartureDate(v) => set(&mut form.departure_date, v),
            FieldChange::ReservationType(v) => set(&mut form.reservation_type, blank_to_none(v)),
            FieldChange::Activity(v) => set(&mut form.activity, blank_to_none(v)),
            FieldChange::People(v) => set(&mut form.people, v),
            FieldChange::Message(v) => set(&mut form.message, blank_to_none(v)),
            FieldChange::IsRecurring(v) => set(&mut form.is_recurring, v),
            FieldChange::RecurrenceFrequency(v) => set(&mut form.recurrence_frequency, v),
            FieldChange::RecurrenceEndDate(v) => set(&mut form.recurrence_end_date, v),
            FieldChange::PaymentMethod(v) => set(&mut form.payment_method, blank_to_none(v)),
            FieldChange::CouponCode(v) => {
                let code = v.map(|c| normalize_coupon_code(&c)).filter(|c| !c.is_empty());
                set(&mut form.coupon_code, code)
            }
            FieldChange::AdditionalServices(v) => set(&mut form.additional_services, v),
            FieldChange::ToggleService(id) => {
                if let Some(pos) = form.additional_services.iter().position(|s| *s == id) {
                    form.additional_services.remove(pos);
                } else {
                    form.additional_services.push(id);
                }
                true
            }
            FieldChange::SaveAsDraft(v) => set(&mut form.save_as_draft, v),
            FieldChange::Notifications(v) => set(&mut form.notifications, v),
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// What one `apply` did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    pub changed: bool,
    /// Dependent fields cleared by the reconcile pass, each listed once
    pub cleared: Vec<Field>,
    pub repriced: bool,
    pub revision: u64,
}

impl ChangeReport {
    pub fn unchanged(revision: u64) -> Self {
        Self {
            changed: false,
            cleared: Vec::new(),
            repriced: false,
            revision,
        }
    }
}

/// Whether recurring bookings can be chosen for the form's current type
pub fn recurring_enabled(config: &PricingConfig, form: &ReservationForm) -> bool {
    form.reservation_type
        .as_deref()
        .is_some_and(|t| config.allows_recurring(t))
}

/// Narrow dependent fields to what the current selections allow.
///
/// Pure: the input is not modified. Running it again on its own output
/// clears nothing.
pub fn reconcile<C: CatalogRepository + ?Sized>(
    catalog: &C,
    config: &PricingConfig,
    form: &ReservationForm,
) -> (ReservationForm, Vec<Field>) {
    let mut next = form.clone();
    let mut cleared = Vec::new();

    // Without a type there is nothing to check the activity against.
    if let (Some(type_id), Some(activity_id)) = (next.reservation_type.as_deref(), next.activity.as_deref()) {
        if catalog.activity(type_id, activity_id).is_none() {
            next.activity = None;
            cleared.push(Field::Activity);
        }
    }

    if next.is_recurring && !recurring_enabled(config, &next) {
        next.is_recurring = false;
        cleared.push(Field::IsRecurring);
    }

    if !next.is_recurring {
        if next.recurrence_frequency.take().is_some() {
            cleared.push(Field::RecurrenceFrequency);
        }
        if next.recurrence_end_date.take().is_some() {
            cleared.push(Field::RecurrenceEndDate);
        }
    }

    (next, cleared)
}

/// Everything the presentation layer derives from the current values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub activities: Vec<Activity>,
    pub available_dates: Vec<NaiveDate>,
    /// Dates listed as unavailable. Dates missing from the calendar are
    /// disabled too but are not enumerated.
    pub disabled_dates: Vec<NaiveDate>,
    pub recurring_enabled: bool,
    pub category: Option<ReservationCategory>,
    pub price: PriceBreakdown,
    pub revision: u64,
}

/// Keeps a reservation form consistent while it is being edited.
///
/// Each effective edit runs exactly one reconcile pass and at most one
/// reprice, no matter how many dependent fields it clears.
pub struct FormController<C> {
    catalog: C,
    engine: PricingEngine,
    form: ReservationForm,
    price: PriceBreakdown,
    revision: u64,
    reprice_count: u64,
}

impl<C: CatalogRepository> FormController<C> {
    pub fn new(catalog: C, config: PricingConfig) -> Self {
        let engine = PricingEngine::new(config);
        let form = ReservationForm::default();
        let price = engine.quote(&catalog, &form.quote_request());
        Self {
            catalog,
            engine,
            form,
            price,
            revision: 0,
            reprice_count: 0,
        }
    }

    pub fn apply(&mut self, change: FieldChange) -> ChangeReport {
        let field = change.field();
        let mut candidate = self.form.clone();
        if !change.write(&mut candidate) {
            return ChangeReport::unchanged(self.revision);
        }

        let (next, cleared) = reconcile(&self.catalog, self.engine.config(), &candidate);
        for f in &cleared {
            debug!(field = f.as_str(), trigger = field.as_str(), "Cleared dependent field");
        }

        let needs_price = field.affects_price() || cleared.iter().any(Field::affects_price);
        self.form = next;
        self.revision += 1;
        if needs_price {
            self.reprice();
        }

        ChangeReport {
            changed: true,
            cleared,
            repriced: needs_price,
            revision: self.revision,
        }
    }

    /// Replace every value, e.g. with a restored draft.
    pub fn load(&mut self, form: ReservationForm) -> ChangeReport {
        let (next, cleared) = reconcile(&self.catalog, self.engine.config(), &form);
        self.form = next;
        self.revision += 1;
        self.reprice();
        debug!(revision = self.revision, cleared = cleared.len(), "Form values replaced");

        ChangeReport {
            changed: true,
            cleared,
            repriced: true,
            revision: self.revision,
        }
    }

    pub fn reset(&mut self) -> ChangeReport {
        self.load(ReservationForm::default())
    }

    fn reprice(&mut self) {
        self.price = self.engine.quote(&self.catalog, &self.form.quote_request());
        self.reprice_count += 1;
    }

    pub fn form(&self) -> &ReservationForm {
        &self.form
    }

    pub fn price(&self) -> PriceBreakdown {
        self.price
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of price recomputations since construction
    pub fn reprice_count(&self) -> u64 {
        self.reprice_count
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn pricing(&self) -> &PricingConfig {
        self.engine.config()
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        self.form.validate(&self.catalog, self.engine.config(), today)
    }

    pub fn view(&self) -> FormView {
        let type_id = self.form.reservation_type.as_deref();
        let calendar = type_id.map(|t| self.catalog.availability(t)).unwrap_or_default();

        FormView {
            activities: type_id.map(|t| self.catalog.activities(t).to_vec()).unwrap_or_default(),
            available_dates: calendar.available_dates(),
            disabled_dates: calendar.disabled_dates(),
            recurring_enabled: recurring_enabled(self.engine.config(), &self.form),
            category: type_id
                .filter(|t| self.catalog.reservation_type(t).is_some())
                .map(|t| self.engine.config().category(t)),
            price: self.price,
            revision: self.revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sirius_catalog::StaticCatalog;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn controller() -> FormController<StaticCatalog> {
        FormController::new(StaticCatalog::seeded(), PricingConfig::default())
    }

    fn select(c: &mut FormController<StaticCatalog>, type_id: &str, activity: &str) {
        c.apply(FieldChange::ReservationType(Some(type_id.to_string())));
        c.apply(FieldChange::Activity(Some(activity.to_string())));
    }

    #[test]
    fn test_type_change_clears_foreign_activity_once() {
        let mut c = controller();
        select(&mut c, "stay", "deluxe");
        let reprices = c.reprice_count();

        let report = c.apply(FieldChange::ReservationType(Some("venue".to_string())));

        assert_eq!(report.cleared, vec![Field::Activity]);
        assert!(report.repriced);
        assert_eq!(c.form().activity, None);
        assert_eq!(c.reprice_count(), reprices + 1);
        assert_eq!(c.price().estimated, 2000.0);
    }

    #[test]
    fn test_activity_checked_against_new_type_list() {
        let mut c = controller();
        select(&mut c, "team", "cooking");

        let report = c.apply(FieldChange::ReservationType(Some("culinary".to_string())));
        assert_eq!(report.cleared, vec![Field::Activity]);

        c.apply(FieldChange::Activity(Some("basics".to_string())));
        let report = c.apply(FieldChange::ReservationType(Some("workshop".to_string())));
        assert_eq!(report.cleared, vec![Field::Activity]);
    }

    #[test]
    fn test_redundant_write_is_a_no_op() {
        let mut c = controller();
        select(&mut c, "stay", "deluxe");
        let revision = c.revision();
        let reprices = c.reprice_count();

        let report = c.apply(FieldChange::ReservationType(Some("stay".to_string())));
        assert_eq!(report, ChangeReport::unchanged(revision));
        assert_eq!(c.reprice_count(), reprices);

        let report = c.apply(FieldChange::CouponCode(Some("  ".to_string())));
        assert!(!report.changed);
    }

    #[test]
    fn test_non_price_fields_do_not_reprice() {
        let mut c = controller();
        let reprices = c.reprice_count();

        let report = c.apply(FieldChange::Name("Marta".to_string()));
        assert!(report.changed);
        assert!(!report.repriced);
        assert_eq!(c.reprice_count(), reprices);
    }

    #[test]
    fn test_recurring_cleared_when_type_disallows_it() {
        let mut c = controller();
        select(&mut c, "workshop", "farming");
        c.apply(FieldChange::Date(Some(day(10))));
        c.apply(FieldChange::IsRecurring(true));
        c.apply(FieldChange::RecurrenceFrequency(Some(RecurrenceFrequency::Weekly)));
        c.apply(FieldChange::RecurrenceEndDate(Some(NaiveDate::from_ymd_opt(2025, 8, 10).unwrap())));
        assert!(c.view().recurring_enabled);
        assert_eq!(c.price().occurrences, Some(8));

        let report = c.apply(FieldChange::ReservationType(Some("stay".to_string())));
        assert_eq!(
            report.cleared,
            vec![
                Field::Activity,
                Field::IsRecurring,
                Field::RecurrenceFrequency,
                Field::RecurrenceEndDate
            ]
        );
        assert!(!c.form().is_recurring);
        assert!(!c.view().recurring_enabled);
        assert_eq!(c.price().occurrences, None);
    }

    #[test]
    fn test_unticking_recurring_clears_its_fields() {
        let mut c = controller();
        select(&mut c, "culinary", "baking");
        c.apply(FieldChange::IsRecurring(true));
        c.apply(FieldChange::RecurrenceFrequency(Some(RecurrenceFrequency::Monthly)));

        let report = c.apply(FieldChange::IsRecurring(false));
        assert_eq!(report.cleared, vec![Field::RecurrenceFrequency]);
        assert_eq!(c.form().recurrence_frequency, None);
    }

    #[test]
    fn test_reconcile_reaches_fixed_point() {
        let catalog = StaticCatalog::seeded();
        let config = PricingConfig::default();

        let forms = [
            ReservationForm {
                reservation_type: Some("venue".to_string()),
                activity: Some("deluxe".to_string()),
                is_recurring: true,
                recurrence_frequency: Some(RecurrenceFrequency::Weekly),
                ..Default::default()
            },
            ReservationForm {
                recurrence_end_date: Some(day(30)),
                ..Default::default()
            },
            ReservationForm {
                reservation_type: Some("workshop".to_string()),
                activity: Some("crafts".to_string()),
                is_recurring: true,
                ..Default::default()
            },
        ];

        for form in &forms {
            let (once, _) = reconcile(&catalog, &config, form);
            let (twice, cleared) = reconcile(&catalog, &config, &once);
            assert!(cleared.is_empty());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_stay_scenario_price() {
        let mut c = controller();
        select(&mut c, "stay", "deluxe");
        c.apply(FieldChange::Date(Some(day(10))));
        c.apply(FieldChange::DepartureDate(Some(day(13))));
        c.apply(FieldChange::ToggleService("transport".to_string()));
        assert_eq!(c.price().total, 725.0);

        c.apply(FieldChange::CouponCode(Some(" summer25 ".to_string())));
        assert_eq!(c.form().coupon_code.as_deref(), Some("SUMMER25"));
        assert_eq!(c.price().discount, 168.75);
        assert_eq!(c.price().total, 556.25);

        c.apply(FieldChange::ToggleService("transport".to_string()));
        assert!(c.form().additional_services.is_empty());
        assert_eq!(c.price().total, 506.25);
    }

    #[test]
    fn test_view_lists_type_data() {
        let mut c = controller();
        assert!(c.view().activities.is_empty());
        assert_eq!(c.view().category, None);

        c.apply(FieldChange::ReservationType(Some("stay".to_string())));
        let view = c.view();
        assert_eq!(view.activities.len(), 3);
        assert_eq!(view.disabled_dates, vec![day(15), day(16)]);
        assert_eq!(view.category, Some(ReservationCategory::Stay));
        assert!(!view.recurring_enabled);
        assert_eq!(view.revision, c.revision());
    }

    #[test]
    fn test_load_reconciles_and_reset_restores_defaults() {
        let mut c = controller();
        let draft = ReservationForm {
            reservation_type: Some("stay".to_string()),
            activity: Some("baking".to_string()),
            people: 4,
            ..Default::default()
        };

        let report = c.load(draft);
        assert_eq!(report.cleared, vec![Field::Activity]);
        assert_eq!(c.form().people, 4);

        c.reset();
        assert_eq!(c.form(), &ReservationForm::default());
        assert_eq!(c.form().people, 1);
        assert!(c.form().notifications.email);
        assert!(!c.form().notifications.sms);
        assert_eq!(c.price().total, 0.0);
    }
}
