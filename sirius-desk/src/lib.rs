use chrono::NaiveDate;
use clap::Args;
use sirius_catalog::{RecurrenceFrequency, StaticCatalog};
use sirius_reservation::{
    ChangeReport, DraftLoad, FieldChange, FormController, ReservationForm, SubmissionOutcome, SubmissionService,
};
use sirius_store::{Config, DraftSlot, FileDraftSlot};
use std::path::Path;
use std::sync::Arc;

pub mod error;
pub mod render;

pub use error::DeskError;

pub type DeskController = FormController<Arc<StaticCatalog>>;

/// Field edits given on the command line, applied after the form file.
#[derive(Debug, Clone, Default, Args)]
pub struct FormOverrides {
    /// Reservation type id (stay, workshop, culinary, team, venue)
    #[arg(long = "type")]
    pub reservation_type: Option<String>,
    /// Activity id within the reservation type
    #[arg(long)]
    pub activity: Option<String>,
    #[arg(long)]
    pub people: Option<u32>,
    /// Arrival or session date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Departure date for stays, YYYY-MM-DD
    #[arg(long)]
    pub departure: Option<NaiveDate>,
    /// Book a recurring series: weekly, biweekly or monthly
    #[arg(long)]
    pub recurring: Option<RecurrenceFrequency>,
    /// Last day of the recurring series, YYYY-MM-DD
    #[arg(long)]
    pub until: Option<NaiveDate>,
    #[arg(long)]
    pub coupon: Option<String>,
    /// Toggle an additional service; repeatable
    #[arg(long = "service")]
    pub services: Vec<String>,
}

impl FormOverrides {
    /// Edits in the order a guest would make them on the form.
    pub fn into_changes(self) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        if let Some(t) = self.reservation_type {
            changes.push(FieldChange::ReservationType(Some(t)));
        }
        if let Some(a) = self.activity {
            changes.push(FieldChange::Activity(Some(a)));
        }
        if let Some(p) = self.people {
            changes.push(FieldChange::People(p));
        }
        if let Some(d) = self.date {
            changes.push(FieldChange::Date(Some(d)));
        }
        if let Some(d) = self.departure {
            changes.push(FieldChange::DepartureDate(Some(d)));
        }
        if let Some(f) = self.recurring {
            changes.push(FieldChange::IsRecurring(true));
            changes.push(FieldChange::RecurrenceFrequency(Some(f)));
        }
        if let Some(d) = self.until {
            changes.push(FieldChange::RecurrenceEndDate(Some(d)));
        }
        if let Some(c) = self.coupon {
            changes.push(FieldChange::CouponCode(Some(c)));
        }
        changes.extend(self.services.into_iter().map(FieldChange::ToggleService));
        changes
    }

    /// Edits for a submit run. The save-as-draft choice always replaces the
    /// flag carried by the form, so a restored draft books unless asked not to.
    pub fn into_submission_changes(self, save_as_draft: bool) -> Vec<FieldChange> {
        let mut changes = self.into_changes();
        changes.push(FieldChange::SaveAsDraft(save_as_draft));
        changes
    }
}

/// Read a reservation form from a JSON file in the draft format.
pub fn read_form(path: impl AsRef<Path>) -> Result<ReservationForm, DeskError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| DeskError::FormFile {
        path: path.display().to_string(),
        source,
    })?;
    ReservationForm::from_json(&raw).map_err(|source| DeskError::FormParse {
        path: path.display().to_string(),
        source,
    })
}

/// Front desk wiring: one catalog, one pricing setup, one draft slot.
pub struct Desk<S> {
    catalog: Arc<StaticCatalog>,
    config: Config,
    submissions: SubmissionService<S>,
}

impl Desk<FileDraftSlot> {
    pub fn from_config(config: Config) -> Result<Self, DeskError> {
        let slot = FileDraftSlot::new(config.drafts.slot_path());
        Self::with_slot(config, slot)
    }
}

impl<S: DraftSlot> Desk<S> {
    pub fn with_slot(config: Config, slot: S) -> Result<Self, DeskError> {
        let catalog = match &config.catalog.path {
            Some(path) => StaticCatalog::from_path(path)?,
            None => StaticCatalog::seeded(),
        };
        let submissions = SubmissionService::from_config(slot, &config.booking);

        Ok(Self {
            catalog: Arc::new(catalog),
            config,
            submissions,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &StaticCatalog {
        &self.catalog
    }

    pub fn controller(&self) -> DeskController {
        FormController::new(self.catalog.clone(), self.config.pricing.clone())
    }

    /// Load `form` into a fresh controller, then apply `changes` one by one.
    /// The returned report merges every field the edits cleared.
    pub fn prepare(&self, form: ReservationForm, changes: Vec<FieldChange>) -> (DeskController, ChangeReport) {
        let mut controller = self.controller();
        let mut report = controller.load(form);

        for change in changes {
            let step = controller.apply(change);
            for field in step.cleared {
                if !report.cleared.contains(&field) {
                    report.cleared.push(field);
                }
            }
            report.revision = step.revision;
        }

        (controller, report)
    }

    pub fn catalog_listing(&self) -> String {
        render::catalog_listing(self.catalog.as_ref(), &self.config.booking.currency_symbol)
    }

    pub fn quote(&self, controller: &DeskController, report: &ChangeReport, today: NaiveDate) -> String {
        render::quote_summary(
            controller,
            report,
            controller.validate(today),
            &self.config.booking.currency_symbol,
        )
    }

    pub async fn submit(&self, controller: &DeskController, today: NaiveDate) -> Result<SubmissionOutcome, DeskError> {
        Ok(self.submissions.submit(controller, today).await?)
    }

    pub fn render_outcome(&self, outcome: &SubmissionOutcome) -> String {
        match outcome {
            SubmissionOutcome::DraftSaved { .. } => "Reservation saved as draft.\n".to_string(),
            SubmissionOutcome::Confirmed(c) => render::confirmation(c, &self.config.booking.currency_symbol),
        }
    }

    pub fn load_draft(&self) -> DraftLoad {
        self.submissions.load_draft()
    }

    /// The stored draft as a form, or the guest-facing reason it is missing.
    pub fn draft_form(&self) -> Result<ReservationForm, DeskError> {
        match self.load_draft() {
            DraftLoad::Loaded(form) => Ok(form),
            other => Err(DeskError::Draft(other.message().to_string())),
        }
    }

    pub fn clear_draft(&self) -> Result<(), DeskError> {
        Ok(self.submissions.clear_draft()?)
    }
}
