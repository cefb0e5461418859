use chrono::NaiveDate;
use rand::Rng;
use sirius_catalog::CatalogRepository;
use sirius_core::ValidationErrors;
use sirius_shared::models::events::{
    now_timestamp, DraftSavedEvent, ReservationConfirmedEvent, SubmissionFailedEvent,
};
use sirius_store::app_config::BookingConfig;
use sirius_store::{DraftSlot, StoreError};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::controller::FormController;
use crate::form::ReservationForm;
use crate::models::{BookingConfirmation, ReservationStatus};
use crate::reference::ReferenceGenerator;

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Reservation is incomplete: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("Booking service unavailable: {0}")]
    Unavailable(String),

    #[error("Draft storage failed: {0}")]
    Storage(#[from] StoreError),

    #[error("Draft encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SubmissionError {
    /// Only a simulated gateway failure is worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmissionError::Unavailable(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    DraftSaved { status: ReservationStatus, bytes: usize },
    Confirmed(BookingConfirmation),
}

/// Result of restoring the draft slot. Never an error: every branch maps to
/// a message for the guest.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftLoad {
    Loaded(ReservationForm),
    NotFound,
    Unreadable(String),
}

impl DraftLoad {
    pub fn message(&self) -> &'static str {
        match self {
            DraftLoad::Loaded(_) => "Draft loaded successfully",
            DraftLoad::NotFound => "No draft found",
            DraftLoad::Unreadable(_) => "Error loading draft",
        }
    }
}

/// Stand-in for a booking backend: waits, then succeeds or fails at a fixed rate.
#[derive(Debug, Clone)]
pub struct SubmissionSimulator {
    delay: Duration,
    failure_rate: f64,
}

impl SubmissionSimulator {
    pub fn new(delay: Duration, failure_rate: f64) -> Self {
        Self {
            delay,
            failure_rate: if failure_rate.is_finite() { failure_rate.clamp(0.0, 1.0) } else { 0.0 },
        }
    }

    /// Resolves immediately and never fails
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }

    pub async fn dispatch(&self) -> Result<(), SubmissionError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate) {
            return Err(SubmissionError::Unavailable(
                "There was an error sending your reservation. Please try again.".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&BookingConfig> for SubmissionSimulator {
    fn from(config: &BookingConfig) -> Self {
        Self::new(config.submission_delay(), config.simulated_failure_rate)
    }
}

/// Terminal step of the form: save a draft or confirm a booking.
pub struct SubmissionService<S> {
    slot: S,
    simulator: SubmissionSimulator,
    references: ReferenceGenerator,
}

impl<S: DraftSlot> SubmissionService<S> {
    pub fn new(slot: S, simulator: SubmissionSimulator, references: ReferenceGenerator) -> Self {
        Self {
            slot,
            simulator,
            references,
        }
    }

    pub fn from_config(slot: S, config: &BookingConfig) -> Self {
        Self::new(
            slot,
            SubmissionSimulator::from(config),
            ReferenceGenerator::new(config.reference_prefix.clone()),
        )
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Validate the current values, then either store them as the draft or
    /// run the booking and issue a reference.
    pub async fn submit<C: CatalogRepository>(
        &self,
        controller: &FormController<C>,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let form = controller.form();
        controller.validate(today)?;

        if form.save_as_draft {
            let bytes = self.save_draft(form)?;
            return Ok(SubmissionOutcome::DraftSaved {
                status: ReservationStatus::Draft,
                bytes,
            });
        }

        let reservation_type = form.reservation_type.clone().unwrap_or_default();
        if let Err(e) = self.simulator.dispatch().await {
            let event = SubmissionFailedEvent {
                event_id: Uuid::new_v4(),
                reservation_type,
                reason: e.to_string(),
                timestamp: now_timestamp(),
            };
            warn!(event = %event.to_json(), "Reservation submission failed");
            return Err(e);
        }

        let confirmation = BookingConfirmation::new(
            self.references.generate(),
            reservation_type,
            form.activity.clone(),
            form.date,
            form.people,
            controller.price(),
        );

        let event = ReservationConfirmedEvent {
            event_id: Uuid::new_v4(),
            booking_reference: confirmation.reference.clone(),
            reservation_type: confirmation.reservation_type.clone(),
            activity: confirmation.activity.clone(),
            people: confirmation.people,
            total: confirmation.breakdown.total,
            coupon_code: form.coupon_code.clone(),
            timestamp: now_timestamp(),
        };
        info!(event = %event.to_json(), "Reservation confirmed");

        Ok(SubmissionOutcome::Confirmed(confirmation))
    }

    /// Overwrite the draft slot with `form`. Returns the bytes written.
    pub fn save_draft(&self, form: &ReservationForm) -> Result<usize, SubmissionError> {
        let json = form.to_json()?;
        self.slot.write(&json)?;

        let event = DraftSavedEvent {
            event_id: Uuid::new_v4(),
            reservation_type: form.reservation_type.clone(),
            bytes: json.len(),
            timestamp: now_timestamp(),
        };
        info!(event = %event.to_json(), "Reservation draft saved");

        Ok(json.len())
    }

    pub fn load_draft(&self) -> DraftLoad {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return DraftLoad::NotFound,
            Err(e) => {
                warn!(error = %e, "Draft slot could not be read");
                return DraftLoad::Unreadable(e.to_string());
            }
        };

        match ReservationForm::from_json(&raw) {
            Ok(form) => DraftLoad::Loaded(form),
            Err(e) => {
                warn!(error = %e, "Draft slot holds an unreadable snapshot");
                DraftLoad::Unreadable(e.to_string())
            }
        }
    }

    pub fn clear_draft(&self) -> Result<(), SubmissionError> {
        self.slot.clear()?;
        Ok(())
    }
}
