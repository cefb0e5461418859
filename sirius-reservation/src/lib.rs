pub mod form;
pub mod models;
pub mod controller;
pub mod reference;
pub mod submission;

pub use form::{Notifications, ReservationForm};
pub use models::{BookingConfirmation, ReservationStatus};
pub use controller::{reconcile, ChangeReport, Field, FieldChange, FormController, FormView};
pub use reference::ReferenceGenerator;
pub use submission::{DraftLoad, SubmissionError, SubmissionOutcome, SubmissionService, SubmissionSimulator};
