pub mod events;

pub use events::{DraftSavedEvent, ReservationConfirmedEvent, SubmissionFailedEvent};
