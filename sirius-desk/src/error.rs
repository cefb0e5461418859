use sirius_catalog::CatalogError;
use sirius_reservation::SubmissionError;
use sirius_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("Catalog could not be loaded: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Form file {path} could not be read: {source}")]
    FormFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Form file {path} is not a valid reservation: {source}")]
    FormParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Draft(String),
}

impl DeskError {
    /// Process exit code: 2 for guest input problems, 3 for a retryable
    /// booking failure, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeskError::Submission(SubmissionError::Invalid(_))
            | DeskError::FormParse { .. }
            | DeskError::FormFile { .. } => 2,
            DeskError::Submission(e) if e.is_retryable() => 3,
            _ => 1,
        }
    }
}
