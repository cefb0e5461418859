pub mod app_config;
pub mod draft;

pub use app_config::Config;
pub use draft::{DraftSlot, FileDraftSlot, MemoryDraftSlot};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Draft storage I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
