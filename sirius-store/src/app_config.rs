use serde::Deserialize;
use sirius_catalog::PricingConfig;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::StoreError;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub booking: BookingConfig,
    pub drafts: DraftConfig,
    pub pricing: PricingConfig,
    pub catalog: CatalogConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BookingConfig {
    /// Leading segment of every booking reference
    pub reference_prefix: String,
    /// Artificial wait before a simulated submission resolves
    pub submission_delay_ms: u64,
    /// Share of simulated submissions that fail (0.0 - 1.0)
    pub simulated_failure_rate: f64,
    pub currency_symbol: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            reference_prefix: "SIR".to_string(),
            submission_delay_ms: 1500,
            simulated_failure_rate: 0.0,
            currency_symbol: "$".to_string(),
        }
    }
}

impl BookingConfig {
    pub fn submission_delay(&self) -> Duration {
        Duration::from_millis(self.submission_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DraftConfig {
    /// Directory holding the draft slot
    pub dir: PathBuf,
    /// Slot name; the draft lives at `{dir}/{slot}.json`
    pub slot: String,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".sirius"),
            slot: "reservationDraft".to_string(),
        }
    }
}

impl DraftConfig {
    pub fn slot_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.slot))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog replacing the compiled-in tables
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "sirius_desk=info,sirius_reservation=info,sirius_catalog=info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from("config")
    }

    /// Layered load: built-in defaults, `{dir}/default`, `{dir}/{RUN_MODE}`,
    /// `{dir}/local`, then `SIRIUS__*` environment variables. Every file is optional.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name(&source_name(dir, "default")).required(false))
            .add_source(config::File::with_name(&source_name(dir, &run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name(&source_name(dir, "local")).required(false))
            // Eg.. `SIRIUS__BOOKING__SUBMISSION_DELAY_MS=0`
            .add_source(
                config::Environment::with_prefix("SIRIUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = s.try_deserialize()?;
        tracing::debug!(run_mode = %run_mode, "Configuration loaded");
        Ok(config)
    }
}

fn source_name(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();

        assert_eq!(config.booking.reference_prefix, "SIR");
        assert_eq!(config.booking.submission_delay(), Duration::from_millis(1500));
        assert_eq!(config.pricing, PricingConfig::default());
        assert!(config.catalog.path.is_none());
        assert!(config.drafts.slot_path().ends_with("reservationDraft.json"));
    }

    #[test]
    fn test_file_overrides_nested_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
[booking]
reference_prefix = "FARM"
submission_delay_ms = 0

[pricing]
recurring_discount_factor = 0.8
"#,
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.booking.reference_prefix, "FARM");
        assert_eq!(config.booking.submission_delay_ms, 0);
        assert_eq!(config.booking.currency_symbol, "$");
        assert_eq!(config.pricing.recurring_discount_factor, 0.8);
        assert_eq!(config.pricing.course_types, vec!["workshop", "culinary"]);
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[booking\nreference_prefix = ").unwrap();

        let err = Config::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
