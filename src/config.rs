//! Engine configuration.
//!
//! Everything the original tool read from ambient state (threshold file,
//! service credentials) is carried explicitly here and injected into the
//! components that need it. The threshold table rides in an `Arc` so an
//! administrative edit swaps in a whole new table without racing in-flight
//! classification.

use std::path::PathBuf;
use std::sync::Arc;

use crate::models::ThresholdTable;

/// Application-level constants
pub const APP_NAME: &str = "Oilsight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "oilsight=info"
}

/// Get the application data directory
/// ~/Oilsight/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Oilsight")
}

/// Default location of the threshold configuration file.
pub fn thresholds_path() -> PathBuf {
    app_data_dir().join("thresholds.json")
}

/// Per-session engine configuration, passed to components instead of read
/// from globals.
#[derive(Clone)]
pub struct EngineConfig {
    pub thresholds: Arc<ThresholdTable>,
    /// Credential for the vision inference collaborator. Absent → the
    /// fallback extraction tier is blocked, not skipped.
    pub vision_credential: Option<String>,
    /// Credential for the text-generation collaborator.
    pub generation_credential: Option<String>,
    /// Target language for the narrative diagnosis.
    pub diagnosis_language: String,
    /// Timeout applied to every network-bound call.
    pub http_timeout_secs: u64,
}

impl EngineConfig {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self {
            thresholds: Arc::new(thresholds),
            vision_credential: None,
            generation_credential: None,
            diagnosis_language: "Arabic".to_string(),
            http_timeout_secs: 120,
        }
    }

    pub fn with_vision_credential(mut self, credential: &str) -> Self {
        self.vision_credential = Some(credential.to_string());
        self
    }

    pub fn with_generation_credential(mut self, credential: &str) -> Self {
        self.generation_credential = Some(credential.to_string());
        self
    }

    pub fn with_diagnosis_language(mut self, language: &str) -> Self {
        self.diagnosis_language = language.to_string();
        self
    }

    /// Administrative threshold edit: swap in a new table atomically.
    pub fn swap_thresholds(&mut self, thresholds: ThresholdTable) {
        self.thresholds = Arc::new(thresholds);
    }
}
