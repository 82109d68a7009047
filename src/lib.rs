//! Oilsight — DGA lab-report field extraction and fault classification.
//!
//! Pipeline: document bytes → text-layer extraction (vision fallback when no
//! usable text exists) → derived fields (O2/N2 ratio, retest date) →
//! severity classification against percentile thresholds → optional
//! narrative diagnosis from a text-generation collaborator.
//!
//! The interactive surface, authentication, and persistence live elsewhere;
//! this crate is the engine they call into.

pub mod cleaning;
pub mod config;
pub mod ingest;
pub mod models;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and harnesses embedding the engine.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
