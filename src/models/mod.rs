pub mod sample;
pub mod thresholds;

pub use sample::{Gas, GasReadings, Sample};
pub use thresholds::{GasLimits, RatioRegime, ThresholdEntry, ThresholdError, ThresholdTable};
