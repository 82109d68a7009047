//! Percentile threshold table for severity classification.
//!
//! Loaded once per session from a JSON configuration source and treated as
//! read-only by the classifier. Administrative edits build a whole new table
//! that callers swap in atomically (`Arc<ThresholdTable>`) — limits are never
//! mutated under an in-flight classification.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sample::Gas;

#[derive(Error, Debug)]
pub enum ThresholdError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Threshold configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The O2/N2 ratio regime selecting which limit set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioRegime {
    /// O2/N2 ≤ 0.2, including a missing or unparseable ratio (treated as 0).
    Low,
    /// O2/N2 > 0.2.
    High,
}

impl RatioRegime {
    pub fn from_ratio(ratio: Option<f64>) -> Self {
        match ratio {
            Some(r) if r > 0.2 => RatioRegime::High,
            _ => RatioRegime::Low,
        }
    }
}

/// Four percentile limits for one gas. Any limit may be absent; a missing
/// pair skips classification for that gas under that regime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GasLimits {
    pub p90_low: Option<f64>,
    pub p95_low: Option<f64>,
    pub p90_high: Option<f64>,
    pub p95_high: Option<f64>,
}

impl GasLimits {
    /// The (90th, 95th) pair for a regime, or `None` if either limit is absent.
    pub fn for_regime(&self, regime: RatioRegime) -> Option<(f64, f64)> {
        match regime {
            RatioRegime::Low => self.p90_low.zip(self.p95_low),
            RatioRegime::High => self.p90_high.zip(self.p95_high),
        }
    }
}

/// One row of the JSON configuration source. Key names follow the
/// configuration file shape, with the regime split spelled out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdEntry {
    #[serde(rename = "Gas")]
    pub gas: String,
    #[serde(rename = "90th_<=0.2")]
    pub p90_low: Option<f64>,
    #[serde(rename = "95th_<=0.2")]
    pub p95_low: Option<f64>,
    #[serde(rename = "90th_>0.2")]
    pub p90_high: Option<f64>,
    #[serde(rename = "95th_>0.2")]
    pub p95_high: Option<f64>,
}

/// Top-level configuration document. The single table currently carried is
/// the unknown-transformer-age limit set.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ThresholdDocument {
    unknown_age: Vec<ThresholdEntry>,
}

/// Immutable gas → limits mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdTable {
    limits: BTreeMap<Gas, GasLimits>,
}

impl ThresholdTable {
    /// Build a table from configuration entries. Entries naming an unknown
    /// gas are skipped with a warning — they are configuration noise, not a
    /// load failure.
    pub fn from_entries(entries: &[ThresholdEntry]) -> Self {
        let mut limits = BTreeMap::new();
        for entry in entries {
            let Some(gas) = Gas::from_label(&entry.gas) else {
                tracing::warn!(gas = %entry.gas, "Skipping threshold entry for unknown gas");
                continue;
            };
            limits.insert(
                gas,
                GasLimits {
                    p90_low: entry.p90_low,
                    p95_low: entry.p95_low,
                    p90_high: entry.p90_high,
                    p95_high: entry.p95_high,
                },
            );
        }
        Self { limits }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ThresholdError> {
        let doc: ThresholdDocument = serde_json::from_str(json)?;
        Ok(Self::from_entries(&doc.unknown_age))
    }

    pub fn load(path: &Path) -> Result<Self, ThresholdError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize back to the configuration document shape, for the
    /// administrative save path.
    pub fn to_json_string(&self) -> Result<String, ThresholdError> {
        let doc = ThresholdDocument {
            unknown_age: self
                .limits
                .iter()
                .map(|(gas, l)| ThresholdEntry {
                    gas: gas.as_str().to_string(),
                    p90_low: l.p90_low,
                    p95_low: l.p95_low,
                    p90_high: l.p90_high,
                    p95_high: l.p95_high,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ThresholdError> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Administrative edit path: a new table with one gas's limits replaced.
    /// The original table is untouched.
    pub fn with_limits(&self, gas: Gas, limits: GasLimits) -> Self {
        let mut next = self.clone();
        next.limits.insert(gas, limits);
        next
    }

    /// The (90th, 95th) limits for a gas under a regime. `None` when the gas
    /// is absent from the table or either limit is missing — the classifier
    /// skips such gases.
    pub fn limits_for(&self, gas: Gas, regime: RatioRegime) -> Option<(f64, f64)> {
        self.limits.get(&gas).and_then(|l| l.for_regime(regime))
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}
