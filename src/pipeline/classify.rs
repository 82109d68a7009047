//! Severity classification against percentile thresholds.
//!
//! Pure functions of (reading, ratio regime, threshold table) — recomputing
//! from the same inputs always reproduces the same tier, and no tier is ever
//! stored apart from its inputs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Gas, RatioRegime, Sample, ThresholdTable};

/// Severity of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Normal,
    /// Above the 90th-percentile limit.
    Warning,
    /// Above the 95th-percentile limit.
    Critical,
}

/// Per-sample classification: the active regime, the ratio field's own tier,
/// and a tier for each classified gas that had a value and limits.
///
/// Gases with no reading or no limits are absent from `gas_tiers` — the
/// absence of data stays visibly distinct from a confirmed Normal.
#[derive(Debug, Clone, Serialize)]
pub struct SeverityReport {
    pub regime: RatioRegime,
    pub ratio_tier: SeverityTier,
    pub gas_tiers: BTreeMap<Gas, SeverityTier>,
}

/// Tier for one value against a (90th, 95th) limit pair.
/// Strictly above the 95th is Critical; strictly above the 90th is Warning.
pub fn classify_value(value: f64, p90: f64, p95: f64) -> SeverityTier {
    if value > p95 {
        SeverityTier::Critical
    } else if value > p90 {
        SeverityTier::Warning
    } else {
        SeverityTier::Normal
    }
}

/// Tier for one gas under a regime, or `None` when the reading is missing
/// or the table has no limits for the gas.
pub fn classify_gas(
    table: &ThresholdTable,
    regime: RatioRegime,
    gas: Gas,
    value: Option<f64>,
) -> Option<SeverityTier> {
    let value = value?;
    let (p90, p95) = table.limits_for(gas, regime)?;
    Some(classify_value(value, p90, p95))
}

/// The ratio field's own display tier. A missing ratio is treated as 0.
pub fn ratio_tier(ratio: Option<f64>) -> SeverityTier {
    let ratio = ratio.unwrap_or(0.0);
    if ratio > 1.0 {
        SeverityTier::Critical
    } else if ratio > 0.2 {
        SeverityTier::Warning
    } else {
        SeverityTier::Normal
    }
}

/// Classify a whole sample: regime selection, ratio tier, and a tier per
/// classified gas.
pub fn classify_sample(sample: &Sample, table: &ThresholdTable) -> SeverityReport {
    let regime = RatioRegime::from_ratio(sample.o2_n2_ratio);

    let mut gas_tiers = BTreeMap::new();
    for gas in Gas::CLASSIFIED {
        if let Some(tier) = classify_gas(table, regime, gas, sample.gases.get(gas)) {
            gas_tiers.insert(gas, tier);
        }
    }

    SeverityReport {
        regime,
        ratio_tier: ratio_tier(sample.o2_n2_ratio),
        gas_tiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThresholdTable;

    fn table() -> ThresholdTable {
        ThresholdTable::from_json_str(
            r#"{
              "unknown_age": [
                {"Gas": "H2", "90th_<=0.2": 100, "95th_<=0.2": 200, "90th_>0.2": 40, "95th_>0.2": 90},
                {"Gas": "CO", "90th_<=0.2": 600, "95th_<=0.2": 1000, "90th_>0.2": 500, "95th_>0.2": 900},
                {"Gas": "CH4", "90th_<=0.2": 75, "95th_<=0.2": 150, "90th_>0.2": 30, "95th_>0.2": 60},
                {"Gas": "C2H2", "90th_<=0.2": 1, "95th_<=0.2": 2, "90th_>0.2": null, "95th_>0.2": null}
              ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn tiers_around_the_limits() {
        // Strictly above the 95th → Critical.
        assert_eq!(classify_value(201.0, 100.0, 200.0), SeverityTier::Critical);
        // Exactly the 95th → Warning (strictly-greater rule).
        assert_eq!(classify_value(200.0, 100.0, 200.0), SeverityTier::Warning);
        // Strictly above the 90th → Warning.
        assert_eq!(classify_value(100.1, 100.0, 200.0), SeverityTier::Warning);
        // Exactly the 90th → Normal.
        assert_eq!(classify_value(100.0, 100.0, 200.0), SeverityTier::Normal);
        assert_eq!(classify_value(0.0, 100.0, 200.0), SeverityTier::Normal);
    }

    #[test]
    fn regime_selects_limit_set() {
        let table = table();
        // H2 = 95: Normal under low-regime limits (100/200), Critical under
        // high-regime limits (40/90).
        assert_eq!(
            classify_gas(&table, RatioRegime::Low, Gas::H2, Some(95.0)),
            Some(SeverityTier::Normal)
        );
        assert_eq!(
            classify_gas(&table, RatioRegime::High, Gas::H2, Some(95.0)),
            Some(SeverityTier::Critical)
        );
    }

    #[test]
    fn missing_value_is_skipped_not_normal() {
        let table = table();
        assert_eq!(classify_gas(&table, RatioRegime::Low, Gas::H2, None), None);
    }

    #[test]
    fn missing_limits_skip_classification() {
        let table = table();
        // C2H2 has no high-regime limits configured.
        assert_eq!(
            classify_gas(&table, RatioRegime::High, Gas::C2H2, Some(50.0)),
            None
        );
        // C2H6 is absent from the table.
        assert_eq!(
            classify_gas(&table, RatioRegime::Low, Gas::C2H6, Some(50.0)),
            None
        );
    }

    #[test]
    fn ratio_field_tiers() {
        assert_eq!(ratio_tier(Some(1.5)), SeverityTier::Critical);
        // Exactly 1.0 is not strictly greater — stays Warning territory.
        assert_eq!(ratio_tier(Some(1.0)), SeverityTier::Warning);
        assert_eq!(ratio_tier(Some(0.5)), SeverityTier::Warning);
        assert_eq!(ratio_tier(Some(0.2)), SeverityTier::Normal);
        assert_eq!(ratio_tier(Some(0.0)), SeverityTier::Normal);
        assert_eq!(ratio_tier(None), SeverityTier::Normal);
    }

    #[test]
    fn classify_sample_end_to_end() {
        let mut sample = Sample::new();
        sample.gases.h2 = Some(50.0);
        sample.gases.ch4 = Some(10.0);
        sample.gases.co = Some(2500.0);
        // No ratio → low regime.

        let report = classify_sample(&sample, &table());
        assert_eq!(report.regime, RatioRegime::Low);
        assert_eq!(report.ratio_tier, SeverityTier::Normal);
        assert_eq!(report.gas_tiers[&Gas::CO], SeverityTier::Critical);
        assert_eq!(report.gas_tiers[&Gas::H2], SeverityTier::Normal);
        assert_eq!(report.gas_tiers[&Gas::CH4], SeverityTier::Normal);
        // Gases with no reading are absent, not Normal.
        assert!(!report.gas_tiers.contains_key(&Gas::C2H4));
    }

    #[test]
    fn high_ratio_switches_regime() {
        let mut sample = Sample::new();
        sample.o2_n2_ratio = Some(0.35);
        sample.gases.ch4 = Some(45.0);

        let report = classify_sample(&sample, &table());
        assert_eq!(report.regime, RatioRegime::High);
        assert_eq!(report.ratio_tier, SeverityTier::Warning);
        // 45 is Warning under high limits (30/60), would be Normal under low.
        assert_eq!(report.gas_tiers[&Gas::CH4], SeverityTier::Warning);
    }

    #[test]
    fn classification_is_deterministic() {
        let mut sample = Sample::new();
        sample.o2_n2_ratio = Some(0.1);
        sample.gases.co = Some(700.0);

        let table = table();
        let first = classify_sample(&sample, &table);
        let second = classify_sample(&sample, &table);
        assert_eq!(first.gas_tiers, second.gas_tiers);
        assert_eq!(first.ratio_tier, second.ratio_tier);
    }
}
