//! The DGA sample — the unit of work across the whole pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The nine gases reported by a DGA analysis.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gas {
    O2,
    N2,
    H2,
    CO2,
    C2H4,
    C2H6,
    C2H2,
    CH4,
    CO,
}

impl Gas {
    /// All nine reported gases.
    pub const ALL: [Gas; 9] = [
        Gas::O2,
        Gas::N2,
        Gas::H2,
        Gas::CO2,
        Gas::C2H4,
        Gas::C2H6,
        Gas::C2H2,
        Gas::CH4,
        Gas::CO,
    ];

    /// The seven gases classified against percentile thresholds.
    /// O2 and N2 only feed the ratio regime, they carry no limits of their own.
    pub const CLASSIFIED: [Gas; 7] = [
        Gas::H2,
        Gas::CH4,
        Gas::C2H6,
        Gas::C2H4,
        Gas::C2H2,
        Gas::CO,
        Gas::CO2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gas::O2 => "O2",
            Gas::N2 => "N2",
            Gas::H2 => "H2",
            Gas::CO2 => "CO2",
            Gas::C2H4 => "C2H4",
            Gas::C2H6 => "C2H6",
            Gas::C2H2 => "C2H2",
            Gas::CH4 => "CH4",
            Gas::CO => "CO",
        }
    }

    /// Resolve a gas from a label as it appears in reports, threshold
    /// configuration, and spreadsheet headers. Case-insensitive.
    pub fn from_label(label: &str) -> Option<Gas> {
        match label.trim().to_uppercase().as_str() {
            "O2" => Some(Gas::O2),
            "N2" => Some(Gas::N2),
            "H2" => Some(Gas::H2),
            "CO2" => Some(Gas::CO2),
            "C2H4" => Some(Gas::C2H4),
            "C2H6" => Some(Gas::C2H6),
            "C2H2" => Some(Gas::C2H2),
            "CH4" => Some(Gas::CH4),
            "CO" => Some(Gas::CO),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Concentration readings in ppm. `None` means the report did not carry
/// the value — distinct from a confirmed zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GasReadings {
    pub o2: Option<f64>,
    pub n2: Option<f64>,
    pub h2: Option<f64>,
    pub co2: Option<f64>,
    pub c2h4: Option<f64>,
    pub c2h6: Option<f64>,
    pub c2h2: Option<f64>,
    pub ch4: Option<f64>,
    pub co: Option<f64>,
}

impl GasReadings {
    pub fn get(&self, gas: Gas) -> Option<f64> {
        match gas {
            Gas::O2 => self.o2,
            Gas::N2 => self.n2,
            Gas::H2 => self.h2,
            Gas::CO2 => self.co2,
            Gas::C2H4 => self.c2h4,
            Gas::C2H6 => self.c2h6,
            Gas::C2H2 => self.c2h2,
            Gas::CH4 => self.ch4,
            Gas::CO => self.co,
        }
    }

    pub fn set(&mut self, gas: Gas, value: Option<f64>) {
        match gas {
            Gas::O2 => self.o2 = value,
            Gas::N2 => self.n2 = value,
            Gas::H2 => self.h2 = value,
            Gas::CO2 => self.co2 = value,
            Gas::C2H4 => self.c2h4 = value,
            Gas::C2H6 => self.c2h6 = value,
            Gas::C2H2 => self.c2h2 = value,
            Gas::CH4 => self.ch4 = value,
            Gas::CO => self.co = value,
        }
    }

    /// Reading with missing values treated as zero — the convention the
    /// diagnosis prompt uses.
    pub fn or_zero(&self, gas: Gas) -> f64 {
        self.get(gas).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        Gas::ALL.iter().all(|g| self.get(*g).is_none())
    }
}

/// A single oil sample: identification, dates, readings, and derived fields.
///
/// Created empty by extraction, mutated field-by-field through edits, with
/// derived fields (`o2_n2_ratio`, `retest_date`) recomputed via
/// `pipeline::derive::fill_derived` after any edit. The ratio is never edited
/// independently once both O2 and N2 exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: Uuid,
    pub substation: String,
    pub transformer: String,
    pub voltage: String,
    pub sample_date: Option<NaiveDate>,
    pub analysis_date: Option<NaiveDate>,
    pub gases: GasReadings,
    /// O2/N2, computed only when both inputs are present and N2 is non-zero.
    pub o2_n2_ratio: Option<f64>,
    pub result_text: String,
    /// Short diagnostic code from the lab ("N", "T1", ...).
    pub dga_code: String,
    /// Coded recommendation, letter `R` plus a month count ("R 1", "R-6").
    pub recommendation: String,
    /// Analysis date advanced by the recommended month count.
    pub retest_date: Option<NaiveDate>,
    /// Narrative diagnosis from the text-generation collaborator.
    pub diagnosis: Option<String>,
    /// Reference to the original report (file name or URL), when known.
    pub source_document: Option<String>,
}

impl Sample {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            substation: String::new(),
            transformer: String::new(),
            voltage: String::new(),
            sample_date: None,
            analysis_date: None,
            gases: GasReadings::default(),
            o2_n2_ratio: None,
            result_text: String::new(),
            dga_code: String::new(),
            recommendation: String::new(),
            retest_date: None,
            diagnosis: None,
            source_document: None,
        }
    }
}

impl Default for Sample {
    fn default() -> Self {
        Self::new()
    }
}
