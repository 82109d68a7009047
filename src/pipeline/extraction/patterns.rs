//! Pattern tables for pulling canonical fields out of report text.
//!
//! Each field carries an explicit ordered list of label-variant patterns
//! (Arabic and English, as they appear on the lab's report forms); the first
//! pattern that matches wins. Numeric captures go through the shared cleaning
//! rules, so a label that matches but fails to parse degrades to an empty
//! field instead of failing the document.
//!
//! Gas labels are word-boundary guarded: the `regex` crate has no lookbehind,
//! but `\bCO\b` cannot match inside "CO2" (no boundary between word
//! characters), which also keeps "H2" from matching inside "C2H2".

use std::sync::LazyLock;

use regex::Regex;

use super::types::ExtractedFields;
use crate::cleaning;
use crate::models::{Gas, GasReadings};

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex")
}

static SUBSTATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        rx(r"المحطة\s*[:\-]?\s*(.+)"),
        rx(r"(?i)Substation\s*[:\-]?\s*(.+)"),
    ]
});

static TRANSFORMER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        rx(r"المحول\s*[:\-]?\s*(.+)"),
        rx(r"(?i)Transformer(?:\s*No\.?)?\s*[:\-]?\s*(.+)"),
    ]
});

static VOLTAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        rx(r"الجهد\s*[:\-]?\s*([0-9/ ]+k?V)"),
        rx(r"(?i)Voltage\s*[:\-]?\s*([0-9/ ]+k?V)"),
    ]
});

/// Ratio-like substring ("66/11", "220/66", "500") inside a transformer
/// identifier, used to infer the voltage rating when no voltage label exists.
static VOLTAGE_IN_TRANSFORMER: LazyLock<Regex> =
    LazyLock::new(|| rx(r"(\d{2,3}(?:/\d{2,3})?)"));

static SAMPLE_DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        rx(r"تاريخ\s*العينة\s*[:\-]?\s*([0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2})"),
        rx(r"(?i)(?:Sample\s*Date|Date\s*of\s*Sample)\s*[:\-]?\s*([0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2})"),
    ]
});

static ANALYSIS_DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        rx(r"تاريخ\s*التحليل\s*[:\-]?\s*([0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2})"),
        rx(r"(?i)(?:Analysis\s*Date|Date\s*of\s*Analysis)\s*[:\-]?\s*([0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2})"),
    ]
});

static RESULT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        rx(r"(?i)Result\s*of\s*analysis\s*[:\-]?\s*(.+)"),
        rx(r"النتيجة\s*[:\-]?\s*(.+)"),
    ]
});

static DGA_CODE_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| vec![rx(r"\bDGA\s*[:\-]?\s*([A-Z0-9\-]+)")]);

static RECOMMENDATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        rx(r"(?i)Recommended\s*[:\-]?\s*(R[\s\-:.()]*[0-9]+)"),
        rx(r"التوصية\s*[:\-]?\s*(?i:(R[\s\-:.()]*[0-9]+))"),
    ]
});

/// Word-boundary-guarded concentration patterns, one per gas.
static GAS_PATTERNS: LazyLock<Vec<(Gas, Regex)>> = LazyLock::new(|| {
    Gas::ALL
        .iter()
        .map(|gas| {
            let pattern = format!(r"(?i)\b{}\b\s*[:=]?\s*([0-9][0-9,\.]*)", gas.as_str());
            (*gas, rx(&pattern))
        })
        .collect()
});

/// First capture of the first matching pattern, trimmed. `None` on a miss.
fn search_text(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| cleaning::clean_text(m.as_str()))
    })
}

/// Like [`search_text`] but coerced to a number. A label that matched with an
/// uncoercible capture is logged and stored as empty.
fn search_number(text: &str, field: &str, patterns: &[Regex]) -> Option<f64> {
    let captured = patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })?;

    let value = cleaning::clean_number(captured);
    if value.is_none() {
        tracing::debug!(field, captured, "Label matched but value is not numeric");
    }
    value
}

/// Extract gas concentrations from report text.
fn extract_gases(text: &str) -> GasReadings {
    let mut readings = GasReadings::default();
    for (gas, pattern) in GAS_PATTERNS.iter() {
        let value = search_number(text, gas.as_str(), std::slice::from_ref(pattern));
        readings.set(*gas, value);
    }
    readings
}

/// Extract the full canonical field set from report text.
///
/// Pure text-to-map transformation: every miss is an empty field, nothing
/// here can fail.
pub fn extract_fields(text: &str) -> ExtractedFields {
    let transformer = search_text(text, &TRANSFORMER_PATTERNS);

    // Voltage: labelled value first, otherwise infer a ratio-like substring
    // from the transformer identifier ("TR-2 66/11" → "66/11").
    let voltage = search_text(text, &VOLTAGE_PATTERNS).or_else(|| {
        transformer.as_deref().and_then(|t| {
            VOLTAGE_IN_TRANSFORMER
                .captures(t)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
    });

    ExtractedFields {
        substation: search_text(text, &SUBSTATION_PATTERNS),
        transformer,
        voltage,
        sample_date: search_text(text, &SAMPLE_DATE_PATTERNS),
        analysis_date: search_text(text, &ANALYSIS_DATE_PATTERNS),
        gases: extract_gases(text),
        result_text: search_text(text, &RESULT_PATTERNS),
        dga_code: search_text(text, &DGA_CODE_PATTERNS),
        recommendation: search_text(text, &RECOMMENDATION_PATTERNS),
    }
}
