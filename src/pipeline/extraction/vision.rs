//! Vision fallback tier — field extraction from a page raster.
//!
//! Runs only when the text layer is insufficient. Sends page 1 as PNG with
//! an instruction naming the exact canonical keys, then parses the JSON the
//! model returns (tolerating surrounding prose). This tier never raises:
//! decode and service failures come back as an error-tagged outcome with the
//! raw response kept for diagnostics.

use serde_json::Value;

use super::json_scan::first_json_object;
use super::types::{ExtractedFields, ExtractionOutcome, Provenance};
use crate::cleaning;
use crate::models::{Gas, GasReadings};
use crate::pipeline::inference::VisionClient;

/// Instruction sent with the page image. Names every canonical key and the
/// expected date format so the response maps straight onto the field set.
pub const FIELD_INSTRUCTION: &str = "\
Extract the following fields from this DGA transformer-oil lab report image \
into a valid JSON object.\n\
Keys: \"substation\", \"transformer\", \"voltage\", \
\"sample_date\" (YYYY-MM-DD), \"analysis_date\" (YYYY-MM-DD), \
\"o2\", \"n2\", \"h2\", \"co2\", \"c2h4\", \"c2h6\", \"c2h2\", \"ch4\", \"co\" \
(all numbers, ppm), \
\"result_text\", \"dga_code\", \"recommendation\" (R1, R2 etc).\n\
If a field is missing, use an empty string \"\". Return ONLY JSON.";

/// Fallback extractor delegating to a vision inference collaborator.
pub struct VisionFieldExtractor {
    client: Box<dyn VisionClient + Send + Sync>,
}

impl VisionFieldExtractor {
    pub fn new(client: Box<dyn VisionClient + Send + Sync>) -> Self {
        Self { client }
    }

    /// Request the canonical field set for a page image.
    ///
    /// Always returns an outcome tagged `VisionFallback`; failures set the
    /// error marker instead of propagating.
    pub fn extract(&self, page_png: &[u8]) -> ExtractionOutcome {
        let response = match self.client.describe_image(page_png, FIELD_INSTRUCTION) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Vision inference call failed");
                return ExtractionOutcome {
                    provenance: Provenance::VisionFallback,
                    fields: ExtractedFields::default(),
                    raw_text: e.to_string(),
                    error: Some(e.to_string()),
                };
            }
        };

        let Some(json_span) = first_json_object(&response) else {
            tracing::warn!(
                response_len = response.len(),
                "No JSON object found in vision response"
            );
            return ExtractionOutcome {
                provenance: Provenance::VisionFallback,
                fields: ExtractedFields::default(),
                error: Some("No JSON object found in response".to_string()),
                raw_text: response,
            };
        };

        match serde_json::from_str::<Value>(json_span) {
            Ok(value) => {
                let fields = fields_from_value(&value);
                tracing::info!(
                    empty = fields.is_empty(),
                    "Vision fallback extraction complete"
                );
                ExtractionOutcome {
                    provenance: Provenance::VisionFallback,
                    fields,
                    raw_text: response,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Vision response JSON decode failed");
                ExtractionOutcome {
                    provenance: Provenance::VisionFallback,
                    fields: ExtractedFields::default(),
                    error: Some(format!("JSON decode failed: {e}")),
                    raw_text: response,
                }
            }
        }
    }
}

/// Map a decoded JSON object onto the canonical field set, leniently:
/// numbers may arrive as JSON numbers or as strings (with thousands
/// separators); anything uncoercible is an empty field.
fn fields_from_value(value: &Value) -> ExtractedFields {
    let mut gases = GasReadings::default();
    for gas in Gas::ALL {
        gases.set(gas, number_field(value, &gas.as_str().to_lowercase()));
    }

    ExtractedFields {
        substation: text_field(value, "substation"),
        transformer: text_field(value, "transformer"),
        voltage: text_field(value, "voltage"),
        sample_date: text_field(value, "sample_date"),
        analysis_date: text_field(value, "analysis_date"),
        gases,
        result_text: text_field(value, "result_text"),
        dga_code: text_field(value, "dga_code"),
        recommendation: text_field(value, "recommendation"),
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key) {
        Some(Value::String(s)) => cleaning::clean_text(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        Some(Value::String(s)) => cleaning::clean_number(s),
        _ => None,
    }
}
