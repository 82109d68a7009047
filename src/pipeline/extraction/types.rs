//! Shared extraction types: the canonical field set, provenance tagging,
//! and the trait seams for the PDF collaborators.

use serde::Serialize;

use super::ExtractionError;
use crate::models::GasReadings;

/// Which extraction tier produced a field map.
///
/// Always retained alongside the extracted data so downstream consumers can
/// judge how much to trust it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Parsed from the document's embedded text layer.
    TextLayer,
    /// Produced by the vision inference collaborator from a page raster.
    VisionFallback,
    /// Nothing could be extracted (e.g. the page raster itself failed).
    None,
}

/// Flat field map over the canonical keys. Every value is either a parsed
/// primitive or an empty sentinel (`None`) — a miss is a normal outcome,
/// never an error. Dates stay raw strings here; cleaning to `NaiveDate`
/// happens when a `Sample` is assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedFields {
    pub substation: Option<String>,
    pub transformer: Option<String>,
    pub voltage: Option<String>,
    pub sample_date: Option<String>,
    pub analysis_date: Option<String>,
    pub gases: GasReadings,
    pub result_text: Option<String>,
    pub dga_code: Option<String>,
    pub recommendation: Option<String>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.substation.is_none()
            && self.transformer.is_none()
            && self.voltage.is_none()
            && self.sample_date.is_none()
            && self.analysis_date.is_none()
            && self.gases.is_empty()
            && self.result_text.is_none()
            && self.dga_code.is_none()
            && self.recommendation.is_none()
    }
}

/// Result of running a document through the extraction tiers.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub provenance: Provenance,
    pub fields: ExtractedFields,
    /// Raw source kept for audit: the assembled text layer, or the vision
    /// collaborator's raw response.
    pub raw_text: String,
    /// Error marker set when the fallback tier could not produce usable
    /// fields (JSON decode failure, service failure). The outcome itself is
    /// still returned — extraction failures are never exceptions.
    pub error: Option<String>,
}

/// Text-layer access to a PDF, one string per page.
pub trait PdfTextSource {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// First-page raster for the vision fallback tier.
pub trait PageRenderer {
    fn render_first_page(&self, pdf_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError>;
}
