//! Two-tier extraction orchestrator: text layer first, vision fallback second.
//!
//! Collaborators sit behind traits so tests can inject mocks for the PDF
//! text source, the page renderer, and the vision client.

use super::text_layer::{TextLayerExtractor, TextLayerResult};
use super::types::{
    ExtractedFields, ExtractionOutcome, PageRenderer, PdfTextSource, Provenance,
};
use super::vision::VisionFieldExtractor;
use super::ExtractionError;
use crate::pipeline::inference::VisionClient;

/// Document-bytes → field-map extractor.
pub struct DocumentExtractor {
    pdf_text: Box<dyn PdfTextSource + Send + Sync>,
    renderer: Box<dyn PageRenderer + Send + Sync>,
    vision: Option<VisionFieldExtractor>,
}

impl DocumentExtractor {
    pub fn new(
        pdf_text: Box<dyn PdfTextSource + Send + Sync>,
        renderer: Box<dyn PageRenderer + Send + Sync>,
    ) -> Self {
        Self {
            pdf_text,
            renderer,
            vision: None,
        }
    }

    /// Enable the vision fallback tier. Without a client the tier is
    /// blocked, not silently skipped.
    pub fn with_vision_client(mut self, client: Box<dyn VisionClient + Send + Sync>) -> Self {
        self.vision = Some(VisionFieldExtractor::new(client));
        self
    }

    /// Run the extraction tiers over a document.
    ///
    /// The only hard failure is [`ExtractionError::VisionBlocked`]: no usable
    /// text layer and no credential for the fallback. Everything else comes
    /// back as an outcome, error-tagged when the fallback tier failed.
    pub fn extract(&self, pdf_bytes: &[u8]) -> Result<ExtractionOutcome, ExtractionError> {
        // A PDF without a readable text layer is a fallback case, not a
        // failure — scanned reports routinely choke the text parser.
        let pages = match self.pdf_text.page_texts(pdf_bytes) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!(error = %e, "Text-layer read failed, treating as no text");
                Vec::new()
            }
        };

        let raw_text = match TextLayerExtractor.extract(&pages) {
            TextLayerResult::Extracted { fields, raw_text } => {
                tracing::info!(provenance = "text_layer", "Extraction complete");
                return Ok(ExtractionOutcome {
                    provenance: Provenance::TextLayer,
                    fields,
                    raw_text,
                    error: None,
                });
            }
            TextLayerResult::InsufficientText { raw_text } => raw_text,
        };

        let Some(vision) = &self.vision else {
            tracing::warn!("Vision fallback needed but no credential is configured");
            return Err(ExtractionError::VisionBlocked);
        };

        let page_png = match self.renderer.render_first_page(pdf_bytes) {
            Ok(png) => png,
            Err(e) => {
                // Local render failure: the document yielded nothing, but one
                // bad document must not abort the caller's batch.
                tracing::warn!(error = %e, "First-page render failed");
                return Ok(ExtractionOutcome {
                    provenance: Provenance::None,
                    fields: ExtractedFields::default(),
                    raw_text,
                    error: Some(format!("Page render failed: {e}")),
                });
            }
        };

        let outcome = vision.extract(&page_png);
        tracing::info!(
            provenance = "vision_fallback",
            error = outcome.error.is_some(),
            "Extraction complete"
        );
        Ok(outcome)
    }
}
