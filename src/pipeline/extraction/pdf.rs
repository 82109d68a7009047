//! PDF text-layer access using the pdf-extract crate.

use super::types::PdfTextSource;
use super::ExtractionError;

/// Text-layer reader for digital PDFs with embedded text.
pub struct PdfTextExtractor;

impl PdfTextSource for PdfTextExtractor {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
        if pages.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }
        Ok(pages)
    }
}
