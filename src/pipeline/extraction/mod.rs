pub mod json_scan;
pub mod orchestrator;
pub mod page_image;
pub mod patterns;
pub mod pdf;
pub mod text_layer;
pub mod types;
pub mod vision;

pub use orchestrator::DocumentExtractor;
pub use types::{ExtractedFields, ExtractionOutcome, Provenance};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Document has no pages")]
    EmptyDocument,

    /// The text layer was insufficient and no vision credential is
    /// configured — the fallback tier cannot run. This is the only
    /// extraction condition escalated to the caller as a hard block.
    #[error("No usable text layer and no vision credential is configured")]
    VisionBlocked,
}
