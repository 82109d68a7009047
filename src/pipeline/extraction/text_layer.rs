//! Text-layer extraction tier — no inference service required.
//!
//! Assembles the per-page text of a document and runs the pattern tables
//! over it. Reports "insufficient text" when the assembled content is too
//! short to be a real text layer, so the orchestrator can invoke the vision
//! fallback tier instead.

use super::patterns::extract_fields;
use super::types::ExtractedFields;

/// Minimum non-whitespace content for the text layer to count as usable.
/// Scanned PDFs typically yield nothing or a few stray glyphs; anything
/// under this is treated as "no text layer".
pub const MIN_TEXT_LEN: usize = 50;

/// Outcome of the text-layer tier.
#[derive(Debug, Clone)]
pub enum TextLayerResult {
    /// The text layer was usable; fields were extracted from it.
    Extracted {
        fields: ExtractedFields,
        raw_text: String,
    },
    /// Too little text to parse — the fallback tier should run.
    /// The assembled text is kept for audit regardless.
    InsufficientText { raw_text: String },
}

/// Pure text-layer extractor over pre-split page texts.
pub struct TextLayerExtractor;

impl TextLayerExtractor {
    pub fn extract(&self, page_texts: &[String]) -> TextLayerResult {
        let raw_text = page_texts.join("\n");

        let content_len = raw_text.chars().filter(|c| !c.is_whitespace()).count();
        if content_len <= MIN_TEXT_LEN {
            tracing::info!(content_len, "Text layer insufficient, fallback tier needed");
            return TextLayerResult::InsufficientText { raw_text };
        }

        let fields = extract_fields(&raw_text);
        tracing::info!(
            content_len,
            pages = page_texts.len(),
            "Text layer extraction complete"
        );
        TextLayerResult::Extracted { fields, raw_text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_text() -> String {
        "Substation: West Delta\n\
         Transformer: TR-7 66/11\n\
         Sample Date: 2024-01-10\n\
         Analysis Date: 2024-01-15\n\
         H2: 50\nCH4: 10\nCO: 2500\nCO2: 4,100\nO2: 1200\nN2: 58000\n\
         Result of analysis: Elevated carbon monoxide\n\
         DGA: T1\n\
         Recommended: R 3"
            .to_string()
    }

    #[test]
    fn extracts_from_usable_text() {
        let result = TextLayerExtractor.extract(&[report_text()]);
        let TextLayerResult::Extracted { fields, raw_text } = result else {
            panic!("expected extraction");
        };
        assert_eq!(fields.substation.as_deref(), Some("West Delta"));
        assert_eq!(fields.gases.co, Some(2500.0));
        assert_eq!(fields.gases.co2, Some(4100.0));
        assert!(raw_text.contains("TR-7"));
    }

    #[test]
    fn short_text_is_insufficient() {
        let result = TextLayerExtractor.extract(&["TR-1".to_string()]);
        assert!(matches!(result, TextLayerResult::InsufficientText { .. }));
    }

    #[test]
    fn whitespace_does_not_count_as_content() {
        let padded = format!("abc{}", " \n\t".repeat(100));
        let result = TextLayerExtractor.extract(&[padded]);
        assert!(matches!(result, TextLayerResult::InsufficientText { .. }));
    }

    #[test]
    fn empty_pages_are_insufficient_but_keep_raw_text() {
        let result = TextLayerExtractor.extract(&[String::new(), String::new()]);
        let TextLayerResult::InsufficientText { raw_text } = result else {
            panic!("expected insufficiency");
        };
        assert_eq!(raw_text, "\n");
    }

    #[test]
    fn pages_are_joined_before_matching() {
        // Label on page 1, gases on page 2 — both must be visible to the
        // pattern pass.
        let page1 = format!("Substation: East Ring\n{}", "x ".repeat(40));
        let page2 = "H2: 75".to_string();
        let result = TextLayerExtractor.extract(&[page1, page2]);
        let TextLayerResult::Extracted { fields, .. } = result else {
            panic!("expected extraction");
        };
        assert_eq!(fields.substation.as_deref(), Some("East Ring"));
        assert_eq!(fields.gases.h2, Some(75.0));
    }
}
