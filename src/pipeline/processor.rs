//! End-to-end report processing: document bytes → extraction tiers →
//! derived fields → `Sample`.
//!
//! Classification is deliberately not part of processing — severity tiers
//! are recomputed from the sample and the threshold table on demand, never
//! stored alongside the data.

use super::derive::fill_derived;
use super::extraction::orchestrator::DocumentExtractor;
use super::extraction::page_image::FirstPageImager;
use super::extraction::pdf::PdfTextExtractor;
use super::extraction::types::{ExtractedFields, ExtractionOutcome};
use super::extraction::ExtractionError;
use super::inference::GeminiClient;
use crate::cleaning;
use crate::config::EngineConfig;
use crate::models::Sample;

/// Assemble a sample from an extracted field map.
///
/// Date strings go through the shared cleaning rules; an uncleanable date is
/// an empty date. Text fields default to empty strings.
pub fn sample_from_fields(fields: &ExtractedFields) -> Sample {
    let mut sample = Sample::new();
    sample.substation = fields.substation.clone().unwrap_or_default();
    sample.transformer = fields.transformer.clone().unwrap_or_default();
    sample.voltage = fields.voltage.clone().unwrap_or_default();
    sample.sample_date = fields.sample_date.as_deref().and_then(cleaning::clean_date);
    sample.analysis_date = fields
        .analysis_date
        .as_deref()
        .and_then(cleaning::clean_date);
    sample.gases = fields.gases;
    sample.result_text = fields.result_text.clone().unwrap_or_default();
    sample.dga_code = fields.dga_code.clone().unwrap_or_default();
    sample.recommendation = fields.recommendation.clone().unwrap_or_default();
    sample
}

/// Synchronous per-document processor. Each document is independent; there
/// is no shared mutable state across samples.
pub struct ReportProcessor {
    extractor: DocumentExtractor,
}

impl ReportProcessor {
    pub fn new(extractor: DocumentExtractor) -> Self {
        Self { extractor }
    }

    /// Production wiring: pdf-extract text layer, lopdf page raster, and a
    /// vision client when the config carries a credential.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut extractor = DocumentExtractor::new(
            Box::new(PdfTextExtractor),
            Box::new(FirstPageImager),
        );
        if let Some(credential) = &config.vision_credential {
            extractor = extractor.with_vision_client(Box::new(GeminiClient::with_credential(
                credential,
                config.http_timeout_secs,
            )));
        }
        Self::new(extractor)
    }

    /// Process one report: extract, assemble, derive.
    ///
    /// The extraction outcome is returned alongside the sample so callers
    /// can inspect provenance, the audit text, and any fallback error tag.
    pub fn process(
        &self,
        pdf_bytes: &[u8],
    ) -> Result<(Sample, ExtractionOutcome), ExtractionError> {
        let outcome = self.extractor.extract(pdf_bytes)?;

        let mut sample = sample_from_fields(&outcome.fields);
        fill_derived(&mut sample);

        tracing::info!(
            sample_id = %sample.id,
            provenance = ?outcome.provenance,
            has_ratio = sample.o2_n2_ratio.is_some(),
            has_retest = sample.retest_date.is_some(),
            "Report processed"
        );
        Ok((sample, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gas, RatioRegime, ThresholdTable};
    use crate::pipeline::classify::{classify_sample, SeverityTier};
    use crate::pipeline::extraction::types::{PageRenderer, PdfTextSource, Provenance};
    use crate::pipeline::inference::MockVisionClient;
    use chrono::NaiveDate;

    struct StaticPdfText(Vec<String>);

    impl PdfTextSource for StaticPdfText {
        fn page_texts(&self, _pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    struct StaticRenderer;

    impl PageRenderer for StaticRenderer {
        fn render_first_page(&self, _pdf_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
            Ok(b"png".to_vec())
        }
    }

    fn processor_with_text(text: &str) -> ReportProcessor {
        ReportProcessor::new(DocumentExtractor::new(
            Box::new(StaticPdfText(vec![text.to_string()])),
            Box::new(StaticRenderer),
        ))
    }

    #[test]
    fn text_report_end_to_end() {
        let text = "Substation: West Delta\nTransformer: TR-7 66/11\n\
                    Analysis Date: 2024-01-15\n\
                    H2: 50\nCH4: 10\nCO: 2500\n\
                    Recommended: R 3\nResult of analysis: high CO";

        let (sample, outcome) = processor_with_text(text).process(b"pdf").unwrap();

        assert_eq!(outcome.provenance, Provenance::TextLayer);
        assert_eq!(sample.gases.h2, Some(50.0));
        assert_eq!(sample.gases.ch4, Some(10.0));
        assert_eq!(sample.gases.co, Some(2500.0));
        assert_eq!(
            sample.analysis_date,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        // R 3 from 2024-01-15 → 2024-04-15.
        assert_eq!(
            sample.retest_date,
            NaiveDate::from_ymd_opt(2024, 4, 15)
        );
        assert_eq!(sample.voltage, "66/11");

        // With a low-regime 95th limit of 1000, CO classifies Critical.
        let table = ThresholdTable::from_json_str(
            r#"{"unknown_age": [
                {"Gas": "CO", "90th_<=0.2": 600, "95th_<=0.2": 1000, "90th_>0.2": 500, "95th_>0.2": 900}
            ]}"#,
        )
        .unwrap();
        let report = classify_sample(&sample, &table);
        assert_eq!(report.regime, RatioRegime::Low);
        assert_eq!(report.gas_tiers[&Gas::CO], SeverityTier::Critical);
    }

    #[test]
    fn ratio_derived_when_both_gases_extracted() {
        let text = "Substation: North Ring Station Area\n\
                    O2: 1200\nN2: 6000\nH2: 20\nCH4: 5\nCO: 100\nCO2: 900";
        let (sample, _) = processor_with_text(text).process(b"pdf").unwrap();
        let ratio = sample.o2_n2_ratio.unwrap();
        assert!((ratio - 0.2).abs() < 1e-9);
    }

    #[test]
    fn vision_fallback_feeds_the_same_assembly() {
        let extractor = DocumentExtractor::new(
            Box::new(StaticPdfText(vec![])),
            Box::new(StaticRenderer),
        )
        .with_vision_client(Box::new(MockVisionClient::new(
            r#"{"substation": "East Ring", "analysis_date": "2023-06-01",
                "o2": 1500, "n2": 5000, "recommendation": "R 6"}"#,
        )));
        let processor = ReportProcessor::new(extractor);

        let (sample, outcome) = processor.process(b"pdf").unwrap();
        assert_eq!(outcome.provenance, Provenance::VisionFallback);
        assert_eq!(sample.substation, "East Ring");
        assert_eq!(sample.o2_n2_ratio, Some(0.3));
        assert_eq!(
            sample.retest_date,
            NaiveDate::from_ymd_opt(2023, 12, 1)
        );
    }

    #[test]
    fn bad_date_degrades_to_empty_not_failure() {
        let fields = ExtractedFields {
            analysis_date: Some("not-a-date".into()),
            recommendation: Some("R 3".into()),
            ..Default::default()
        };
        let mut sample = sample_from_fields(&fields);
        fill_derived(&mut sample);
        assert_eq!(sample.analysis_date, None);
        assert_eq!(sample.retest_date, None);
        assert_eq!(sample.recommendation, "R 3");
    }
}
