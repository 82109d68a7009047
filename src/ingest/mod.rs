//! Batch import adapter: CSV exports → samples.
//!
//! Thin glue over the same column-mapping and cleaning rules the extraction
//! path uses. Row-level problems never abort an import: uncleanable values
//! degrade to empty fields and rows without any identification are skipped
//! and counted.

pub mod columns;

use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::cleaning;
use crate::models::Sample;
use crate::pipeline::derive::fill_derived;
use columns::{canonical_column, Column};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of a batch import.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub samples: Vec<Sample>,
    /// Rows skipped because they carried neither a substation nor a
    /// transformer identifier.
    pub skipped_rows: usize,
    /// Sheet headers that mapped to no canonical column.
    pub unmapped_headers: Vec<String>,
}

/// Read samples from CSV with bilingual headers.
pub fn read_samples_csv<R: Read>(reader: R) -> Result<IngestReport, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Resolve each header position once.
    let mut layout: Vec<Option<Column>> = Vec::new();
    let mut unmapped_headers = Vec::new();
    for header in csv_reader.headers()?.iter() {
        match canonical_column(header) {
            Some(column) => layout.push(Some(column)),
            None => {
                if !header.trim().is_empty() {
                    unmapped_headers.push(header.trim().to_string());
                }
                layout.push(None);
            }
        }
    }

    tracing::info!(
        mapped = layout.iter().filter(|c| c.is_some()).count(),
        unmapped = unmapped_headers.len(),
        "CSV headers resolved"
    );

    let mut report = IngestReport {
        unmapped_headers,
        ..Default::default()
    };

    for record in csv_reader.records() {
        let record = record?;
        let sample = sample_from_record(&layout, &record);

        if sample.substation.is_empty() && sample.transformer.is_empty() {
            report.skipped_rows += 1;
            continue;
        }
        report.samples.push(sample);
    }

    tracing::info!(
        imported = report.samples.len(),
        skipped = report.skipped_rows,
        "CSV import complete"
    );
    Ok(report)
}

/// Import a CSV file, stamping each sample with the originating file name.
pub fn import_csv_file(path: &Path) -> Result<IngestReport, IngestError> {
    let file = std::fs::File::open(path)?;
    let mut report = read_samples_csv(file)?;

    let label = path.file_name().map(|n| n.to_string_lossy().into_owned());
    for sample in &mut report.samples {
        sample.source_document = label.clone();
    }
    Ok(report)
}

fn sample_from_record(layout: &[Option<Column>], record: &csv::StringRecord) -> Sample {
    let mut sample = Sample::new();
    let mut imported_ratio = None;
    let mut imported_retest = None;

    for (idx, value) in record.iter().enumerate() {
        let Some(Some(column)) = layout.get(idx) else {
            continue;
        };
        match column {
            Column::Substation => {
                sample.substation = cleaning::clean_text(value).unwrap_or_default()
            }
            Column::Transformer => {
                sample.transformer = cleaning::clean_text(value).unwrap_or_default()
            }
            Column::Voltage => sample.voltage = cleaning::clean_text(value).unwrap_or_default(),
            Column::SampleDate => sample.sample_date = cleaning::clean_date(value),
            Column::AnalysisDate => sample.analysis_date = cleaning::clean_date(value),
            Column::RetestDate => imported_retest = cleaning::clean_date(value),
            Column::Ratio => imported_ratio = cleaning::clean_number(value),
            Column::Gas(gas) => sample.gases.set(*gas, cleaning::clean_number(value)),
            Column::ResultText => {
                sample.result_text = cleaning::clean_text(value).unwrap_or_default()
            }
            Column::DgaCode => sample.dga_code = cleaning::clean_text(value).unwrap_or_default(),
            Column::Recommendation => {
                sample.recommendation = cleaning::clean_text(value).unwrap_or_default()
            }
            Column::Diagnosis => sample.diagnosis = cleaning::clean_text(value),
        }
    }

    // Derivations win over imported values; imported values only fill the
    // gaps the derivations cannot (sheet carries a ratio but no O2/N2, or a
    // retest date with no parseable recommendation).
    fill_derived(&mut sample);
    if sample.o2_n2_ratio.is_none() {
        sample.o2_n2_ratio = imported_ratio;
    }
    if sample.retest_date.is_none() {
        sample.retest_date = imported_retest;
    }

    sample
}
