//! Spreadsheet header → canonical column mapping for batch import.
//!
//! Sheets arrive with Arabic headers, English headers, or a mix; matching is
//! case-insensitive over the trimmed header text.

use crate::models::Gas;

/// Canonical columns of the sample record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Substation,
    Transformer,
    Voltage,
    SampleDate,
    AnalysisDate,
    RetestDate,
    Ratio,
    Gas(Gas),
    ResultText,
    DgaCode,
    Recommendation,
    Diagnosis,
}

/// Resolve a sheet header to its canonical column, or `None` for headers the
/// importer does not carry.
pub fn canonical_column(header: &str) -> Option<Column> {
    let key = header.trim().to_lowercase();
    let column = match key.as_str() {
        "المحطة" | "substation" => Column::Substation,
        "المحول" | "transformer" | "transformer no" => Column::Transformer,
        "الجهد" | "voltage" => Column::Voltage,
        "تاريخ العينة" | "sample date" | "date of sample" => Column::SampleDate,
        "تاريخ التحليل" | "analysis date" | "date of analysis" => Column::AnalysisDate,
        "تاريخ إعادة التحليل" | "reanalysis date" | "retest date" => Column::RetestDate,
        "o2/n2" => Column::Ratio,
        "result of analysis" | "result" => Column::ResultText,
        "dga" => Column::DgaCode,
        "c.recommended" | "recommendation" => Column::Recommendation,
        "ai report" => Column::Diagnosis,
        other => return Gas::from_label(other).map(Column::Gas),
    };
    Some(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_headers() {
        assert_eq!(canonical_column("Substation"), Some(Column::Substation));
        assert_eq!(canonical_column("Transformer No"), Some(Column::Transformer));
        assert_eq!(canonical_column("Sample Date"), Some(Column::SampleDate));
        assert_eq!(
            canonical_column("Date of Analysis"),
            Some(Column::AnalysisDate)
        );
        assert_eq!(
            canonical_column("C.Recommended"),
            Some(Column::Recommendation)
        );
    }

    #[test]
    fn arabic_headers() {
        assert_eq!(canonical_column("المحطة"), Some(Column::Substation));
        assert_eq!(canonical_column("المحول"), Some(Column::Transformer));
        assert_eq!(
            canonical_column("تاريخ التحليل"),
            Some(Column::AnalysisDate)
        );
        assert_eq!(
            canonical_column("تاريخ إعادة التحليل"),
            Some(Column::RetestDate)
        );
    }

    #[test]
    fn gas_headers() {
        assert_eq!(canonical_column("H2"), Some(Column::Gas(Gas::H2)));
        assert_eq!(canonical_column("c2h4"), Some(Column::Gas(Gas::C2H4)));
        assert_eq!(canonical_column("CO"), Some(Column::Gas(Gas::CO)));
    }

    #[test]
    fn ratio_header() {
        assert_eq!(canonical_column("O2/N2"), Some(Column::Ratio));
    }

    #[test]
    fn matching_is_case_insensitive_and_trimmed() {
        assert_eq!(canonical_column("  VOLTAGE  "), Some(Column::Voltage));
        assert_eq!(canonical_column("Result"), Some(Column::ResultText));
        assert_eq!(canonical_column("AI Report"), Some(Column::Diagnosis));
    }

    #[test]
    fn unknown_headers_are_none() {
        assert_eq!(canonical_column("Operator Notes"), None);
        assert_eq!(canonical_column(""), None);
    }
}
