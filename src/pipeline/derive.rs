//! Derived fields: the O2/N2 ratio and the regulatory retest date.
//!
//! Both derivations degrade to empty instead of failing — a missing input,
//! a recommendation without digits, or an unparseable analysis date leaves
//! the derived field `None` and never blocks the rest of the sample.

use std::sync::LazyLock;

use chrono::{Months, NaiveDate};
use regex::Regex;

use crate::models::Sample;

/// Recommendation codes tolerate separators between the letter and the
/// month count: "R1", "R 1", "R-6", "r:12", "R.(3)".
static RECOMMENDATION_MONTHS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bR\s*[\s\-:.()]*([0-9]+)").expect("static regex"));

/// O2/N2, computed only when both readings are present and N2 is non-zero.
/// Never zero, never an error value — anything else is `None`.
pub fn compute_ratio(o2: Option<f64>, n2: Option<f64>) -> Option<f64> {
    match (o2, n2) {
        (Some(o2), Some(n2)) if n2 != 0.0 => {
            let ratio = o2 / n2;
            ratio.is_finite().then_some(ratio)
        }
        _ => None,
    }
}

/// Month count from a recommendation code. `None` when no digits follow an
/// `R` — "no recommendation" is a valid terminal state, not an error.
pub fn recommendation_months(code: &str) -> Option<u32> {
    RECOMMENDATION_MONTHS
        .captures(code)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Analysis date advanced by the given month count, with true calendar-month
/// arithmetic and end-of-month clamping (31 Jan + 1 month → 28/29 Feb).
pub fn retest_date(analysis_date: NaiveDate, months: u32) -> Option<NaiveDate> {
    analysis_date.checked_add_months(Months::new(months))
}

/// Recompute both derived fields on a sample.
///
/// The ratio is a pure function of the O2 and N2 readings — it is never
/// edited independently, so a recompute always overwrites it. The retest
/// date likewise follows (recommendation, analysis date) alone.
pub fn fill_derived(sample: &mut Sample) {
    sample.o2_n2_ratio = compute_ratio(sample.gases.o2, sample.gases.n2);

    sample.retest_date = match (
        recommendation_months(&sample.recommendation),
        sample.analysis_date,
    ) {
        (Some(months), Some(base)) => retest_date(base, months),
        _ => None,
    };
}
