//! Analysis layer: every summary, chart series and table derived from a
//! filtered view.
//!
//! ```text
//!   FilteredView
//!        │
//!        ├── summary     mean / median / std of the two measures
//!        ├── grouped     per-year, per-term, per-department aggregates
//!        └── describe    whole-dataset column description (on demand)
//!        │
//!        ▼
//!   Outcome<T>   Ready | Unavailable (notice) | Failed (error)
//! ```
//!
//! Sections are independent: one section failing never stops another.
pub mod describe;
pub mod grouped;
pub mod stats;
pub mod summary;

use serde::Serialize;
use thiserror::Error;

use crate::data::filter::FilteredView;
use crate::data::model::CellValue;

pub use describe::{Description, describe};
pub use grouped::{
    DepartmentTotals, TermAverage, TermSpread, YearAverage, YearTermSeries,
    department_totals_by_year, mean_by_year, mean_by_year_and_term, spread_by_term,
    term_averages,
};
pub use summary::{SummaryStats, summary_stats};

pub const RETENTION: &str = "Retention_rate";
pub const SATISFACTION: &str = "Student_satisfaction";

/// Message used whenever a section has no rows to work with.
pub const NOT_ENOUGH_DATA: &str = "Not enough data for this section.";

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeriveError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no columns matching '{0}'")]
    NoMatchingColumns(String),

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("{}", NOT_ENOUGH_DATA)]
    NotEnoughData,
}

/// Result of one dashboard section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    /// Informational: nothing to show, nothing went wrong.
    Unavailable(String),
    /// A reported error scoped to this section.
    Failed(String),
}

impl<T> Outcome<T> {
    /// Every error is downgraded to a notice.
    pub fn informational(result: Result<T, DeriveError>) -> Self {
        match result {
            Ok(v) => Outcome::Ready(v),
            Err(e) => Outcome::Unavailable(e.to_string()),
        }
    }

    /// Missing columns and empty input are notices; anything else is an error.
    pub fn reported(result: Result<T, DeriveError>) -> Self {
        match result {
            Ok(v) => Outcome::Ready(v),
            Err(
                e @ (DeriveError::MissingColumns(_)
                | DeriveError::NoMatchingColumns(_)
                | DeriveError::NotEnoughData),
            ) => {
                Outcome::Unavailable(e.to_string())
            }
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column access shared by the derivations
// ---------------------------------------------------------------------------

/// Fail with every column in `names` that the dataset lacks.
pub(crate) fn require_columns(view: &FilteredView<'_>, names: &[&str]) -> Result<(), DeriveError> {
    let missing: Vec<String> = names
        .iter()
        .filter(|n| !view.dataset.has_column(n))
        .map(|n| n.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DeriveError::MissingColumns(missing))
    }
}

/// Values of a numeric column over the view, nulls as `NaN`.
pub(crate) fn numeric_column(view: &FilteredView<'_>, name: &str) -> Result<Vec<f64>, DeriveError> {
    let column = view
        .dataset
        .column(name)
        .ok_or_else(|| DeriveError::MissingColumns(vec![name.to_string()]))?;
    if !column.kind.is_numeric() {
        return Err(DeriveError::NotNumeric(name.to_string()));
    }
    let cells = view.column(name).unwrap_or_default();
    Ok(cells.into_iter().map(as_f64_or_nan).collect())
}

pub(crate) fn as_f64_or_nan(cell: &CellValue) -> f64 {
    cell.as_f64().unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// Dashboard: every filtered-view section at once
// ---------------------------------------------------------------------------

/// All sections derived from one filtered view. Rebuilt on every selection
/// change; the full-dataset description is computed separately on request.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub rows: usize,
    pub summary: Outcome<SummaryStats>,
    pub retention_by_year_and_term: Outcome<YearTermSeries>,
    pub retention_by_year: Outcome<Vec<YearAverage>>,
    pub satisfaction_by_year_and_term: Outcome<YearTermSeries>,
    pub satisfaction_spread: Outcome<Vec<TermSpread>>,
    pub term_averages: Outcome<Vec<TermAverage>>,
    pub department_totals: Outcome<DepartmentTotals>,
}

impl Dashboard {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        log::debug!("recomputing dashboard over {} rows", view.len());
        let dashboard = Dashboard {
            rows: view.len(),
            summary: Outcome::informational(summary_stats(view)),
            retention_by_year_and_term: Outcome::reported(mean_by_year_and_term(view, RETENTION)),
            retention_by_year: Outcome::informational(mean_by_year(view, RETENTION)),
            satisfaction_by_year_and_term: Outcome::reported(mean_by_year_and_term(
                view,
                SATISFACTION,
            )),
            satisfaction_spread: Outcome::informational(spread_by_term(view, SATISFACTION)),
            term_averages: Outcome::informational(term_averages(view)),
            department_totals: Outcome::informational(department_totals_by_year(view)),
        };
        dashboard.log_degraded();
        dashboard
    }

    fn log_degraded(&self) {
        let sections: [(&str, Option<&str>); 7] = [
            ("summary", failure(&self.summary)),
            ("retention by year and term", failure(&self.retention_by_year_and_term)),
            ("retention by year", failure(&self.retention_by_year)),
            ("satisfaction by year and term", failure(&self.satisfaction_by_year_and_term)),
            ("satisfaction spread", failure(&self.satisfaction_spread)),
            ("term averages", failure(&self.term_averages)),
            ("department totals", failure(&self.department_totals)),
        ];
        for (name, message) in sections {
            if let Some(message) = message {
                log::warn!("{name}: {message}");
            }
        }
    }
}

fn failure<T>(outcome: &Outcome<T>) -> Option<&str> {
    match outcome {
        Outcome::Failed(m) => Some(m.as_str()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::data::loader::read_csv;
    use crate::data::model::Dataset;

    pub const STUDENTS: &str = "\
Year,Term,Retention Rate (%),Student Satisfaction (%),Engineering Enrolled,Business Enrolled
2020,Spring,80,70,100,50
2020,Fall,84,74,110,55
2021,Spring,90,80,120,
2021,Fall,86,76,130,65
2022,Spring,,90,140,70
";

    pub fn students() -> Dataset {
        read_csv(STUDENTS.as_bytes()).expect("fixture parses")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{Selection, filter};
    use crate::data::loader::read_csv;

    fn is_ready<T>(outcome: &Outcome<T>) -> bool {
        matches!(outcome, Outcome::Ready(_))
    }

    #[test]
    fn every_section_ready_on_full_dataset() {
        let ds = fixtures::students();
        let view = filter(&ds, &Selection::all(&ds));
        let dash = Dashboard::compute(&view);
        assert_eq!(dash.rows, 5);
        assert!(is_ready(&dash.summary));
        assert!(is_ready(&dash.retention_by_year_and_term));
        assert!(is_ready(&dash.retention_by_year));
        assert!(is_ready(&dash.satisfaction_by_year_and_term));
        assert!(is_ready(&dash.satisfaction_spread));
        assert!(is_ready(&dash.term_averages));
        assert!(is_ready(&dash.department_totals));
    }

    #[test]
    fn empty_view_degrades_to_notices() {
        let ds = fixtures::students();
        let selection = Selection {
            terms: [CellValue::Text("Winter".into())].into(),
            years: Default::default(),
        };
        let dash = Dashboard::compute(&filter(&ds, &selection));
        assert_eq!(dash.rows, 0);
        assert_eq!(dash.retention_by_year, Outcome::Unavailable(NOT_ENOUGH_DATA.into()));
        assert!(matches!(dash.retention_by_year_and_term, Outcome::Unavailable(_)));
        assert!(matches!(dash.term_averages, Outcome::Unavailable(_)));
    }

    #[test]
    fn text_measure_is_a_reported_error_for_line_charts() {
        let ds = read_csv("Year,Term,Retention Rate\n2020,Fall,high\n".as_bytes()).unwrap();
        let dash = Dashboard::compute(&filter(&ds, &Selection::default()));
        assert!(matches!(dash.retention_by_year_and_term, Outcome::Failed(_)));
        assert!(matches!(dash.retention_by_year, Outcome::Unavailable(_)));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let ready: Outcome<u32> = Outcome::Ready(3);
        let json = serde_json::to_string(&ready).unwrap();
        assert_eq!(json, r#"{"status":"ready","value":3}"#);
    }
}
