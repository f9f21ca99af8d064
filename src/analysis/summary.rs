use serde::Serialize;

use super::stats::{mean, median, round2, std_dev};
use super::{DeriveError, RETENTION, SATISFACTION, numeric_column, require_columns};
use crate::data::filter::FilteredView;

/// Mean, median and sample standard deviation of one measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasureSummary {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

impl MeasureSummary {
    fn of(values: &[f64]) -> Self {
        MeasureSummary {
            mean: round2(mean(values)),
            median: round2(median(values)),
            std: round2(std_dev(values)),
        }
    }
}

/// Quick summary shown next to the filtered table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub retention_rate: MeasureSummary,
    pub student_satisfaction: MeasureSummary,
}

/// Summary of both measures over the view, rounded to two decimals.
pub fn summary_stats(view: &FilteredView<'_>) -> Result<SummaryStats, DeriveError> {
    require_columns(view, &[RETENTION, SATISFACTION])?;
    if view.is_empty() {
        return Err(DeriveError::NotEnoughData);
    }
    let retention = numeric_column(view, RETENTION)?;
    let satisfaction = numeric_column(view, SATISFACTION)?;
    Ok(SummaryStats {
        retention_rate: MeasureSummary::of(&retention),
        student_satisfaction: MeasureSummary::of(&satisfaction),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::students;
    use crate::data::filter::{Selection, filter};
    use crate::data::loader::read_csv;

    #[test]
    fn summary_skips_missing_values() {
        let ds = students();
        let view = filter(&ds, &Selection::default());
        let stats = summary_stats(&view).unwrap();
        // Retention: 80, 84, 90, 86 (one null)
        assert_eq!(stats.retention_rate.mean, 85.0);
        assert_eq!(stats.retention_rate.median, 85.0);
        assert_eq!(stats.retention_rate.std, 4.16);
        // Satisfaction: 70, 74, 80, 76, 90
        assert_eq!(stats.student_satisfaction.mean, 78.0);
        assert_eq!(stats.student_satisfaction.median, 76.0);
    }

    #[test]
    fn absent_measure_skips_summary() {
        let ds = read_csv("Year,Retention rate\n2020,80\n".as_bytes()).unwrap();
        let view = filter(&ds, &Selection::default());
        assert_eq!(
            summary_stats(&view),
            Err(DeriveError::MissingColumns(vec![SATISFACTION.to_string()]))
        );
    }
}
