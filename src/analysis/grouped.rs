use std::collections::BTreeMap;

use serde::Serialize;

use super::stats::{FiveNumber, five_number, mean, round2, sum};
use super::{DeriveError, RETENTION, SATISFACTION, numeric_column, require_columns};
use crate::data::filter::{FilteredView, TERM, YEAR};
use crate::data::model::CellValue;

/// Suffix that marks a per-department enrollment count column.
pub const ENROLLED_SUFFIX: &str = "_enrolled";

// ---------------------------------------------------------------------------
// Output rows
// ---------------------------------------------------------------------------

/// Mean of a measure for one year. `NaN` when every value in the group is
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearAverage {
    pub year: CellValue,
    pub mean: f64,
}

/// One line per term: the measure's yearly mean within that term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermLine {
    pub term: CellValue,
    pub points: Vec<YearAverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTermSeries {
    pub measure: String,
    pub lines: Vec<TermLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermAverage {
    pub term: CellValue,
    pub retention_rate: f64,
    pub student_satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermSpread {
    pub term: CellValue,
    pub spread: FiveNumber,
}

/// Summed enrollment per department for one year, aligned with
/// [`DepartmentTotals::departments`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentYear {
    pub year: CellValue,
    pub totals: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentTotals {
    pub departments: Vec<String>,
    pub years: Vec<DepartmentYear>,
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Positions within the view grouped by the value of `key`, sorted by key.
/// Rows with a missing key are left out.
fn group_positions(
    view: &FilteredView<'_>,
    key: &str,
) -> Result<BTreeMap<CellValue, Vec<usize>>, DeriveError> {
    let keys = view
        .column(key)
        .ok_or_else(|| DeriveError::MissingColumns(vec![key.to_string()]))?;
    let mut groups: BTreeMap<CellValue, Vec<usize>> = BTreeMap::new();
    for (pos, value) in keys.into_iter().enumerate() {
        if value.is_null() {
            continue;
        }
        groups.entry(value.clone()).or_default().push(pos);
    }
    Ok(groups)
}

fn pick(values: &[f64], positions: &[usize]) -> Vec<f64> {
    positions.iter().map(|&p| values[p]).collect()
}

fn non_empty<T>(items: Vec<T>) -> Result<Vec<T>, DeriveError> {
    if items.is_empty() {
        Err(DeriveError::NotEnoughData)
    } else {
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Mean of `measure` per `Year`, ascending by year.
pub fn mean_by_year(view: &FilteredView<'_>, measure: &str) -> Result<Vec<YearAverage>, DeriveError> {
    require_columns(view, &[YEAR, measure])?;
    if view.is_empty() {
        return Err(DeriveError::NotEnoughData);
    }
    let values = numeric_column(view, measure)?;
    let groups = group_positions(view, YEAR)?;
    non_empty(
        groups
            .into_iter()
            .map(|(year, positions)| YearAverage {
                year,
                mean: mean(&pick(&values, &positions)),
            })
            .collect(),
    )
}

/// Yearly mean of `measure`, one line per `Term`. Years where the term has no
/// value for the measure are left off its line.
pub fn mean_by_year_and_term(
    view: &FilteredView<'_>,
    measure: &str,
) -> Result<YearTermSeries, DeriveError> {
    require_columns(view, &[YEAR, TERM, measure])?;
    if view.is_empty() {
        return Err(DeriveError::NotEnoughData);
    }
    let values = numeric_column(view, measure)?;
    let years = view.column(YEAR).unwrap_or_default();

    let mut lines = Vec::new();
    for (term, positions) in group_positions(view, TERM)? {
        let mut by_year: BTreeMap<CellValue, Vec<f64>> = BTreeMap::new();
        for pos in positions {
            let year = years[pos];
            if year.is_null() || values[pos].is_nan() {
                continue;
            }
            by_year.entry(year.clone()).or_default().push(values[pos]);
        }
        let points: Vec<YearAverage> = by_year
            .into_iter()
            .map(|(year, vals)| YearAverage {
                year,
                mean: mean(&vals),
            })
            .collect();
        if !points.is_empty() {
            lines.push(TermLine { term, points });
        }
    }

    Ok(YearTermSeries {
        measure: measure.to_string(),
        lines: non_empty(lines)?,
    })
}

/// Mean retention and satisfaction per `Term`, rounded to two decimals.
pub fn term_averages(view: &FilteredView<'_>) -> Result<Vec<TermAverage>, DeriveError> {
    require_columns(view, &[TERM, RETENTION, SATISFACTION])?;
    if view.is_empty() {
        return Err(DeriveError::NotEnoughData);
    }
    let retention = numeric_column(view, RETENTION)?;
    let satisfaction = numeric_column(view, SATISFACTION)?;
    non_empty(
        group_positions(view, TERM)?
            .into_iter()
            .map(|(term, positions)| TermAverage {
                term,
                retention_rate: round2(mean(&pick(&retention, &positions))),
                student_satisfaction: round2(mean(&pick(&satisfaction, &positions))),
            })
            .collect(),
    )
}

/// Box-plot numbers of `measure` per `Term`.
pub fn spread_by_term(view: &FilteredView<'_>, measure: &str) -> Result<Vec<TermSpread>, DeriveError> {
    require_columns(view, &[TERM, measure])?;
    let values = numeric_column(view, measure)?;
    non_empty(
        group_positions(view, TERM)?
            .into_iter()
            .filter_map(|(term, positions)| {
                let spread = five_number(&pick(&values, &positions))?;
                Some(TermSpread { term, spread })
            })
            .collect(),
    )
}

/// Names of every `*_enrolled` column, in dataset order.
pub fn department_columns(view: &FilteredView<'_>) -> Vec<String> {
    view.dataset
        .column_names()
        .filter(|name| name.to_ascii_lowercase().ends_with(ENROLLED_SUFFIX))
        .map(str::to_string)
        .collect()
}

/// Every `*_enrolled` column summed per `Year`, ascending by year.
/// Missing counts add nothing.
pub fn department_totals_by_year(view: &FilteredView<'_>) -> Result<DepartmentTotals, DeriveError> {
    let departments = department_columns(view);
    if departments.is_empty() {
        return Err(DeriveError::NoMatchingColumns(format!("*{ENROLLED_SUFFIX}")));
    }
    require_columns(view, &[YEAR])?;
    if view.is_empty() {
        return Err(DeriveError::NotEnoughData);
    }

    let columns: Vec<Vec<f64>> = departments
        .iter()
        .map(|name| numeric_column(view, name))
        .collect::<Result<_, _>>()?;

    let years = non_empty(
        group_positions(view, YEAR)?
            .into_iter()
            .map(|(year, positions)| DepartmentYear {
                year,
                totals: columns.iter().map(|col| sum(&pick(col, &positions))).collect(),
            })
            .collect(),
    )?;

    Ok(DepartmentTotals { departments, years })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::analysis::fixtures::students;
    use crate::data::filter::{Selection, filter};
    use crate::data::loader::read_csv;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn yearly_mean_is_sorted_and_nan_for_empty_groups() {
        let ds = students();
        let view = filter(&ds, &Selection::default());
        let avg = mean_by_year(&view, RETENTION).unwrap();
        let years: Vec<_> = avg.iter().map(|a| a.year.clone()).collect();
        assert_eq!(
            years,
            vec![CellValue::Integer(2020), CellValue::Integer(2021), CellValue::Integer(2022)]
        );
        assert_eq!(avg[0].mean, 82.0);
        assert_eq!(avg[1].mean, 88.0);
        assert!(avg[2].mean.is_nan());
    }

    #[test]
    fn term_lines_drop_missing_points() {
        let ds = students();
        let view = filter(&ds, &Selection::default());
        let series = mean_by_year_and_term(&view, RETENTION).unwrap();
        assert_eq!(series.measure, RETENTION);
        let terms: Vec<_> = series.lines.iter().map(|l| l.term.clone()).collect();
        assert_eq!(terms, vec![text("Fall"), text("Spring")]);
        // Spring 2022 has no retention value.
        assert_eq!(series.lines[1].points.len(), 2);
    }

    #[test]
    fn term_averages_cover_exactly_the_present_terms() {
        let ds = students();
        for selection in [
            Selection::default(),
            Selection { terms: BTreeSet::new(), years: [CellValue::Integer(2022)].into() },
            Selection { terms: [text("Fall")].into(), years: BTreeSet::new() },
        ] {
            let view = filter(&ds, &selection);
            let rows = term_averages(&view).unwrap();
            let got: BTreeSet<_> = rows.iter().map(|r| r.term.clone()).collect();
            let expected: BTreeSet<_> = view
                .column(TERM)
                .unwrap()
                .into_iter()
                .filter(|v| !v.is_null())
                .cloned()
                .collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn term_averages_are_rounded() {
        let ds = students();
        let view = filter(&ds, &Selection::default());
        let rows = term_averages(&view).unwrap();
        let spring = rows.iter().find(|r| r.term == text("Spring")).unwrap();
        assert_eq!(spring.retention_rate, 85.0);
        assert_eq!(spring.student_satisfaction, 80.0);
    }

    #[test]
    fn department_totals_sum_per_year() {
        let ds = students();
        let view = filter(&ds, &Selection::default());
        let totals = department_totals_by_year(&view).unwrap();
        assert_eq!(totals.departments, vec!["Engineering_enrolled", "Business_enrolled"]);
        assert_eq!(totals.years.len(), 3);
        assert_eq!(totals.years[0].totals, vec![210.0, 105.0]);
        // Missing business count in 2021 adds nothing.
        assert_eq!(totals.years[1].totals, vec![250.0, 65.0]);
    }

    #[test]
    fn no_enrolled_columns_means_no_department_output() {
        let ds = read_csv("Year,Term,Retention rate\n2020,Fall,80\n".as_bytes()).unwrap();
        let view = filter(&ds, &Selection::default());
        assert!(department_columns(&view).is_empty());
        assert!(matches!(
            department_totals_by_year(&view),
            Err(DeriveError::NoMatchingColumns(_))
        ));
    }

    #[test]
    fn spread_per_term() {
        let ds = students();
        let view = filter(&ds, &Selection::default());
        let spreads = spread_by_term(&view, SATISFACTION).unwrap();
        assert_eq!(spreads.len(), 2);
        let spring = &spreads[1].spread;
        assert_eq!(spring.median, 80.0);
        assert_eq!(spring.upper_whisker, 90.0);
    }
}
