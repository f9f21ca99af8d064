use std::collections::HashMap;

use serde::Serialize;

use super::stats::{count, format2, max, mean, min, quantile, round2, std_dev};
use super::{DeriveError, as_f64_or_nan};
use crate::data::model::{CellValue, Dataset};

/// Row labels in display order.
pub const STAT_LABELS: [&str; 11] = [
    "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric {
        count: usize,
        mean: f64,
        std: f64,
        min: f64,
        q25: f64,
        q50: f64,
        q75: f64,
        max: f64,
    },
    Categorical {
        count: usize,
        unique: usize,
        top: Option<String>,
        freq: usize,
    },
}

impl ColumnStats {
    /// Cell for one of [`STAT_LABELS`]; empty where the statistic does not
    /// apply to this column.
    pub fn cell(&self, label: &str) -> String {
        match (self, label) {
            (ColumnStats::Numeric { count, .. }, "count")
            | (ColumnStats::Categorical { count, .. }, "count") => count.to_string(),
            (ColumnStats::Numeric { mean, .. }, "mean") => format2(*mean),
            (ColumnStats::Numeric { std, .. }, "std") => format2(*std),
            (ColumnStats::Numeric { min, .. }, "min") => format2(*min),
            (ColumnStats::Numeric { q25, .. }, "25%") => format2(*q25),
            (ColumnStats::Numeric { q50, .. }, "50%") => format2(*q50),
            (ColumnStats::Numeric { q75, .. }, "75%") => format2(*q75),
            (ColumnStats::Numeric { max, .. }, "max") => format2(*max),
            (ColumnStats::Categorical { unique, .. }, "unique") => unique.to_string(),
            (ColumnStats::Categorical { top, .. }, "top") => top.clone().unwrap_or_default(),
            (ColumnStats::Categorical { freq, .. }, "freq") => freq.to_string(),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    pub stats: ColumnStats,
}

/// Per-column description of a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Description {
    pub columns: Vec<ColumnDescription>,
}

impl Description {
    /// Labels that apply to at least one column, in display order.
    pub fn labels(&self) -> Vec<&'static str> {
        let any_numeric = self
            .columns
            .iter()
            .any(|c| matches!(c.stats, ColumnStats::Numeric { .. }));
        let any_categorical = self
            .columns
            .iter()
            .any(|c| matches!(c.stats, ColumnStats::Categorical { .. }));
        STAT_LABELS
            .iter()
            .copied()
            .filter(|label| match *label {
                "count" => true,
                "unique" | "top" | "freq" => any_categorical,
                _ => any_numeric,
            })
            .collect()
    }
}

/// Describe every column of the dataset. Numeric columns get count, mean,
/// std, min, quartiles and max; the rest get count, unique, top and freq.
/// Numbers are rounded to two decimals.
pub fn describe(dataset: &Dataset) -> Result<Description, DeriveError> {
    if dataset.columns.is_empty() {
        return Err(DeriveError::NotEnoughData);
    }
    let columns = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let cells: Vec<&CellValue> = dataset.rows.iter().filter_map(|r| r.get(idx)).collect();
            let stats = if col.kind.is_numeric() {
                numeric_stats(&cells)
            } else {
                categorical_stats(&cells)
            };
            ColumnDescription {
                name: col.name.clone(),
                stats,
            }
        })
        .collect();
    Ok(Description { columns })
}

fn numeric_stats(cells: &[&CellValue]) -> ColumnStats {
    let values: Vec<f64> = cells.iter().map(|c| as_f64_or_nan(c)).collect();
    ColumnStats::Numeric {
        count: count(&values),
        mean: round2(mean(&values)),
        std: round2(std_dev(&values)),
        min: round2(min(&values)),
        q25: round2(quantile(&values, 0.25)),
        q50: round2(quantile(&values, 0.5)),
        q75: round2(quantile(&values, 0.75)),
        max: round2(max(&values)),
    }
}

fn categorical_stats(cells: &[&CellValue]) -> ColumnStats {
    let present: Vec<&CellValue> = cells.iter().copied().filter(|c| !c.is_null()).collect();
    let mut counts: HashMap<&CellValue, usize> = HashMap::new();
    // First appearance order decides ties.
    let mut order: Vec<&CellValue> = Vec::new();
    for &cell in &present {
        let n = counts.entry(cell).or_insert(0);
        if *n == 0 {
            order.push(cell);
        }
        *n += 1;
    }

    let mut top: Option<(&CellValue, usize)> = None;
    for cell in order.iter().copied() {
        let n = counts[cell];
        let better = match top {
            None => true,
            Some((_, best)) => n > best,
        };
        if better {
            top = Some((cell, n));
        }
    }

    ColumnStats::Categorical {
        count: present.len(),
        unique: counts.len(),
        top: top.map(|(v, _)| v.to_string()),
        freq: top.map(|(_, n)| n).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::students;
    use crate::data::loader::read_csv;

    #[test]
    fn numeric_and_categorical_columns() {
        let ds = students();
        let desc = describe(&ds).unwrap();
        assert_eq!(desc.columns.len(), ds.columns.len());

        let term = &desc.columns[1];
        assert_eq!(term.name, "Term");
        assert_eq!(
            term.stats,
            ColumnStats::Categorical {
                count: 5,
                unique: 2,
                top: Some("Spring".into()),
                freq: 3
            }
        );

        let ColumnStats::Numeric { count, mean, q25, max, .. } = desc.columns[2].stats else {
            panic!("retention should be numeric");
        };
        assert_eq!(count, 4);
        assert_eq!(mean, 85.0);
        assert_eq!(q25, 83.0);
        assert_eq!(max, 90.0);
    }

    #[test]
    fn ties_go_to_the_first_value_seen() {
        let ds = read_csv("Term\nFall\nSpring\nSpring\nFall\n".as_bytes()).unwrap();
        let desc = describe(&ds).unwrap();
        assert_eq!(desc.columns[0].stats.cell("top"), "Fall");
        assert_eq!(desc.labels(), vec!["count", "unique", "top", "freq"]);
    }

    #[test]
    fn cells_are_blank_where_not_applicable() {
        let ds = students();
        let desc = describe(&ds).unwrap();
        assert_eq!(desc.columns[0].stats.cell("top"), "");
        assert_eq!(desc.columns[0].stats.cell("min"), "2020.00");
        assert_eq!(desc.labels().len(), STAT_LABELS.len());
    }

    #[test]
    fn undefined_statistics_render_like_other_tables() {
        let ds = read_csv("Score\n7\n".as_bytes()).unwrap();
        let desc = describe(&ds).unwrap();
        assert_eq!(desc.columns[0].stats.cell("std"), "");
        assert_eq!(desc.columns[0].stats.cell("mean"), "7.00");
    }
}
