use std::collections::BTreeSet;

use super::model::{CellValue, Dataset};

pub const TERM: &str = "Term";
pub const YEAR: &str = "Year";

// ---------------------------------------------------------------------------
// Filter predicate: which Term / Year values are selected
// ---------------------------------------------------------------------------

/// Selected values for the two filter dimensions.
///
/// An empty set means "no filter" for that dimension: every row passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub terms: BTreeSet<CellValue>,
    pub years: BTreeSet<CellValue>,
}

impl Selection {
    /// Everything selected, the default when a dataset is first shown.
    pub fn all(dataset: &Dataset) -> Self {
        Selection {
            terms: term_options(dataset),
            years: year_options(dataset),
        }
    }

    /// Mutable access to one dimension's set by column name.
    pub fn dimension_mut(&mut self, column: &str) -> Option<&mut BTreeSet<CellValue>> {
        match column {
            TERM => Some(&mut self.terms),
            YEAR => Some(&mut self.years),
            _ => None,
        }
    }

    pub fn dimension(&self, column: &str) -> Option<&BTreeSet<CellValue>> {
        match column {
            TERM => Some(&self.terms),
            YEAR => Some(&self.years),
            _ => None,
        }
    }
}

/// Sorted distinct non-null `Term` values; empty without a `Term` column.
pub fn term_options(dataset: &Dataset) -> BTreeSet<CellValue> {
    dataset.unique_values.get(TERM).cloned().unwrap_or_default()
}

/// Sorted distinct non-null `Year` values; empty without a `Year` column.
pub fn year_options(dataset: &Dataset) -> BTreeSet<CellValue> {
    dataset.unique_values.get(YEAR).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Rows of a dataset that pass a [`Selection`], in dataset order.
///
/// Borrows the dataset; build a new one whenever the selection changes.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub dataset: &'a Dataset,
    pub indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Rows of the view as slices aligned with `dataset.columns`.
    pub fn rows(&self) -> impl Iterator<Item = &'a [CellValue]> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| dataset.rows[i].as_slice())
    }

    /// Values of column `name` for every row in the view.
    /// `None` when the dataset has no such column.
    pub fn column(&self, name: &str) -> Option<Vec<&'a CellValue>> {
        let idx = self.dataset.column_index(name)?;
        Some(self.rows().map(|row| &row[idx]).collect())
    }
}

/// Apply the Term / Year selection to the dataset.
///
/// A row passes a dimension when the selection for it is empty, or when its
/// value is one of the selected ones. Null values (and a missing column) never
/// match a non-empty selection.
pub fn filter<'a>(dataset: &'a Dataset, selection: &Selection) -> FilteredView<'a> {
    let term_idx = dataset.column_index(TERM);
    let year_idx = dataset.column_index(YEAR);

    let indices = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            passes(row, term_idx, &selection.terms) && passes(row, year_idx, &selection.years)
        })
        .map(|(i, _)| i)
        .collect();

    FilteredView { dataset, indices }
}

fn passes(row: &[CellValue], column: Option<usize>, selected: &BTreeSet<CellValue>) -> bool {
    if selected.is_empty() {
        return true;
    }
    let Some(value) = column.and_then(|idx| row.get(idx)) else {
        return false;
    };
    if value.is_null() {
        return false;
    }
    selected.contains(value) || selected.iter().any(|s| s.matches(value))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::{Column, ColumnKind};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn dataset() -> Dataset {
        let columns = vec![
            Column { name: "Year".into(), kind: ColumnKind::Integer },
            Column { name: "Term".into(), kind: ColumnKind::Text },
            Column { name: "Retention_rate".into(), kind: ColumnKind::Integer },
        ];
        let rows = vec![
            vec![CellValue::Integer(2020), text("Fall"), CellValue::Integer(80)],
            vec![CellValue::Integer(2021), text("Spring"), CellValue::Integer(90)],
            vec![CellValue::Integer(2021), text("Fall"), CellValue::Integer(85)],
            vec![CellValue::Null, text("Spring"), CellValue::Integer(70)],
            vec![CellValue::Integer(2022), CellValue::Null, CellValue::Integer(60)],
        ];
        Dataset::from_rows(columns, rows)
    }

    #[test]
    fn empty_selection_keeps_every_row_in_order() {
        let ds = dataset();
        let view = filter(&ds, &Selection::default());
        assert_eq!(view.indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn year_only_selection_matches_documented_example() {
        let ds = dataset();
        let selection = Selection {
            terms: BTreeSet::new(),
            years: [CellValue::Integer(2020)].into(),
        };
        assert_eq!(filter(&ds, &selection).indices, vec![0]);
    }

    #[test]
    fn filtering_is_conjunctive() {
        let ds = dataset();
        let selections = [
            Selection { terms: [text("Fall")].into(), years: BTreeSet::new() },
            Selection { terms: [text("Spring")].into(), years: [CellValue::Integer(2021)].into() },
            Selection {
                terms: [text("Fall"), text("Spring")].into(),
                years: [CellValue::Integer(2021), CellValue::Integer(2022)].into(),
            },
            Selection { terms: [text("Winter")].into(), years: BTreeSet::new() },
        ];
        for selection in &selections {
            let view = filter(&ds, selection);
            for (i, row) in ds.rows.iter().enumerate() {
                let term_ok = selection.terms.is_empty() || selection.terms.contains(&row[1]);
                let year_ok = selection.years.is_empty() || selection.years.contains(&row[0]);
                assert_eq!(view.indices.contains(&i), term_ok && year_ok, "row {i} {selection:?}");
            }
        }
    }

    #[test]
    fn nulls_drop_out_once_a_dimension_is_restricted() {
        let ds = dataset();
        let all = Selection::all(&ds);
        assert_eq!(filter(&ds, &all).indices, vec![0, 1, 2]);
    }

    #[test]
    fn float_years_match_integer_selection() {
        let columns = vec![Column { name: "Year".into(), kind: ColumnKind::Float }];
        let ds = Dataset::from_rows(columns, vec![vec![CellValue::Float(2020.0)]]);
        let selection = Selection {
            terms: BTreeSet::new(),
            years: [CellValue::Integer(2020)].into(),
        };
        assert_eq!(filter(&ds, &selection).len(), 1);
    }

    #[test]
    fn missing_term_column_excludes_rows_only_when_terms_selected() {
        let columns = vec![Column { name: "Year".into(), kind: ColumnKind::Integer }];
        let ds = Dataset::from_rows(columns, vec![vec![CellValue::Integer(2020)]]);
        assert!(term_options(&ds).is_empty());
        assert_eq!(filter(&ds, &Selection::default()).len(), 1);
        let selection = Selection { terms: [text("Fall")].into(), years: BTreeSet::new() };
        assert!(filter(&ds, &selection).is_empty());
    }

    const TERMS: [&str; 3] = ["Fall", "Spring", "Summer"];

    fn cell_year(year: Option<i64>) -> CellValue {
        year.map_or(CellValue::Null, CellValue::Integer)
    }

    fn cell_term(term: Option<&str>) -> CellValue {
        term.map_or(CellValue::Null, text)
    }

    proptest! {
        #[test]
        fn filter_keeps_exactly_the_rows_passing_both_dimensions(
            rows in prop::collection::vec(
                (
                    proptest::option::of(2018i64..2024),
                    proptest::option::of(prop::sample::select(TERMS.to_vec())),
                ),
                0..40,
            ),
            years in prop::collection::btree_set(2018i64..2024, 0..4),
            terms in prop::collection::btree_set(prop::sample::select(TERMS.to_vec()), 0..3),
        ) {
            let columns = vec![
                Column { name: "Year".into(), kind: ColumnKind::Integer },
                Column { name: "Term".into(), kind: ColumnKind::Text },
            ];
            let cells = rows
                .iter()
                .map(|&(year, term)| vec![cell_year(year), cell_term(term)])
                .collect();
            let ds = Dataset::from_rows(columns, cells);
            let selection = Selection {
                terms: terms.iter().map(|t| text(t)).collect(),
                years: years.iter().copied().map(CellValue::Integer).collect(),
            };

            let expected: Vec<usize> = rows
                .iter()
                .enumerate()
                .filter(|(_, (year, term))| {
                    let year_ok = years.is_empty() || year.is_some_and(|y| years.contains(&y));
                    let term_ok = terms.is_empty() || term.is_some_and(|t| terms.contains(&t));
                    year_ok && term_ok
                })
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(filter(&ds, &selection).indices, expected);
        }

        #[test]
        fn empty_selection_is_the_identity(
            years in prop::collection::vec(proptest::option::of(2018i64..2024), 0..40),
        ) {
            let columns = vec![Column { name: "Year".into(), kind: ColumnKind::Integer }];
            let ds = Dataset::from_rows(
                columns,
                years.iter().map(|&y| vec![cell_year(y)]).collect(),
            );
            let view = filter(&ds, &Selection::default());
            prop_assert_eq!(view.indices, (0..years.len()).collect::<Vec<_>>());
        }
    }
}
