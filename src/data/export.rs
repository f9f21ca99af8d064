use std::io::Write;
use std::path::Path;

use thiserror::Error;

use super::filter::FilteredView;
use super::model::CellValue;

/// Suggested file name for the filtered download.
pub const EXPORT_FILE_NAME: &str = "university_student_data_filtered.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("writing CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("flushing CSV output: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize the view as CSV: normalized header row, no index column.
///
/// Floats always keep a decimal point and nulls become empty fields, so the
/// output parses back into the same table.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, out: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(view.dataset.column_names())?;
    for row in view.rows() {
        wtr.write_record(row.iter().map(csv_field))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the view to `path`, replacing any existing file.
pub fn export_to_path(view: &FilteredView<'_>, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(view, file)?;
    log::info!("Exported {} rows to {}", view.len(), path.display());
    Ok(())
}

fn csv_field(cell: &CellValue) -> String {
    if cell.is_null() {
        return String::new();
    }
    cell.to_string()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::filter::{Selection, filter};
    use crate::data::loader::read_csv;
    use crate::data::model::{Column, ColumnKind, Dataset};

    fn to_csv_string(view: &FilteredView<'_>) -> Result<String, ExportError> {
        let mut buf = Vec::new();
        write_csv(view, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    const SAMPLE: &str = "\
Year,Term,Retention Rate (%),Student Satisfaction (%),Notes,Active
2020,Fall,80,75.0,\"quoted, with comma\",True
2021,Spring,90,,plain,False
2021,Fall,85,81.25,,True
";

    #[test]
    fn export_round_trips_through_the_loader() {
        let ds = read_csv(SAMPLE.as_bytes()).unwrap();
        let selection = Selection {
            terms: [CellValue::Text("Fall".into())].into(),
            years: Default::default(),
        };
        let view = filter(&ds, &selection);
        let text = to_csv_string(&view).unwrap();
        let reparsed = read_csv(text.as_bytes()).unwrap();

        assert_eq!(reparsed.columns, ds.columns);
        let expected: Vec<Vec<CellValue>> = view.rows().map(|r| r.to_vec()).collect();
        assert_eq!(reparsed.rows, expected);
    }

    #[test]
    fn header_is_normalized_and_unindexed() {
        let ds = read_csv(SAMPLE.as_bytes()).unwrap();
        let view = filter(&ds, &Selection::default());
        let text = to_csv_string(&view).unwrap();
        let first_line = text.lines().next().unwrap();
        assert_eq!(
            first_line,
            "Year,Term,Retention_rate,Student_satisfaction,Notes,Active"
        );
        assert!(text.contains("2021,Spring,90,,plain,False"));
    }

    #[test]
    fn export_to_path_writes_file() {
        let ds = read_csv(SAMPLE.as_bytes()).unwrap();
        let view = filter(&ds, &Selection::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        export_to_path(&view, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 4);
    }

    const TERMS: [&str; 3] = ["Fall", "Spring, late", "Say \"hi\""];

    proptest! {
        #[test]
        fn any_filtered_view_survives_export_and_reload(
            rows in prop::collection::vec(
                (
                    proptest::option::of(2018i64..2024),
                    proptest::option::of(prop::sample::select(TERMS.to_vec())),
                    proptest::option::of(-1000.0f64..1000.0),
                ),
                0..30,
            ),
            years in prop::collection::btree_set(2018i64..2024, 0..3),
        ) {
            let columns = vec![
                Column { name: "Year".into(), kind: ColumnKind::Integer },
                Column { name: "Term".into(), kind: ColumnKind::Text },
                Column { name: "Retention_rate".into(), kind: ColumnKind::Float },
            ];
            let cells = rows
                .iter()
                .map(|&(year, term, rate)| {
                    vec![
                        year.map_or(CellValue::Null, CellValue::Integer),
                        term.map_or(CellValue::Null, |t| CellValue::Text(t.to_string())),
                        rate.map_or(CellValue::Null, CellValue::Float),
                    ]
                })
                .collect();
            let ds = Dataset::from_rows(columns, cells);
            let selection = Selection {
                terms: Default::default(),
                years: years.into_iter().map(CellValue::Integer).collect(),
            };
            let view = filter(&ds, &selection);

            let reparsed = read_csv(to_csv_string(&view).unwrap().as_bytes()).unwrap();
            let names: Vec<&str> = reparsed.column_names().collect();
            prop_assert_eq!(names, vec!["Year", "Term", "Retention_rate"]);
            let expected: Vec<Vec<CellValue>> = view.rows().map(|r| r.to_vec()).collect();
            prop_assert_eq!(reparsed.rows, expected);
        }
    }
}
