// Headless report: the same sections the window shows, printed as markdown
// tables (or one JSON document) on stdout.
use std::fmt::Write as _;

use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::analysis::stats::format2;
use crate::analysis::{Dashboard, Description, Outcome, describe};
use crate::data::filter::FilteredView;
use crate::data::model::Dataset;

#[derive(Serialize)]
struct JsonReport<'a> {
    rows: usize,
    columns: usize,
    dashboard: &'a Dashboard,
    description: Option<Outcome<Description>>,
}

/// Render the full report for one filtered view.
pub fn render(dataset: &Dataset, view: &FilteredView<'_>, with_description: bool) -> String {
    let dashboard = Dashboard::compute(view);
    let description = with_description.then(|| Outcome::informational(describe(dataset)));
    let mut out = String::new();

    let (n_rows, n_cols) = dataset.shape();
    let _ = writeln!(out, "Rows, columns: {n_rows} x {n_cols}");
    let _ = writeln!(out, "Rows (filtered): {}\n", view.len());

    section(&mut out, "Quick summary", &dashboard.summary, |s| {
        let mut b = Builder::default();
        b.push_record(["", "Retention_rate", "Student_satisfaction"]);
        let r = &s.retention_rate;
        let t = &s.student_satisfaction;
        b.push_record(["mean".to_string(), format2(r.mean), format2(t.mean)]);
        b.push_record(["median".to_string(), format2(r.median), format2(t.median)]);
        b.push_record(["std".to_string(), format2(r.std), format2(t.std)]);
        markdown(b)
    });

    for (title, series) in [
        ("Retention rate by year and term", &dashboard.retention_by_year_and_term),
        ("Student satisfaction by year and term", &dashboard.satisfaction_by_year_and_term),
    ] {
        section(&mut out, title, series, |s| {
            let mut b = Builder::default();
            b.push_record(["Term", "Year", s.measure.as_str()]);
            for line in &s.lines {
                for p in &line.points {
                    b.push_record([line.term.to_string(), p.year.to_string(), format2(p.mean)]);
                }
            }
            markdown(b)
        });
    }

    section(&mut out, "Average retention per year", &dashboard.retention_by_year, |rows| {
        let mut b = Builder::default();
        b.push_record(["Year", "Retention_rate"]);
        for r in rows {
            b.push_record([r.year.to_string(), format2(r.mean)]);
        }
        markdown(b)
    });

    section(&mut out, "Student satisfaction by term (box)", &dashboard.satisfaction_spread, |rows| {
        let mut b = Builder::default();
        b.push_record(["Term", "low", "q1", "median", "q3", "high"]);
        for r in rows {
            let s = &r.spread;
            b.push_record([
                r.term.to_string(),
                format2(s.lower_whisker),
                format2(s.q1),
                format2(s.median),
                format2(s.q3),
                format2(s.upper_whisker),
            ]);
        }
        markdown(b)
    });

    section(&mut out, "Statistics by term", &dashboard.term_averages, |rows| {
        let mut b = Builder::default();
        b.push_record(["Term", "Retention_rate", "Student_satisfaction"]);
        for r in rows {
            b.push_record([r.term.to_string(), format2(r.retention_rate), format2(r.student_satisfaction)]);
        }
        markdown(b)
    });

    section(&mut out, "Enrolled students by department per year", &dashboard.department_totals, |d| {
        let mut b = Builder::default();
        b.push_record(std::iter::once("Year".to_string()).chain(d.departments.iter().cloned()));
        for y in &d.years {
            b.push_record(std::iter::once(y.year.to_string()).chain(y.totals.iter().map(|v| format2(*v))));
        }
        markdown(b)
    });

    if let Some(description) = &description {
        let mut b = Builder::default();
        b.push_record(["Column", "dtype"]);
        for col in &dataset.columns {
            b.push_record([col.name.as_str(), col.kind.dtype_name()]);
        }
        let _ = writeln!(out, "## Columns and types\n\n{}\n", markdown(b));

        section(&mut out, "Column description", description, |d| {
            let mut b = Builder::default();
            b.push_record(std::iter::once(String::new()).chain(d.columns.iter().map(|c| c.name.clone())));
            for label in d.labels() {
                b.push_record(
                    std::iter::once(label.to_string()).chain(d.columns.iter().map(|c| c.stats.cell(label))),
                );
            }
            markdown(b)
        });
    }

    out
}

/// Same content as [`render`] as a JSON document.
pub fn render_json(
    dataset: &Dataset,
    view: &FilteredView<'_>,
    with_description: bool,
) -> serde_json::Result<String> {
    let dashboard = Dashboard::compute(view);
    let report = JsonReport {
        rows: view.len(),
        columns: dataset.columns.len(),
        dashboard: &dashboard,
        description: with_description.then(|| Outcome::informational(describe(dataset))),
    };
    serde_json::to_string_pretty(&report)
}

fn section<T>(out: &mut String, title: &str, outcome: &Outcome<T>, table: impl FnOnce(&T) -> String) {
    let _ = writeln!(out, "## {title}\n");
    match outcome {
        Outcome::Ready(v) => {
            let _ = writeln!(out, "{}\n", table(v));
        }
        Outcome::Unavailable(msg) => {
            let _ = writeln!(out, "(info) {msg}\n");
        }
        Outcome::Failed(msg) => {
            let _ = writeln!(out, "(error) {msg}\n");
        }
    }
}

fn markdown(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::markdown());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::students;
    use crate::data::filter::{Selection, filter};
    use crate::data::loader::read_csv;

    #[test]
    fn report_lists_every_section() {
        let ds = students();
        let view = filter(&ds, &Selection::default());
        let text = render(&ds, &view, true);
        assert!(text.contains("Rows, columns: 5 x 6"));
        assert!(text.contains("## Quick summary"));
        assert!(text.contains("| Engineering_enrolled"));
        assert!(text.contains("## Column description"));
        assert!(text.contains("## Columns and types"));
    }

    #[test]
    fn missing_departments_show_a_notice() {
        let ds = read_csv("Year,Term\n2020,Fall\n".as_bytes()).unwrap();
        let view = filter(&ds, &Selection::default());
        let text = render(&ds, &view, false);
        assert!(text.contains("(info) no columns matching '*_enrolled'"));
        assert!(!text.contains("## Column description"));
    }

    #[test]
    fn json_report_carries_status_tags() {
        let ds = students();
        let view = filter(&ds, &Selection::default());
        let json = render_json(&ds, &view, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"], 5);
        assert_eq!(value["dashboard"]["term_averages"]["status"], "ready");
        assert!(value["description"].is_null());
    }
}
