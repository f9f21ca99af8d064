use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use crate::analysis::{DepartmentTotals, TermAverage, TermSpread, YearAverage, YearTermSeries};
use crate::color::{ColorMap, generate_palette};
use crate::data::model::CellValue;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Numeric years sit at their value; anything else at its rank among `keys`.
fn x_position(key: &CellValue, keys: &[CellValue]) -> f64 {
    key.as_f64()
        .unwrap_or_else(|| keys.iter().position(|k| k == key).unwrap_or(0) as f64)
}

/// Axis formatter that prints labels at integer positions only.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let v = mark.value;
        if v.fract() != 0.0 || v < 0.0 {
            return String::new();
        }
        labels.get(v as usize).cloned().unwrap_or_default()
    }
}

type AxisFormatter = Box<dyn Fn(GridMark, &RangeInclusive<f64>) -> String>;

/// Whole numeric years without decimals; textual years by rank.
fn year_axis(years: &[CellValue]) -> AxisFormatter {
    if years.iter().all(|y| y.as_f64().is_some()) {
        Box::new(|mark: GridMark, _range: &RangeInclusive<f64>| {
            if mark.value.fract() == 0.0 {
                format!("{:.0}", mark.value)
            } else {
                String::new()
            }
        })
    } else {
        Box::new(category_formatter(years.iter().map(|y| y.to_string()).collect()))
    }
}

// ---------------------------------------------------------------------------
// Line charts
// ---------------------------------------------------------------------------

/// One coloured line per term over the years.
pub fn year_term_lines(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    series: &YearTermSeries,
    colors: &ColorMap,
) {
    let years: Vec<CellValue> = {
        let mut all: Vec<CellValue> = series
            .lines
            .iter()
            .flat_map(|l| l.points.iter().map(|p| p.year.clone()))
            .collect();
        all.sort();
        all.dedup();
        all
    };

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label(y_label)
        .x_axis_formatter(year_axis(&years))
        .show(ui, |plot_ui| {
            for line in &series.lines {
                let color = colors.color_for(&line.term);
                let name = line.term.to_string();
                let points: PlotPoints = line
                    .points
                    .iter()
                    .map(|p| [x_position(&p.year, &years), p.mean])
                    .collect();
                let markers: PlotPoints = line
                    .points
                    .iter()
                    .map(|p| [x_position(&p.year, &years), p.mean])
                    .collect();
                plot_ui.line(Line::new(points).name(&name).color(color).width(2.0));
                plot_ui.points(Points::new(markers).name(&name).color(color).radius(4.0));
            }
        });
}

/// Single line of yearly averages. `NaN` averages are left out.
pub fn year_average_line(ui: &mut Ui, id: &str, y_label: &str, rows: &[YearAverage]) {
    let years: Vec<CellValue> = rows.iter().map(|r| r.year.clone()).collect();
    let coords: Vec<[f64; 2]> = rows
        .iter()
        .filter(|r| !r.mean.is_nan())
        .map(|r| [x_position(&r.year, &years), r.mean])
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label(y_label)
        .x_axis_formatter(year_axis(&years))
        .show(ui, |plot_ui| {
            let line: PlotPoints = coords.iter().copied().collect();
            let markers: PlotPoints = coords.iter().copied().collect();
            plot_ui.line(Line::new(line).color(Color32::LIGHT_BLUE).width(2.0));
            plot_ui.points(Points::new(markers).color(Color32::LIGHT_BLUE).radius(4.0));
        });
}

// ---------------------------------------------------------------------------
// Distribution and bar charts
// ---------------------------------------------------------------------------

/// Box per term.
pub fn term_boxes(ui: &mut Ui, id: &str, y_label: &str, spreads: &[TermSpread], colors: &ColorMap) {
    let labels: Vec<String> = spreads.iter().map(|s| s.term.to_string()).collect();
    let boxes: Vec<BoxElem> = spreads
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let f = &s.spread;
            BoxElem::new(
                i as f64,
                BoxSpread::new(f.lower_whisker, f.q1, f.median, f.q3, f.upper_whisker),
            )
            .name(s.term.to_string())
            .fill(colors.color_for(&s.term).gamma_multiply(0.4))
            .box_width(0.5)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label("Term")
        .y_axis_label(y_label)
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes));
        });
}

/// Two bar charts side by side: average retention and satisfaction by term.
pub fn term_bars(ui: &mut Ui, rows: &[TermAverage], colors: &ColorMap) {
    let labels: Vec<String> = rows.iter().map(|r| r.term.to_string()).collect();
    ui.columns(2, |cols| {
        let charts: [(&str, &str, fn(&TermAverage) -> f64); 2] = [
            ("term_retention_bars", "Average retention rate", |r| r.retention_rate),
            ("term_satisfaction_bars", "Average student satisfaction", |r| r.student_satisfaction),
        ];
        for (col_ui, (id, title, value)) in cols.iter_mut().zip(charts) {
            col_ui.label(title);
            let bars: Vec<Bar> = rows
                .iter()
                .enumerate()
                .filter(|(_, r)| !value(r).is_nan())
                .map(|(i, r)| {
                    Bar::new(i as f64, value(r))
                        .width(0.6)
                        .name(r.term.to_string())
                        .fill(colors.color_for(&r.term))
                })
                .collect();
            Plot::new(id)
                .height(CHART_HEIGHT)
                .x_axis_formatter(category_formatter(labels.clone()))
                .show(col_ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars));
                });
        }
    });
}

/// Enrollment per department stacked per year.
pub fn department_stack(ui: &mut Ui, id: &str, totals: &DepartmentTotals) {
    let years: Vec<CellValue> = totals.years.iter().map(|y| y.year.clone()).collect();
    let palette = generate_palette(totals.departments.len());

    let mut charts: Vec<BarChart> = Vec::with_capacity(totals.departments.len());
    for (dept_idx, (name, color)) in totals.departments.iter().zip(palette).enumerate() {
        let bars: Vec<Bar> = totals
            .years
            .iter()
            .map(|y| Bar::new(x_position(&y.year, &years), y.totals[dept_idx]).width(0.6))
            .collect();
        let mut chart = BarChart::new(bars).name(name).color(color);
        if !charts.is_empty() {
            let below: Vec<&BarChart> = charts.iter().collect();
            chart = chart.stack_on(&below);
        }
        charts.push(chart);
    }

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Number of enrolled students")
        .x_axis_formatter(year_axis(&years))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_years_plot_at_their_value() {
        let keys = [CellValue::Integer(2020), CellValue::Integer(2021)];
        assert_eq!(x_position(&keys[1], &keys), 2021.0);
    }

    #[test]
    fn year_axis_labels() {
        let numeric = year_axis(&[CellValue::Integer(2020)]);
        let mark = GridMark { value: 2020.0, step_size: 1.0 };
        assert_eq!(numeric(mark, &(2019.0..=2021.0)), "2020");

        let text = year_axis(&[CellValue::Text("A".into()), CellValue::Text("B".into())]);
        let mark = GridMark { value: 1.0, step_size: 1.0 };
        assert_eq!(text(mark, &(0.0..=1.0)), "B");
    }

    #[test]
    fn text_years_plot_at_their_rank() {
        let keys = [CellValue::Text("2020/21".into()), CellValue::Text("2021/22".into())];
        assert_eq!(x_position(&keys[1], &keys), 1.0);
    }
}
