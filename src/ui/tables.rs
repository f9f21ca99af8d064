use eframe::egui::{self, Align, Layout, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::analysis::stats::format2;
use crate::analysis::summary::MeasureSummary;
use crate::analysis::{Description, SummaryStats, TermAverage};
use crate::data::model::CellValue;

const ROW_HEIGHT: f32 = 18.0;
const TABLE_HEIGHT: f32 = 240.0;

/// Scrollable table of rows. `rows` are borrowed lazily so only the
/// visible ones are rendered.
pub fn data_table<'a>(
    ui: &mut Ui,
    id: &str,
    headers: &[String],
    n_rows: usize,
    row: impl Fn(usize) -> &'a [CellValue],
) {
    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal()
            .id_salt(id)
            .show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .cell_layout(Layout::left_to_right(Align::Center))
                    .columns(TableColumn::auto().at_least(60.0), headers.len())
                    .max_scroll_height(TABLE_HEIGHT)
                    .header(ROW_HEIGHT + 2.0, |mut header| {
                        for name in headers {
                            header.col(|ui: &mut Ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(ROW_HEIGHT, n_rows, |mut table_row| {
                            let cells = row(table_row.index());
                            for cell in cells {
                                table_row.col(|ui: &mut Ui| {
                                    if cell.is_null() {
                                        ui.weak("None");
                                    } else {
                                        ui.label(cell.to_string());
                                    }
                                });
                            }
                        });
                    });
            });
    });
}

/// Mean / median / std of both measures.
pub fn summary_grid(ui: &mut Ui, summary: &SummaryStats) {
    let measures: [(&str, fn(&MeasureSummary) -> f64); 3] = [
        ("mean", |m| m.mean),
        ("median", |m| m.median),
        ("std", |m| m.std),
    ];
    egui::Grid::new("quick_summary")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            ui.strong("Retention_rate");
            ui.strong("Student_satisfaction");
            ui.end_row();
            for (label, pick) in measures {
                ui.label(label);
                ui.monospace(format2(pick(&summary.retention_rate)));
                ui.monospace(format2(pick(&summary.student_satisfaction)));
                ui.end_row();
            }
        });
}

pub fn term_table(ui: &mut Ui, rows: &[TermAverage]) {
    egui::Grid::new("term_averages")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Term");
            ui.strong("Retention_rate");
            ui.strong("Student_satisfaction");
            ui.end_row();
            for r in rows {
                ui.label(r.term.to_string());
                ui.monospace(format2(r.retention_rate));
                ui.monospace(format2(r.student_satisfaction));
                ui.end_row();
            }
        });
}

/// Statistic labels down, columns across.
pub fn description_grid(ui: &mut Ui, description: &Description) {
    ScrollArea::horizontal()
        .id_salt("description_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("description")
                .striped(true)
                .num_columns(description.columns.len() + 1)
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for col in &description.columns {
                        ui.strong(&col.name);
                    }
                    ui.end_row();
                    for label in description.labels() {
                        ui.label(label);
                        for col in &description.columns {
                            ui.monospace(col.stats.cell(label));
                        }
                        ui.end_row();
                    }
                });
        });
}
