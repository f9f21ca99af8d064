use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::EXPORT_FILE_NAME;
use crate::data::filter::{TERM, YEAR};
use crate::data::model::CellValue;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let (n_rows, n_cols) = dataset.shape();
    ui.label(format!("Rows, columns: {n_rows} x {n_cols}"));
    ui.checkbox(&mut state.show_dtypes, "Show columns and types");
    if state.show_dtypes {
        egui::Grid::new("dtypes").striped(true).show(ui, |ui: &mut Ui| {
            for col in &dataset.columns {
                ui.label(&col.name);
                ui.monospace(col.kind.dtype_name());
                ui.end_row();
            }
        });
    }
    ui.separator();

    // Toggles are collected first and applied once, so the dashboard is
    // rebuilt at most once per frame.
    let mut toggles: Vec<(&str, CellValue)> = Vec::new();
    let mut select_all: Vec<&str> = Vec::new();
    let mut select_none: Vec<&str> = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, label) in [(TERM, "Select term(s)"), (YEAR, "Select year(s)")] {
                let all_values = state.options(col);
                if all_values.is_empty() {
                    continue;
                }
                let Some(selected) = state.selection.dimension(col) else {
                    continue;
                };

                // Show count of selected / total in the header
                let header_text = format!("{label}  ({}/{})", selected.len(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                select_all.push(col);
                            }
                            if ui.small_button("None").clicked() {
                                select_none.push(col);
                            }
                        });
                        if selected.is_empty() {
                            ui.weak("Nothing selected: no filter applied.");
                        }

                        for val in &all_values {
                            let mut checked = selected.contains(val);
                            let mut text = RichText::new(val.to_string());
                            if col == TERM {
                                text = text.color(state.term_colors.color_for(val));
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                toggles.push((col, val.clone()));
                            }
                        }
                    });
            }
        });

    for col in select_all {
        state.select_all(col);
    }
    for col in select_none {
        state.select_none(col);
    }
    for (col, val) in toggles {
        state.toggle_filter_value(col, &val);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{}: {} rows loaded, {} visible",
                state.data_path.display(),
                ds.len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        match &state.status {
            Some(Status::Info(msg)) => {
                ui.label(RichText::new(msg).color(Color32::LIGHT_BLUE));
            }
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open student data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_view(&path);
    }
}
