use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::analysis::{Dashboard, RETENTION, SATISFACTION};
use crate::state::AppState;
use crate::ui::{panels, plot, show_outcome, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &mut self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Student enrollment, retention and satisfaction");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("Open a CSV with the same structure to see the dashboard (File → Open…).");
        return;
    };

    ui.label(RichText::new("Original data").strong());
    let headers: Vec<String> = dataset.column_names().map(str::to_string).collect();
    tables::data_table(ui, "original_table", &headers, dataset.len(), |i| {
        dataset.rows[i].as_slice()
    });
    ui.add_space(8.0);

    let Some(view) = state.view() else {
        return;
    };
    let Some(dash) = &state.dashboard else {
        return;
    };

    ui.columns(2, |cols| {
        cols[0].label(RichText::new(format!("Filtered data ({} rows)", view.len())).strong());
        tables::data_table(&mut cols[0], "filtered_table", &headers, view.len(), |i| {
            dataset.rows[view.indices[i]].as_slice()
        });
        cols[1].label(RichText::new("Quick summary").strong());
        show_outcome(&mut cols[1], &dash.summary, tables::summary_grid);
    });

    let export_clicked = ui.button("Export filtered CSV…").clicked();
    ui.separator();

    charts(ui, state, dash);

    ui.separator();
    let mut show_description = state.show_description;
    ui.checkbox(&mut show_description, "Show full description");

    if export_clicked {
        panels::save_file_dialog(state);
    }
    state.show_description = show_description;
    if state.show_description {
        state.ensure_description();
        if let Some(description) = &state.description {
            show_outcome(ui, description, tables::description_grid);
        }
    }
}

fn charts(ui: &mut Ui, state: &AppState, dash: &Dashboard) {
    let colors = &state.term_colors;

    ui.heading("Retention rate by year and term");
    show_outcome(ui, &dash.retention_by_year_and_term, |ui, series| {
        plot::year_term_lines(ui, "retention_lines", RETENTION, series, colors);
    });

    ui.heading("Average retention per year");
    show_outcome(ui, &dash.retention_by_year, |ui, rows| {
        plot::year_average_line(ui, "retention_yearly", RETENTION, rows);
    });

    ui.heading("Student satisfaction by year and term");
    show_outcome(ui, &dash.satisfaction_by_year_and_term, |ui, series| {
        plot::year_term_lines(ui, "satisfaction_lines", SATISFACTION, series, colors);
    });

    ui.heading("Student satisfaction by term");
    show_outcome(ui, &dash.satisfaction_spread, |ui, spreads| {
        plot::term_boxes(ui, "satisfaction_boxes", SATISFACTION, spreads, colors);
    });

    ui.heading("Statistics by term");
    show_outcome(ui, &dash.term_averages, |ui, rows| {
        tables::term_table(ui, rows);
        plot::term_bars(ui, rows, colors);
    });

    ui.heading("Enrolled students by department per year");
    show_outcome(ui, &dash.department_totals, |ui, totals| {
        plot::department_stack(ui, "department_stack", totals);
    });
}
