mod analysis;
mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::DashboardApp;
use config::Settings;
use data::cache::DatasetCache;
use data::export::export_to_path;
use data::filter::filter;
use state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::parse();
    if settings.headless {
        run_headless(&settings)
    } else {
        run_window(settings)
    }
}

/// Print the report for the selected rows and optionally export them.
fn run_headless(settings: &Settings) -> Result<()> {
    let mut cache = DatasetCache::new();
    let dataset = match cache.load(&settings.path) {
        Ok(ds) => ds,
        Err(e) if e.is_not_found() => {
            println!("{e}. Provide a CSV with the same structure.");
            return Ok(());
        }
        Err(e) => return Err(e).context("could not load the dataset"),
    };

    let view = filter(&dataset, &settings.selection(&dataset));
    if view.is_empty() {
        log::warn!("no rows match the selected terms and years");
    }

    if let Some(path) = &settings.export {
        export_to_path(&view, path)
            .with_context(|| format!("could not export to {}", path.display()))?;
    }

    if settings.json {
        println!("{}", report::render_json(&dataset, &view, settings.describe)?);
    } else {
        print!("{}", report::render(&dataset, &view, settings.describe));
    }
    Ok(())
}

fn run_window(settings: Settings) -> Result<()> {
    let mut state = AppState::new(settings.path.clone());
    state.open(&settings.path);
    if let Some(dataset) = state.dataset.clone() {
        let selection = settings.selection(&dataset);
        state.set_dataset(dataset, Some(selection));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Campus Lens – Student Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
