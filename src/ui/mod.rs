pub mod panels;
pub mod plot;
pub mod tables;

use eframe::egui::{Color32, RichText, Ui};

use crate::analysis::Outcome;

/// Render a section body, or its notice / error when it is not ready.
pub fn show_outcome<T>(ui: &mut Ui, outcome: &Outcome<T>, body: impl FnOnce(&mut Ui, &T)) {
    match outcome {
        Outcome::Ready(value) => body(ui, value),
        Outcome::Unavailable(msg) => {
            ui.label(RichText::new(format!("ℹ {msg}")).color(Color32::LIGHT_BLUE));
        }
        Outcome::Failed(msg) => {
            ui.label(RichText::new(format!("⚠ {msg}")).color(Color32::RED));
        }
    }
}
