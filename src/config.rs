use std::path::PathBuf;

use clap::Parser;

use crate::data::filter::Selection;
use crate::data::loader::DEFAULT_DATA_FILE;
use crate::data::model::{CellValue, Dataset};

/// Student enrollment, retention and satisfaction dashboard.
#[derive(Debug, Clone, Parser)]
#[command(name = "campus-lens", version, about)]
pub struct Settings {
    /// Data file (.csv, .json or .parquet).
    #[arg(default_value = DEFAULT_DATA_FILE)]
    pub path: PathBuf,

    /// Print the report to stdout instead of opening a window.
    #[arg(long)]
    pub headless: bool,

    /// Only keep these terms (repeatable). Default: every term.
    #[arg(long = "term", value_name = "TERM")]
    pub terms: Vec<String>,

    /// Only keep these years (repeatable). Default: every year.
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<i64>,

    /// Write the filtered rows as CSV to this file (headless).
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Include the full per-column description (headless).
    #[arg(long)]
    pub describe: bool,

    /// Emit the report as JSON instead of markdown tables (headless).
    #[arg(long)]
    pub json: bool,
}

impl Settings {
    /// Every term and year in `dataset`, narrowed to the values given on the
    /// command line. The window and the headless report both start here.
    pub fn selection(&self, dataset: &Dataset) -> Selection {
        let mut selection = Selection::all(dataset);
        if !self.terms.is_empty() {
            selection.terms = self.terms.iter().cloned().map(CellValue::Text).collect();
        }
        if !self.years.is_empty() {
            selection.years = self.years.iter().copied().map(CellValue::Integer).collect();
        }
        selection
    }
}
