use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::{Dashboard, Description, Outcome, describe};
use crate::color::ColorMap;
use crate::data::cache::DatasetCache;
use crate::data::export::export_to_path;
use crate::data::filter::{
    FilteredView, Selection, TERM, YEAR, filter, term_options, year_options,
};
use crate::data::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Message shown at the top of the window.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Path of the dataset currently shown (or last attempted).
    pub data_path: PathBuf,

    /// Loaded datasets for the lifetime of the process.
    cache: DatasetCache,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Selected terms and years.
    pub selection: Selection,

    /// Indices of rows passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Every section over the current view, rebuilt on selection change.
    pub dashboard: Option<Dashboard>,

    /// Line colours per term, stable across filter changes.
    pub term_colors: ColorMap,

    /// Sidebar checkbox: list column types.
    pub show_dtypes: bool,

    /// Checkbox: show the full-dataset description.
    pub show_description: bool,

    /// Full-dataset description, computed the first time it is shown.
    pub description: Option<Outcome<Description>>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(data_path: PathBuf) -> Self {
        Self {
            data_path,
            cache: DatasetCache::new(),
            dataset: None,
            selection: Selection::default(),
            visible_indices: Vec::new(),
            dashboard: None,
            term_colors: ColorMap::default(),
            show_dtypes: false,
            show_description: false,
            description: None,
            status: None,
        }
    }

    /// Load (or fetch from the cache) the dataset at `path` and show it with
    /// every term and year selected. A failed load leaves no dataset.
    pub fn open(&mut self, path: &Path) {
        self.data_path = path.to_path_buf();
        match self.cache.load(path) {
            Ok(dataset) => self.set_dataset(dataset, None),
            Err(e) if e.is_not_found() => {
                log::info!("{e}");
                self.clear_dataset();
                self.status = Some(Status::Info(format!(
                    "{e}. Open a CSV with the same structure (File → Open…)."
                )));
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.clear_dataset();
                self.status = Some(Status::Error(format!("Error: {e}")));
            }
        }
    }

    /// Ingest a loaded dataset. `selection` overrides the default of
    /// selecting every term and year.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>, selection: Option<Selection>) {
        self.selection = selection.unwrap_or_else(|| Selection::all(&dataset));
        self.term_colors = ColorMap::new(&term_options(&dataset));
        self.description = None;
        self.dataset = Some(dataset);
        self.status = None;
        self.refilter();
    }

    fn clear_dataset(&mut self) {
        self.dataset = None;
        self.visible_indices.clear();
        self.dashboard = None;
        self.description = None;
    }

    /// Recompute `visible_indices` and every section after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            let view = filter(ds, &self.selection);
            self.dashboard = Some(Dashboard::compute(&view));
            self.visible_indices = view.indices;
        }
    }

    /// The current filtered view, if a dataset is loaded.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        let ds = self.dataset.as_deref()?;
        Some(FilteredView {
            dataset: ds,
            indices: self.visible_indices.clone(),
        })
    }

    /// Filter options for a dimension column (`Term` or `Year`).
    pub fn options(&self, column: &str) -> Vec<CellValue> {
        let Some(ds) = &self.dataset else {
            return Vec::new();
        };
        let values = match column {
            TERM => term_options(ds),
            YEAR => year_options(ds),
            _ => Default::default(),
        };
        values.into_iter().collect()
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let Some(selected) = self.selection.dimension_mut(column) else {
            return;
        };
        if selected.contains(value) {
            selected.remove(value);
        } else {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, column: &str) {
        let all = self.options(column);
        if let Some(selected) = self.selection.dimension_mut(column) {
            *selected = all.into_iter().collect();
            self.refilter();
        }
    }

    /// Clear a dimension's selection. An empty selection filters nothing.
    pub fn select_none(&mut self, column: &str) {
        if let Some(selected) = self.selection.dimension_mut(column) {
            selected.clear();
            self.refilter();
        }
    }

    /// Compute the full description once per dataset.
    pub fn ensure_description(&mut self) {
        if self.description.is_some() {
            return;
        }
        if let Some(ds) = &self.dataset {
            log::debug!("describing {} columns", ds.columns.len());
            self.description = Some(Outcome::informational(describe(ds)));
        }
    }

    /// Write the current view to `path`; the outcome lands in `status`.
    pub fn export_view(&mut self, path: &Path) {
        let Some(view) = self.view() else {
            return;
        };
        match export_to_path(&view, path) {
            Ok(()) => {
                self.status = Some(Status::Info(format!(
                    "Saved {} rows to {}",
                    self.visible_indices.len(),
                    path.display()
                )));
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.status = Some(Status::Error(format!("Export failed: {e}")));
            }
        }
    }
}
