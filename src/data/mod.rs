//! Data layer: core types, loading, filtering and export.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file, normalize headers, infer column kinds
//!   └──────────┘
//!        │            (cache keeps one Arc<Dataset> per path)
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  columns, rows of CellValue, unique values per column
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  term / year selection → FilteredView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  FilteredView → CSV
//!   └──────────┘
//! ```

pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
