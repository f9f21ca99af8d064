use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common DataFrame dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_nan() => write!(f, "NaN"),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Null => write!(f, "None"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`; `Null` and `NaN` count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Missing in the DataFrame sense: `Null` or a float `NaN`.
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Equality that lets `Integer(2020)` match `Float(2020.0)`.
    pub fn matches(&self, other: &CellValue) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

// ---------------------------------------------------------------------------
// Column kinds and inference
// ---------------------------------------------------------------------------

/// Tokens read as missing values, case-sensitive.
pub const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

/// Inferred storage type of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Dtype label as DataFrame users know it.
    pub fn dtype_name(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "object",
        }
    }

    /// Pick the narrowest kind that every non-null raw string fits.
    pub fn infer_from_raw<'a>(raw: impl IntoIterator<Item = &'a str> + Clone) -> Self {
        let present = || raw.clone().into_iter().filter(|s| !is_null_token(s));
        if present().all(|s| s.parse::<i64>().is_ok()) {
            // An all-missing column ends up here too and is stored as floats.
            if present().next().is_none() {
                return ColumnKind::Float;
            }
            return ColumnKind::Integer;
        }
        if present().all(|s| s.parse::<f64>().is_ok()) {
            return ColumnKind::Float;
        }
        if present().all(|s| parse_bool(s).is_some()) {
            return ColumnKind::Bool;
        }
        ColumnKind::Text
    }

    /// Unify already-typed cells (JSON / Parquet input).
    pub fn infer_from_cells(cells: &[CellValue]) -> Self {
        let mut kind: Option<ColumnKind> = None;
        for cell in cells.iter().filter(|c| !c.is_null()) {
            let this = match cell {
                CellValue::Integer(_) => ColumnKind::Integer,
                CellValue::Float(_) => ColumnKind::Float,
                CellValue::Bool(_) => ColumnKind::Bool,
                _ => ColumnKind::Text,
            };
            kind = Some(match (kind, this) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(ColumnKind::Integer), ColumnKind::Float)
                | (Some(ColumnKind::Float), ColumnKind::Integer) => ColumnKind::Float,
                _ => ColumnKind::Text,
            });
        }
        kind.unwrap_or(ColumnKind::Float)
    }

    /// Parse a raw CSV field under this column kind.
    pub fn parse(self, raw: &str) -> CellValue {
        if is_null_token(raw) {
            return CellValue::Null;
        }
        match self {
            ColumnKind::Integer => raw
                .parse::<i64>()
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Null),
            ColumnKind::Float => raw
                .parse::<f64>()
                .map(CellValue::Float)
                .unwrap_or(CellValue::Null),
            ColumnKind::Bool => parse_bool(raw).map(CellValue::Bool).unwrap_or(CellValue::Null),
            ColumnKind::Text => CellValue::Text(raw.to_string()),
        }
    }

    /// Convert a typed cell so the whole column shares one representation.
    pub fn coerce(self, cell: CellValue) -> CellValue {
        match (self, cell) {
            (_, c) if c.is_null() => CellValue::Null,
            (ColumnKind::Float, CellValue::Integer(i)) => CellValue::Float(i as f64),
            (ColumnKind::Text, c @ CellValue::Text(_)) => c,
            (ColumnKind::Text, c) => CellValue::Text(c.to_string()),
            (_, c) => c,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dtype_name())
    }
}

fn is_null_token(s: &str) -> bool {
    NULL_TOKENS.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Column header after normalization plus its inferred kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// The full parsed table with pre-computed column indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Columns in file order.
    pub columns: Vec<Column>,
    /// Rows, each aligned with `columns`.
    pub rows: Vec<Vec<CellValue>>,
    /// For each column the sorted set of distinct non-null values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Dataset {
    /// Build column indices from the loaded rows.
    pub fn from_rows(columns: Vec<Column>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();
        for (idx, col) in columns.iter().enumerate() {
            if unique_values.contains_key(&col.name) {
                continue;
            }
            let values = rows
                .iter()
                .filter_map(|row| row.get(idx))
                .filter(|v| !v.is_null())
                .cloned()
                .collect();
            unique_values.insert(col.name.clone(), values);
        }
        Dataset {
            columns,
            rows,
            unique_values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(rows, columns)`, like a DataFrame's shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Position of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Cell at (`row`, column `name`); `None` when the column is absent.
    pub fn value(&self, row: usize, name: &str) -> Option<&CellValue> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_inference_picks_narrowest_kind() {
        assert_eq!(ColumnKind::infer_from_raw(["1", "", "3"]), ColumnKind::Integer);
        assert_eq!(ColumnKind::infer_from_raw(["1", "2.5"]), ColumnKind::Float);
        assert_eq!(ColumnKind::infer_from_raw(["True", "false", "NA"]), ColumnKind::Bool);
        assert_eq!(ColumnKind::infer_from_raw(["Fall", "1"]), ColumnKind::Text);
        assert_eq!(ColumnKind::infer_from_raw(["", "NaN"]), ColumnKind::Float);
    }

    #[test]
    fn cell_inference_widens_integers_to_floats() {
        let cells = [CellValue::Integer(1), CellValue::Null, CellValue::Float(2.5)];
        assert_eq!(ColumnKind::infer_from_cells(&cells), ColumnKind::Float);
        let mixed = [CellValue::Integer(1), CellValue::Text("x".into())];
        assert_eq!(ColumnKind::infer_from_cells(&mixed), ColumnKind::Text);
        assert_eq!(ColumnKind::Text.coerce(CellValue::Integer(7)), CellValue::Text("7".into()));
    }

    #[test]
    fn numeric_cells_match_across_representations() {
        assert!(CellValue::Integer(2020).matches(&CellValue::Float(2020.0)));
        assert!(!CellValue::Null.matches(&CellValue::Null));
        assert!(!CellValue::Text("2020".into()).matches(&CellValue::Integer(2020)));
    }

    #[test]
    fn unique_values_skip_nulls() {
        let ds = Dataset::from_rows(
            vec![Column {
                name: "Term".into(),
                kind: ColumnKind::Text,
            }],
            vec![
                vec![CellValue::Text("Spring".into())],
                vec![CellValue::Null],
                vec![CellValue::Text("Fall".into())],
                vec![CellValue::Text("Spring".into())],
            ],
        );
        let terms: Vec<_> = ds.unique_values["Term"].iter().cloned().collect();
        assert_eq!(
            terms,
            vec![CellValue::Text("Fall".into()), CellValue::Text("Spring".into())]
        );
        assert_eq!(ds.shape(), (4, 1));
    }
}
