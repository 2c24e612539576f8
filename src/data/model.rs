use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Value – a single dynamically-typed cell produced by the loaders
// ---------------------------------------------------------------------------

/// A cell value as inferred while loading, before schema coercion.
/// Mirrors the dtypes the source files can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dtype – the declared semantic type of a column
// ---------------------------------------------------------------------------

/// Declared column type used for schema coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    Category,
    Int32,
    Int64,
    Float64,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dtype::Category => "category",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::Float64 => "float64",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Series – one typed column
// ---------------------------------------------------------------------------

/// A single column of the frame. All rows of one column share a type.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Category(Vec<String>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Category(v) => v.len(),
            Series::Int32(v) => v.len(),
            Series::Int64(v) => v.len(),
            Series::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Series::Category(_) => Dtype::Category,
            Series::Int32(_) => Dtype::Int32,
            Series::Int64(_) => Dtype::Int64,
            Series::Float64(_) => Dtype::Float64,
        }
    }

    /// Numeric view of the column, `None` for categoricals.
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self {
            Series::Int32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Series::Int64(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Series::Float64(v) => Some(v.clone()),
            Series::Category(_) => None,
        }
    }

    /// Render one cell for console output.
    pub fn fmt_cell(&self, row: usize) -> String {
        match self {
            Series::Category(v) => v[row].clone(),
            Series::Int32(v) => v[row].to_string(),
            Series::Int64(v) => v[row].to_string(),
            Series::Float64(v) => format!("{}", v[row]),
        }
    }

    fn take(&self, indices: &[usize]) -> Series {
        match self {
            Series::Category(v) => {
                Series::Category(indices.iter().map(|&i| v[i].clone()).collect())
            }
            Series::Int32(v) => Series::Int32(indices.iter().map(|&i| v[i]).collect()),
            Series::Int64(v) => Series::Int64(indices.iter().map(|&i| v[i]).collect()),
            Series::Float64(v) => Series::Float64(indices.iter().map(|&i| v[i]).collect()),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame – the loaded table (columns of equal length)
// ---------------------------------------------------------------------------

/// The full loaded table: ordered column names and one [`Series`] each.
/// Loaded once, never mutated except by schema coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    data: Vec<Series>,
}

impl Frame {
    /// Build a frame from `(name, series)` pairs.
    ///
    /// All columns must have the same length; the loaders construct
    /// column-major data uniformly, so a mismatch is a bug.
    pub fn new(columns: Vec<(String, Series)>) -> Frame {
        if let Some(first_len) = columns.first().map(|(_, s)| s.len()) {
            for (name, series) in &columns {
                assert_eq!(
                    series.len(),
                    first_len,
                    "column '{name}' has length {}, expected {first_len}",
                    series.len()
                );
            }
        }
        let (columns, data) = columns.into_iter().unzip();
        Frame { columns, data }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.first().map_or(0, Series::len)
    }

    pub fn is_empty(&self) -> bool {
        self.data.first().map_or(true, Series::is_empty)
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.columns.len())
    }

    /// Ordered column names.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.data[i])
    }

    /// Iterate `(name, series)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.data.iter())
    }

    /// First `n` rows as a new frame.
    pub fn head(&self, n: usize) -> Frame {
        let indices: Vec<usize> = (0..self.len().min(n)).collect();
        Frame {
            columns: self.columns.clone(),
            data: self.data.iter().map(|s| s.take(&indices)).collect(),
        }
    }

    /// Rows where the categorical column `column` equals `value`.
    pub fn filter_eq(&self, column: &str, value: &str) -> Option<Frame> {
        let Series::Category(keys) = self.get(column)? else {
            return None;
        };
        let indices: Vec<usize> = keys
            .iter()
            .enumerate()
            .filter(|(_, k)| k.as_str() == value)
            .map(|(i, _)| i)
            .collect();
        Some(Frame {
            columns: self.columns.clone(),
            data: self.data.iter().map(|s| s.take(&indices)).collect(),
        })
    }

    /// Unique values of a categorical column, in order of first appearance.
    pub fn unique(&self, column: &str) -> Option<Vec<String>> {
        let Series::Category(values) = self.get(column)? else {
            return None;
        };
        let mut seen: Vec<String> = Vec::new();
        for v in values {
            if !seen.contains(v) {
                seen.push(v.clone());
            }
        }
        Some(seen)
    }

    /// Per-value frequencies of a categorical column, descending by count.
    /// Ties are broken by value so the output is deterministic.
    pub fn value_counts(&self, column: &str) -> Option<Vec<(String, usize)>> {
        let Series::Category(values) = self.get(column)? else {
            return None;
        };
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for v in values {
            *counts.entry(v.as_str()).or_insert(0) += 1;
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(k, n)| (k.to_string(), n))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Some(counts)
    }

    /// The numeric columns as `(name, values)` pairs, in column order.
    pub fn numeric_columns(&self) -> Vec<(&str, Vec<f64>)> {
        self.iter()
            .filter_map(|(name, series)| series.as_f64().map(|v| (name, v)))
            .collect()
    }
}
