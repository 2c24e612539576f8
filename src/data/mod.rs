/// Data layer: core types, loading, and schema coercion.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Frame (inferred dtypes)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  apply declared dtypes → Frame (coerced)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   Frame   │  Vec<Series>, column lookup, unique / counts / filter
///   └──────────┘
/// ```
pub mod loader;
pub mod model;
pub mod schema;
