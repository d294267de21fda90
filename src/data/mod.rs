/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .ods / .csv / .json / .parquet  (uploaded bytes)
///        │
///        ▼
///   ┌──────────────────┐
///   │  cache + loader  │  content hash → parse → Table
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  typed columns, aligned rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  per-column value sets → derived Table
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ summary  │   │ crosstab │  pie distributions / heatmap grid
///   └──────────┘   └──────────┘
/// ```

pub mod cache;
pub mod crosstab;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
