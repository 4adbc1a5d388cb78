//! Data layer: core types, loading, normalisation, reshaping and export.
//!
//! Architecture:
//! ```text
//!  <dir>/*_<n>h.csv  or  <dir>/<one wide>.csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse files → RawDataset (hour → HourRecord)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  subtract control series per hour
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ reshape   │  RawDataset → SampleDataset (+ group maxima)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  write normalised_<n>h.csv / <sample>.csv
//!   └──────────┘
//! ```

pub mod export;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod reshape;
