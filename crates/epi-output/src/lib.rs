//! `epi-output` — report writers for the rust_epi workspace.
//!
//! Two backends implement [`ReportWriter`]:
//!
//! | Backend             | Files created                                  |
//! |---------------------|------------------------------------------------|
//! | [`CsvReportWriter`] | `statistics.csv`, `trace.csv` (when tracing)   |
//! | [`JsonReportWriter`]| one JSON document with the whole report        |
//!
//! # Usage
//!
//! ```rust,ignore
//! use epi_output::{CsvReportWriter, ReportWriter};
//!
//! let report = Sim::new(&scenario, padding, &NoopObserver)?.run()?;
//! let mut writer = CsvReportWriter::new(Path::new("./output"))?;
//! writer.write(&report)?;
//! writer.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod json;
pub mod writer;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use csv::CsvReportWriter;
pub use error::{OutputError, OutputResult};
pub use json::JsonReportWriter;
pub use writer::ReportWriter;
