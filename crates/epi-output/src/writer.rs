//! The `ReportWriter` trait implemented by all backend writers.

use epi_sim::Report;

use crate::OutputResult;

/// Trait implemented by the CSV and JSON writers.
pub trait ReportWriter {
    /// Write one full report.
    fn write(&mut self, report: &Report) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
