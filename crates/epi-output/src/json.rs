//! JSON output backend: the whole report as one document.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use epi_sim::Report;

use crate::OutputResult;
use crate::writer::ReportWriter;

/// Serialises the full report (statistics and trace) to a single JSON file.
pub struct JsonReportWriter {
    path:     PathBuf,
    file:     Option<BufWriter<File>>,
    finished: bool,
}

impl JsonReportWriter {
    /// Create (or truncate) the output file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> OutputResult<Self> {
        let path = path.into();
        let file = BufWriter::new(File::create(&path)?);
        Ok(Self { path, file: Some(file), finished: false })
    }

    /// The path this writer targets.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ReportWriter for JsonReportWriter {
    fn write(&mut self, report: &Report) -> OutputResult<()> {
        if let Some(file) = self.file.as_mut() {
            serde_json::to_writer_pretty(&mut *file, report)?;
            file.write_all(b"\n")?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        Ok(())
    }
}
