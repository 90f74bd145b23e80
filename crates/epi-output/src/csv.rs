//! CSV output backend.
//!
//! Creates `statistics.csv` in the configured output directory, one row per
//! query per tick, and — only when the report carries a trace —
//! `trace.csv`, one row per person per tick.

use std::fs::File;
use std::path::PathBuf;

use csv::Writer;
use epi_sim::Report;

use crate::OutputResult;
use crate::writer::ReportWriter;

/// Writes simulation reports to CSV files.
pub struct CsvReportWriter {
    dir:        PathBuf,
    statistics: Writer<File>,
    finished:   bool,
}

impl CsvReportWriter {
    /// Open (or create) `statistics.csv` in `dir` and write its header row.
    /// `trace.csv` is created on demand by [`write`][ReportWriter::write].
    pub fn new(dir: impl Into<PathBuf>) -> OutputResult<Self> {
        let dir = dir.into();
        let mut statistics = Writer::from_path(dir.join("statistics.csv"))?;
        statistics.write_record([
            "query",
            "tick",
            "susceptible",
            "infected",
            "infectious",
            "recovered",
        ])?;
        Ok(Self { dir, statistics, finished: false })
    }
}

impl ReportWriter for CsvReportWriter {
    fn write(&mut self, report: &Report) -> OutputResult<()> {
        for (query, series) in &report.statistics {
            for (tick, counts) in series.iter().enumerate() {
                self.statistics.write_record(&[
                    query.clone(),
                    tick.to_string(),
                    counts.susceptible.to_string(),
                    counts.infected.to_string(),
                    counts.infectious.to_string(),
                    counts.recovered.to_string(),
                ])?;
            }
        }

        if !report.trace.is_empty() {
            let mut trace = Writer::from_path(self.dir.join("trace.csv"))?;
            trace.write_record(["tick", "person", "name", "x", "y", "compartment"])?;
            for (tick, entry) in report.trace.iter().enumerate() {
                for info in entry {
                    trace.write_record(&[
                        tick.to_string(),
                        info.id.0.to_string(),
                        info.name.clone(),
                        info.position.x.to_string(),
                        info.position.y.to_string(),
                        info.compartment.to_string(),
                    ])?;
                }
            }
            trace.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.statistics.flush()?;
        Ok(())
    }
}
