//! CSV report output: one header line, then one row per run.
//!
//! Rows are flushed as each run completes so partial results survive a later
//! failure. Floating-point columns use six decimal places.

use std::io::Write;

use csv::{Writer, WriterBuilder};
use serde::Serializer;

use crate::engine::orchestrator::RunResult;
use crate::utils::error::{BenchError, Result};

pub const CSV_HEADER: [&str; 6] = [
    "run",
    "threads",
    "lock_type",
    "elapsed_seconds",
    "ops_per_second",
    "final_counter",
];

/// serde helper: formats an `f64` with exactly six decimals.
pub fn six_decimals<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.6}", value))
}

pub struct ReportWriter<W: Write> {
    wtr: Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            wtr: WriterBuilder::new().has_headers(false).from_writer(inner),
        }
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.wtr.write_record(CSV_HEADER)?;
        self.wtr.flush()?;
        Ok(())
    }

    pub fn write_result(&mut self, result: &RunResult) -> Result<()> {
        self.wtr.serialize(result)?;
        self.wtr.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.wtr
            .into_inner()
            .map_err(|e| BenchError::Io(e.into_error()))
    }
}
