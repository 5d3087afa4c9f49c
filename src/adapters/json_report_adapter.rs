//! JSON report adapter implementing ReportPort.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::error::TickwiseError;
use crate::domain::report::AnalysisReport;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &AnalysisReport, output: Option<&Path>) -> Result<(), TickwiseError> {
        write_json(report, output)
    }
}

/// Pretty-print `value` to `output`, creating parent directories, or to stdout.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), TickwiseError> {
    let mut body = serde_json::to_vec_pretty(value)?;
    body.push(b'\n');

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, body)?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&body)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
