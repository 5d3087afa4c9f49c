//! Report output port trait.

use std::path::Path;

use crate::domain::error::TickwiseError;
use crate::domain::report::AnalysisReport;

/// Port for writing analysis reports.
pub trait ReportPort {
    /// Write `report` to `output`, or to stdout when `output` is `None`.
    fn write(&self, report: &AnalysisReport, output: Option<&Path>) -> Result<(), TickwiseError>;
}
