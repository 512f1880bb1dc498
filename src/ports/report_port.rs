//! Report output port trait.

use crate::domain::error::FolioError;
use crate::domain::table::Table;
use std::path::Path;

/// Sink for rendered result tables.
pub trait ReportSink {
    fn write(&self, table: &Table, output_path: &Path) -> Result<(), FolioError>;
}
