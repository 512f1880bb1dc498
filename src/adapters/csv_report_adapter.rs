//! CSV report output adapter.
//!
//! Renders a domain [`Table`] to CSV. Missing values render as empty
//! cells, never as "0" or a NaN literal; dates use ISO `%Y-%m-%d`.

use crate::domain::error::FolioError;
use crate::domain::table::{Table, Value};
use crate::ports::report_port::ReportSink;
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }

    fn render_cell(value: &Value) -> String {
        match value {
            Value::Missing => String::new(),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Num(n) => n.to_string(),
        }
    }

    pub fn render(&self, table: &Table) -> Result<String, FolioError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(table.schema().names())
            .map_err(|e| FolioError::Report {
                reason: format!("CSV write error: {e}"),
            })?;

        for row in 0..table.row_count() {
            let record: Vec<String> = table
                .schema()
                .handles()
                .map(|h| Self::render_cell(table.value(row, h)))
                .collect();
            wtr.write_record(&record).map_err(|e| FolioError::Report {
                reason: format!("CSV write error: {e}"),
            })?;
        }

        let bytes = wtr.into_inner().map_err(|e| FolioError::Report {
            reason: format!("CSV flush error: {e}"),
        })?;
        String::from_utf8(bytes).map_err(|e| FolioError::Report {
            reason: format!("CSV encoding error: {e}"),
        })
    }
}

impl ReportSink for CsvReportAdapter {
    fn write(&self, table: &Table, output_path: &Path) -> Result<(), FolioError> {
        let rendered = self.render(table)?;
        fs::write(output_path, rendered)?;
        Ok(())
    }
}
