//! CSV ledger ingestion adapter.
//!
//! Reads a transaction CSV into a [`RawTable`] of string cells; all typing
//! and column reconciliation happens later in the domain. The reader is
//! flexible about row widths on purpose: ragged input must surface as a
//! schema mismatch from reconciliation, not as a parse failure here.

use crate::domain::error::FolioError;
use crate::domain::table::RawTable;
use crate::ports::ledger_port::LedgerSource;
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct CsvLedgerAdapter;

impl CsvLedgerAdapter {
    pub fn new() -> Self {
        CsvLedgerAdapter
    }

    pub fn parse(&self, content: &str) -> Result<RawTable, FolioError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| FolioError::Ledger {
                reason: format!("CSV header error: {e}"),
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| FolioError::Ledger {
                reason: format!("CSV parse error: {e}"),
            })?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }

        Ok(RawTable { headers, rows })
    }
}

impl LedgerSource for CsvLedgerAdapter {
    fn load(&self, path: &Path) -> Result<RawTable, FolioError> {
        let content = fs::read_to_string(path).map_err(|e| FolioError::Ledger {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        self.parse(&content)
    }
}
