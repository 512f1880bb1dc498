//! Ledger ingestion port trait.

use crate::domain::error::FolioError;
use crate::domain::table::RawTable;
use std::path::Path;

/// Source of unreconciled transaction tables.
pub trait LedgerSource {
    fn load(&self, path: &Path) -> Result<RawTable, FolioError>;
}
