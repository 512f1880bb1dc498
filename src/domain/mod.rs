//! Core domain types and logic.

pub mod schema;
pub mod table;
pub mod ledger;
pub mod slicer;
pub mod report;
pub mod statistics;
pub mod error;
