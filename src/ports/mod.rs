//! Port traits at the crate's boundaries.

pub mod config_port;
pub mod ledger_port;
pub mod report_port;
