//! The activity log is a single CSV file handled by [log_store::CsvLogStore].
//!  - The header is fixed, see [entities::LOG_COLUMNS].
//!  - Every flush loads the whole table, appends the new rows and writes it back.
//!  - Rows are never modified once written.

pub mod entities;
pub mod log_store;
