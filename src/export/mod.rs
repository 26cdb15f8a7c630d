//! Export functionality for analysis
//!
//! This module provides functionality to export training artifacts for
//! analysis outside the crate. Currently supports CSV export of episode
//! history and JSON export of the learned value table.

mod history_csv;
mod table_json;

pub use history_csv::write_history;
pub use table_json::write_q_table;
