//! Per-table export summary handed to schema inference

use std::path::PathBuf;

use serde::Serialize;

use super::schema::Column;
use super::table::Row;

/// What was written for one table
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Table display name
    pub name: String,
    /// Column ordering fixed from the first row
    pub columns: Vec<Column>,
    /// First row, as received
    pub sample_row: Row,
    /// Number of data rows written
    pub row_count: usize,
    /// File the rows were written to
    pub path: PathBuf,
}

impl ExportSummary {
    /// Column names in output order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
