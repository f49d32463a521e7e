//! Data model for workspace tables and their content

mod schema;
mod summary;
mod table;

pub use schema::{CellType, Column};
pub use summary::ExportSummary;
pub use table::{Row, TableId, TableRef};
