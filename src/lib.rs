//! xano-export - Bulk export of workspace tables
//!
//! Walks the paginated table listing and table content endpoints of a
//! workspace and writes every non-empty table to a delimited file, along
//! with a per-table summary for downstream schema inference.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod fetch;
pub mod model;
pub mod retrieve;

pub use config::{ClientConfig, ExportConfig};
pub use coordinator::{ExportCoordinator, ExportReport, TableOutcome};
pub use error::{ExportError, FetchError, Result, RetrieveError};
pub use export::TabularExporter;
pub use fetch::{HttpFetcher, PageFetcher};
pub use model::{ExportSummary, Row, TableRef};
pub use retrieve::BulkRetriever;
