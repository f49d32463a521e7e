//! Drives a whole-workspace export

use std::path::PathBuf;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::error::{ExportError, Result};
use crate::export::TabularExporter;
use crate::fetch::PageFetcher;
use crate::model::{ExportSummary, Row, TableRef};
use crate::retrieve::{BulkRetriever, StopReason};

/// Outcome of exporting one table
#[derive(Debug, Clone)]
pub enum TableOutcome {
    /// Rows were written
    Exported(ExportSummary),
    /// No rows came back; nothing was written
    Empty,
    /// A content request failed; rows received before it were written
    Failed {
        reason: StopReason,
        summary: Option<ExportSummary>,
    },
}

impl TableOutcome {
    pub fn summary(&self) -> Option<&ExportSummary> {
        match self {
            TableOutcome::Exported(summary) => Some(summary),
            TableOutcome::Failed { summary, .. } => summary.as_ref(),
            TableOutcome::Empty => None,
        }
    }
}

/// Result of a run, in listing order
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Every table processed, with what happened to it
    pub tables: Vec<(TableRef, TableOutcome)>,
}

impl ExportReport {
    /// Summaries of tables that produced a file
    pub fn summaries(&self) -> Vec<&ExportSummary> {
        self.tables.iter().filter_map(|(_, o)| o.summary()).collect()
    }

    /// Tables that produced no file
    pub fn skipped(&self) -> Vec<&TableRef> {
        self.tables
            .iter()
            .filter(|(_, o)| o.summary().is_none())
            .map(|(t, _)| t)
            .collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

/// Enumerates tables and exports each one
pub struct ExportCoordinator<F> {
    retriever: BulkRetriever<F>,
    exporter: TabularExporter,
}

impl<F: PageFetcher> ExportCoordinator<F> {
    pub fn new(retriever: BulkRetriever<F>, exporter: TabularExporter) -> Self {
        Self {
            retriever,
            exporter,
        }
    }

    /// Complete table listing of the workspace
    pub fn list_tables(&self) -> Result<Vec<TableRef>> {
        Ok(self.retriever.fetch_tables()?)
    }

    /// Export every table of the workspace
    pub fn run(&self) -> Result<ExportReport> {
        let tables = self.list_tables()?;
        warn_on_collisions(&self.exporter, &tables);

        let jobs = self.exporter.config().jobs;
        let outcomes: Vec<TableOutcome> = if jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| ExportError::Config(e.to_string()))?;
            pool.install(|| {
                tables
                    .par_iter()
                    .map(|table| self.export_table(table))
                    .collect::<Result<Vec<_>>>()
            })?
        } else {
            tables
                .iter()
                .map(|table| self.export_table(table))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(ExportReport {
            tables: tables.into_iter().zip(outcomes).collect(),
        })
    }

    /// Export a single table found by ID in the listing
    pub fn export_table_by_id(&self, table_id: &str) -> Result<(TableRef, TableOutcome)> {
        let table = self
            .retriever
            .tables()
            .find(|item| match item {
                Ok(table) => table.id.as_str() == table_id,
                Err(_) => true,
            })
            .transpose()?
            .ok_or_else(|| ExportError::TableNotFound(table_id.to_string()))?;

        let outcome = self.export_table(&table)?;
        Ok((table, outcome))
    }

    /// Retrieve a table's content and write it out
    pub fn export_table(&self, table: &TableRef) -> Result<TableOutcome> {
        info!(
            table = %table.name,
            table_id = %table.id,
            "Exporting table: {} (ID: {})",
            table.name,
            table.id
        );

        let mut pages = self.retriever.table_content(&table.id);
        let rows: Vec<Row> = pages.by_ref().collect::<std::result::Result<_, _>>()?;
        let summary = self.exporter.export_table(&table.name, &rows)?;

        Ok(match (pages.stop_reason(), summary) {
            (Some(reason), summary) if reason.is_failure() => TableOutcome::Failed {
                reason: reason.clone(),
                summary,
            },
            (_, Some(summary)) => TableOutcome::Exported(summary),
            (_, None) => TableOutcome::Empty,
        })
    }
}

/// Tables whose names resolve to the same file overwrite each other
fn warn_on_collisions(exporter: &TabularExporter, tables: &[TableRef]) {
    let mut seen: FxHashMap<PathBuf, &TableRef> = FxHashMap::default();
    for table in tables {
        let path = exporter.output_path(&table.name);
        if let Some(previous) = seen.insert(path.clone(), table) {
            warn!(
                path = %path.display(),
                "Tables {} ({}) and {} ({}) share an output file; the later one wins",
                previous.name,
                previous.id,
                table.name,
                table.id
            );
        }
    }
}
