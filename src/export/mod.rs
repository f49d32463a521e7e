//! Delimited-file export of table content

mod value;

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::config::ExportConfig;
use crate::error::Result;
use crate::model::{CellType, Column, ExportSummary, Row};

pub use value::{file_stem, format_value};

/// Writes one delimited file per table
#[derive(Debug, Clone)]
pub struct TabularExporter {
    config: ExportConfig,
}

impl Default for TabularExporter {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

impl TabularExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// File a table's rows are written to
    pub fn output_path(&self, table_name: &str) -> PathBuf {
        self.config
            .export_dir
            .join(format!("{}.{}", file_stem(table_name), self.config.extension()))
    }

    /// Export a table's complete row set
    ///
    /// Returns `None` without touching the filesystem when there are no rows.
    pub fn export_table(&self, table_name: &str, rows: &[Row]) -> Result<Option<ExportSummary>> {
        let Some(sample_row) = rows.first() else {
            info!(table = table_name, "No data found for table: {}", table_name);
            return Ok(None);
        };

        let columns = column_order(rows);
        let path = self.output_path(table_name);

        fs::create_dir_all(&self.config.export_dir)?;
        let file = File::create(&path)?;
        self.write_rows(&columns, rows, file)?;

        info!(
            table = table_name,
            rows = rows.len(),
            path = %path.display(),
            "Exported {} records to {}",
            rows.len(),
            path.display()
        );

        Ok(Some(ExportSummary {
            name: table_name.to_string(),
            columns: infer_columns(&columns, rows),
            sample_row: sample_row.clone(),
            row_count: rows.len(),
            path,
        }))
    }

    /// Write a header row and one record per row, positionally by column
    ///
    /// With no columns every line is blank, header included.
    pub fn write_rows<W: Write>(&self, columns: &[String], rows: &[Row], mut writer: W) -> Result<()> {
        if columns.is_empty() {
            for _ in 0..=rows.len() {
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
            return Ok(());
        }

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter)
            .from_writer(writer);

        csv_writer.write_record(columns)?;
        for row in rows {
            csv_writer.write_record(columns.iter().map(|c| format_value(row.get(c))))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Column ordering: the first row's keys in first-seen order
pub fn column_order(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Infer column types across all exported rows
fn infer_columns(columns: &[String], rows: &[Row]) -> Vec<Column> {
    columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let inferred = rows
                .iter()
                .filter_map(|row| row.get(name))
                .map(CellType::of_value)
                .fold(CellType::Null, CellType::widen);
            Column::with_type(name.clone(), index, inferred)
        })
        .collect()
}
