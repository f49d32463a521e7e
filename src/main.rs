//! xano-export - Bulk export of workspace tables

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use xano_export::config::{ClientConfig, ExportConfig, DEFAULT_BASE_URL, DEFAULT_DATA_SOURCE};
use xano_export::{BulkRetriever, ExportCoordinator, ExportSummary, HttpFetcher, TabularExporter};

/// Export every table of a Xano workspace to delimited files
#[derive(Parser, Debug)]
#[command(name = "xano-export")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API authentication token
    #[arg(long, env = "XANO_AUTH_TOKEN", hide_env_values = true)]
    auth_token: String,

    /// Workspace to export
    #[arg(long, env = "XANO_WORKSPACE_ID", default_value = "1")]
    workspace_id: String,

    /// Base URL of the metadata API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Value sent in the x-data-source header
    #[arg(long, default_value = DEFAULT_DATA_SOURCE)]
    data_source: String,

    /// Directory for exported files (created if absent)
    #[arg(long, default_value = "csv_exports")]
    csv_dir: PathBuf,

    /// Items requested per page
    #[arg(long, default_value_t = 100)]
    per_page: u32,

    /// Stop each page sequence after this many pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Field delimiter (a single ASCII character)
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Number of tables exported concurrently
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Write per-table summaries as JSON to this file
    #[arg(long)]
    summary_file: Option<PathBuf>,

    /// List tables instead of exporting
    #[arg(long, conflicts_with = "export_table")]
    list_tables: bool,

    /// Export only the table with this ID
    #[arg(long, value_name = "TABLE_ID")]
    export_table: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character: {:?}", s)),
        },
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut client_config = ClientConfig::new(cli.auth_token, cli.workspace_id)
        .with_base_url(cli.base_url)
        .with_data_source(cli.data_source)
        .with_per_page(cli.per_page);
    if let Some(max_pages) = cli.max_pages {
        client_config = client_config.with_max_pages(max_pages);
    }
    if let Some(secs) = cli.timeout {
        client_config = client_config.with_request_timeout(Duration::from_secs(secs));
    }

    let export_config = ExportConfig::new(&cli.csv_dir)
        .with_delimiter(cli.delimiter)
        .with_jobs(cli.jobs);

    let fetcher = HttpFetcher::new(&client_config).context("Failed to build HTTP client")?;
    let retriever =
        BulkRetriever::new(fetcher, &client_config).context("Invalid API base URL")?;
    let coordinator = ExportCoordinator::new(retriever, TabularExporter::new(export_config));

    if cli.list_tables {
        let tables = coordinator.list_tables().context("Failed to list tables")?;
        println!("Found {} tables:", tables.len());
        for table in &tables {
            println!("{}: {}", table.id, table.name);
        }
        return Ok(());
    }

    std::fs::create_dir_all(&cli.csv_dir)
        .with_context(|| format!("Failed to create export directory: {}", cli.csv_dir.display()))?;

    let summaries: Vec<ExportSummary> = match cli.export_table {
        Some(table_id) => {
            let (_, outcome) = coordinator
                .export_table_by_id(&table_id)
                .with_context(|| format!("Failed to export table {}", table_id))?;
            outcome.summary().cloned().into_iter().collect()
        }
        None => {
            let report = coordinator.run().context("Export failed")?;
            info!(
                tables = report.table_count(),
                exported = report.summaries().len(),
                skipped = report.skipped().len(),
                "Export completed successfully to {}",
                cli.csv_dir.display()
            );
            report.summaries().into_iter().cloned().collect()
        }
    };

    if let Some(path) = cli.summary_file {
        write_summaries(&path, &summaries)
            .with_context(|| format!("Failed to write summaries: {}", path.display()))?;
    }

    Ok(())
}

fn write_summaries(path: &Path, summaries: &[ExportSummary]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, summaries)?;
    Ok(())
}
