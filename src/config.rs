//! Configuration handling for xano-export

use std::path::PathBuf;
use std::time::Duration;

/// Production metadata API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.gogym.ph/api:meta";

/// Default value of the `x-data-source` header
pub const DEFAULT_DATA_SOURCE: &str = "live";

/// Default page size for listing and content requests
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Default directory for exported files
pub const DEFAULT_EXPORT_DIR: &str = "csv_exports";

/// Connection settings for the remote workspace API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the metadata API
    pub base_url: String,
    /// Workspace whose tables are exported
    pub workspace_id: String,
    /// Bearer token sent with every request
    pub auth_token: String,
    /// Value of the `x-data-source` header
    pub data_source: String,
    /// Items requested per page
    pub per_page: u32,
    /// Upper bound on pages fetched per sequence (unbounded if None)
    pub max_pages: Option<u32>,
    /// Per-request timeout (transport default if None)
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            workspace_id: "1".to_string(),
            auth_token: String::new(),
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            per_page: DEFAULT_PER_PAGE,
            max_pages: None,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig for a token and workspace
    pub fn new(auth_token: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            workspace_id: workspace_id.into(),
            ..Default::default()
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the `x-data-source` header value
    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = data_source.into();
        self
    }

    /// Set page size
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Cap the number of pages fetched per sequence
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Set a per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Base URL without trailing slashes
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Settings for writing exported tables
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory receiving one file per table
    pub export_dir: PathBuf,
    /// Field delimiter
    pub delimiter: u8,
    /// Number of tables exported concurrently
    pub jobs: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            delimiter: b',',
            jobs: 1,
        }
    }
}

impl ExportConfig {
    /// Create a new ExportConfig writing into `export_dir`
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            ..Default::default()
        }
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the number of concurrent table exports
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// File extension matching the delimiter
    pub fn extension(&self) -> &'static str {
        match self.delimiter {
            b'\t' => "tsv",
            _ => "csv",
        }
    }
}
