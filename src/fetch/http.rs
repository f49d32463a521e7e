//! Blocking HTTP page fetcher

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{FetchError, StatusKind};

use super::{JsonObject, PageFetcher, RequestHeaders};

/// Stands in for an error body that could not be read
const UNREADABLE_BODY: &str = "<unreadable body>";

/// Page fetcher backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher carrying the header bundle derived from `config`
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let headers = RequestHeaders::from_config(config)?;
        Self::with_headers(&headers, config)
    }

    /// Create a fetcher from an explicit header bundle
    pub fn with_headers(headers: &RequestHeaders, config: &ClientConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().default_headers(headers.to_header_map()?);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<JsonObject, FetchError> {
        debug!(url = %url, "GET");

        let response = self.client.get(url.clone()).send()?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response.text().unwrap_or_else(|e| {
                debug!(url = %url, error = %e, "Failed to read error body");
                UNREADABLE_BODY.to_string()
            });
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
                kind: StatusKind::from_status(status),
                body,
            });
        }

        let body = response.text()?;
        let value: Value = serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match value {
            Value::Object(map) => Ok(map),
            other => Err(FetchError::Decode {
                url: url.to_string(),
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
