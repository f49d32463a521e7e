//! Scripted page fetcher for tests.
//!
//! Responses are keyed by `path?query` of the requested URL, so a test
//! describes each page it expects the retriever to ask for. Unscripted
//! URLs answer 404.

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::error::{FetchError, StatusKind};

use super::{JsonObject, PageFetcher};

#[derive(Debug, Clone)]
enum Scripted {
    Body(Value),
    Status(u16, String),
}

/// In-memory fetcher answering from a script
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Scripted>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path_and_query` with a 200 and `body`
    pub fn respond(&self, path_and_query: &str, body: Value) -> &Self {
        self.script(path_and_query, Scripted::Body(body))
    }

    /// Answer `path_and_query` with a non-success status
    pub fn fail(&self, path_and_query: &str, status: u16, body: &str) -> &Self {
        self.script(path_and_query, Scripted::Status(status, body.to_string()))
    }

    /// Every `path?query` requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn script(&self, path_and_query: &str, response: Scripted) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path_and_query.to_string(), response);
        self
    }
}

impl PageFetcher for MockFetcher {
    fn fetch(&self, url: &Url) -> Result<JsonObject, FetchError> {
        let key = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.clone());

        let scripted = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Scripted::Status(404, "not scripted".to_string()));

        match scripted {
            Scripted::Body(Value::Object(map)) => Ok(map),
            Scripted::Body(other) => Err(FetchError::Decode {
                url: url.to_string(),
                reason: format!("expected a JSON object, got {}", other),
            }),
            Scripted::Status(code, body) => {
                let status =
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                    kind: StatusKind::from_status(status),
                    body,
                })
            }
        }
    }
}
