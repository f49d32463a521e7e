//! Cursor-based pagination over workspace resources

mod policy;

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{FetchError, RetrieveError};
use crate::fetch::{JsonObject, PageFetcher};
use crate::model::{Row, TableId, TableRef};

pub use policy::{ContentPolicy, ListingPolicy, PagePolicy, StopReason};

/// Page requested first in every sequence
pub const FIRST_PAGE: &str = "1";

/// A paginated resource of the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// `workspace/{ws}/table`
    Tables,
    /// `workspace/{ws}/table/{id}/content`
    TableContent(TableId),
}

/// Walks paginated resources through a [`PageFetcher`]
#[derive(Debug)]
pub struct BulkRetriever<F> {
    fetcher: F,
    base_url: Url,
    workspace_id: String,
    per_page: u32,
    max_pages: Option<u32>,
}

impl<F: PageFetcher> BulkRetriever<F> {
    /// Create a retriever for the workspace described by `config`
    pub fn new(fetcher: F, config: &ClientConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| FetchError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            fetcher,
            base_url,
            workspace_id: config.workspace_id.clone(),
            per_page: config.per_page,
            max_pages: config.max_pages,
        })
    }

    /// Lazily walk the table listing from page one
    pub fn tables(&self) -> Paginator<'_, F, ListingPolicy, TableRef> {
        Paginator::new(self, Resource::Tables, ListingPolicy)
    }

    /// Lazily walk one table's rows from page one
    pub fn table_content(&self, table_id: &TableId) -> Paginator<'_, F, ContentPolicy, Row> {
        Paginator::new(
            self,
            Resource::TableContent(table_id.clone()),
            ContentPolicy,
        )
    }

    /// Collect the complete table listing
    pub fn fetch_tables(&self) -> Result<Vec<TableRef>, RetrieveError> {
        self.tables().collect()
    }

    /// Collect every row of a table
    pub fn fetch_table_content(&self, table_id: &TableId) -> Result<Vec<Row>, RetrieveError> {
        self.table_content(table_id).collect()
    }

    /// Build the URL of one page of `resource`
    pub fn resource_url(&self, resource: &Resource, page: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| FetchError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?;
            segments
                .pop_if_empty()
                .push("workspace")
                .push(&self.workspace_id)
                .push("table");
            if let Resource::TableContent(table_id) = resource {
                segments.push(table_id.as_str()).push("content");
            }
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", page);
        Ok(url)
    }
}

/// Lazy page sequence yielding decoded items
///
/// A page is only requested once the items of the previous one are used
/// up. The next page number is always the server's `nextPage`, verbatim.
pub struct Paginator<'a, F, P, T> {
    retriever: &'a BulkRetriever<F>,
    resource: Resource,
    policy: P,
    next_page: Option<String>,
    current_page: String,
    pages_fetched: u32,
    buffer: std::vec::IntoIter<Value>,
    stop: Option<StopReason>,
    _item: PhantomData<fn() -> T>,
}

impl<'a, F, P, T> Paginator<'a, F, P, T>
where
    F: PageFetcher,
    P: PagePolicy,
    T: DeserializeOwned,
{
    fn new(retriever: &'a BulkRetriever<F>, resource: Resource, policy: P) -> Self {
        Self {
            retriever,
            resource,
            policy,
            next_page: Some(FIRST_PAGE.to_string()),
            current_page: FIRST_PAGE.to_string(),
            pages_fetched: 0,
            buffer: Vec::new().into_iter(),
            stop: None,
            _item: PhantomData,
        }
    }

    /// Why the sequence ended, once it has
    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop.as_ref()
    }

    /// Number of pages successfully fetched
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    fn finish(&mut self, reason: StopReason) {
        self.policy.report(&reason);
        self.next_page = None;
        self.stop = Some(reason);
    }

    fn abort(&mut self) {
        self.next_page = None;
        self.buffer = Vec::new().into_iter();
    }

    /// Fetch one page, refilling the buffer or ending the sequence
    fn load_page(&mut self, page: String) -> Result<(), RetrieveError> {
        let url = self.retriever.resource_url(&self.resource, &page)?;
        self.current_page = page;

        let mut body = match self.retriever.fetcher.fetch(&url) {
            Ok(body) => body,
            Err(FetchError::Status {
                status, kind, body, ..
            }) => {
                let message = format!("{} - {} ({})", url, body, kind);
                self.finish(StopReason::RequestFailed {
                    status,
                    kind,
                    message,
                });
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        self.pages_fetched += 1;

        let items = take_items(&mut body, &self.current_page)?;
        if let Some(reason) = self.policy.check_items(items.as_deref()) {
            self.finish(reason);
            return Ok(());
        }
        let items = items.unwrap_or_default();
        let next = next_page_token(&body, &self.current_page)?;

        debug!(
            resource = ?self.resource,
            page = %self.current_page,
            items = items.len(),
            next_page = ?next,
            "Fetched page"
        );

        self.buffer = items.into_iter();
        match next {
            Some(token) => self.next_page = Some(token),
            None => self.finish(StopReason::LastPage),
        }
        Ok(())
    }
}

impl<'a, F, P, T> Iterator for Paginator<'a, F, P, T>
where
    F: PageFetcher,
    P: PagePolicy,
    T: DeserializeOwned,
{
    type Item = Result<T, RetrieveError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.buffer.next() {
                return Some(serde_json::from_value(value).map_err(|source| {
                    self.abort();
                    RetrieveError::Item {
                        page: self.current_page.clone(),
                        source,
                    }
                }));
            }

            let page = self.next_page.take()?;

            if let Some(max) = self.retriever.max_pages {
                if self.pages_fetched >= max {
                    warn!(resource = ?self.resource, max_pages = max, "Page limit reached");
                    self.stop = Some(StopReason::PageLimit);
                    return None;
                }
            }

            if let Err(err) = self.load_page(page) {
                self.abort();
                return Some(Err(err));
            }
        }
    }
}

/// Remove and return `items`; null counts as absent
fn take_items(body: &mut JsonObject, page: &str) -> Result<Option<Vec<Value>>, RetrieveError> {
    match body.remove("items") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(RetrieveError::MalformedPage {
            page: page.to_string(),
            reason: format!("`items` must be an array, got {}", other),
        }),
    }
}

/// Read the continuation token; null and false mean none
fn next_page_token(body: &JsonObject, page: &str) -> Result<Option<String>, RetrieveError> {
    match body.get("nextPage") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(RetrieveError::MalformedPage {
            page: page.to_string(),
            reason: format!("`nextPage` must be a page number, got {}", other),
        }),
    }
}
