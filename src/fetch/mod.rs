//! Page fetching: one authenticated read per call

mod http;
mod mock;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::{Map, Value};
use url::Url;

use crate::config::ClientConfig;
use crate::error::FetchError;

pub use self::http::HttpFetcher;
pub use self::mock::MockFetcher;

/// Decoded top-level response body
pub type JsonObject = Map<String, Value>;

/// Header selecting the data source on the remote service
pub const DATA_SOURCE_HEADER: &str = "x-data-source";

/// Trait for reading a single page of a resource
pub trait PageFetcher: Send + Sync {
    /// Perform one read against a fully-formed resource URL
    fn fetch(&self, url: &Url) -> Result<JsonObject, FetchError>;
}

impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    fn fetch(&self, url: &Url) -> Result<JsonObject, FetchError> {
        (**self).fetch(url)
    }
}

impl<T: PageFetcher + ?Sized> PageFetcher for Box<T> {
    fn fetch(&self, url: &Url) -> Result<JsonObject, FetchError> {
        (**self).fetch(url)
    }
}

impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    fn fetch(&self, url: &Url) -> Result<JsonObject, FetchError> {
        (**self).fetch(url)
    }
}

/// Fixed header bundle sent with every request
#[derive(Clone)]
pub struct RequestHeaders {
    data_source: String,
    auth_token: String,
}

impl RequestHeaders {
    /// Build the bundle, rejecting a missing bearer credential
    pub fn new(
        auth_token: impl Into<String>,
        data_source: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let auth_token = auth_token.into();
        if auth_token.trim().is_empty() {
            return Err(FetchError::InvalidHeader(
                "auth token must not be empty".to_string(),
            ));
        }
        Ok(Self {
            data_source: data_source.into(),
            auth_token,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, FetchError> {
        Self::new(config.auth_token.clone(), config.data_source.clone())
    }

    /// Render as request headers
    pub fn to_header_map(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(DATA_SOURCE_HEADER),
            header_value(&self.data_source)?,
        );
        let mut bearer = header_value(&format!("Bearer {}", self.auth_token))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }
}

impl std::fmt::Debug for RequestHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHeaders")
            .field("data_source", &self.data_source)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

fn header_value(value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bundle() {
        let headers = RequestHeaders::new("secret", "live").unwrap();
        let map = headers.to_header_map().unwrap();
        assert_eq!(map.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(map.get(DATA_SOURCE_HEADER).unwrap(), "live");
        assert_eq!(map.get(AUTHORIZATION).unwrap(), "Bearer secret");
        assert!(map.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            RequestHeaders::new("  ", "live"),
            Err(FetchError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let headers = RequestHeaders::new("secret", "live").unwrap();
        let rendered = format!("{:?}", headers);
        assert!(!rendered.contains("secret"));
    }
}
