//! Termination policies for page sequences
//!
//! Table listings and table content end on different conditions: a
//! listing only stops when `items` is missing, content also stops on an
//! empty `items`. The two are kept apart on purpose.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{error, warn};

use crate::error::StatusKind;

/// Why a page sequence ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last page carried no continuation token
    LastPage,
    /// A page had no `items` key
    MissingItems,
    /// A page had an empty `items` sequence
    EmptyItems,
    /// The server answered with a non-success status
    RequestFailed {
        status: StatusCode,
        kind: StatusKind,
        message: String,
    },
    /// The configured page cap was reached
    PageLimit,
}

impl StopReason {
    /// True when the sequence ended because of a failed request
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::RequestFailed { .. })
    }
}

/// Decides when a page ends its sequence and how that is reported
pub trait PagePolicy {
    /// Inspect a page's `items` before they are taken
    ///
    /// `None` means the key is absent (or null).
    fn check_items(&self, items: Option<&[Value]>) -> Option<StopReason>;

    /// Log the end of a sequence
    fn report(&self, reason: &StopReason);
}

/// Table listing: stop only when `items` is absent
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingPolicy;

impl PagePolicy for ListingPolicy {
    fn check_items(&self, items: Option<&[Value]>) -> Option<StopReason> {
        match items {
            None => Some(StopReason::MissingItems),
            Some(_) => None,
        }
    }

    fn report(&self, reason: &StopReason) {
        match reason {
            StopReason::MissingItems => error!("No tables found or error in response"),
            StopReason::RequestFailed {
                status, message, ..
            } => error!(status = status.as_u16(), "Table listing failed: {}", message),
            _ => {}
        }
    }
}

/// Table content: stop when `items` is absent or empty, silently
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentPolicy;

impl PagePolicy for ContentPolicy {
    fn check_items(&self, items: Option<&[Value]>) -> Option<StopReason> {
        match items {
            None => Some(StopReason::MissingItems),
            Some([]) => Some(StopReason::EmptyItems),
            Some(_) => None,
        }
    }

    fn report(&self, reason: &StopReason) {
        if let StopReason::RequestFailed {
            status, message, ..
        } = reason
        {
            warn!(status = status.as_u16(), "Table content request failed: {}", message);
        }
    }
}
