//! Cached copy of one remotely sourced value plus its request lifecycle
//!
//! `AsyncResource<T>` is immutable: every transition returns a new value and
//! leaves the previous one untouched, so holders of an older snapshot keep a
//! consistent view.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one fetch, allocated by the root store in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Never fetched (or reset)
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// Last completed fetch succeeded
    Succeeded,
    /// Last completed fetch failed; `error` holds the message
    Failed,
}

impl ResourceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceStatus::Idle => "idle",
            ResourceStatus::Loading => "loading",
            ResourceStatus::Succeeded => "succeeded",
            ResourceStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side cached resource with load status and last error.
///
/// `error` is present if and only if `status` is [`ResourceStatus::Failed`].
/// Data survives refetches and failed refetches (stale-while-revalidate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsyncResource<T> {
    data: Option<T>,
    status: ResourceStatus,
    error: Option<String>,
    latest_request: Option<RequestId>,
}

impl<T> Default for AsyncResource<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> AsyncResource<T> {
    /// Initial state: no data, no error
    pub fn idle() -> Self {
        Self {
            data: None,
            status: ResourceStatus::Idle,
            error: None,
            latest_request: None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Most recently started fetch, if any since the last reset
    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest_request
    }

    pub fn is_idle(&self) -> bool {
        self.status == ResourceStatus::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.status == ResourceStatus::Loading
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == ResourceStatus::Succeeded
    }

    pub fn is_failed(&self) -> bool {
        self.status == ResourceStatus::Failed
    }

    /// Fetch completed successfully
    pub fn succeed(&self, request: RequestId, data: T) -> Self {
        Self {
            data: Some(data),
            status: ResourceStatus::Succeeded,
            error: None,
            latest_request: self.latest_request.or(Some(request)),
        }
    }

    /// Fetch failed and the slice substitutes a declared fallback value
    pub fn fail_with_fallback(&self, request: RequestId, message: impl Into<String>, fallback: T) -> Self {
        Self {
            data: Some(fallback),
            status: ResourceStatus::Failed,
            error: Some(message.into()),
            latest_request: self.latest_request.or(Some(request)),
        }
    }
}

impl<T: Clone> AsyncResource<T> {
    /// Fetch started: loading, error cleared, data kept
    pub fn begin(&self, request: RequestId) -> Self {
        Self {
            data: self.data.clone(),
            status: ResourceStatus::Loading,
            error: None,
            latest_request: Some(request),
        }
    }

    /// Fetch failed: last good data retained
    pub fn fail(&self, request: RequestId, message: impl Into<String>) -> Self {
        Self {
            data: self.data.clone(),
            status: ResourceStatus::Failed,
            error: Some(message.into()),
            latest_request: self.latest_request.or(Some(request)),
        }
    }

    /// Replace data through a local mutation, keeping status and error
    pub fn with_data(&self, data: T) -> Self {
        Self {
            data: Some(data),
            status: self.status,
            error: self.error.clone(),
            latest_request: self.latest_request,
        }
    }
}
