//! Rate-limited HTTP fetching.
//!
//! Every outbound request in the crate goes through [`Fetcher`], which queues
//! behind one shared [`RateLimiter`], applies a per-attempt timeout, and retries
//! transient failures with capped exponential backoff. The wire itself sits
//! behind the [`Transport`] trait so tests can script responses.

pub mod fetcher;
pub mod http;
pub mod limiter;
pub mod retry;

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::de::DeserializeOwned;

pub use fetcher::{Fetcher, FetcherConfig};
pub use http::ReqwestTransport;
pub use limiter::RateLimiter;
pub use retry::RetryPolicy;

/// Upstream service a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Ncbi,
    Gnomad,
    Reactome,
}

impl Source {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ncbi => "ncbi",
            Self::Gnomad => "gnomad",
            Self::Reactome => "reactome",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One logical outbound request. Attempts are counted by the fetcher.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub source: Source,
    pub operation: &'static str,
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(source: Source, operation: &'static str, url: impl Into<String>) -> Self {
        Self {
            source,
            operation,
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(
        source: Source,
        operation: &'static str,
        url: impl Into<String>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            source,
            operation,
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// First value of a query parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    /// Returns the `serde_json` error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Failure below the HTTP status layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Network(String),
    Timeout,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Timeout => f.write_str("request timed out"),
        }
    }
}

impl Error for TransportError {}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;

/// Sends a single HTTP request. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn send<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a>;
}

/// Terminal outcome of a fetch after the retry budget is spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, DNS, or other transport failure.
    Network { source: Source, message: String },
    /// Non-retryable HTTP status.
    Status { source: Source, status: u16, url: String },
    Timeout { source: Source, timeout: Duration, attempts: u32 },
    RateLimited { source: Source, attempts: u32 },
}

impl FetchError {
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { source, message } => write!(f, "{source} network error: {message}"),
            Self::Status { source, status, url } => {
                write!(f, "{source} returned HTTP {status} for {url}")
            }
            Self::Timeout {
                source,
                timeout,
                attempts,
            } => write!(
                f,
                "{source} request timed out after {}ms ({attempts} attempts)",
                timeout.as_millis()
            ),
            Self::RateLimited { source, attempts } => {
                write!(f, "{source} rate limit still exceeded after {attempts} attempts")
            }
        }
    }
}

impl Error for FetchError {}
