//! In-memory upstream for tests of this crate and its dependents.
//!
//! Enabled for this crate's own tests and behind the `testing` feature.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::fetch::{
    Fetcher,
    FetcherConfig,
    HttpRequest,
    HttpResponse,
    RateLimiter,
    RetryPolicy,
    Transport,
    TransportFuture,
};

struct Route {
    operation: &'static str,
    needle: Option<String>,
    response: HttpResponse,
}

/// Answers requests from a fixed routing table and records what was sent.
///
/// Routes match on the operation label and, optionally, a substring of the
/// URL, query values or JSON body. The first matching route wins; unmatched
/// requests get a 404.
#[derive(Default)]
pub struct RouteTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn guard<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RouteTransport {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers every `operation` request with a 200 body.
    pub fn on(&self, operation: &'static str, body: impl Into<String>) {
        self.respond(operation, None, HttpResponse::new(200, body));
    }

    /// Answers `operation` requests that mention `needle` with a 200 body.
    pub fn on_matching(&self, operation: &'static str, needle: &str, body: impl Into<String>) {
        self.respond(operation, Some(needle), HttpResponse::new(200, body));
    }

    pub fn on_status(&self, operation: &'static str, needle: Option<&str>, status: u16) {
        self.respond(operation, needle, HttpResponse::new(status, ""));
    }

    pub fn respond(&self, operation: &'static str, needle: Option<&str>, response: HttpResponse) {
        guard(&self.routes).push(Route {
            operation,
            needle: needle.map(str::to_string),
            response,
        });
    }

    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        guard(&self.requests).clone()
    }

    #[must_use]
    pub fn requests_for(&self, operation: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.operation == operation)
            .collect()
    }

    #[must_use]
    pub fn count(&self, operation: &str) -> usize {
        guard(&self.requests)
            .iter()
            .filter(|request| request.operation == operation)
            .count()
    }
}

fn mentions(request: &HttpRequest, needle: &str) -> bool {
    request.url.contains(needle)
        || request.query.iter().any(|(_, value)| value.contains(needle))
        || request
            .body
            .as_ref()
            .is_some_and(|body| body.to_string().contains(needle))
}

impl Transport for RouteTransport {
    fn send<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a> {
        guard(&self.requests).push(request.clone());
        let response = guard(&self.routes)
            .iter()
            .find(|route| {
                route.operation == request.operation
                    && route
                        .needle
                        .as_deref()
                        .is_none_or(|needle| mentions(request, needle))
            })
            .map_or_else(|| HttpResponse::new(404, "no route"), |route| route.response.clone());
        Box::pin(async move { Ok(response) })
    }
}

/// Fetcher over `transport` with no pacing and a single attempt per request.
#[must_use]
pub fn fetcher(transport: Arc<dyn Transport>) -> Arc<Fetcher> {
    let retry = RetryPolicy::new(1, Duration::from_millis(1), Duration::from_millis(1))
        .with_jitter(Duration::ZERO);
    Arc::new(Fetcher::new(
        transport,
        Arc::new(RateLimiter::new(Duration::ZERO)),
        FetcherConfig::default().with_retry(retry),
    ))
}
