use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::retry::{is_retryable_status, parse_retry_after};
use super::{
    FetchError,
    HttpRequest,
    HttpResponse,
    RateLimiter,
    RetryPolicy,
    Transport,
    TransportError,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout and retry settings applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherConfig {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl FetcherConfig {
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Transient failure of a single attempt.
enum AttemptFailure {
    Status {
        status: u16,
        retry_after: Option<Duration>,
    },
    Timeout,
    Network(String),
}

impl AttemptFailure {
    const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Status { status, .. } => format!("HTTP {status}"),
            Self::Timeout => "timeout".to_string(),
            Self::Network(message) => message.clone(),
        }
    }
}

/// Shared HTTP front door for all source clients.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        config: FetcherConfig,
    ) -> Self {
        Self {
            transport,
            limiter,
            config,
        }
    }

    /// Sends `request`, retrying transient failures within the retry budget.
    ///
    /// # Errors
    /// Returns `FetchError::RateLimited` when the budget runs out on HTTP 429,
    /// `FetchError::Timeout` when it runs out on timeouts, `FetchError::Status`
    /// for non-retryable statuses, and `FetchError::Network` for persistent 5xx
    /// or transport failures.
    pub async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let request_id = Uuid::new_v4();
        let max_attempts = self.config.retry.max_attempts();
        let mut attempts = 0_u32;

        loop {
            self.limiter.acquire(request.source).await;
            attempts += 1;

            let outcome =
                tokio::time::timeout(self.config.timeout, self.transport.send(request)).await;
            let failure = match outcome {
                Ok(Ok(response)) if response.is_success() => {
                    debug!(
                        %request_id,
                        source = %request.source,
                        operation = request.operation,
                        attempts,
                        status = response.status,
                        "request completed"
                    );
                    return Ok(response);
                }
                Ok(Ok(response)) if is_retryable_status(response.status) => AttemptFailure::Status {
                    status: response.status,
                    retry_after: response
                        .retry_after
                        .as_deref()
                        .and_then(|value| parse_retry_after(value, Utc::now())),
                },
                Ok(Ok(response)) => {
                    debug!(
                        %request_id,
                        source = %request.source,
                        operation = request.operation,
                        status = response.status,
                        "request failed with non-retryable status"
                    );
                    return Err(FetchError::Status {
                        source: request.source,
                        status: response.status,
                        url: request.url.clone(),
                    });
                }
                Ok(Err(TransportError::Timeout)) | Err(_) => AttemptFailure::Timeout,
                Ok(Err(TransportError::Network(message))) => AttemptFailure::Network(message),
            };

            if attempts >= max_attempts {
                warn!(
                    %request_id,
                    source = %request.source,
                    operation = request.operation,
                    attempts,
                    failure = %failure.describe(),
                    "retry budget exhausted"
                );
                return Err(self.exhausted(request, failure, attempts));
            }

            let delay = self
                .config
                .retry
                .delay_for(attempts - 1, failure.retry_after());
            warn!(
                %request_id,
                source = %request.source,
                operation = request.operation,
                attempts,
                failure = %failure.describe(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "transient failure, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn exhausted(&self, request: &HttpRequest, failure: AttemptFailure, attempts: u32) -> FetchError {
        match failure {
            AttemptFailure::Status { status: 429, .. } => FetchError::RateLimited {
                source: request.source,
                attempts,
            },
            AttemptFailure::Status { status, .. } => FetchError::Network {
                source: request.source,
                message: format!("HTTP {status} after {attempts} attempts"),
            },
            AttemptFailure::Timeout => FetchError::Timeout {
                source: request.source,
                timeout: self.config.timeout,
                attempts,
            },
            AttemptFailure::Network(message) => FetchError::Network {
                source: request.source,
                message,
            },
        }
    }
}
