//! Retry with exponential backoff, jitter and a per-attempt timeout.
//!
//! Operations report failures through [`Classify`], which decides whether a
//! failure is worth another attempt. The loop itself is a plain iteration:
//! fatal failures return immediately, retryable ones sleep and try again until
//! the policy runs out of attempts.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    ConnectionFailed,
    ServerError,
    RateLimited,
    Unknown,
}

impl ErrorKind {
    /// Message safe to show to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "The request timed out. Please try again.",
            ErrorKind::ConnectionFailed => {
                "Unable to connect. Please check your connection and try again."
            }
            ErrorKind::ServerError => "The server encountered an error. Please try again later.",
            ErrorKind::RateLimited => "Too many requests. Please wait a moment and try again.",
            ErrorKind::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::ConnectionFailed => "CONNECTION_FAILED",
            ErrorKind::ServerError => "SERVER_ERROR",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: ErrorKind,
    pub retryable: bool,
    pub status: Option<u16>,
}

impl Classification {
    pub fn retryable(kind: ErrorKind) -> Self {
        Self {
            kind,
            retryable: true,
            status: None,
        }
    }

    pub fn fatal(kind: ErrorKind) -> Self {
        Self {
            kind,
            retryable: false,
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// 429 and 5xx are retryable; every other 4xx is fatal.
    pub fn from_status(status: u16) -> Self {
        let class = match status {
            429 => Self::retryable(ErrorKind::RateLimited),
            500..=599 => Self::retryable(ErrorKind::ServerError),
            400..=499 => Self::fatal(ErrorKind::ConnectionFailed),
            _ => Self::retryable(ErrorKind::Unknown),
        };
        class.with_status(status)
    }

    /// Status classification, upgraded to rate limiting when the provider's
    /// message says so (quota errors sometimes arrive as 403).
    pub fn from_status_and_message(status: u16, message: &str) -> Self {
        if mentions_rate_limit(message) {
            Self::retryable(ErrorKind::RateLimited).with_status(status)
        } else {
            Self::from_status(status)
        }
    }

    /// Transport-level reqwest failures, before any status was received.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::retryable(ErrorKind::Timeout)
        } else if err.is_connect() {
            Self::retryable(ErrorKind::ConnectionFailed)
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16())
        } else {
            Self::retryable(ErrorKind::Unknown)
        }
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("rate limit") || message.contains("ratelimit") || message.contains("quota")
}

/// Implemented by operation errors so the retry loop can tell transient
/// failures from fatal ones.
pub trait Classify {
    fn classify(&self) -> Classification;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    pub attempt_timeout: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
            attempt_timeout: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the attempt following `attempt` (1-based):
    /// `min(base * factor^(attempt-1) * (1 + jitter), max)`, jitter in `[0, 0.1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter {
            rand::rng().random_range(0.0..0.1)
        } else {
            0.0
        };
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent) * (1.0 + jitter);
        let capped = secs.min(self.max_delay.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            Duration::ZERO
        }
    }
}

/// Final, classified failure of a retried operation.
#[derive(Debug)]
pub struct RetryError<E> {
    pub kind: ErrorKind,
    pub retryable: bool,
    pub status: Option<u16>,
    pub attempts: u32,
    /// `None` when the last attempt timed out.
    pub source: Option<E>,
}

impl<E> RetryError<E> {
    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }

    pub fn classification(&self) -> Classification {
        Classification {
            kind: self.kind,
            retryable: self.retryable,
            status: self.status,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after {} attempt(s)", self.kind, self.attempts)?;
        if let Some(status) = self.status {
            write!(f, " (status {status})")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Run `op` under `policy`.
///
/// Each attempt is bounded by `policy.attempt_timeout`; a timed-out attempt is
/// dropped (cancelling the in-flight request) and counts as a retryable
/// `Timeout`. A warning is logged before every retry.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + fmt::Display,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        let (class, description, source) =
            match tokio::time::timeout(policy.attempt_timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => (err.classify(), err.to_string(), Some(err)),
                Err(_) => (
                    Classification::retryable(ErrorKind::Timeout),
                    format!("attempt timed out after {:?}", policy.attempt_timeout),
                    None,
                ),
            };

        if !class.retryable || attempt >= max_attempts {
            return Err(RetryError {
                kind: class.kind,
                retryable: class.retryable,
                status: class.status,
                attempts: attempt,
                source,
            });
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(
            operation,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %description,
            "attempt failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
