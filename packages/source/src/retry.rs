//! Bounded HTTP retry for upstream requests.
//!
//! [`send_text`] sends a request up to [`RetryPolicy::max_attempts`]
//! times. Transport failures (timeouts, connection errors, body read
//! failures) and any status other than `200 OK` are retried after a fixed
//! delay. There is no delay after the last attempt.
//!
//! Only transport-level problems are retried here. Callers validate the
//! returned body themselves, and a body that fails validation is not
//! re-fetched: the same request would produce the same body.
//!
//! # Usage
//!
//! ```ignore
//! let body = retry::send_text(|| client.get(&url).query(&params), &policy).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Default number of attempts per request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How many times to try a request and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Fixed wait before each attempt after the first.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Sends the request built by `build_request` and returns the body of the
/// first `200 OK` response as text.
///
/// The closure is called once per attempt, since a
/// [`reqwest::RequestBuilder`] is consumed by `.send()`.
///
/// # Errors
///
/// Returns [`SourceError::RetriesExhausted`] carrying the last failure
/// when every attempt failed.
pub async fn send_text<F>(build_request: F, policy: &RetryPolicy) -> Result<String, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_failure = String::new();

    for attempt in 1..=attempts {
        match attempt_once(&build_request).await {
            Ok(body) => {
                if attempt > 1 {
                    log::info!("Request succeeded on attempt {attempt}/{attempts}");
                }
                return Ok(body);
            }
            Err(failure) => {
                log::warn!("Request failed (attempt {attempt}/{attempts}): {failure}");
                last_failure = failure;
            }
        }

        if attempt < attempts {
            log::debug!("Retrying in {:?}", policy.delay);
            tokio::time::sleep(policy.delay).await;
        }
    }

    log::error!("Request failed after {attempts} attempts: {last_failure}");
    Err(SourceError::RetriesExhausted {
        attempts,
        message: last_failure,
    })
}

/// One send + body read. Failures are rendered to a message for logging.
async fn attempt_once<F>(build_request: &F) -> Result<String, String>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = build_request().send().await.map_err(|e| describe(&e))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(format!("HTTP {status}"));
    }

    response.text().await.map_err(|e| describe(&e))
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout: {e}")
    } else if e.is_connect() {
        format!("connection error: {e}")
    } else {
        e.to_string()
    }
}
