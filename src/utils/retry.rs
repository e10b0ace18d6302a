use crate::utils::error::Result;
use reqwest::{Client, Response};
use std::time::Duration;

/// Controls how a transient request failure is retried. The collector
/// default matches the unattended-operation posture: retry forever with a
/// fixed delay. Tests substitute a zero-delay, bounded policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// `None` retries indefinitely.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts),
        }
    }

    fn exhausted(&self, attempts_made: u32) -> bool {
        self.max_attempts
            .is_some_and(|limit| attempts_made >= limit)
    }
}

/// GET the given URL until the server answers with a success status,
/// sleeping `policy.delay` between attempts.
pub async fn get_with_retry(client: &Client, url: &str, policy: RetryPolicy) -> Result<Response> {
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match client.get(url).send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                if policy.exhausted(attempts) {
                    return match response.error_for_status() {
                        Ok(response) => Ok(response),
                        Err(e) => Err(e.into()),
                    };
                }
                tracing::warn!(
                    status = %response.status(),
                    url,
                    "request failed, retrying"
                );
            }
            Err(e) => {
                if policy.exhausted(attempts) {
                    return Err(e.into());
                }
                tracing::warn!(error = %e, url, "request error, retrying");
            }
        }
        tokio::time::sleep(policy.delay).await;
    }
}
