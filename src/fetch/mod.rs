//! HTTP collaborators: the pluggable client stack, a retrying JSON fetch and
//! the weather API mapping built on top of it.

mod basic;
mod client;
pub mod auth;
pub mod extract;
pub mod weather;

pub use basic::BasicClient;
pub use client::HttpClient;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

const BODY_PREVIEW_CHARS: usize = 200;

/// How many times to try a request and how long to wait per attempt and
/// between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub timeout: Duration,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout: Duration::from_secs(10),
            backoff: Duration::from_millis(1500),
        }
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

async fn try_once<C: HttpClient + ?Sized>(
    client: &C,
    url: &Url,
    timeout: Duration,
) -> Result<serde_json::Value> {
    let resp = client
        .get(url, timeout)
        .await
        .with_context(|| format!("GET {url} failed"))?;
    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        warn!(
            event = "api_non_200",
            status = status.as_u16(),
            body = %preview(&body)
        );
        bail!("unexpected status {status}");
    }

    resp.json::<serde_json::Value>()
        .await
        .context("Response body is not JSON")
}

/// GETs `url` and decodes the body as JSON, retrying per `policy`.
///
/// Returns `None` once every attempt has failed; each failure is logged.
pub async fn fetch_json<C: HttpClient + ?Sized>(
    client: &C,
    url: &Url,
    policy: &RetryPolicy,
) -> Option<serde_json::Value> {
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        match try_once(client, url, policy.timeout).await {
            Ok(body) => {
                debug!(attempt, url = %url, "API response decoded");
                return Some(body);
            }
            Err(error) => {
                warn!(event = "api_exception", attempt, attempts, error = %format!("{error:#}"));
            }
        }
        if attempt < attempts {
            tokio::time::sleep(policy.backoff).await;
        }
    }
    None
}
