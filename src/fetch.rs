// src/fetch.rs
//! Bounded-rate page fetching. Each `HttpFetcher` instance caps its own
//! concurrency and enforces a minimum spacing between the requests it makes;
//! the caps are per instance, not global. `FetchPool` hands out independent
//! instances so fetches for different pages can start concurrently.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;

/// Seam for the pipeline and enricher; stubbed out in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Retrieve the raw body of `url`. Non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Hands out independent rate-limited clients. Limits bind each client on its
/// own; two clients from the same pool never wait on one another, so article
/// fetches for different posts interleave freely.
pub trait FetchPool: Send + Sync {
    fn client(&self) -> Arc<dyn Fetch>;
}

#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub max_concurrency: usize,
    pub min_interval: Duration,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            min_interval: Duration::from_secs(30),
        }
    }
}

/// Spacing gate: admits callers one at a time, at least `min_interval` apart.
#[derive(Debug)]
pub struct RequestGate {
    last_start: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RequestGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_start: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until this client is allowed to start another request.
    pub async fn admit(&self) {
        let mut last = self.last_start.lock().await;
        if let Some(prev) = *last {
            if !self.min_interval.is_zero() {
                tokio::time::sleep_until(prev + self.min_interval).await;
            }
        }
        *last = Some(Instant::now());
    }
}

pub struct HttpFetcher {
    client: reqwest::Client,
    permits: Semaphore,
    gate: RequestGate,
}

impl HttpFetcher {
    pub fn new(limits: FetchLimits) -> Self {
        Self::with_client(reqwest::Client::new(), limits)
    }

    /// Build around an existing `reqwest::Client` so instances can share a
    /// connection pool while keeping their own caps.
    pub fn with_client(client: reqwest::Client, limits: FetchLimits) -> Self {
        Self {
            client,
            permits: Semaphore::new(limits.max_concurrency.max(1)),
            gate: RequestGate::new(limits.min_interval),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .context("fetch semaphore closed")?;
        self.gate.admit().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;

        let body = response
            .bytes()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        tracing::debug!(bytes = body.len(), %url, "fetched page");
        Ok(body.to_vec())
    }
}

/// `FetchPool` over HTTP: one shared `reqwest::Client` underneath, a fresh
/// `HttpFetcher` with its own gate and permits per `client()` call.
pub struct HttpFetchPool {
    client: reqwest::Client,
    limits: FetchLimits,
}

impl HttpFetchPool {
    pub fn new(limits: FetchLimits) -> Self {
        Self {
            client: reqwest::Client::new(),
            limits,
        }
    }
}

impl FetchPool for HttpFetchPool {
    fn client(&self) -> Arc<dyn Fetch> {
        Arc::new(HttpFetcher::with_client(self.client.clone(), self.limits))
    }
}
