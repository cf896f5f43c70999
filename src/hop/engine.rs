//! The request-hop engine.
//!
//! # Responsibilities
//! - Classify the inbound hop count (reject / terminate / forward)
//! - Pick the next host from the pool
//! - Forward with the decremented count and the caller's request ID
//! - Relay a successful downstream body verbatim; a downstream error fails this hop too
//! - Apply the simulated work-load delay
//!
//! # Design Decisions
//! - No retries and no fallback host: a failed forward fails this request only
//! - The server runs each request on its own task, so a forward outlives a departed caller
//! - Forward deadline is optional and unbounded by default

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::{HopConfig, WorkLoadMode};
use crate::hop::count::{HopRequest, DONE_BODY, REJECTION_BODY};
use crate::hop::pool::HostPool;
use crate::http::request::{RequestId, REQUEST_ID_HEADER};
use crate::observability::metrics;

/// Errors that end a single hop request.
#[derive(Debug, Error)]
pub enum HopError {
    /// No host to forward to.
    #[error("host pool is empty")]
    EmptyPool,

    /// The selected host does not form a valid URI.
    #[error("invalid forward target '{0}'")]
    InvalidTarget(String),

    /// The outbound request could not be built.
    #[error("failed to build forward request: {0}")]
    Request(#[from] axum::http::Error),

    /// Connecting to or exchanging with the next host failed.
    #[error("forward failed: {0}")]
    Connect(#[from] hyper_util::client::legacy::Error),

    /// The next hop answered with a non-success status.
    #[error("next hop answered {0}")]
    Upstream(StatusCode),

    /// The downstream body could not be read.
    #[error("failed to read forwarded body: {0}")]
    Body(#[from] axum::Error),

    /// The forward did not finish within the configured deadline.
    #[error("forward timed out after {0:?}")]
    Timeout(Duration),
}

impl HopError {
    pub fn status(&self) -> StatusCode {
        match self {
            HopError::EmptyPool => StatusCode::SERVICE_UNAVAILABLE,
            HopError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            HopError::InvalidTarget(_)
            | HopError::Request(_)
            | HopError::Connect(_)
            | HopError::Upstream(_)
            | HopError::Body(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for HopError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Per-instance hop counters.
#[derive(Debug, Default)]
pub struct HopStats {
    forwarded: AtomicU64,
    terminal: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`HopStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HopStatsSnapshot {
    pub forwarded: u64,
    pub terminal: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl HopStats {
    pub fn snapshot(&self) -> HopStatsSnapshot {
        HopStatsSnapshot {
            forwarded: self.forwarded.load(Ordering::Relaxed),
            terminal: self.terminal.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Validates hop counts and forwards requests along the chain.
#[derive(Clone)]
pub struct HopEngine {
    pool: HostPool,
    client: Client<HttpConnector, Body>,
    work_load: Duration,
    work_load_mode: WorkLoadMode,
    forward_timeout: Option<Duration>,
    stats: Arc<HopStats>,
}

impl HopEngine {
    pub fn new(config: &HopConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            pool: HostPool::new(config.hosts.clone()),
            client,
            work_load: Duration::from_millis(config.work_load_ms),
            work_load_mode: config.work_load_mode,
            forward_timeout: match config.forward_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            stats: Arc::new(HopStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<HopStats> {
        self.stats.clone()
    }

    /// Answer one hop request given its URI.
    pub async fn handle(&self, uri: &Uri, request_id: &RequestId) -> Result<Bytes, HopError> {
        match HopRequest::from_uri(uri) {
            HopRequest::Rejected => {
                tracing::warn!(request_id = %request_id, "Hop count above ceiling, rejecting");
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                metrics::record_outcome("rejected");
                Ok(Bytes::from_static(REJECTION_BODY.as_bytes()))
            }
            HopRequest::Terminal => {
                if self.work_load_mode == WorkLoadMode::Terminal {
                    self.simulate_work().await;
                }
                self.stats.terminal.fetch_add(1, Ordering::Relaxed);
                metrics::record_outcome("done");
                Ok(Bytes::from_static(DONE_BODY.as_bytes()))
            }
            HopRequest::Forward(remaining) => match self.forward_hop(remaining, request_id).await {
                Ok(body) => {
                    if self.work_load_mode == WorkLoadMode::EveryHop {
                        self.simulate_work().await;
                    }
                    self.stats.forwarded.fetch_add(1, Ordering::Relaxed);
                    metrics::record_outcome("forwarded");
                    Ok(body)
                }
                Err(e) => {
                    tracing::error!(request_id = %request_id, error = %e, "Hop forward failed");
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    metrics::record_outcome("failed");
                    Err(e)
                }
            },
        }
    }

    async fn forward_hop(&self, remaining: u32, request_id: &RequestId) -> Result<Bytes, HopError> {
        let host = self.pool.select().ok_or(HopError::EmptyPool)?;

        tracing::info!(
            request_id = %request_id,
            host = %host,
            remaining_hops = remaining,
            "Making request to {}, remaining hops after this request: {}",
            host,
            remaining
        );
        metrics::record_forward(host);

        let call = self.forward(host, remaining, request_id);
        match self.forward_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| HopError::Timeout(limit))?,
            None => call.await,
        }
    }

    async fn forward(&self, host: &str, hops: u32, request_id: &RequestId) -> Result<Bytes, HopError> {
        let uri: Uri = format!("http://{}/?hops={}", host, hops)
            .parse()
            .map_err(|_| HopError::InvalidTarget(host.to_string()))?;

        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        let request = builder
            .header(header::USER_AGENT, "hop-relay")
            .body(Body::empty())?;

        let response = self.client.request(request).await?;
        if !response.status().is_success() {
            return Err(HopError::Upstream(response.status()));
        }
        let body = axum::body::to_bytes(Body::new(response.into_body()), usize::MAX).await?;

        Ok(body)
    }

    async fn simulate_work(&self) {
        if !self.work_load.is_zero() {
            tokio::time::sleep(self.work_load).await;
        }
    }
}
