//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the decorator pipeline around the hop engine
//! - Mount it on every path of an Axum router
//! - Wire up tower-http layers (inbound deadline, HTTP trace spans)
//! - Serve until the shutdown signal, then drain
//!
//! Each request runs on its own task. When the caller disconnects or the
//! inbound deadline fires, only the response is abandoned; the forward and
//! its access log line still complete.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::hop::{HopEngine, HopStats};
use crate::http::middleware::{access_log, compose, handler_fn, BoxedHandler};
use crate::http::request::{request_identity, RequestId, RequestIdExt};
use crate::lifecycle::ShutdownSignal;

/// HTTP server for one relay instance.
pub struct HopServer {
    router: Router,
    config: RelayConfig,
    stats: Arc<HopStats>,
}

impl HopServer {
    /// Create a new server with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        let engine = HopEngine::new(&config.hops);
        let stats = engine.stats();

        let pipeline = compose(hop_handler(engine), [request_identity(), access_log()]);
        let router = Self::build_router(&config, pipeline);

        Self {
            router,
            config,
            stats,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, pipeline: BoxedHandler) -> Router {
        let mut router = Router::new().fallback(dispatch).with_state(pipeline);

        if config.listener.request_timeout_secs > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )));
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            hosts = ?self.config.hops.hosts,
            work_load_ms = self.config.hops.work_load_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Hop counters for this instance.
    pub fn stats(&self) -> Arc<HopStats> {
        self.stats.clone()
    }
}

async fn dispatch(State(pipeline): State<BoxedHandler>, request: Request<Body>) -> Response {
    match tokio::spawn(pipeline(request)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Request task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "request task failed").into_response()
        }
    }
}

/// Terminal handler: runs the hop engine and renders its result.
fn hop_handler(engine: HopEngine) -> BoxedHandler {
    handler_fn(move |req: Request<Body>| {
        let engine = engine.clone();
        async move {
            let request_id = req
                .request_id()
                .cloned()
                .unwrap_or_else(|| RequestId::from_headers_or_generate(req.headers()));
            let uri = req.uri().clone();

            match engine.handle(&uri, &request_id).await {
                Ok(body) => (
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    body,
                )
                    .into_response(),
                Err(e) => e.into_response(),
            }
        }
    })
}
