//! Before/after access logging.

use std::sync::Arc;
use std::time::Instant;

use axum::{body::Body, http::Request, response::Response};
use futures_util::future::BoxFuture;

use crate::http::middleware::{BoxedHandler, Decorator};
use crate::http::request::RequestIdExt;
use crate::observability::metrics;

/// Placeholder logged when no request ID has been assigned.
const NO_REQUEST_ID: &str = "none";

/// Decorator that logs `[<id>] Before` and `[<id>] Finished in <elapsed>`
/// around the inner handler.
///
/// Elapsed time covers everything inside, including outbound forwards and the
/// simulated work-load delay.
pub fn access_log() -> Decorator {
    Arc::new(|next: BoxedHandler| -> BoxedHandler {
        Arc::new(move |req: Request<Body>| -> BoxFuture<'static, Response> {
            let next = next.clone();
            let rid = req
                .request_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| NO_REQUEST_ID.to_string());

            Box::pin(async move {
                tracing::info!(request_id = %rid, "[{}] Before", rid);

                let start = Instant::now();
                let response = next(req).await;
                let elapsed = start.elapsed();

                tracing::info!(
                    request_id = %rid,
                    status = response.status().as_u16(),
                    "[{}] Finished in {:?}",
                    rid,
                    elapsed
                );
                metrics::record_duration(elapsed);

                response
            })
        })
    })
}
