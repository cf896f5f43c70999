//! Request decorator pipeline.
//!
//! A [`BoxedHandler`] turns a request into a response future. A [`Decorator`]
//! wraps one handler in another. [`compose`] stacks decorators around a
//! terminal handler:
//!
//! ```text
//! compose(hop, [request_identity(), access_log()])
//!
//!   request ─▶ request_identity ─▶ access_log ─▶ hop
//!   response ◀─────────────────────────────────────┘
//! ```
//!
//! The first decorator in the list is the outermost, so it sees the request
//! first and the response last.

pub mod access_log;

use std::future::Future;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response};
use futures_util::future::BoxFuture;

pub use access_log::access_log;

/// Type-erased request handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

/// Wraps a handler, returning a new one.
pub type Decorator = Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync>;

/// Erase an async function into a [`BoxedHandler`].
pub fn handler_fn<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req: Request<Body>| -> BoxFuture<'static, Response> { Box::pin(f(req)) })
}

/// Wrap `handler` in `decorators`, first decorator outermost.
///
/// Pure: nothing runs until the returned handler is called.
pub fn compose<I>(handler: BoxedHandler, decorators: I) -> BoxedHandler
where
    I: IntoIterator<Item = Decorator>,
    I::IntoIter: DoubleEndedIterator,
{
    decorators
        .into_iter()
        .rev()
        .fold(handler, |inner, decorate| decorate(inner))
}
