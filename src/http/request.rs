//! Request identity: the correlation token carried along a hop chain.
//!
//! # Responsibilities
//! - Reuse a short `Request-ID` supplied by the caller
//! - Otherwise mint a fresh 8-letter token
//! - Write the token back onto the request header for propagation
//! - Store it as a typed request extension for downstream decorators
//!
//! # Design Decisions
//! - The token lives in the request's own extensions, never in shared state
//! - Header lookup is case-insensitive (`Request-ID` on the wire)

use std::fmt;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
};

use crate::http::middleware::{BoxedHandler, Decorator};

/// Header carrying the correlation token.
pub const REQUEST_ID_HEADER: &str = "request-id";

/// Longest caller-supplied token that is reused as-is.
pub const MAX_REQUEST_ID_LEN: usize = 8;

const TOKEN_ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Correlation token for one logical request across its hops.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh token of [`MAX_REQUEST_ID_LEN`] letters.
    pub fn generate() -> Self {
        let token = (0..MAX_REQUEST_ID_LEN)
            .map(|_| TOKEN_ALPHABET[fastrand::usize(..TOKEN_ALPHABET.len())] as char)
            .collect();
        Self(token)
    }

    /// The caller's token, if present, non-empty and short enough.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
            .map(Self::new)
    }

    /// Reuse the caller's token or generate one.
    pub fn from_headers_or_generate(headers: &HeaderMap) -> Self {
        Self::from_headers(headers).unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extension accessor for requests that went through [`request_identity`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Decorator that assigns the request's [`RequestId`].
pub fn request_identity() -> Decorator {
    Arc::new(|next: BoxedHandler| -> BoxedHandler {
        Arc::new(move |mut req: Request<Body>| {
            let id = RequestId::from_headers_or_generate(req.headers());

            if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                req.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            req.extensions_mut().insert(id);

            next(req)
        })
    })
}
