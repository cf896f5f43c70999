//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower-http layers)
//!     → middleware/ (decorator pipeline)
//!         → request.rs (assign Request-ID)
//!         → middleware/access_log.rs (Before / Finished in)
//!         → hop engine
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdExt, REQUEST_ID_HEADER};
pub use server::HopServer;
