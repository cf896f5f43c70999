//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! access_log decorator / hop engine
//!     → logging.rs (tracing events, request_id field on every line)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log stream
//!     → Prometheus scrape (when a metrics address is configured)
//! ```

pub mod logging;
pub mod metrics;
