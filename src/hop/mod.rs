//! Hop forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! GET /?hops=N
//!     → count.rs (parse N, apply the 1000 ceiling)
//!     → N == 0: answer "Done"
//!     → N > 0: pool.rs (uniform random peer)
//!         → engine.rs (GET http://peer/?hops=N-1, Request-ID propagated)
//!         → relay the peer's body unchanged
//! ```

pub mod count;
pub mod engine;
pub mod pool;

pub use count::{HopRequest, DONE_BODY, HOP_CEILING, REJECTION_BODY};
pub use engine::{HopEngine, HopError, HopStats, HopStatsSnapshot};
pub use pool::HostPool;
