//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the store layer produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line via the trace span
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
