//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`tracing_layer`]: request/response tracing with `TraceLayer`.
//! - [`metrics`]: per-route request counters and latency histograms.

pub mod metrics;
pub mod tracing_layer;
