//! # buildcraft-observability
//!
//! Tracing subscriber setup, span macros, and structured events for the
//! write queue, cost store, and HTTP transport.

pub mod tracing_setup;

pub use tracing_setup::{events, init_from_config, init_tracing, init_tracing_with_filter};

// Span macros expand to `$crate::tracing::*`.
#[doc(hidden)]
pub use tracing;
