//! # buildcraft-api
//!
//! Async HTTP implementation of [`ItemApi`](buildcraft_core::ItemApi): per-item
//! create/update/delete for materials, labor, permits, and other costs, plus
//! the subproject cost summary. Retries idempotent requests with exponential
//! backoff; creates are sent exactly once.

pub mod item_api;
pub mod transport;

pub use item_api::HttpItemApi;
pub use transport::{HttpClient, HttpClientConfig};
