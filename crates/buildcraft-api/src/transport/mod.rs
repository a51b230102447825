//! Transport layer: HTTP client with retry/backoff and endpoint paths.

pub mod endpoints;
pub mod http_client;

pub use http_client::{HttpClient, HttpClientConfig};
