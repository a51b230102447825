/// BuildCraft crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "BUILDCRAFT_LOG";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV_VAR: &str = "BUILDCRAFT_API_URL";

/// Environment variable holding the bearer token for the API.
pub const API_TOKEN_ENV_VAR: &str = "BUILDCRAFT_API_TOKEN";

/// Environment variable overriding the debounce window in milliseconds.
pub const DEBOUNCE_ENV_VAR: &str = "BUILDCRAFT_DEBOUNCE_MS";

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";
