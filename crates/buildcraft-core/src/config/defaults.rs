// Single source of truth for all default values.

// --- Write queue ---
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

// --- Cost store ---
pub const DEFAULT_STALENESS_MS: u64 = 5_000;

// --- API ---
pub const DEFAULT_API_BASE_URL: &str = "https://api.buildcraftpro.com/api";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_MAX_RETRIES: u32 = 3;
pub const DEFAULT_API_INITIAL_BACKOFF_MS: u64 = 500;
pub const DEFAULT_API_MAX_BACKOFF_MS: u64 = 30_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
