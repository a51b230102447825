/// Item CRUD API errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("unauthorized: {detail}")]
    Unauthorized { detail: String },

    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("failed to decode response: {reason}")]
    Decode { reason: String },

    #[error("all {attempts} attempts failed: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl ApiError {
    /// Whether the same request may succeed if sent again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
