/// Errors raised while constructing a cost session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cost session requires a Tokio runtime: {reason}")]
    NoRuntime { reason: String },
}
