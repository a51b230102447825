//! Error handling for BuildCraft.
//! One error enum per subsystem, `thiserror` only.

pub mod api_error;
pub mod config_error;
pub mod session_error;
pub mod write_error;

pub use api_error::ApiError;
pub use config_error::ConfigError;
pub use session_error::SessionError;
pub use write_error::WriteError;

/// Top-level error aggregating every subsystem error.
#[derive(Debug, thiserror::Error)]
pub enum BuildcraftError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type BuildcraftResult<T> = Result<T, BuildcraftError>;
pub type ApiResult<T> = Result<T, ApiError>;
pub type WriteResult<T> = Result<T, WriteError>;
