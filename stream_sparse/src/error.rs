use stream_handles::error::HandleError;
use stream_handles::native::NativeStatus;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SparseError {
    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error("{entry_point} failed: {status}")]
    Native {
        entry_point: String,
        status: NativeStatus,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SparseError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SparseError::InvalidArgument(message.into())
    }
}
