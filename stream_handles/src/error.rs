use crate::native::NativeStatus;
use thiserror::Error;

/// Which step of bringing up a native handle failed
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InitStage {
    /// Native handle creation
    Create,
    /// Binding the handle to its stream
    BindStream,
}

/// Recoverable errors surfaced to callers of the handle cache
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
pub enum HandleError {
    #[error("Failed to initialize native handle for stream {stream} ({stage:?}): {status}")]
    Initialization {
        stream: String,
        stage: InitStage,
        status: NativeStatus,
    },
}

impl HandleError {
    /// Native status which caused the error
    pub fn status(&self) -> NativeStatus {
        match self {
            HandleError::Initialization { status, .. } => *status,
        }
    }
}

/// Unrecoverable faults. These never travel through a [`Result`], they are rendered into the
/// message of a panic
#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
pub enum HandleFault {
    #[error("Failed to destroy native handle for stream {stream}: {status}")]
    ConsistencyFault { stream: String, status: NativeStatus },

    #[error("Native handle for stream {stream} used before it was initialized")]
    ContractViolation { stream: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialization_message() {
        let err = HandleError::Initialization {
            stream: "StreamId(3)".to_string(),
            stage: InitStage::BindStream,
            status: NativeStatus::INVALID_VALUE,
        };
        assert_eq!(err.status(), NativeStatus::INVALID_VALUE);
        assert_eq!(
            err.to_string(),
            "Failed to initialize native handle for stream StreamId(3) (BindStream): INVALID_VALUE"
        );
    }
}
