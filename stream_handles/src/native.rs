use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;

/// Status code returned by a native library primitive
///
/// Zero is success, everything else is a failure reported by the native side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeStatus(pub i32);

impl NativeStatus {
    pub const SUCCESS: Self = Self(0);
    pub const NOT_INITIALIZED: Self = Self(1);
    pub const ALLOC_FAILED: Self = Self(2);
    pub const INVALID_VALUE: Self = Self(3);
    pub const ARCH_MISMATCH: Self = Self(4);
    pub const MAPPING_ERROR: Self = Self(5);
    pub const EXECUTION_FAILED: Self = Self(6);
    pub const INTERNAL_ERROR: Self = Self(7);
    pub const MATRIX_TYPE_NOT_SUPPORTED: Self = Self(8);

    pub fn code(&self) -> i32 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }

    /// Symbolic name of the status, [`None`] for codes we do not know about
    pub fn name(&self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "SUCCESS",
            1 => "NOT_INITIALIZED",
            2 => "ALLOC_FAILED",
            3 => "INVALID_VALUE",
            4 => "ARCH_MISMATCH",
            5 => "MAPPING_ERROR",
            6 => "EXECUTION_FAILED",
            7 => "INTERNAL_ERROR",
            8 => "MATRIX_TYPE_NOT_SUPPORTED",
            _ => return None,
        })
    }

    /// Turn a raw status into a [`Result`]
    pub fn into_result(self) -> Result<(), NativeStatus> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for NativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "UNKNOWN({})", self.0),
        }
    }
}

impl From<i32> for NativeStatus {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// The primitives consumed from a native numeric library which needs a handle per stream
///
/// Implementors are the only place which talks to the native side. Everything else in this
/// crate only ever moves [`NativeLibrary::Handle`] around and hashes [`NativeLibrary::Stream`].
pub trait NativeLibrary: Send + Sync + 'static {
    /// Opaque identifier of an execution stream. Only ever used as a lookup key
    type Stream: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Opaque native handle
    type Handle: Send + Sync + 'static;

    /// Create a new native handle
    fn create(&self) -> Result<Self::Handle, NativeStatus>;

    /// Bind a handle to the stream all of its work will be submitted on
    fn set_stream(&self, handle: &mut Self::Handle, stream: Self::Stream)
        -> Result<(), NativeStatus>;

    /// Destroy a handle previously returned by [`NativeLibrary::create`]
    fn destroy(&self, handle: Self::Handle) -> Result<(), NativeStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        assert_eq!(NativeStatus::SUCCESS.to_string(), "SUCCESS");
        assert_eq!(NativeStatus::ALLOC_FAILED.to_string(), "ALLOC_FAILED");
        assert_eq!(NativeStatus(42).to_string(), "UNKNOWN(42)");
        assert_eq!(NativeStatus(42).name(), None);
    }

    #[test]
    fn status_into_result() {
        assert_eq!(NativeStatus::SUCCESS.into_result(), Ok(()));
        assert_eq!(
            NativeStatus::from(7).into_result(),
            Err(NativeStatus::INTERNAL_ERROR)
        );
    }
}
