pub use super::context::SparseContext;
pub use super::error::SparseError;
pub use super::host::{HostHandle, HostLibrary, StreamId};
pub use super::library::SparseLibrary;
pub use super::matrix::{CsrMatrix, CsrMatrixMut, Operation};
pub use super::scalar::{Precision, SparseScalar};
pub use num_complex::{Complex32, Complex64};
pub use stream_handles::prelude::*;
