pub mod context;
pub mod error;
pub mod host;
pub mod library;
pub mod matrix;
pub mod prelude;
pub mod scalar;

pub use error::SparseError;

// Re-exports
pub use num_complex;
pub use stream_handles;
