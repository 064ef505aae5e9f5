pub mod cache;
pub mod entry;
pub mod error;
pub mod native;
pub mod prelude;
pub mod traits;


pub use error::HandleError;

// Re-exports
pub use dashmap;
