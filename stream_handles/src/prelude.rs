pub use super::cache::{HandleCache, HandleRef};
pub use super::entry::HandleEntry;
pub use super::error::{HandleError, HandleFault, InitStage};
pub use super::native::{NativeLibrary, NativeStatus};
pub use super::traits::*;
