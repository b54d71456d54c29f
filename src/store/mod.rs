//! Persistence fallback layer — local record set used when the remote API
//! is unreachable.

pub mod json_file;
pub mod memory;
pub mod traits;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::FallbackStore;
