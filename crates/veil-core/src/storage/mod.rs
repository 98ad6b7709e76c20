//! Storage abstractions and backends.
//!
//! - **traits**: `Storage` (raw host primitives) and `PasswordPrompt`
//! - **fs_store**: directory-rooted vault with atomic writes
//! - **memory**: in-memory map, for embedding hosts and tests

pub mod fs_store;
pub mod memory;
pub mod traits;

pub use fs_store::FsStorage;
pub use memory::MemoryStorage;
pub use traits::{PasswordPrompt, PasswordRequest, PromptPurpose, Storage};
