/// Session management module - Gateway

mod state;
mod storage;

pub use state::{RestorePolicy, SessionSnapshot, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
