//! Client state with a partial, write-through persisted snapshot

pub mod app_store;
pub mod storage;

pub use app_store::{AppState, AppStore, PersistedState, Theme, STORE_NAME};
pub use storage::{FileStorage, MemoryStorage, Storage};
