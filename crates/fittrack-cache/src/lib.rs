// Client-side entity cache
// Per-key request lifecycle, in-flight de-duplication and an optional SQLite snapshot

pub mod error;
pub mod nested;
pub mod snapshot;
pub mod status;
pub mod store;

pub use error::{CacheError, Result};
pub use nested::NestedRequestStore;
pub use snapshot::SnapshotStore;
pub use status::RequestStatus;
pub use store::{EntrySnapshot, FetchHandle, RequestStore};
