//! Persisted session state.

pub mod storage;

pub use storage::StoredSession;
