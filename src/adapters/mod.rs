//! Adapters layer: Concrete implementations of ports.
//!
//! - `sqlite`: SQLite persistence gateway
//! - `session`: in-memory and file-backed session stores
//! - `sanitize`: PII filtering for logs

pub mod sanitize;
pub mod session;
pub mod sqlite;

pub use session::{FileSessionStore, MemorySessionStore};
pub use sqlite::{SqliteGateway, StorageError};
