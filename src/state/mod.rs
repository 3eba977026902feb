pub mod config;
pub mod journal;
pub mod session;

pub use config::Config;
pub use journal::{Journal, JournalEntry};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
