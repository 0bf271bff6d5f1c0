//! Substrate error types

use thiserror::Error;

/// Result type alias for substrate operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Failures reported by a [`Substrate`](crate::Substrate)
#[derive(Debug, Error)]
pub enum StorageError {
    /// A command addressed a key holding a different value type
    #[error("WRONGTYPE operation against key '{key}': holds {actual}, expected {expected}")]
    WrongType {
        /// Offending key
        key: String,
        /// Type the command needs
        expected: &'static str,
        /// Type currently stored
        actual: &'static str,
    },

    /// The atomic batch was discarded; nothing was applied
    #[error("transaction aborted: {0}")]
    Aborted(String),

    /// The substrate could not be reached
    #[error("connection error: {0}")]
    Connection(String),

    /// Error reported by a Redis server or client
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
