//! Key-value substrate for the device directory
//!
//! This crate implements the substrate the store is layered on:
//! - Substrate: the Redis-compatible command surface the store needs
//! - Batch: ordered command list applied all-or-nothing
//! - MemorySubstrate: in-process implementation with Redis semantics
//! - RedisSubstrate: Redis server implementation (feature `redis`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod error;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_substrate;
pub mod sorted_set;
pub mod substrate;

pub use batch::{Batch, Command};
pub use error::{StorageError, StorageResult};
pub use memory::MemorySubstrate;
#[cfg(feature = "redis")]
pub use redis_substrate::RedisSubstrate;
pub use sorted_set::SortedSet;
pub use substrate::Substrate;
