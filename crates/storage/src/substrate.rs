//! The key-value substrate interface
//!
//! The device directory needs a small slice of a Redis-compatible store:
//! scalar reads, sorted-set and hash reads, and atomic command batches.
//! All mutation goes through [`Substrate::exec`]; there is no single-key
//! write path, so every logical write is atomic by construction.

use crate::batch::Batch;
use crate::error::StorageResult;

/// Redis-compatible key-value substrate
///
/// Implementations must be safe to share across threads. Range methods use
/// Redis rank semantics: `start` and `stop` are inclusive, negative values
/// count from the end, and `-1` is the last member.
pub trait Substrate: Send + Sync {
    /// `GET key`
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// `MGET key [key ...]`
    ///
    /// Returns one slot per requested key, `None` for absent keys.
    fn mget(&self, keys: &[String]) -> StorageResult<Vec<Option<Vec<u8>>>>;

    /// `ZSCORE key member`
    fn zscore(&self, key: &str, member: &str) -> StorageResult<Option<f64>>;

    /// `ZCARD key`
    fn zcard(&self, key: &str) -> StorageResult<usize>;

    /// `ZRANGE key start stop` (ascending score)
    fn zrange(&self, key: &str, start: isize, stop: isize) -> StorageResult<Vec<String>>;

    /// `ZREVRANGE key start stop` (descending score)
    fn zrevrange(&self, key: &str, start: isize, stop: isize) -> StorageResult<Vec<String>>;

    /// `HGET key field`
    fn hget(&self, key: &str, field: &str) -> StorageResult<Option<String>>;

    /// `HEXISTS key field`
    fn hexists(&self, key: &str, field: &str) -> StorageResult<bool>;

    /// `MULTI` + queued commands + `EXEC`
    ///
    /// Applies every command or none of them.
    fn exec(&self, batch: &Batch) -> StorageResult<()>;
}
