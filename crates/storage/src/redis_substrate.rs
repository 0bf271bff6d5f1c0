//! RedisSubstrate: the substrate backed by a Redis-compatible server
//!
//! Batches are sent as an atomic pipeline, which the client wraps in
//! `MULTI` / `EXEC`. The server then queues every command and runs them
//! with no other client interleaved.
//!
//! Redis does not roll back a transaction when one queued command fails at
//! run time (e.g. `WRONGTYPE`): the commands before it stay applied. Callers
//! must not submit batches that can hit a type mismatch. The device store
//! rejects ids whose primary key would coincide with an index key, so its
//! batches only mistype when foreign data occupies the key space.

use parking_lot::Mutex;
use redis::{Client, Connection};
use tracing::debug;

use crate::batch::{Batch, Command};
use crate::error::{StorageError, StorageResult};
use crate::substrate::Substrate;

/// Substrate talking to a Redis server over one connection
///
/// The connection is serialized behind a mutex; run one `RedisSubstrate` per
/// worker when a single connection becomes the bottleneck.
pub struct RedisSubstrate {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for RedisSubstrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSubstrate").finish_non_exhaustive()
    }
}

impl RedisSubstrate {
    /// Connect to `url`, e.g. `redis://127.0.0.1:6379/0`
    pub fn connect(url: &str) -> StorageResult<Self> {
        let client = Client::open(url)?;
        let conn = client
            .get_connection()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        debug!(target: "devicedir::substrate", url, "Connected to redis");
        Ok(RedisSubstrate {
            conn: Mutex::new(conn),
        })
    }

    fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> StorageResult<T> {
        let mut conn = self.conn.lock();
        Ok(cmd.query(&mut *conn)?)
    }
}

impl Substrate for RedisSubstrate {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.query(redis::cmd("GET").arg(key))
    }

    fn mget(&self, keys: &[String]) -> StorageResult<Vec<Option<Vec<u8>>>> {
        // MGET with no keys is a syntax error
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.query(redis::cmd("MGET").arg(keys))
    }

    fn zscore(&self, key: &str, member: &str) -> StorageResult<Option<f64>> {
        self.query(redis::cmd("ZSCORE").arg(key).arg(member))
    }

    fn zcard(&self, key: &str) -> StorageResult<usize> {
        self.query(redis::cmd("ZCARD").arg(key))
    }

    fn zrange(&self, key: &str, start: isize, stop: isize) -> StorageResult<Vec<String>> {
        self.query(redis::cmd("ZRANGE").arg(key).arg(start).arg(stop))
    }

    fn zrevrange(&self, key: &str, start: isize, stop: isize) -> StorageResult<Vec<String>> {
        self.query(redis::cmd("ZREVRANGE").arg(key).arg(start).arg(stop))
    }

    fn hget(&self, key: &str, field: &str) -> StorageResult<Option<String>> {
        self.query(redis::cmd("HGET").arg(key).arg(field))
    }

    fn hexists(&self, key: &str, field: &str) -> StorageResult<bool> {
        self.query(redis::cmd("HEXISTS").arg(key).arg(field))
    }

    fn exec(&self, batch: &Batch) -> StorageResult<()> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for cmd in batch {
            match cmd {
                Command::Set { key, value } => pipe.cmd("SET").arg(key).arg(&value[..]).ignore(),
                Command::Del { key } => pipe.cmd("DEL").arg(key).ignore(),
                Command::ZAdd { key, score, member } => {
                    pipe.cmd("ZADD").arg(key).arg(*score).arg(member).ignore()
                }
                Command::ZRem { key, member } => pipe.cmd("ZREM").arg(key).arg(member).ignore(),
                Command::HSet { key, field, value } => {
                    pipe.cmd("HSET").arg(key).arg(field).arg(value).ignore()
                }
                Command::HDel { key, field } => pipe.cmd("HDEL").arg(key).arg(field).ignore(),
            };
        }

        let mut conn = self.conn.lock();
        pipe.query::<()>(&mut *conn)?;
        debug!(target: "devicedir::substrate", commands = batch.len(), "Batch committed");
        Ok(())
    }
}
