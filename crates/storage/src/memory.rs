//! MemorySubstrate: in-process Redis-compatible substrate
//!
//! This module implements the [`Substrate`] trait using:
//! - `BTreeMap<String, Entry>` for the key space
//! - `parking_lot::RwLock` for thread-safe access
//!
//! # Atomicity
//!
//! `exec` holds the write lock for the whole batch and type-checks every
//! command before applying any of them. A batch that would hit a
//! `WRONGTYPE` error is rejected untouched, so readers never observe a
//! partially applied batch.
//!
//! # Fault injection
//!
//! Tests can make the next `exec` abort ([`MemorySubstrate::fail_next_exec`])
//! or make every call fail as if the connection dropped
//! ([`MemorySubstrate::set_unavailable`]).

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::batch::{Batch, Command};
use crate::error::{StorageError, StorageResult};
use crate::sorted_set::SortedSet;
use crate::substrate::Substrate;

/// A value held under one key
#[derive(Debug, Clone)]
enum Entry {
    Str(Vec<u8>),
    ZSet(SortedSet),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Str,
    ZSet,
    Hash,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Kind::Str => "string",
            Kind::ZSet => "zset",
            Kind::Hash => "hash",
        }
    }
}

impl Entry {
    fn kind(&self) -> Kind {
        match self {
            Entry::Str(_) => Kind::Str,
            Entry::ZSet(_) => Kind::ZSet,
            Entry::Hash(_) => Kind::Hash,
        }
    }
}

/// Type and member count a key will have part-way through a batch
struct Projected<'a> {
    kind: Option<Kind>,
    /// Value the key held before the batch, while it still backs the key
    base: Option<&'a Entry>,
    len: usize,
    /// Members (or fields) touched by the batch: `true` if now present
    touched: HashMap<&'a str, bool>,
}

impl<'a> Projected<'a> {
    fn from_entry(entry: Option<&'a Entry>) -> Self {
        let len = match entry {
            Some(Entry::ZSet(set)) => set.len(),
            Some(Entry::Hash(hash)) => hash.len(),
            _ => 0,
        };
        Projected {
            kind: entry.map(Entry::kind),
            base: entry,
            len,
            touched: HashMap::new(),
        }
    }

    fn replace(&mut self, kind: Option<Kind>) {
        self.kind = kind;
        self.base = None;
        self.len = 0;
        self.touched.clear();
    }

    fn contains(&self, member: &str) -> bool {
        match self.touched.get(member) {
            Some(present) => *present,
            None => match self.base {
                Some(Entry::ZSet(set)) => set.score(member).is_some(),
                Some(Entry::Hash(hash)) => hash.contains_key(member),
                _ => false,
            },
        }
    }

    fn add(&mut self, kind: Kind, member: &'a str) {
        if !self.contains(member) {
            self.len += 1;
        }
        self.kind = Some(kind);
        self.touched.insert(member, true);
    }

    fn remove(&mut self, member: &'a str) {
        if self.kind.is_none() || !self.contains(member) {
            return;
        }
        self.len -= 1;
        self.touched.insert(member, false);
        // Removing the last member deletes the key
        if self.len == 0 {
            self.replace(None);
        }
    }
}

fn wrong_type(key: &str, expected: Kind, actual: Kind) -> StorageError {
    StorageError::WrongType {
        key: key.to_string(),
        expected: expected.as_str(),
        actual: actual.as_str(),
    }
}

/// In-process substrate with Redis semantics
#[derive(Debug, Default)]
pub struct MemorySubstrate {
    data: RwLock<BTreeMap<String, Entry>>,
    fail_next: Mutex<Option<String>>,
    unavailable: AtomicBool,
}

impl MemorySubstrate {
    /// Create an empty substrate
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the next `exec` call with `reason`
    pub fn fail_next_exec(&self, reason: impl Into<String>) {
        *self.fail_next.lock() = Some(reason.into());
    }

    /// Make every call fail with a connection error until cleared
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// All keys currently stored, in order
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if no keys are stored
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("substrate unavailable".into()));
        }
        Ok(())
    }

    /// Type-check a batch against the current key space
    ///
    /// Projects the type and size each key will have after earlier commands
    /// of the same batch, so `DEL k` followed by `HSET k ...` is accepted,
    /// and so is a `SET k` after a `ZREM` that emptied (and so deleted) `k`.
    fn validate(data: &BTreeMap<String, Entry>, batch: &Batch) -> StorageResult<()> {
        let mut pending: HashMap<&str, Projected<'_>> = HashMap::new();
        for cmd in batch {
            let key = cmd.key();
            let state = pending
                .entry(key)
                .or_insert_with(|| Projected::from_entry(data.get(key)));
            match cmd {
                Command::Set { .. } => state.replace(Some(Kind::Str)),
                Command::Del { .. } => state.replace(None),
                Command::ZAdd { member, .. } => {
                    Self::expect(key, state.kind, Kind::ZSet)?;
                    state.add(Kind::ZSet, member);
                }
                Command::ZRem { member, .. } => {
                    Self::expect(key, state.kind, Kind::ZSet)?;
                    state.remove(member);
                }
                Command::HSet { field, .. } => {
                    Self::expect(key, state.kind, Kind::Hash)?;
                    state.add(Kind::Hash, field);
                }
                Command::HDel { field, .. } => {
                    Self::expect(key, state.kind, Kind::Hash)?;
                    state.remove(field);
                }
            }
        }
        Ok(())
    }

    fn expect(key: &str, current: Option<Kind>, expected: Kind) -> StorageResult<()> {
        match current {
            Some(actual) if actual != expected => Err(wrong_type(key, expected, actual)),
            _ => Ok(()),
        }
    }

    fn apply(data: &mut BTreeMap<String, Entry>, cmd: &Command) {
        match cmd {
            Command::Set { key, value } => {
                data.insert(key.clone(), Entry::Str(value.clone()));
            }
            Command::Del { key } => {
                data.remove(key);
            }
            Command::ZAdd { key, score, member } => {
                if let Entry::ZSet(set) = data
                    .entry(key.clone())
                    .or_insert_with(|| Entry::ZSet(SortedSet::new()))
                {
                    set.insert(member, *score);
                }
            }
            Command::ZRem { key, member } => {
                let now_empty = match data.get_mut(key) {
                    Some(Entry::ZSet(set)) => {
                        set.remove(member);
                        set.is_empty()
                    }
                    _ => false,
                };
                // Empty collections do not exist in Redis
                if now_empty {
                    data.remove(key);
                }
            }
            Command::HSet { key, field, value } => {
                if let Entry::Hash(hash) = data
                    .entry(key.clone())
                    .or_insert_with(|| Entry::Hash(HashMap::new()))
                {
                    hash.insert(field.clone(), value.clone());
                }
            }
            Command::HDel { key, field } => {
                let now_empty = match data.get_mut(key) {
                    Some(Entry::Hash(hash)) => {
                        hash.remove(field);
                        hash.is_empty()
                    }
                    _ => false,
                };
                if now_empty {
                    data.remove(key);
                }
            }
        }
    }

    fn with_zset<T>(
        &self,
        key: &str,
        empty: T,
        f: impl FnOnce(&SortedSet) -> T,
    ) -> StorageResult<T> {
        self.check_available()?;
        let data = self.data.read();
        match data.get(key) {
            None => Ok(empty),
            Some(Entry::ZSet(set)) => Ok(f(set)),
            Some(other) => Err(wrong_type(key, Kind::ZSet, other.kind())),
        }
    }

    fn with_hash<T>(
        &self,
        key: &str,
        empty: T,
        f: impl FnOnce(&HashMap<String, String>) -> T,
    ) -> StorageResult<T> {
        self.check_available()?;
        let data = self.data.read();
        match data.get(key) {
            None => Ok(empty),
            Some(Entry::Hash(hash)) => Ok(f(hash)),
            Some(other) => Err(wrong_type(key, Kind::Hash, other.kind())),
        }
    }
}

impl Substrate for MemorySubstrate {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.check_available()?;
        let data = self.data.read();
        match data.get(key) {
            None => Ok(None),
            Some(Entry::Str(value)) => Ok(Some(value.clone())),
            Some(other) => Err(wrong_type(key, Kind::Str, other.kind())),
        }
    }

    fn mget(&self, keys: &[String]) -> StorageResult<Vec<Option<Vec<u8>>>> {
        self.check_available()?;
        let data = self.data.read();
        // MGET reports non-string keys as nil rather than failing
        Ok(keys
            .iter()
            .map(|key| match data.get(key) {
                Some(Entry::Str(value)) => Some(value.clone()),
                _ => None,
            })
            .collect())
    }

    fn zscore(&self, key: &str, member: &str) -> StorageResult<Option<f64>> {
        self.with_zset(key, None, |set| set.score(member))
    }

    fn zcard(&self, key: &str) -> StorageResult<usize> {
        self.with_zset(key, 0, SortedSet::len)
    }

    fn zrange(&self, key: &str, start: isize, stop: isize) -> StorageResult<Vec<String>> {
        self.with_zset(key, Vec::new(), |set| set.range(start, stop))
    }

    fn zrevrange(&self, key: &str, start: isize, stop: isize) -> StorageResult<Vec<String>> {
        self.with_zset(key, Vec::new(), |set| set.rev_range(start, stop))
    }

    fn hget(&self, key: &str, field: &str) -> StorageResult<Option<String>> {
        self.with_hash(key, None, |hash| hash.get(field).cloned())
    }

    fn hexists(&self, key: &str, field: &str) -> StorageResult<bool> {
        self.with_hash(key, false, |hash| hash.contains_key(field))
    }

    fn exec(&self, batch: &Batch) -> StorageResult<()> {
        self.check_available()?;
        if let Some(reason) = self.fail_next.lock().take() {
            return Err(StorageError::Aborted(reason));
        }

        // Hold the write lock across validation and application
        let mut data = self.data.write();
        Self::validate(&data, batch)?;
        for cmd in batch {
            Self::apply(&mut data, cmd);
        }

        debug!(target: "devicedir::substrate", commands = batch.len(), "Batch committed");
        Ok(())
    }
}
