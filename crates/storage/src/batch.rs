//! Atomic command batches
//!
//! A [`Batch`] is the ordered list of mutations one logical write produces.
//! Substrates apply it all-or-nothing (`MULTI` ... `EXEC`): readers observe
//! either none of its commands or all of them.

use std::fmt;

/// A single queued mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set a string value
    Set {
        /// Target key
        key: String,
        /// Value bytes
        value: Vec<u8>,
    },
    /// Delete a key of any type
    Del {
        /// Target key
        key: String,
    },
    /// Add or re-score a sorted-set member
    ZAdd {
        /// Sorted-set key
        key: String,
        /// Member score
        score: f64,
        /// Member
        member: String,
    },
    /// Remove a sorted-set member
    ZRem {
        /// Sorted-set key
        key: String,
        /// Member
        member: String,
    },
    /// Set a hash field
    HSet {
        /// Hash key
        key: String,
        /// Field name
        field: String,
        /// Field value
        value: String,
    },
    /// Delete a hash field
    HDel {
        /// Hash key
        key: String,
        /// Field name
        field: String,
    },
}

impl Command {
    /// The key this command mutates
    pub fn key(&self) -> &str {
        match self {
            Command::Set { key, .. }
            | Command::Del { key }
            | Command::ZAdd { key, .. }
            | Command::ZRem { key, .. }
            | Command::HSet { key, .. }
            | Command::HDel { key, .. } => key,
        }
    }

    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::ZAdd { .. } => "ZADD",
            Command::ZRem { .. } => "ZREM",
            Command::HSet { .. } => "HSET",
            Command::HDel { .. } => "HDEL",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Set { key, value } => write!(f, "SET {} <{} bytes>", key, value.len()),
            Command::Del { key } => write!(f, "DEL {}", key),
            Command::ZAdd { key, score, member } => write!(f, "ZADD {} {} {}", key, score, member),
            Command::ZRem { key, member } => write!(f, "ZREM {} {}", key, member),
            Command::HSet { key, field, value } => write!(f, "HSET {} {} {}", key, field, value),
            Command::HDel { key, field } => write!(f, "HDEL {} {}", key, field),
        }
    }
}

/// Ordered list of commands committed as one unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    commands: Vec<Command>,
}

impl Batch {
    /// Create an empty batch
    pub fn new() -> Self {
        Batch {
            commands: Vec::new(),
        }
    }

    /// Create a batch with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Batch {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Queue a SET
    pub fn set(&mut self, key: impl Into<String>, value: Vec<u8>) -> &mut Self {
        self.commands.push(Command::Set {
            key: key.into(),
            value,
        });
        self
    }

    /// Queue a DEL
    pub fn del(&mut self, key: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Del { key: key.into() });
        self
    }

    /// Queue a ZADD
    pub fn zadd(&mut self, key: impl Into<String>, score: f64, member: impl Into<String>) -> &mut Self {
        self.commands.push(Command::ZAdd {
            key: key.into(),
            score,
            member: member.into(),
        });
        self
    }

    /// Queue a ZREM
    pub fn zrem(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.commands.push(Command::ZRem {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    /// Queue an HSET
    pub fn hset(
        &mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.commands.push(Command::HSet {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Queue an HDEL
    pub fn hdel(&mut self, key: impl Into<String>, field: impl Into<String>) -> &mut Self {
        self.commands.push(Command::HDel {
            key: key.into(),
            field: field.into(),
        });
        self
    }

    /// Queued commands in commit order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Check if the batch is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
