//! Core types for the device directory
//!
//! This crate defines the foundational types shared by the substrate and the
//! store:
//! - Device: the persisted device record and its JSON form
//! - KeyLayout: composition of every primary and index key
//! - Clock: timestamp source for `created` / `modified`
//! - StoreConfig: `devicedir.toml` configuration
//! - Error: error kinds callers branch on

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod keys;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, RedisConfig, StoreConfig, CONFIG_FILE_NAME};
pub use device::{AdminState, Device, OperatingState, ProtocolProperties};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use keys::{KeyLayout, DEVICE_COLLECTION, KEY_SEPARATOR};
