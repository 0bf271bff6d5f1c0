//! devicedir - Secondary-indexed device directory
//!
//! Stores device records in a Redis-style key-value substrate alongside the
//! indexes that make them queryable by id, name, service, profile and label.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use devicedir::{Device, DeviceStore, MemorySubstrate, UNLIMITED};
//!
//! let store = DeviceStore::new(Arc::new(MemorySubstrate::new()));
//! store.create(Device::new("d1", "therm-1", "svc1", "prof1").with_labels(["floor1"]))?;
//!
//! let page = store.devices_by_labels(0, UNLIMITED, &["floor1"])?;
//! ```
//!
//! # Architecture
//!
//! - `devicedir-core`: the device record, errors, key layout, config, clock
//! - `devicedir-storage`: the [`Substrate`] trait, atomic batches, and the
//!   in-memory and Redis backends
//! - `devicedir-registry`: [`DeviceStore`], the index maintenance and queries

pub use devicedir_core::{
    AdminState, Clock, ConfigError, Device, Error, ErrorKind, KeyLayout, ManualClock,
    OperatingState, ProtocolProperties, RedisConfig, Result, StoreConfig, SystemClock,
    CONFIG_FILE_NAME, DEVICE_COLLECTION, KEY_SEPARATOR,
};
pub use devicedir_registry::{DeviceStore, UNLIMITED};
#[cfg(feature = "redis")]
pub use devicedir_registry::open_redis;
#[cfg(feature = "redis")]
pub use devicedir_storage::RedisSubstrate;
pub use devicedir_storage::{Batch, Command, MemorySubstrate, StorageError, Substrate};
