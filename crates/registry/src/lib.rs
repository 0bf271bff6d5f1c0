//! Device directory layer
//!
//! [`DeviceStore`] keeps device records in a key-value substrate together
//! with the secondary indexes that answer lookups by id and name and
//! paginated queries by service, profile and label:
//!
//! - **Writes**: create, update and delete each commit one atomic batch
//! - **Lookups**: by id or name, plus existence checks
//! - **Group queries**: newest-first pages over service, profile, label
//!   and id indexes, with counts
//!
//! ## Design Principle: Stateless Facade
//!
//! The store holds only an `Arc<dyn Substrate>`, its key layout and a clock.
//! All state lives in the substrate, so instances are cheap to clone and
//! several may share one backend.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod device_store;
mod indexes;
mod pagination;
mod query;

pub use device_store::DeviceStore;
pub use pagination::UNLIMITED;

/// Open a store on the Redis server named by `config`
///
/// Fails with `InvalidInput` when the configuration has no `[redis]` section.
#[cfg(feature = "redis")]
pub fn open_redis(config: &devicedir_core::StoreConfig) -> devicedir_core::Result<DeviceStore> {
    use std::sync::Arc;

    use devicedir_core::Error;
    use devicedir_storage::RedisSubstrate;

    config
        .validate()
        .map_err(|e| Error::invalid_input(e.to_string()))?;
    let redis = config
        .redis
        .as_ref()
        .ok_or_else(|| Error::invalid_input("configuration has no [redis] section"))?;
    let substrate = RedisSubstrate::connect(&redis.url)
        .map_err(|e| Error::database("redis connection failed", e))?;
    Ok(DeviceStore::from_config(Arc::new(substrate), config))
}
