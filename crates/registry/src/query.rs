//! Paginated group queries
//!
//! Groups are sorted sets scored by `modified`, so a descending rank range
//! is a reverse-chronological page. The page's stored keys are fetched with
//! one `MGET` and decoded.
//!
//! A record that is missing or fails to decode fails the whole query with
//! `DatabaseError`. Either means index/object corruption; no partial page is
//! ever returned.

use std::collections::HashSet;

use tracing::warn;

use devicedir_core::{Device, Error, Result};

use crate::device_store::{db_err, DeviceStore};
use crate::pagination::RankRange;

impl DeviceStore {
    /// Devices owned by a service, most recently modified first
    ///
    /// `offset` is the zero-based starting rank; `limit` is the page size,
    /// or `-1` for every remaining device.
    pub fn devices_by_service_name(
        &self,
        offset: usize,
        limit: i64,
        service_name: &str,
    ) -> Result<Vec<Device>> {
        let key = self.layout.service_index(service_name);
        self.devices_by_rev_range(&key, offset, limit)
    }

    /// Devices using a profile, most recently modified first
    pub fn devices_by_profile_name(
        &self,
        offset: usize,
        limit: i64,
        profile_name: &str,
    ) -> Result<Vec<Device>> {
        let key = self.layout.profile_index(profile_name);
        self.devices_by_rev_range(&key, offset, limit)
    }

    /// Devices carrying every label in `labels`, most recently modified first
    ///
    /// With no labels this lists all devices, like [`DeviceStore::all_devices`].
    pub fn devices_by_labels<S: AsRef<str>>(
        &self,
        offset: usize,
        limit: i64,
        labels: &[S],
    ) -> Result<Vec<Device>> {
        let mut seen = HashSet::new();
        let labels: Vec<&str> = labels
            .iter()
            .map(AsRef::as_ref)
            .filter(|l| seen.insert(*l))
            .collect();

        match labels.as_slice() {
            [] => self.all_devices(offset, limit),
            [label] => {
                let key = self.layout.label_index(label);
                self.devices_by_rev_range(&key, offset, limit)
            }
            [first, rest @ ..] => {
                let Some(range) = RankRange::resolve(offset, limit)? else {
                    return Ok(Vec::new());
                };
                let keys = self.intersect_labels(first, rest)?;
                self.fetch_devices(&range.slice(keys))
            }
        }
    }

    /// All devices, paged over the id membership index
    ///
    /// Id index members share score 0, so the order is reverse
    /// lexicographic by stored key rather than by time.
    pub fn all_devices(&self, offset: usize, limit: i64) -> Result<Vec<Device>> {
        let key = self.layout.id_index().to_string();
        self.devices_by_rev_range(&key, offset, limit)
    }

    /// Number of stored devices
    pub fn device_count(&self) -> Result<usize> {
        self.substrate
            .zcard(self.layout.id_index())
            .map_err(db_err("device count failed"))
    }

    /// Number of devices owned by a service
    pub fn device_count_by_service_name(&self, service_name: &str) -> Result<usize> {
        self.substrate
            .zcard(&self.layout.service_index(service_name))
            .map_err(db_err("device count by service name failed"))
    }

    /// Number of devices using a profile
    pub fn device_count_by_profile_name(&self, profile_name: &str) -> Result<usize> {
        self.substrate
            .zcard(&self.layout.profile_index(profile_name))
            .map_err(db_err("device count by profile name failed"))
    }

    /// Page through one sorted set in descending score order
    fn devices_by_rev_range(&self, key: &str, offset: usize, limit: i64) -> Result<Vec<Device>> {
        let Some(range) = RankRange::resolve(offset, limit)? else {
            return Ok(Vec::new());
        };
        let (start, stop) = range.ranks();
        let stored_keys = self
            .substrate
            .zrevrange(key, start, stop)
            .map_err(db_err("device range query failed"))?;
        self.fetch_devices(&stored_keys)
    }

    /// Stored keys present in every label bucket
    ///
    /// Keeps the first bucket's descending order. A device carries the same
    /// score in all of its buckets, so that order is the intersection's
    /// reverse-chronological order.
    fn intersect_labels(&self, first: &str, rest: &[&str]) -> Result<Vec<String>> {
        let mut keys = self
            .substrate
            .zrevrange(&self.layout.label_index(first), 0, -1)
            .map_err(db_err("device query by labels failed"))?;

        for label in rest {
            if keys.is_empty() {
                break;
            }
            let members: HashSet<String> = self
                .substrate
                .zrange(&self.layout.label_index(label), 0, -1)
                .map_err(db_err("device query by labels failed"))?
                .into_iter()
                .collect();
            keys.retain(|k| members.contains(k));
        }
        Ok(keys)
    }

    /// Batch-fetch and decode the primary objects behind `stored_keys`
    fn fetch_devices(&self, stored_keys: &[String]) -> Result<Vec<Device>> {
        if stored_keys.is_empty() {
            return Ok(Vec::new());
        }
        let objects = self
            .substrate
            .mget(stored_keys)
            .map_err(db_err("device batch fetch failed"))?;

        let mut devices = Vec::with_capacity(objects.len());
        for (key, object) in stored_keys.iter().zip(objects) {
            let Some(bytes) = object else {
                warn!(target: "devicedir::store", stored_key = %key, "Index entry without primary object");
                return Err(Error::database(
                    "device format parsing failed from the database",
                    format!("no primary object at {}", key),
                ));
            };
            let device = Device::from_json(&bytes).map_err(|e| {
                Error::database("device format parsing failed from the database", e)
            })?;
            devices.push(device);
        }
        Ok(devices)
    }
}
