//! Index fan-out for device writes
//!
//! Each logical write appends its index mutations to a [`Batch`] in a fixed
//! order: id membership, name uniqueness, then the grouping buckets. The
//! primary object write is queued by the caller ahead of these.

use std::collections::BTreeSet;

use devicedir_core::{Device, KeyLayout};
use devicedir_storage::Batch;

/// Score of every member of the id membership index
pub(crate) const ID_INDEX_SCORE: f64 = 0.0;

/// Grouping buckets `device` belongs to: its service, its profile and each
/// distinct label
pub(crate) fn grouping_keys(layout: &KeyLayout, device: &Device) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    keys.insert(layout.service_index(&device.service_name));
    keys.insert(layout.profile_index(&device.profile_name));
    for label in device.label_set() {
        keys.insert(layout.label_index(label));
    }
    keys
}

/// Queue index entries for a newly stored device
pub(crate) fn queue_insert(batch: &mut Batch, layout: &KeyLayout, device: &Device, stored_key: &str) {
    batch.zadd(layout.id_index(), ID_INDEX_SCORE, stored_key);
    batch.hset(layout.name_index(), device.name.as_str(), stored_key);
    let score = device.modified as f64;
    for key in grouping_keys(layout, device) {
        batch.zadd(key, score, stored_key);
    }
}

/// Queue removal of every index entry `device` participates in
///
/// `device` must be the record as currently stored: its fields decide which
/// buckets are cleaned up.
pub(crate) fn queue_remove(batch: &mut Batch, layout: &KeyLayout, device: &Device, stored_key: &str) {
    batch.zrem(layout.id_index(), stored_key);
    batch.hdel(layout.name_index(), device.name.as_str());
    for key in grouping_keys(layout, device) {
        batch.zrem(key, stored_key);
    }
}

/// Queue the index changes that turn `old` into `new`
///
/// Stale buckets are left, current buckets are (re)scored with the new
/// `modified`, and the name entry moves if the device was renamed.
pub(crate) fn queue_update(
    batch: &mut Batch,
    layout: &KeyLayout,
    old: &Device,
    new: &Device,
    stored_key: &str,
) {
    if old.name != new.name {
        batch.hdel(layout.name_index(), old.name.as_str());
        batch.hset(layout.name_index(), new.name.as_str(), stored_key);
    }

    let old_keys = grouping_keys(layout, old);
    let new_keys = grouping_keys(layout, new);
    for stale in old_keys.difference(&new_keys) {
        batch.zrem(stale.as_str(), stored_key);
    }
    let score = new.modified as f64;
    for key in new_keys {
        batch.zadd(key, score, stored_key);
    }
}
