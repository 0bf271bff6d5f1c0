//! DeviceStore: secondary-indexed device directory
//!
//! ## Design
//!
//! DeviceStore is a stateless facade over a [`Substrate`]. It holds no
//! in-memory state beyond the substrate handle, the key layout and a clock,
//! so any number of instances may share one substrate.
//!
//! ## Indexes
//!
//! Every stored device participates in five structures:
//! - primary object: `<collection>:<id>` holding the JSON record
//! - id membership: sorted set `<collection>`, score 0
//! - name uniqueness: hash `<collection>:name`, name -> stored key
//! - service / profile groupings: sorted sets scored by `modified`
//! - label groupings: one sorted set per label, scored by `modified`
//!
//! Each create, update or delete submits exactly one atomic batch that
//! touches the primary object and every affected index.
//!
//! ## Known race
//!
//! The duplicate checks in [`DeviceStore::create`] are separate reads that
//! precede the write batch. Two concurrent creates with the same name can
//! both pass the checks and both commit; the later batch then owns the name
//! entry while both primary objects remain. Callers needing strict name
//! uniqueness under concurrency must serialize creates per name.

use std::sync::Arc;

use tracing::{debug, warn};

use devicedir_core::{Clock, Device, Error, KeyLayout, Result, StoreConfig, SystemClock};
use devicedir_storage::{Batch, StorageError, Substrate};

use crate::indexes;

/// Device directory over a key-value substrate
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use devicedir_registry::DeviceStore;
/// use devicedir_storage::MemorySubstrate;
/// use devicedir_core::Device;
///
/// let store = DeviceStore::new(Arc::new(MemorySubstrate::new()));
/// let device = Device::new("d1", "therm-1", "svc1", "prof1").with_labels(["floor1"]);
/// store.create(device)?;
///
/// let by_service = store.devices_by_service_name(0, -1, "svc1")?;
/// store.delete_by_id("d1")?;
/// ```
#[derive(Clone)]
pub struct DeviceStore {
    pub(crate) substrate: Arc<dyn Substrate>,
    pub(crate) layout: KeyLayout,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DeviceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceStore")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Map a substrate failure to `DatabaseError`
pub(crate) fn db_err(message: &'static str) -> impl FnOnce(StorageError) -> Error {
    move |e| Error::database(message, e)
}

impl DeviceStore {
    /// Create a store with the default key layout and the system clock
    pub fn new(substrate: Arc<dyn Substrate>) -> Self {
        Self::with_layout(substrate, KeyLayout::default())
    }

    /// Create a store with a custom key layout
    pub fn with_layout(substrate: Arc<dyn Substrate>, layout: KeyLayout) -> Self {
        DeviceStore {
            substrate,
            layout,
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a store using the layout from `config`
    pub fn from_config(substrate: Arc<dyn Substrate>, config: &StoreConfig) -> Self {
        Self::with_layout(substrate, config.key_layout())
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The key layout in use
    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// The underlying substrate
    pub fn substrate(&self) -> &Arc<dyn Substrate> {
        &self.substrate
    }

    fn commit(&self, batch: &Batch, message: &'static str) -> Result<()> {
        self.substrate.exec(batch).map_err(|e| {
            warn!(target: "devicedir::store", error = %e, commands = batch.len(), "{}", message);
            Error::database(message, e)
        })
    }

    // ========== Existence ==========

    /// Check whether a device with `id` is stored
    ///
    /// Reads the id membership index only.
    pub fn exists_by_id(&self, id: &str) -> Result<bool> {
        let stored_key = self.layout.stored_key(id);
        let score = self
            .substrate
            .zscore(self.layout.id_index(), &stored_key)
            .map_err(db_err("device existence check by id failed"))?;
        Ok(score.is_some())
    }

    /// Check whether a device named `name` is stored
    ///
    /// Reads the name uniqueness index only.
    pub fn exists_by_name(&self, name: &str) -> Result<bool> {
        self.substrate
            .hexists(&self.layout.name_index(), name)
            .map_err(db_err("device existence check by name failed"))
    }

    // ========== Create ==========

    /// Store a new device
    ///
    /// Assigns `created` when it is 0 and always assigns `modified`, then
    /// writes the record and all of its index entries in one batch.
    ///
    /// ## Returns
    /// The device as stored, with timestamps filled in.
    ///
    /// ## Errors
    /// - `InvalidInput` if id or name is empty, or the id would collide with
    ///   an index key (see [`KeyLayout::is_reserved_id`])
    /// - `DuplicateId` / `DuplicateName` if either is already taken
    /// - `ContractInvalid` if the record cannot be serialized
    /// - `DatabaseError` if a check or the batch fails
    pub fn create(&self, mut device: Device) -> Result<Device> {
        device.validate_for(&self.layout)?;

        if self.exists_by_id(&device.id)? {
            return Err(Error::DuplicateId { id: device.id });
        }
        if self.exists_by_name(&device.name)? {
            return Err(Error::DuplicateName { name: device.name });
        }

        let ts = self.clock.now_millis();
        if device.created == 0 {
            device.created = ts;
        }
        device.modified = ts;

        let payload = device.to_json()?;
        let stored_key = self.layout.stored_key(&device.id);

        let mut batch = Batch::with_capacity(5 + device.labels.len());
        batch.set(stored_key.as_str(), payload);
        indexes::queue_insert(&mut batch, &self.layout, &device, &stored_key);
        self.commit(&batch, "device creation failed")?;

        debug!(target: "devicedir::store", id = %device.id, name = %device.name, "Device created");
        Ok(device)
    }

    // ========== Lookup ==========

    /// Fetch a device by id
    ///
    /// ## Errors
    /// - `NotFound` if no device has this id
    /// - `ContractInvalid` if the stored record cannot be decoded
    /// - `DatabaseError` on substrate failure
    pub fn device_by_id(&self, id: &str) -> Result<Device> {
        let not_found = || Error::not_found(format!("device with id {} does not exist", id));
        // A reserved id names an index key, never a device
        if self.layout.is_reserved_id(id) {
            return Err(not_found());
        }
        let stored_key = self.layout.stored_key(id);
        self.device_by_stored_key(&stored_key)?.ok_or_else(not_found)
    }

    /// Fetch a device by name
    ///
    /// Resolves the stored key through the name index, then reads the
    /// primary object.
    pub fn device_by_name(&self, name: &str) -> Result<Device> {
        let stored_key = self
            .substrate
            .hget(&self.layout.name_index(), name)
            .map_err(db_err("device query by name failed"))?;
        let device = match stored_key {
            Some(key) => self.device_by_stored_key(&key)?,
            None => None,
        };
        device.ok_or_else(|| Error::not_found(format!("device with name {} does not exist", name)))
    }

    fn device_by_stored_key(&self, stored_key: &str) -> Result<Option<Device>> {
        let bytes = self
            .substrate
            .get(stored_key)
            .map_err(db_err("device query failed"))?;
        bytes.map(|b| Device::from_json(&b)).transpose()
    }

    // ========== Update ==========

    /// Replace a stored device, keeping every index consistent
    ///
    /// The stored record is read first and its grouping memberships are
    /// diffed against the new record, so stale service, profile and label
    /// buckets are cleaned in the same batch that writes the new state.
    /// `created` is preserved from the stored record; `modified` is
    /// reassigned.
    ///
    /// ## Errors
    /// - `NotFound` if no device has this id
    /// - `DuplicateName` if the device is renamed to a name already taken
    /// - `ContractInvalid` / `DatabaseError` as for `create`
    pub fn update(&self, mut device: Device) -> Result<Device> {
        device.validate_for(&self.layout)?;

        let old = self.device_by_id(&device.id)?;
        if old.name != device.name && self.exists_by_name(&device.name)? {
            return Err(Error::DuplicateName { name: device.name });
        }

        device.created = old.created;
        device.modified = self.clock.now_millis();

        let payload = device.to_json()?;
        let stored_key = self.layout.stored_key(&device.id);

        let mut batch = Batch::new();
        batch.set(stored_key.as_str(), payload);
        indexes::queue_update(&mut batch, &self.layout, &old, &device, &stored_key);
        self.commit(&batch, "device update failed")?;

        debug!(target: "devicedir::store", id = %device.id, name = %device.name, "Device updated");
        Ok(device)
    }

    // ========== Delete ==========

    /// Delete a device by id
    ///
    /// ## Errors
    /// - `NotFound` if no device has this id
    /// - `DatabaseError` if the batch fails
    pub fn delete_by_id(&self, id: &str) -> Result<()> {
        let device = self.device_by_id(id)?;
        self.delete_device(&device)
    }

    /// Delete a device by name
    pub fn delete_by_name(&self, name: &str) -> Result<()> {
        let device = self.device_by_name(name)?;
        self.delete_device(&device)
    }

    /// Remove a resolved device from the primary table and every index
    fn delete_device(&self, device: &Device) -> Result<()> {
        let stored_key = self.layout.stored_key(&device.id);

        let mut batch = Batch::with_capacity(5 + device.labels.len());
        batch.del(stored_key.as_str());
        indexes::queue_remove(&mut batch, &self.layout, device, &stored_key);
        self.commit(&batch, "device deletion failed")?;

        debug!(target: "devicedir::store", id = %device.id, name = %device.name, "Device deleted");
        Ok(())
    }
}
