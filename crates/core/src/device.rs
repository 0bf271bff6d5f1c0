//! Device record
//!
//! The JSON form of [`Device`] is the persisted form: attribute names are
//! camelCase (`serviceName`, `profileName`, ...) so records written by other
//! deployments of the registry decode unchanged.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::keys::KeyLayout;

/// Administrative state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdminState {
    /// Device accepts commands
    #[default]
    Unlocked,
    /// Device is administratively disabled
    Locked,
}

/// Operating state reported for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatingState {
    /// Device is reachable
    Up,
    /// Device is unreachable
    Down,
    /// No state reported yet
    #[default]
    Unknown,
}

/// Protocol properties keyed by protocol name
pub type ProtocolProperties = HashMap<String, HashMap<String, String>>;

/// A registered device
///
/// `id` and `name` are unique across the directory. `created` and `modified`
/// are milliseconds since Unix epoch and are owned by the store: `created` is
/// filled in on first insert when left at 0, `modified` is overwritten on
/// every write.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Caller-assigned unique id, immutable once stored
    pub id: String,
    /// Unique name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Administrative state
    #[serde(default)]
    pub admin_state: AdminState,
    /// Operating state
    #[serde(default)]
    pub operating_state: OperatingState,
    /// Owning device service
    pub service_name: String,
    /// Device profile describing the device's resources
    pub profile_name: String,
    /// Free-form labels (order-insignificant)
    #[serde(default)]
    pub labels: Vec<String>,
    /// Protocol-specific connection properties
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub protocols: ProtocolProperties,
    /// Creation time, ms since epoch (0 = unset)
    #[serde(default)]
    pub created: i64,
    /// Last modification time, ms since epoch
    #[serde(default)]
    pub modified: i64,
}

impl Device {
    /// Create a device with the fields every record needs
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        service_name: impl Into<String>,
        profile_name: impl Into<String>,
    ) -> Self {
        Device {
            id: id.into(),
            name: name.into(),
            service_name: service_name.into(),
            profile_name: profile_name.into(),
            ..Device::default()
        }
    }

    /// Builder-style label assignment
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Distinct labels in sorted order
    pub fn label_set(&self) -> BTreeSet<&str> {
        self.labels.iter().map(String::as_str).collect()
    }

    /// Reject records the indexes cannot hold
    ///
    /// An empty id or name would produce a stored key or name-index field
    /// that collides with the index keys themselves.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::invalid_input("device id must not be empty"));
        }
        if self.name.is_empty() {
            return Err(Error::invalid_input("device name must not be empty"));
        }
        Ok(())
    }

    /// [`Device::validate`], plus rejecting ids whose primary key under
    /// `layout` would land on an index key
    pub fn validate_for(&self, layout: &KeyLayout) -> Result<()> {
        self.validate()?;
        if layout.is_reserved_id(&self.id) {
            return Err(Error::invalid_input(format!(
                "device id {} collides with an index key",
                self.id
            )));
        }
        Ok(())
    }

    /// Serialize to the persisted JSON form
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            Error::contract_invalid("unable to JSON marshal device for persistence", e)
        })
    }

    /// Deserialize from the persisted JSON form
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::contract_invalid("unable to JSON unmarshal device", e))
    }
}
