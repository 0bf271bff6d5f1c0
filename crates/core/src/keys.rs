//! Key-space layout of the device directory
//!
//! The layout must match existing deployments byte for byte:
//!
//! ```text
//! <collection>:<id>                          primary object (string)
//! <collection>                               id membership (sorted set, score 0)
//! <collection>:name                          name uniqueness (hash name -> stored key)
//! <collection>:service:name:<serviceName>    service grouping (sorted set, score modified)
//! <collection>:profile:name:<profileName>    profile grouping (sorted set, score modified)
//! <collection>:label:<label>                 label grouping (sorted set, score modified)
//! ```

use serde::{Deserialize, Serialize};

/// Default device table literal
pub const DEVICE_COLLECTION: &str = "md|dv";

/// Default key separator
pub const KEY_SEPARATOR: &str = ":";

const NAME: &str = "name";
const LABEL: &str = "label";
const SERVICE: &str = "service";
const PROFILE: &str = "profile";

/// Composes every key the store touches
///
/// All collection literals live here so a layout change is a one-line edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLayout {
    collection: String,
    separator: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        KeyLayout::new(DEVICE_COLLECTION, KEY_SEPARATOR)
    }
}

impl KeyLayout {
    /// Layout rooted at `collection`, parts joined by `separator`
    pub fn new(collection: impl Into<String>, separator: impl Into<String>) -> Self {
        KeyLayout {
            collection: collection.into(),
            separator: separator.into(),
        }
    }

    /// The collection literal
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The separator
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Join parts with the separator
    pub fn create_key(&self, parts: &[&str]) -> String {
        parts.join(&self.separator)
    }

    /// Primary object key: `<collection>:<id>`
    pub fn stored_key(&self, id: &str) -> String {
        self.create_key(&[&self.collection, id])
    }

    /// Id membership index key: `<collection>`
    pub fn id_index(&self) -> &str {
        &self.collection
    }

    /// Name uniqueness index key: `<collection>:name`
    pub fn name_index(&self) -> String {
        self.create_key(&[&self.collection, NAME])
    }

    /// Service grouping key: `<collection>:service:name:<serviceName>`
    pub fn service_index(&self, service_name: &str) -> String {
        self.create_key(&[&self.collection, SERVICE, NAME, service_name])
    }

    /// Profile grouping key: `<collection>:profile:name:<profileName>`
    pub fn profile_index(&self, profile_name: &str) -> String {
        self.create_key(&[&self.collection, PROFILE, NAME, profile_name])
    }

    /// Label grouping key: `<collection>:label:<label>`
    pub fn label_index(&self, label: &str) -> String {
        self.create_key(&[&self.collection, LABEL, label])
    }

    /// True if the primary key for `id` would be one of the index keys
    ///
    /// Reserved: `name`, and anything starting with `label:`,
    /// `service:name:` or `profile:name:` (with this layout's separator).
    pub fn is_reserved_id(&self, id: &str) -> bool {
        id == NAME
            || id.starts_with(&self.create_key(&[LABEL, ""]))
            || id.starts_with(&self.create_key(&[SERVICE, NAME, ""]))
            || id.starts_with(&self.create_key(&[PROFILE, NAME, ""]))
    }
}
