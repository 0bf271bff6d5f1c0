//! Config file driven store construction

use std::sync::Arc;

use devicedir::{StoreConfig, CONFIG_FILE_NAME};
use tempfile::TempDir;

use crate::common::*;

#[test]
fn test_default_file_yields_default_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    StoreConfig::write_default_if_missing(&path).unwrap();

    let config = StoreConfig::from_file(&path).unwrap();
    assert_eq!(config.key_layout(), KeyLayout::default());
    assert!(config.redis.is_none());
}

#[test]
fn test_custom_collection_roots_every_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "collection = \"fleet\"\nseparator = \"/\"\n").unwrap();
    let config = StoreConfig::from_file(&path).unwrap();

    let substrate = Arc::new(MemorySubstrate::new());
    let store = DeviceStore::from_config(substrate.clone(), &config);
    store
        .create(Device::new("d1", "n1", "svc", "prof").with_labels(["floor1"]))
        .unwrap();

    assert_eq!(
        substrate.keys(),
        vec![
            "fleet",
            "fleet/d1",
            "fleet/label/floor1",
            "fleet/name",
            "fleet/profile/name/prof",
            "fleet/service/name/svc",
        ]
    );
    let page = store.devices_by_labels(0, UNLIMITED, &["floor1"]).unwrap();
    assert_eq!(ids(&page), vec!["d1"]);
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "collection = \"\"\n").unwrap();
    assert!(StoreConfig::from_file(&path).is_err());
}
