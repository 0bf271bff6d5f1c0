//! Index consistency: uniqueness, teardown, update moves

use crate::common::*;

#[test]
fn test_duplicate_id_rejected_before_any_write() {
    let t = TestStore::new();
    t.store.create(device("d1", "a", "svc1", "prof1", &["l"])).unwrap();
    let keys_before = t.substrate.keys();

    let err = t
        .store
        .create(device("d1", "b", "svc2", "prof2", &["m"]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateId);
    assert_eq!(t.substrate.keys(), keys_before);
    assert!(t.service_bucket("svc2").is_empty());
}

#[test]
fn test_delete_shrinks_each_bucket_by_one() {
    let t = TestStore::new();
    t.store.create(device("d1", "n1", "svc", "prof", &["a", "b"])).unwrap();
    t.store.create(device("d2", "n2", "svc", "prof", &["a", "b"])).unwrap();

    t.store.delete_by_id("d1").unwrap();

    assert_eq!(t.service_bucket("svc"), vec!["md|dv:d2"]);
    assert_eq!(t.profile_bucket("prof"), vec!["md|dv:d2"]);
    assert_eq!(t.label_bucket("a"), vec!["md|dv:d2"]);
    assert_eq!(t.label_bucket("b"), vec!["md|dv:d2"]);
    assert_eq!(t.name_entry("n1"), None);
    assert_eq!(t.store.device_count().unwrap(), 1);
}

#[test]
fn test_delete_last_device_leaves_empty_keyspace() {
    let t = TestStore::new();
    t.store
        .create(device("d1", "n1", "svc", "prof", &["a", "b", "c"]))
        .unwrap();
    t.store.delete_by_name("n1").unwrap();
    assert!(t.substrate.is_empty(), "leftover keys: {:?}", t.substrate.keys());
}

#[test]
fn test_delete_missing_device() {
    let t = TestStore::new();
    assert_eq!(t.store.delete_by_id("nope").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(t.store.delete_by_name("nope").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_update_moves_service_membership() {
    let t = TestStore::new();
    t.store.create(device("d1", "n1", "svc-a", "prof", &[])).unwrap();
    t.store.create(device("d2", "n2", "svc-a", "prof", &[])).unwrap();
    t.store.create(device("d3", "n3", "svc-b", "prof", &[])).unwrap();

    let mut d1 = t.store.device_by_id("d1").unwrap();
    d1.service_name = "svc-b".into();
    t.store.update(d1).unwrap();

    assert_eq!(t.store.device_count_by_service_name("svc-a").unwrap(), 1);
    assert_eq!(t.store.device_count_by_service_name("svc-b").unwrap(), 2);
    assert_eq!(t.service_bucket("svc-b"), vec!["md|dv:d1", "md|dv:d3"]);
}

#[test]
fn test_update_label_changes() {
    let t = TestStore::new();
    t.store.create(device("d1", "n1", "s", "p", &["old", "keep"])).unwrap();

    let mut d1 = t.store.device_by_id("d1").unwrap();
    d1.labels = vec!["keep".into(), "new".into()];
    t.store.update(d1).unwrap();

    assert!(t.label_bucket("old").is_empty());
    assert_eq!(t.label_bucket("keep"), vec!["md|dv:d1"]);
    assert_eq!(t.label_bucket("new"), vec!["md|dv:d1"]);
    let found = t.store.devices_by_labels(0, UNLIMITED, &["keep", "new"]).unwrap();
    assert_eq!(ids(&found), vec!["d1"]);
}

#[test]
fn test_update_rename_moves_name_entry() {
    let t = TestStore::new();
    t.store.create(device("d1", "before", "s", "p", &[])).unwrap();

    let mut d1 = t.store.device_by_id("d1").unwrap();
    d1.name = "after".into();
    t.store.update(d1).unwrap();

    assert_eq!(t.name_entry("before"), None);
    assert_eq!(t.name_entry("after").as_deref(), Some("md|dv:d1"));
    assert_eq!(
        t.store.device_by_name("before").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn test_index_key_ids_rejected_and_label_stays_usable() {
    let t = TestStore::new();
    t.store.create(device("d1", "n1", "svc", "prof", &["floor1"])).unwrap();

    for id in ["name", "label:floor1", "service:name:svc", "profile:name:prof"] {
        let err = t.store.create(device(id, "other", "svc", "prof", &[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "id {}", id);
    }

    let mut d1 = t.store.device_by_id("d1").unwrap();
    d1.id = "label:floor1".into();
    assert_eq!(t.store.update(d1).unwrap_err().kind(), ErrorKind::InvalidInput);

    t.store.create(device("d3", "n3", "svc", "prof", &["floor1"])).unwrap();
    assert_eq!(t.label_bucket("floor1"), vec!["md|dv:d3", "md|dv:d1"]);
    assert_eq!(t.name_entry("n1").as_deref(), Some("md|dv:d1"));
}
