//! Substrate failures surface as DatabaseError and change nothing

use crate::common::*;

#[test]
fn test_failed_create_writes_nothing() {
    let t = TestStore::new();
    t.substrate.fail_next_exec("injected");

    let err = t
        .store
        .create(device("d1", "n1", "svc", "prof", &["a"]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DatabaseError);
    assert!(t.substrate.is_empty());
}

#[test]
fn test_failed_update_keeps_old_indexes() {
    let t = TestStore::new();
    t.store.create(device("d1", "n1", "svc-a", "prof", &["a"])).unwrap();
    let keys_before = t.substrate.keys();

    let mut d1 = t.store.device_by_id("d1").unwrap();
    d1.service_name = "svc-b".into();
    d1.labels = vec!["b".into()];
    t.substrate.fail_next_exec("injected");
    assert_eq!(t.store.update(d1).unwrap_err().kind(), ErrorKind::DatabaseError);

    assert_eq!(t.substrate.keys(), keys_before);
    assert_eq!(t.service_bucket("svc-a"), vec!["md|dv:d1"]);
    assert_eq!(t.label_bucket("a"), vec!["md|dv:d1"]);
    assert_eq!(t.store.device_by_id("d1").unwrap().service_name, "svc-a");
}

#[test]
fn test_failed_delete_keeps_device() {
    let t = TestStore::new();
    t.store.create(device("d1", "n1", "svc", "prof", &[])).unwrap();

    t.substrate.fail_next_exec("injected");
    assert_eq!(
        t.store.delete_by_id("d1").unwrap_err().kind(),
        ErrorKind::DatabaseError
    );
    assert!(t.store.exists_by_id("d1").unwrap());
    assert!(t.store.exists_by_name("n1").unwrap());
}

#[test]
fn test_unavailable_substrate() {
    let t = TestStore::new();
    t.substrate.set_unavailable(true);

    assert_eq!(t.store.exists_by_id("d1").unwrap_err().kind(), ErrorKind::DatabaseError);
    assert_eq!(
        t.store.devices_by_service_name(0, UNLIMITED, "svc").unwrap_err().kind(),
        ErrorKind::DatabaseError
    );
    assert_eq!(t.store.device_count().unwrap_err().kind(), ErrorKind::DatabaseError);

    t.substrate.set_unavailable(false);
    assert!(!t.store.exists_by_id("d1").unwrap());
}

#[test]
fn test_missing_primary_object_fails_page() {
    let t = TestStore::new();
    for id in ["d1", "d2", "d3"] {
        t.store.create(device(id, &format!("n-{}", id), "svc", "prof", &[])).unwrap();
    }
    let mut batch = devicedir::Batch::new();
    batch.del("md|dv:d2");
    t.substrate.exec(&batch).unwrap();

    let err = t.store.devices_by_service_name(0, 2, "svc").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DatabaseError);
    let err = t.store.all_devices(0, UNLIMITED).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DatabaseError);
}
