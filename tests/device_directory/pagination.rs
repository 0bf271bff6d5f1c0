//! Page windows and label intersection

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::common::*;

/// `count` devices in one service, created in id order (last is newest)
fn seeded(count: usize) -> TestStore {
    let t = TestStore::new();
    for i in 0..count {
        t.store
            .create(device(&format!("d{:03}", i), &format!("n{:03}", i), "svc", "prof", &[]))
            .unwrap();
    }
    t
}

fn newest_first(count: usize) -> Vec<String> {
    (0..count).rev().map(|i| format!("d{:03}", i)).collect()
}

#[test]
fn test_pages_partition_the_group() {
    let t = seeded(7);
    let mut collected = Vec::new();
    let mut offset = 0;
    loop {
        let page = t.store.devices_by_service_name(offset, 3, "svc").unwrap();
        if page.is_empty() {
            break;
        }
        assert!(page.len() <= 3);
        offset += page.len();
        collected.extend(ids(&page));
    }
    assert_eq!(collected, newest_first(7));
}

#[test]
fn test_negative_limit_other_than_unlimited() {
    let t = seeded(2);
    let err = t.store.devices_by_profile_name(0, -2, "prof").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_label_intersection_matches_every_label() {
    let t = TestStore::new();
    t.store.create(device("d1", "n1", "s", "p", &["a", "b", "c"])).unwrap();
    t.store.create(device("d2", "n2", "s", "p", &["a", "c"])).unwrap();
    t.store.create(device("d3", "n3", "s", "p", &["b", "c"])).unwrap();
    t.store.create(device("d4", "n4", "s", "p", &["a", "b"])).unwrap();

    let found = t.store.devices_by_labels(0, UNLIMITED, &["a", "b"]).unwrap();
    assert_eq!(ids(&found), vec!["d4", "d1"]);

    let found = t.store.devices_by_labels(0, UNLIMITED, &["c", "b", "a"]).unwrap();
    assert_eq!(ids(&found), vec!["d1"]);

    let found = t.store.devices_by_labels(0, UNLIMITED, &["a", "missing"]).unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_label_intersection_paging() {
    let t = TestStore::new();
    for i in 0..6 {
        let labels: &[&str] = if i % 2 == 0 { &["x", "y"] } else { &["x"] };
        t.store
            .create(device(&format!("d{}", i), &format!("n{}", i), "s", "p", labels))
            .unwrap();
    }
    let page = t.store.devices_by_labels(1, 2, &["y", "x"]).unwrap();
    assert_eq!(ids(&page), vec!["d2", "d0"]);

    assert!(t.store.devices_by_labels(0, 0, &["x", "y"]).unwrap().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_page_is_window_of_full_listing(
        count in 0usize..20,
        offset in 0usize..25,
        limit in 1i64..25,
    ) {
        let t = seeded(count);
        let page = t.store.devices_by_service_name(offset, limit, "svc").unwrap();
        let expected: Vec<String> = newest_first(count)
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect();
        prop_assert_eq!(ids(&page), expected);
    }

    #[test]
    fn prop_label_query_is_set_intersection(
        label_sets in proptest::collection::vec(
            proptest::sample::subsequence(vec!["a", "b", "c", "d"], 0..=4),
            1..12,
        ),
        query in proptest::sample::subsequence(vec!["a", "b", "c", "d"], 1..=3),
    ) {
        let t = TestStore::new();
        for (i, labels) in label_sets.iter().enumerate() {
            t.store
                .create(device(&format!("d{:02}", i), &format!("n{:02}", i), "s", "p", labels))
                .unwrap();
        }

        let found: BTreeSet<String> = ids(&t.store.devices_by_labels(0, UNLIMITED, query.as_slice()).unwrap())
            .into_iter()
            .collect();
        let expected: BTreeSet<String> = label_sets
            .iter()
            .enumerate()
            .filter(|(_, labels)| query.iter().all(|q| labels.contains(q)))
            .map(|(i, _)| format!("d{:02}", i))
            .collect();
        prop_assert_eq!(found, expected);
    }
}
