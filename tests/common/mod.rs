//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};

pub use devicedir::{
    Device, DeviceStore, ErrorKind, KeyLayout, ManualClock, MemorySubstrate, Substrate, UNLIMITED,
};

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness when `RUST_LOG` is set
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        if std::env::var_os("RUST_LOG").is_some() {
            let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        }
    });
}

// ============================================================================
// TestStore
// ============================================================================

/// A store over a fresh in-memory substrate with a stepping clock
pub struct TestStore {
    pub substrate: Arc<MemorySubstrate>,
    pub store: DeviceStore,
    pub clock: Arc<ManualClock>,
}

impl TestStore {
    pub fn new() -> Self {
        init_tracing();
        let substrate = Arc::new(MemorySubstrate::new());
        let clock = Arc::new(ManualClock::with_step(1_000, 1));
        let store = DeviceStore::new(substrate.clone()).with_clock(clock.clone());
        TestStore {
            substrate,
            store,
            clock,
        }
    }

    pub fn layout(&self) -> &KeyLayout {
        self.store.layout()
    }

    /// Members of a sorted-set index, highest score first
    pub fn index(&self, key: &str) -> Vec<String> {
        self.substrate.zrevrange(key, 0, -1).unwrap()
    }

    pub fn service_bucket(&self, service: &str) -> Vec<String> {
        self.index(&self.layout().service_index(service))
    }

    pub fn profile_bucket(&self, profile: &str) -> Vec<String> {
        self.index(&self.layout().profile_index(profile))
    }

    pub fn label_bucket(&self, label: &str) -> Vec<String> {
        self.index(&self.layout().label_index(label))
    }

    pub fn name_entry(&self, name: &str) -> Option<String> {
        self.substrate.hget(&self.layout().name_index(), name).unwrap()
    }
}

pub fn device(id: &str, name: &str, service: &str, profile: &str, labels: &[&str]) -> Device {
    Device::new(id, name, service, profile).with_labels(labels.iter().copied())
}

pub fn ids(devices: &[Device]) -> Vec<String> {
    devices.iter().map(|d| d.id.clone()).collect()
}
