//! Shared test utilities for the rs232 integration tests.
//!
//! Every registry built here runs on a [`MockBackend`] with its own small
//! device table, so no test touches a real serial device.

#![allow(dead_code)]

use rs232::device::{MockBackend, MockSettings};
use rs232::{DeviceTable, PortRegistry, PortSettings};

/// Device table used by the mock registries.
pub static MOCK_DEVICES: &[&str] = &["/dev/ttyMOCK0", "/dev/ttyMOCK1", "/dev/ttyMOCK2"];

/// A backend with every entry of [`MOCK_DEVICES`] present.
pub fn mock_backend() -> MockBackend {
    let backend = MockBackend::new();
    for name in MOCK_DEVICES {
        backend.add_device(*name);
    }
    backend
}

/// A registry over [`MOCK_DEVICES`] on the given backend.
///
/// Registries built from clones of one backend see the same devices, like
/// two processes on one machine.
pub fn registry_on(backend: &MockBackend) -> PortRegistry<MockBackend> {
    PortRegistry::with_table(backend.clone(), DeviceTable::new(MOCK_DEVICES))
}

/// A fresh registry with its own backend.
pub fn mock_registry() -> PortRegistry<MockBackend> {
    registry_on(&mock_backend())
}

/// A registry with port 0 already open at 9600 8N1.
pub fn opened_registry() -> PortRegistry<MockBackend> {
    let mut ports = mock_registry();
    ports.open(0, 9600, "8N1", false).expect("open mock port");
    ports.backend().clear_calls();
    ports
}

/// Settings a device had before the library touched it.
pub fn factory_settings() -> MockSettings {
    MockSettings(Some(PortSettings::parse(2400, "7E1", false).expect("valid settings")))
}
