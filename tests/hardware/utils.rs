//! Helpers for the hardware tests.

use rs232::PortRegistry;
use std::env;
use std::time::{Duration, Instant};

/// Test device settings from the environment.
pub struct TestPortConfig {
    pub device: String,
    pub baud_rate: u32,
    pub loopback_enabled: bool,
}

impl TestPortConfig {
    /// Read `RS232_TEST_DEVICE`, `RS232_TEST_BAUD` and `RS232_TEST_LOOPBACK`.
    pub fn from_env() -> Option<Self> {
        let device = env::var("RS232_TEST_DEVICE").ok()?;
        let baud_rate = env::var("RS232_TEST_BAUD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(9600);
        let loopback_enabled = env::var("RS232_TEST_LOOPBACK").ok().as_deref() == Some("1");

        Some(Self {
            device,
            baud_rate,
            loopback_enabled,
        })
    }

    /// Index of the test device in the registry's table.
    pub fn index_in(&self, ports: &PortRegistry) -> Option<usize> {
        let index = ports.find_port_index(&self.device);
        if index.is_none() {
            println!("Skipping hardware test: {} is not in the device table", self.device);
        }
        index
    }
}

/// The test device and its index, or `None` when no device is configured.
pub fn test_port(ports: &PortRegistry) -> Option<(TestPortConfig, usize)> {
    let Some(config) = TestPortConfig::from_env() else {
        println!("Skipping hardware test: RS232_TEST_DEVICE not set");
        return None;
    };
    let index = config.index_in(ports)?;
    Some((config, index))
}

/// Poll `index` until `expected` bytes have arrived or `timeout` passes.
pub fn read_for(ports: &mut PortRegistry, index: usize, expected: usize, timeout: Duration) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buffer = [0u8; 64];
    let deadline = Instant::now() + timeout;
    while received.len() < expected && Instant::now() < deadline {
        let count = ports.poll_read(index, &mut buffer).unwrap();
        received.extend_from_slice(&buffer[..count]);
        std::thread::sleep(Duration::from_millis(5));
    }
    received
}
