//! Tests requiring an actual serial device.
//!
//! ```bash
//! export RS232_TEST_DEVICE=ttyUSB0     # or COM3 on Windows
//! export RS232_TEST_BAUD=9600          # optional, default: 9600
//! export RS232_TEST_LOOPBACK=1         # if TX and RX are wired together
//! cargo test --features hardware-tests -- --ignored
//! ```

use super::utils::{read_for, test_port};
use rs232::{FlushDirection, ModemLine, OpenError, PortRegistry};
use std::time::{Duration, Instant};

#[test]
#[ignore]
fn test_real_port_open_close() {
    let mut ports = PortRegistry::new();
    let Some((config, index)) = test_port(&ports) else { return };

    for _ in 0..3 {
        ports.open(index, config.baud_rate, "8N1", false).unwrap();
        ports.close(index);
    }
}

#[test]
#[ignore]
fn test_real_port_is_locked_against_second_registry() {
    let mut first = PortRegistry::new();
    let mut second = PortRegistry::new();
    let Some((config, index)) = test_port(&first) else { return };

    first.open(index, config.baud_rate, "8N1", false).unwrap();
    let err = second.open(index, config.baud_rate, "8N1", false).unwrap_err();
    assert!(matches!(err, OpenError::PortBusy { .. }));

    first.close(index);
    second.open(index, config.baud_rate, "8N1", false).unwrap();
}

#[test]
#[ignore]
fn test_real_port_poll_and_lines() {
    let mut ports = PortRegistry::new();
    let Some((config, index)) = test_port(&ports) else { return };
    ports.open(index, config.baud_rate, "8N1", false).unwrap();

    ports.flush(index, FlushDirection::Both).unwrap();
    let mut buffer = [0u8; 64];
    let started = Instant::now();
    ports.poll_read(index, &mut buffer).unwrap();
    assert!(started.elapsed() < Duration::from_millis(100), "poll_read blocked");

    ports.get_line_state(index, ModemLine::Cts).unwrap();
    ports.set_dtr(index, false).unwrap();
    ports.set_rts(index, false).unwrap();
}

#[test]
#[ignore]
fn test_real_port_loopback() {
    let mut ports = PortRegistry::new();
    let Some((config, index)) = test_port(&ports) else { return };
    if !config.loopback_enabled {
        println!("Skipping loopback test: RS232_TEST_LOOPBACK not set");
        return;
    }
    ports.open(index, config.baud_rate, "8N1", false).unwrap();
    ports.flush(index, FlushDirection::Both).unwrap();

    ports.send_string(index, "loopback").unwrap();

    let received = read_for(&mut ports, index, 8, Duration::from_secs(1));
    assert_eq!(received, b"loopback");
}
