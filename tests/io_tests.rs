//! Non-blocking I/O, modem line and flush tests against the mock backend.

mod common;

use common::{opened_registry, MOCK_DEVICES};
use rs232::device::{MockCall, MockFault};
use rs232::{FlushDirection, IoError, ModemLine, ModemStatus};

const DEVICE: &str = MOCK_DEVICES[0];

mod read_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_poll_read_without_data_returns_zero() {
        let mut ports = opened_registry();
        let mut buffer = [0u8; 32];

        let count = ports.poll_read(0, &mut buffer).unwrap();

        assert_eq!(count, 0);
        assert_eq!(ports.backend().calls(), vec![MockCall::Read]);
    }

    #[test]
    fn test_poll_read_returns_available_bytes() {
        let mut ports = opened_registry();
        ports.backend().enqueue_read(DEVICE, b"OK\r\n");
        let mut buffer = [0u8; 32];

        let count = ports.poll_read(0, &mut buffer).unwrap();
        assert_eq!(&buffer[..count], b"OK\r\n");

        // Drained: the next poll finds nothing.
        assert_eq!(ports.poll_read(0, &mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_poll_read_respects_buffer_size() {
        let mut ports = opened_registry();
        ports.backend().enqueue_read(DEVICE, b"0123456789");
        let mut buffer = [0u8; 4];

        assert_eq!(ports.poll_read(0, &mut buffer).unwrap(), 4);
        assert_eq!(&buffer, b"0123");
        assert_eq!(ports.backend().pending_rx(DEVICE), 6);
    }

    #[test]
    fn test_poll_read_native_error() {
        let mut ports = opened_registry();
        ports.backend().fail_next(MockFault::Read);
        let mut buffer = [0u8; 4];

        assert!(matches!(ports.poll_read(0, &mut buffer), Err(IoError::Native(_))));
        // The port stays usable.
        assert!(ports.is_open(0));
        assert_eq!(ports.poll_read(0, &mut buffer).unwrap(), 0);
    }
}

mod write_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_send_byte() {
        let mut ports = opened_registry();
        ports.send_byte(0, 0x55).unwrap();
        assert_eq!(ports.backend().written(DEVICE), vec![0x55]);
    }

    #[test]
    fn test_send_byte_would_block() {
        let mut ports = opened_registry();
        ports.backend().set_write_limit(DEVICE, Some(0));

        assert!(matches!(ports.send_byte(0, 0x55), Err(IoError::WouldBlock)));
        assert!(ports.backend().written(DEVICE).is_empty());
    }

    #[test]
    fn test_send_buffer_reports_partial_write() {
        // Arrange
        let mut ports = opened_registry();
        ports.backend().set_write_limit(DEVICE, Some(5));

        // Act
        let count = ports.send_buffer(0, b"Hello, World!").unwrap();

        // Assert: the short count is returned as is, without a retry
        assert_eq!(count, 5);
        assert_eq!(ports.backend().written(DEVICE), b"Hello");
        let writes = ports
            .backend()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, MockCall::Write(_)))
            .count();
        assert_eq!(writes, 1);
    }

    #[test]
    fn test_send_buffer_would_block() {
        let mut ports = opened_registry();
        ports.backend().set_write_limit(DEVICE, Some(0));
        assert!(matches!(ports.send_buffer(0, b"data"), Err(IoError::WouldBlock)));
    }

    #[test]
    fn test_send_empty_buffer() {
        let mut ports = opened_registry();
        assert_eq!(ports.send_buffer(0, b"").unwrap(), 0);
    }

    #[test]
    fn test_send_string() {
        let mut ports = opened_registry();
        ports.send_string(0, "ATZ\r").unwrap();
        assert_eq!(ports.backend().written(DEVICE), b"ATZ\r");
    }

    #[test]
    fn test_send_string_stops_on_would_block() {
        let mut ports = opened_registry();
        ports.backend().set_write_limit(DEVICE, Some(0));

        assert!(matches!(ports.send_string(0, "ATZ"), Err(IoError::WouldBlock)));
        let writes: Vec<_> = ports
            .backend()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, MockCall::Write(_)))
            .collect();
        assert_eq!(writes, vec![MockCall::Write(b"A".to_vec())]);
    }
}

mod modem_line_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_line_state() {
        let mut ports = opened_registry();
        ports.backend().set_modem_status(
            DEVICE,
            ModemStatus {
                dcd: true,
                ring: false,
                cts: true,
                dsr: false,
            },
        );

        assert!(ports.get_line_state(0, ModemLine::Dcd).unwrap());
        assert!(!ports.get_line_state(0, ModemLine::Ring).unwrap());
        assert!(ports.get_line_state(0, ModemLine::Cts).unwrap());
        assert!(!ports.get_line_state(0, ModemLine::Dsr).unwrap());
    }

    #[test]
    fn test_modem_status_failure() {
        let mut ports = opened_registry();
        ports.backend().fail_next(MockFault::ModemStatus);
        assert!(matches!(ports.get_line_state(0, ModemLine::Cts), Err(IoError::Native(_))));
    }

    #[test]
    fn test_set_dtr_and_rts() {
        let mut ports = opened_registry();
        assert_eq!(ports.backend().control_lines(DEVICE), (true, true));

        ports.set_dtr(0, false).unwrap();
        assert_eq!(ports.backend().control_lines(DEVICE), (false, true));

        ports.set_rts(0, false).unwrap();
        assert_eq!(ports.backend().control_lines(DEVICE), (false, false));

        ports.set_dtr(0, true).unwrap();
        assert_eq!(ports.backend().control_lines(DEVICE), (true, false));
    }

    #[test]
    fn test_set_dtr_failure_is_reported() {
        let mut ports = opened_registry();
        ports.backend().fail_next(MockFault::ControlLines);

        assert!(ports.set_dtr(0, false).is_err());
        assert_eq!(ports.backend().control_lines(DEVICE), (true, true));
    }
}

mod flush_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flush_rx_discards_pending_input() {
        let mut ports = opened_registry();
        ports.backend().enqueue_read(DEVICE, b"stale");

        ports.flush(0, FlushDirection::Rx).unwrap();

        let mut buffer = [0u8; 8];
        assert_eq!(ports.poll_read(0, &mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_flush_directions_reach_device() {
        let mut ports = opened_registry();
        for direction in [FlushDirection::Rx, FlushDirection::Tx, FlushDirection::Both] {
            ports.flush(0, direction).unwrap();
        }
        assert_eq!(
            ports.backend().calls(),
            vec![
                MockCall::Flush(FlushDirection::Rx),
                MockCall::Flush(FlushDirection::Tx),
                MockCall::Flush(FlushDirection::Both),
            ]
        );
    }

    #[test]
    fn test_flush_closed_port() {
        let mut ports = opened_registry();
        ports.close(0);
        assert!(matches!(ports.flush(0, FlushDirection::Both), Err(IoError::NotOpen(0))));
    }
}
