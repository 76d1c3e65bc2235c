//! End-to-end UDP tests: the control client against the device emulator,
//! plus the failure paths a real device can produce (silence, short replies).
//!
//! Everything runs on loopback with ephemeral ports.

use fastps_udp::codec::envelope::internet_checksum;
use fastps_udp::logging::{DeviceLogger, LogLevel};
use fastps_udp::{
    ControlClient, ControlConfig, ControlError, ControlRequest, DeviceEmulator, DeviceResponse,
    EmulatorConfig, EnvelopePrefix, ErrorKind,
};
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Keeps every log line for later inspection.
#[derive(Default)]
struct MemoryLogger {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl DeviceLogger for MemoryLogger {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        self.lines.lock().unwrap().push((level, format!("[{}] {}", component, msg)));
    }
}

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

fn start_emulator(output_on: bool, logger: Arc<MemoryLogger>) -> (Arc<DeviceEmulator>, thread::JoinHandle<()>) {
    let config = EmulatorConfig { bind: loopback(), output_on, ..EmulatorConfig::default() };
    let emulator = DeviceEmulator::bind(&config, logger).unwrap();
    let e = emulator.clone();
    let handle = thread::spawn(move || e.run());
    (emulator, handle)
}

fn client_config(device: SocketAddr) -> ControlConfig {
    ControlConfig {
        device,
        bind: loopback(),
        timeout: Some(Duration::from_secs(2)),
        ..ControlConfig::default()
    }
}

#[test]
fn test_setpoints_round_trip_through_emulator() {
    let logger = Arc::new(MemoryLogger::default());
    let (emulator, handle) = start_emulator(true, logger.clone());
    let device = emulator.local_addr().unwrap();

    let client = ControlClient::connect(&client_config(device), logger.clone()).unwrap();

    let response = client.exchange(&ControlRequest::new(1, 2.5, 48.0).unwrap()).unwrap();
    assert!(response.output_on());
    assert_eq!(response.current_setpoint_micro, 2_500_000);
    assert_eq!(response.voltage_setpoint_micro, 48_000_000);
    assert_eq!(response.current_readback_micro, 2_500_000);
    assert_eq!(response.voltage_readback_micro, 48_000_000);

    // set=0 only queries, the previous setpoints stay
    let response = client.exchange(&ControlRequest::new(0, 9.0, 9.0).unwrap()).unwrap();
    assert_eq!(response.current_setpoint_micro, 2_500_000);
    assert_eq!(response.voltage_setpoint_micro, 48_000_000);

    emulator.stop();
    handle.join().unwrap();

    assert_eq!(emulator.packets_received(), 2);
    assert_eq!(emulator.state().current_setpoint_micro, 2_500_000);
    assert!(logger.contains(LogLevel::Info, "Setpoints from"));
}

#[test]
fn test_output_off_reports_zero_readback() {
    let logger = Arc::new(MemoryLogger::default());
    let (emulator, handle) = start_emulator(false, logger.clone());
    let client = ControlClient::connect(&client_config(emulator.local_addr().unwrap()), logger).unwrap();

    let response = client.exchange(&ControlRequest::new(1, 1.0, 12.0).unwrap()).unwrap();
    assert!(!response.output_on());
    assert_eq!(response.voltage_setpoint_micro, 12_000_000);
    assert_eq!(response.current_readback_micro, 0);
    assert_eq!(response.voltage_readback_micro, 0);

    emulator.stop();
    handle.join().unwrap();
}

#[test]
fn test_reply_carries_valid_envelope() {
    let logger = Arc::new(MemoryLogger::default());
    let (emulator, handle) = start_emulator(true, logger);
    let device = emulator.local_addr().unwrap();

    let socket = UdpSocket::bind(loopback()).unwrap();
    socket.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let request = ControlRequest::new(1, 0.5, 5.0).unwrap();
    socket.send_to(&request.to_bytes(), device).unwrap();

    let mut buf = [0u8; 1024];
    let (size, src) = socket.recv_from(&mut buf).unwrap();
    assert_eq!(size, DeviceResponse::REPLY_LENGTH);
    assert_eq!(src, device);

    let prefix = EnvelopePrefix::parse(&buf[..size]).expect("reply should start with an IPv4/UDP image");
    assert_eq!(prefix.destination.port(), socket.local_addr().unwrap().port());
    assert_eq!(prefix.source.port(), device.port());
    assert_eq!(prefix.identification, 1);
    assert_eq!(prefix.payload_len as usize, DeviceResponse::LENGTH);
    assert_eq!(internet_checksum(&[&buf[..20]]), 0);

    let response = DeviceResponse::from_reply(&buf[..size]).unwrap();
    assert_eq!(response.current_setpoint_micro, 500_000);

    emulator.stop();
    handle.join().unwrap();
}

#[test]
fn test_emulator_drops_malformed_packets() {
    let logger = Arc::new(MemoryLogger::default());
    let (emulator, handle) = start_emulator(true, logger.clone());
    let device = emulator.local_addr().unwrap();

    let socket = UdpSocket::bind(loopback()).unwrap();
    socket.set_read_timeout(Some(Duration::from_millis(300))).unwrap();

    // too short
    socket.send_to(&[0u8; 20], device).unwrap();
    // right size, wrong signature
    let mut wrong = ControlRequest::new(1, 1.0, 1.0).unwrap().to_bytes();
    wrong[0..4].copy_from_slice(b"LUeC");
    socket.send_to(&wrong, device).unwrap();

    let mut buf = [0u8; 1024];
    assert!(socket.recv_from(&mut buf).is_err(), "malformed packets must not be answered");

    emulator.stop();
    handle.join().unwrap();

    assert_eq!(emulator.packets_received(), 2);
    assert_eq!(emulator.state().current_setpoint_micro, 0);
    assert!(logger.contains(LogLevel::Warn, "unknown packet (20 bytes)"));
    assert!(logger.contains(LogLevel::Warn, "Wrong magic"));
}

#[test]
fn test_silent_device_times_out() {
    // bound but never answers
    let silent = UdpSocket::bind(loopback()).unwrap();
    let mut config = client_config(silent.local_addr().unwrap());
    config.timeout = Some(Duration::from_millis(200));

    let client = ControlClient::connect(&config, Arc::new(MemoryLogger::default())).unwrap();
    let err = client.exchange(&ControlRequest::new(1, 1.0, 1.0).unwrap()).unwrap_err();

    assert!(matches!(err, ControlError::Timeout(d) if d == Duration::from_millis(200)));
    assert_eq!(err.kind(), ErrorKind::Network);

    // the request still made it out
    let mut buf = [0u8; 64];
    silent.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
    let (size, _) = silent.recv_from(&mut buf).unwrap();
    assert_eq!(size, ControlRequest::LENGTH);
    assert_eq!(&buf[..4], b"CeUL");
}

#[test]
fn test_short_reply_is_decode_error() {
    let fake = UdpSocket::bind(loopback()).unwrap();
    fake.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let device = fake.local_addr().unwrap();

    let responder = thread::spawn(move || {
        let mut buf = [0u8; 64];
        let (_, src) = fake.recv_from(&mut buf).unwrap();
        fake.send_to(&[0xAB; 40], src).unwrap();
    });

    let client = ControlClient::connect(&client_config(device), Arc::new(MemoryLogger::default())).unwrap();
    let err = client.exchange(&ControlRequest::new(1, 2.5, 48.0).unwrap()).unwrap_err();
    responder.join().unwrap();

    assert!(matches!(err, ControlError::ShortReply { expected: 64, actual: 40 }));
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_bind_conflict_is_network_error() {
    let holder = UdpSocket::bind(loopback()).unwrap();
    let taken = holder.local_addr().unwrap();

    // SO_REUSEADDR on our side alone does not share a live unicast UDP port
    // with a socket that never set it. Linux refuses; other platforms vary.
    let config = ControlConfig { bind: taken, ..client_config(taken) };
    let result = ControlClient::connect(&config, Arc::new(MemoryLogger::default()));

    #[cfg(target_os = "linux")]
    assert!(result.is_err(), "second bind on {} should fail", taken);

    if let Err(err) = result {
        assert!(matches!(err, ControlError::Bind { addr, .. } if addr == taken));
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.exit_code(), 3);
    }
}
