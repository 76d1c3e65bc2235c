//! # Device Emulator
//!
//! Stand-in for the UDP control server running on the power supply, for
//! bench tests without hardware.
//!
//! ## Behaviour
//!
//! 1. Poll the (nonblocking) socket, sleeping briefly when it is empty
//! 2. Drop datagrams that are not exactly 24 bytes or carry the wrong magic
//! 3. Apply the setpoints when `set != 0`
//! 4. Answer every valid packet with envelope prefix + response record
//!
//! ## Example
//!
//! ```ignore
//! let emulator = DeviceEmulator::bind(&EmulatorConfig::default(), ConsoleLogger::new())?;
//! let e = emulator.clone();
//! ctrlc::set_handler(move || e.stop())?;
//! emulator.run();
//! ```

pub mod state;

pub use state::PowerSupplyState;

use crate::codec::{ControlRequest, EnvelopePrefix};
use crate::config::EmulatorConfig;
use crate::error::{ControlError, ControlResult};
use crate::logging::{self, DeviceLogger, LogLevel};
use crate::transport::{DatagramTransport, UdpTransport};
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const COMPONENT: &str = "Emulator";
const UDP_BUFFER_LEN: usize = 256;

pub struct DeviceEmulator<T: DatagramTransport = UdpTransport> {
    transport: T,
    state: Mutex<PowerSupplyState>,
    running: AtomicBool,
    packets: AtomicU64,
    poll_interval: Duration,
    logger: Arc<dyn DeviceLogger>,
}

impl DeviceEmulator<UdpTransport> {
    pub fn bind(config: &EmulatorConfig, logger: Arc<dyn DeviceLogger>) -> ControlResult<Arc<Self>> {
        let transport = UdpTransport::new(config.bind)
            .map_err(|source| ControlError::Bind { addr: config.bind, source })?;
        transport
            .set_nonblocking(true)
            .map_err(|source| ControlError::Bind { addr: config.bind, source })?;

        logger.log(LogLevel::Info, COMPONENT, &format!("UDP socket open on {}", config.bind));
        Ok(Self::with_transport(transport, config, logger))
    }
}

impl<T: DatagramTransport> DeviceEmulator<T> {
    /// `transport` must not block on receive; the loop polls it.
    pub fn with_transport(transport: T, config: &EmulatorConfig, logger: Arc<dyn DeviceLogger>) -> Arc<Self> {
        Arc::new(DeviceEmulator {
            transport,
            state: Mutex::new(PowerSupplyState::new(config.output_on)),
            running: AtomicBool::new(true),
            packets: AtomicU64::new(0),
            poll_interval: config.poll_interval,
            logger,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    pub fn state(&self) -> PowerSupplyState {
        *self.lock_state()
    }

    /// Switch the output stage, like the front panel or MON/MOFF.
    /// Setpoints are kept across off/on.
    pub fn set_output(&self, on: bool) {
        let mut state = self.lock_state();
        if state.output_on != on {
            state.output_on = on;
            self.logger.log(LogLevel::Info, COMPONENT, if on { "Output on" } else { "Output off" });
        }
    }

    /// Datagrams received so far, valid or not
    pub fn packets_received(&self) -> u64 {
        self.packets.load(Ordering::Relaxed)
    }

    pub fn run(&self) {
        self.logger.log(LogLevel::Info, COMPONENT, "Event Loop Started");
        let mut buf = [0u8; UDP_BUFFER_LEN];

        while self.running.load(Ordering::Relaxed) {
            match self.transport.receive(&mut buf) {
                Ok((size, src)) => {
                    if let Some(reply) = self.handle_datagram(&buf[..size], src) {
                        logging::dump_packet(self.logger.as_ref(), COMPONENT, "TX", &reply);
                        if let Err(e) = self.transport.send(&reply, src) {
                            self.logger.log(LogLevel::Error, COMPONENT, &format!("TX Error to {}: {}", src, e));
                        }
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(self.poll_interval);
                }
                Err(e) => {
                    self.logger.log(LogLevel::Error, COMPONENT, &format!("RX Error: {}", e));
                    thread::sleep(self.poll_interval);
                }
            }
        }

        self.logger.log(LogLevel::Info, COMPONENT, "Stopped, graceful exit");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Process one datagram and build the reply, if it deserves one.
    pub fn handle_datagram(&self, data: &[u8], src: SocketAddr) -> Option<Vec<u8>> {
        let counter = self.packets.fetch_add(1, Ordering::Relaxed) + 1;
        logging::dump_packet(self.logger.as_ref(), COMPONENT, "RX", data);

        let request = match ControlRequest::from_bytes(data) {
            Ok(request) => request,
            Err(ControlError::BadRequestLength { actual, .. }) => {
                self.logger.log(
                    LogLevel::Warn,
                    COMPONENT,
                    &format!("Received unknown packet ({} bytes) from {}", actual, src),
                );
                return None;
            }
            Err(e) => {
                self.logger.log(LogLevel::Warn, COMPONENT, &format!("Rejected packet from {}: {}", src, e));
                return None;
            }
        };

        let response = {
            let mut state = self.lock_state();
            if state.apply(&request) {
                self.logger.log(
                    LogLevel::Info,
                    COMPONENT,
                    &format!(
                        "Setpoints from {}: I={} uA U={} uV",
                        src, request.current_setpoint_micro, request.voltage_setpoint_micro
                    ),
                );
            }
            state.snapshot()
        };

        let payload = response.to_bytes();
        let prefix = EnvelopePrefix {
            source: self.envelope_source(),
            destination: as_v4(src),
            identification: counter as u16,
            payload_len: payload.len() as u16,
        };
        let mut reply = prefix.build(&payload).to_vec();
        reply.extend_from_slice(&payload);
        Some(reply)
    }

    fn envelope_source(&self) -> SocketAddrV4 {
        match self.transport.local_addr() {
            Ok(addr) => as_v4(addr),
            Err(_) => SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, PowerSupplyState> {
        // plain data, safe to reuse after a poisoning panic
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn as_v4(addr: SocketAddr) -> SocketAddrV4 {
    match addr {
        SocketAddr::V4(v4) => v4,
        SocketAddr::V6(v6) => SocketAddrV4::new(
            v6.ip().to_ipv4_mapped().unwrap_or(Ipv4Addr::UNSPECIFIED),
            v6.port(),
        ),
    }
}
