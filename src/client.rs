//! # Control Client
//!
//! One request/response exchange with the power supply: send a
//! [`ControlRequest`], wait for a single datagram, decode the
//! [`DeviceResponse`] behind the envelope prefix.
//!
//! The socket lives inside the client and is closed when the client is
//! dropped, on every exit path.

use crate::codec::{ControlRequest, DeviceResponse, EnvelopePrefix};
use crate::config::ControlConfig;
use crate::error::{ControlError, ControlResult};
use crate::logging::{self, DeviceLogger, LogLevel};
use crate::transport::{DatagramTransport, UdpTransport};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const COMPONENT: &str = "Client";

pub struct ControlClient<T: DatagramTransport = UdpTransport> {
    transport: T,
    device: SocketAddr,
    timeout: Option<Duration>,
    recv_buffer_len: usize,
    logger: Arc<dyn DeviceLogger>,
}

impl ControlClient<UdpTransport> {
    /// Bind the local socket described by `config`.
    pub fn connect(config: &ControlConfig, logger: Arc<dyn DeviceLogger>) -> ControlResult<Self> {
        let transport = UdpTransport::new(config.bind)
            .map_err(|source| ControlError::Bind { addr: config.bind, source })?;
        logger.log(LogLevel::Debug, COMPONENT, &format!("Bound to {}", config.bind));
        Self::with_transport(transport, config, logger)
    }
}

impl<T: DatagramTransport> ControlClient<T> {
    pub fn with_transport(transport: T, config: &ControlConfig, logger: Arc<dyn DeviceLogger>) -> ControlResult<Self> {
        transport.set_read_timeout(config.timeout).map_err(ControlError::Receive)?;
        Ok(ControlClient {
            transport,
            device: config.device,
            timeout: config.timeout,
            recv_buffer_len: config.recv_buffer_len,
            logger,
        })
    }

    pub fn device(&self) -> SocketAddr {
        self.device
    }

    /// Send `request` and block for the reply.
    pub fn exchange(&self, request: &ControlRequest) -> ControlResult<DeviceResponse> {
        self.send(request)?;
        let reply = self.receive()?;
        DeviceResponse::from_reply(&reply)
    }

    fn send(&self, request: &ControlRequest) -> ControlResult<()> {
        let packet = request.to_bytes();
        logging::dump_packet(self.logger.as_ref(), COMPONENT, "TX", &packet);

        let sent = self
            .transport
            .send(&packet, self.device)
            .map_err(|source| ControlError::Send { addr: self.device, source })?;
        if sent != packet.len() {
            return Err(ControlError::ShortSend { sent, expected: packet.len() });
        }

        self.logger.log(
            LogLevel::Info,
            COMPONENT,
            &format!(
                "Sent set={} I={} uA U={} uV to {}",
                request.set, request.current_setpoint_micro, request.voltage_setpoint_micro, self.device
            ),
        );
        Ok(())
    }

    fn receive(&self) -> ControlResult<Vec<u8>> {
        let mut buf = vec![0u8; self.recv_buffer_len];
        let (size, src) = match self.transport.receive(&mut buf) {
            Ok(received) => received,
            // read timeouts surface as WouldBlock on unix, TimedOut on windows
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(match self.timeout {
                    Some(timeout) => ControlError::Timeout(timeout),
                    None => ControlError::Receive(e),
                });
            }
            Err(e) => return Err(ControlError::Receive(e)),
        };
        buf.truncate(size);

        self.logger.log(LogLevel::Debug, COMPONENT, &format!("Received {} bytes from {}", size, src));
        logging::dump_packet(self.logger.as_ref(), COMPONENT, "RX", &buf);
        if let Some(prefix) = EnvelopePrefix::parse(&buf) {
            self.logger.log(
                LogLevel::Debug,
                COMPONENT,
                &format!("Envelope {} -> {} id={}", prefix.source, prefix.destination, prefix.identification),
            );
        }
        Ok(buf)
    }
}
