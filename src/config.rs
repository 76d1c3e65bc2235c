use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Address of the power supply on the accelerator control network
pub const DEVICE_IP: Ipv4Addr = Ipv4Addr::new(10, 66, 67, 10);
/// Port of the device's UDP control server. The client binds the same port.
pub const CONTROL_PORT: u16 = 16665;
/// Receive buffer, larger than any reply the device sends
pub const RECV_BUFFER_LEN: usize = 1024;

/// Settings for one control exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    /// Where the control packet goes
    pub device: SocketAddr,
    /// Local bind address. The device answers to the source port, so this
    /// defaults to the control port on all interfaces.
    pub bind: SocketAddr,
    /// Receive timeout; `None` waits forever
    pub timeout: Option<Duration>,
    pub recv_buffer_len: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            device: SocketAddr::new(IpAddr::V4(DEVICE_IP), CONTROL_PORT),
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), CONTROL_PORT),
            timeout: None,
            recv_buffer_len: RECV_BUFFER_LEN,
        }
    }
}

/// Settings for the device emulator
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatorConfig {
    pub bind: SocketAddr,
    /// Initial state of the emulated output stage
    pub output_on: bool,
    /// Sleep between empty polls of the socket
    pub poll_interval: Duration,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), CONTROL_PORT),
            output_on: true,
            poll_interval: Duration::from_micros(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_fixed_device_address() {
        let cfg = ControlConfig::default();
        assert_eq!(cfg.device, "10.66.67.10:16665".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.bind, "0.0.0.0:16665".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.timeout, None);
        assert_eq!(cfg.recv_buffer_len, 1024);
    }
}
