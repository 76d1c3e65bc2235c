pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod transport;
pub mod client;
pub mod emulator;
pub mod report;

pub use transport::{DatagramTransport, UdpTransport};
pub use codec::{ControlRequest, DeviceResponse, EnvelopePrefix, WireEncode, WireDecode};
pub use client::ControlClient;
pub use emulator::{DeviceEmulator, PowerSupplyState};
pub use config::{ControlConfig, EmulatorConfig};
pub use error::{ControlError, ControlResult, ErrorKind};
