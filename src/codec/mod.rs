//! # Wire Codec Module
//!
//! Encoding and decoding of the packets exchanged with the power supply's
//! UDP control server.
//!
//! ## Key Types
//!
//! - [`ControlRequest`] - 24-byte control packet (`"CeUL"`, set flag, setpoints)
//! - [`DeviceResponse`] - 36-byte status/setpoint/readback record
//! - [`EnvelopePrefix`] - 28-byte IPv4 + UDP header image in front of every reply
//! - [`WireEncode`] / [`WireDecode`] - Little-endian encoding traits
//!
//! ## Example
//!
//! ```ignore
//! use fastps_udp::codec::{ControlRequest, DeviceResponse};
//!
//! let request = ControlRequest::new(1, 2.5, 48.0)?;
//! socket.send_to(&request.to_bytes(), device)?;
//! let response = DeviceResponse::from_reply(&datagram)?;
//! ```

pub mod traits;
pub mod primitives;
pub mod units;
pub mod request;
pub mod response;
pub mod envelope;

pub use traits::{WireEncode, WireDecode};
pub use request::ControlRequest;
pub use response::DeviceResponse;
pub use envelope::EnvelopePrefix;
pub use units::{to_micro, from_micro};
