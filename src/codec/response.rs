use super::envelope::EnvelopePrefix;
use super::traits::{WireEncode, WireDecode};
use super::units::from_micro;
use crate::error::{ControlError, ControlResult};
use serde::Serialize;
use std::io::{Cursor, Read, Result, Write};

/// Operating values reported by the device after every control packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeviceResponse {
    pub status: u32,
    pub current_setpoint_micro: i64,
    pub voltage_setpoint_micro: i64,
    pub current_readback_micro: i64,
    pub voltage_readback_micro: i64,
}

impl DeviceResponse {
    pub const LENGTH: usize = 36;
    /// Smallest datagram that carries a full record behind the prefix
    pub const REPLY_LENGTH: usize = EnvelopePrefix::LENGTH + Self::LENGTH;
    /// Status bit set while the output stage is enabled
    pub const STATUS_OUTPUT_ON: u32 = 0x0000_0001;

    /// Decode a whole reply datagram: skip the envelope prefix and read one
    /// record. Trailing bytes are ignored.
    pub fn from_reply(datagram: &[u8]) -> ControlResult<Self> {
        if datagram.len() < Self::REPLY_LENGTH {
            return Err(ControlError::ShortReply {
                expected: Self::REPLY_LENGTH,
                actual: datagram.len(),
            });
        }
        let record = &datagram[EnvelopePrefix::LENGTH..Self::REPLY_LENGTH];
        Self::decode(&mut Cursor::new(record)).map_err(ControlError::Codec)
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut buffer = [0u8; Self::LENGTH];
        buffer[0..4].copy_from_slice(&self.status.to_le_bytes());
        buffer[4..12].copy_from_slice(&self.current_setpoint_micro.to_le_bytes());
        buffer[12..20].copy_from_slice(&self.voltage_setpoint_micro.to_le_bytes());
        buffer[20..28].copy_from_slice(&self.current_readback_micro.to_le_bytes());
        buffer[28..36].copy_from_slice(&self.voltage_readback_micro.to_le_bytes());
        buffer
    }

    pub fn output_on(&self) -> bool {
        self.status & Self::STATUS_OUTPUT_ON != 0
    }

    pub fn current_setpoint(&self) -> f64 {
        from_micro(self.current_setpoint_micro)
    }

    pub fn voltage_setpoint(&self) -> f64 {
        from_micro(self.voltage_setpoint_micro)
    }

    pub fn current_readback(&self) -> f64 {
        from_micro(self.current_readback_micro)
    }

    pub fn voltage_readback(&self) -> f64 {
        from_micro(self.voltage_readback_micro)
    }
}

impl WireEncode for DeviceResponse {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.status.encode(writer)?;
        self.current_setpoint_micro.encode(writer)?;
        self.voltage_setpoint_micro.encode(writer)?;
        self.current_readback_micro.encode(writer)?;
        self.voltage_readback_micro.encode(writer)
    }
}

impl WireDecode for DeviceResponse {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(DeviceResponse {
            status: u32::decode(reader)?,
            current_setpoint_micro: i64::decode(reader)?,
            voltage_setpoint_micro: i64::decode(reader)?,
            current_readback_micro: i64::decode(reader)?,
            voltage_readback_micro: i64::decode(reader)?,
        })
    }
}
