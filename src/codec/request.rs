use super::traits::{WireEncode, WireDecode};
use super::units::to_micro;
use crate::error::{ControlError, ControlResult};
use std::io::{Cursor, Error, ErrorKind, Read, Result, Write};

/// Control packet sent to the device.
///
/// Layout (little-endian, packed):
/// `magic "CeUL" | set: i32 | current µA: i64 | voltage µV: i64`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    /// Non-zero asks the device to apply the setpoints
    pub set: i32,
    pub current_setpoint_micro: i64,
    pub voltage_setpoint_micro: i64,
}

impl ControlRequest {
    pub const MAGIC: [u8; 4] = *b"CeUL";
    /// The signature as the device reads it, a little-endian u32
    pub const MAGIC_WORD: u32 = u32::from_le_bytes(Self::MAGIC);
    pub const LENGTH: usize = 24;

    /// Build a request from setpoints in amps and volts.
    pub fn new(set: i32, current: f64, voltage: f64) -> ControlResult<Self> {
        Ok(ControlRequest {
            set,
            current_setpoint_micro: to_micro("current", current)?,
            voltage_setpoint_micro: to_micro("voltage", voltage)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut buffer = [0u8; Self::LENGTH];
        buffer[0..4].copy_from_slice(&Self::MAGIC);
        buffer[4..8].copy_from_slice(&self.set.to_le_bytes());
        buffer[8..16].copy_from_slice(&self.current_setpoint_micro.to_le_bytes());
        buffer[16..24].copy_from_slice(&self.voltage_setpoint_micro.to_le_bytes());
        buffer
    }

    /// Parse a received datagram. Anything but exactly 24 bytes is rejected,
    /// as is a packet whose first word is not the signature.
    pub fn from_bytes(buffer: &[u8]) -> ControlResult<Self> {
        if buffer.len() != Self::LENGTH {
            return Err(ControlError::BadRequestLength {
                expected: Self::LENGTH,
                actual: buffer.len(),
            });
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buffer[0..4]);
        let found = u32::from_le_bytes(magic);
        if found != Self::MAGIC_WORD {
            return Err(ControlError::BadMagic { found, expected: Self::MAGIC_WORD });
        }
        Self::decode(&mut Cursor::new(buffer)).map_err(ControlError::Codec)
    }

    pub fn applies_setpoints(&self) -> bool {
        self.set != 0
    }
}

impl WireEncode for ControlRequest {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        Self::MAGIC_WORD.encode(writer)?;
        self.set.encode(writer)?;
        self.current_setpoint_micro.encode(writer)?;
        self.voltage_setpoint_micro.encode(writer)
    }
}

impl WireDecode for ControlRequest {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = u32::decode(reader)?;
        if magic != Self::MAGIC_WORD {
            return Err(Error::new(ErrorKind::InvalidData, "Wrong control packet magic"));
        }
        Ok(ControlRequest {
            set: i32::decode(reader)?,
            current_setpoint_micro: i64::decode(reader)?,
            voltage_setpoint_micro: i64::decode(reader)?,
        })
    }
}
