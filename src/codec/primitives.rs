use super::traits::{WireEncode, WireDecode};
use std::io::{Result, Write, Read};

// The device is a little-endian ARM target and packs its structs in host order.
macro_rules! impl_primitive {
    ($type:ty, $bytes:expr) => {
        impl WireEncode for $type {
            fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
                writer.write_all(&self.to_le_bytes())
            }
        }

        impl WireDecode for $type {
            fn decode<R: Read>(reader: &mut R) -> Result<Self> {
                let mut buf = [0u8; $bytes];
                reader.read_exact(&mut buf)?;
                Ok(<$type>::from_le_bytes(buf))
            }
        }
    };
}

impl_primitive!(u32, 4);
impl_primitive!(i32, 4);
impl_primitive!(i64, 8);
