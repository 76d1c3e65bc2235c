use std::io::{Result, Write, Read};

// Types that can be written in the device's little-endian wire format
pub trait WireEncode {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()>;
}

// Types that can be read back from the device's little-endian wire format
pub trait WireDecode: Sized {
    fn decode<R: Read>(reader: &mut R) -> Result<Self>;
}
