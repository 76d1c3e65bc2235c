use std::net::{Ipv4Addr, SocketAddrV4};

/// Image of an IPv4 + UDP header that the device writes into the payload in
/// front of every response record.
///
/// The client never relies on it; [`EnvelopePrefix::parse`] is best effort
/// and only used for diagnostics. The emulator builds it with valid
/// checksums. Header fields are in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopePrefix {
    pub source: SocketAddrV4,
    pub destination: SocketAddrV4,
    pub identification: u16,
    pub payload_len: u16,
}

const IPV4_HEADER_LEN: usize = 20;
const UDP_HEADER_LEN: usize = 8;
const IPPROTO_UDP: u8 = 17;
const TTL: u8 = 255;

impl EnvelopePrefix {
    pub const LENGTH: usize = IPV4_HEADER_LEN + UDP_HEADER_LEN;

    /// Serialize the prefix for `payload`, filling in both checksums.
    pub fn build(&self, payload: &[u8]) -> [u8; Self::LENGTH] {
        let mut buffer = [0u8; Self::LENGTH];
        let total_len = (Self::LENGTH + payload.len()) as u16;
        let udp_len = (UDP_HEADER_LEN + payload.len()) as u16;

        // IPv4 header
        buffer[0] = 0x45; // version 4, IHL 5
        buffer[1] = 0x00;
        buffer[2..4].copy_from_slice(&total_len.to_be_bytes());
        buffer[4..6].copy_from_slice(&self.identification.to_be_bytes());
        buffer[6..8].copy_from_slice(&[0x00, 0x00]);
        buffer[8] = TTL;
        buffer[9] = IPPROTO_UDP;
        buffer[12..16].copy_from_slice(&self.source.ip().octets());
        buffer[16..20].copy_from_slice(&self.destination.ip().octets());
        let ip_check = internet_checksum(&[&buffer[..IPV4_HEADER_LEN]]);
        buffer[10..12].copy_from_slice(&ip_check.to_be_bytes());

        // UDP header
        buffer[20..22].copy_from_slice(&self.source.port().to_be_bytes());
        buffer[22..24].copy_from_slice(&self.destination.port().to_be_bytes());
        buffer[24..26].copy_from_slice(&udp_len.to_be_bytes());
        let udp_check = udp_checksum(
            *self.source.ip(),
            *self.destination.ip(),
            &buffer[IPV4_HEADER_LEN..],
            payload,
        );
        buffer[26..28].copy_from_slice(&udp_check.to_be_bytes());

        buffer
    }

    /// Read back the addressing from a reply. Returns `None` when the bytes
    /// do not look like an IPv4/UDP header image.
    pub fn parse(buffer: &[u8]) -> Option<Self> {
        if buffer.len() < Self::LENGTH || buffer[0] != 0x45 || buffer[9] != IPPROTO_UDP {
            return None;
        }
        let be16 = |i: usize| u16::from_be_bytes([buffer[i], buffer[i + 1]]);
        let ip = |i: usize| Ipv4Addr::new(buffer[i], buffer[i + 1], buffer[i + 2], buffer[i + 3]);

        let udp_len = be16(24);
        Some(EnvelopePrefix {
            source: SocketAddrV4::new(ip(12), be16(20)),
            destination: SocketAddrV4::new(ip(16), be16(22)),
            identification: be16(4),
            payload_len: udp_len.saturating_sub(UDP_HEADER_LEN as u16),
        })
    }
}

/// RFC 1071 one's complement sum over a sequence of byte chunks.
/// Odd-length chunks are only allowed in the last position.
pub fn internet_checksum(chunks: &[&[u8]]) -> u16 {
    let mut sum: u32 = 0;
    for chunk in chunks {
        let mut words = chunk.chunks_exact(2);
        for word in &mut words {
            sum += u16::from_be_bytes([word[0], word[1]]) as u32;
        }
        if let [last] = words.remainder() {
            sum += (*last as u32) << 8;
        }
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

/// UDP checksum over the pseudo header, the UDP header and the payload.
pub fn udp_checksum(source: Ipv4Addr, destination: Ipv4Addr, udp_header: &[u8], payload: &[u8]) -> u16 {
    let udp_len = (udp_header.len() + payload.len()) as u16;
    let mut pseudo = [0u8; 12];
    pseudo[0..4].copy_from_slice(&source.octets());
    pseudo[4..8].copy_from_slice(&destination.octets());
    pseudo[9] = IPPROTO_UDP;
    pseudo[10..12].copy_from_slice(&udp_len.to_be_bytes());

    let mut header = [0u8; UDP_HEADER_LEN];
    header.copy_from_slice(&udp_header[..UDP_HEADER_LEN]);
    header[6] = 0;
    header[7] = 0;

    match internet_checksum(&[&pseudo[..], &header[..], payload]) {
        // zero means "no checksum" in UDP
        0 => 0xFFFF,
        check => check,
    }
}
