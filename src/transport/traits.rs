use std::io::Result;
use std::net::SocketAddr;
use std::time::Duration;

/// Datagram channel used to reach the device.
/// Object-safe so tests and the emulator can swap in their own sockets.
pub trait DatagramTransport: Send + Sync {
    /// Send one datagram to `destination`.
    fn send(&self, data: &[u8], destination: SocketAddr) -> Result<usize>;

    /// Receive one datagram.
    /// Returns the number of bytes read and the source address.
    fn receive(&self, buffer: &mut [u8]) -> Result<(usize, SocketAddr)>;

    /// Limit how long `receive` blocks. `None` blocks forever.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()>;

    /// Get the local socket address.
    fn local_addr(&self) -> Result<SocketAddr>;
}
