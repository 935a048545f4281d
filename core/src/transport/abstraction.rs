//! Transport abstraction for the gossip layer
//!
//! Packets are best-effort and connectionless; streams are reliable and used
//! for the infrequent full state syncs. Concrete transports live elsewhere,
//! the core only depends on this contract.

use crate::wire::WireError;
use async_trait::async_trait;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

/// An inbound packet with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Raw packet contents
    pub buf: Vec<u8>,
    /// Address of the sending peer
    pub from: SocketAddr,
    /// Taken as close to receipt as possible, for RTT measurement
    pub timestamp: Instant,
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Packet {{ from: {}, len: {} }}", self.from, self.buf.len())
    }
}

/// A reliable bidirectional connection to a peer
pub trait PeerStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> PeerStream for T {}

/// Connection and packet plumbing consumed by the gossip scheduler
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolve the address to advertise to the cluster from the configured
    /// values. `None` / port 0 mean "use whatever we are bound to".
    fn final_advertise_addr(&self, ip: Option<IpAddr>, port: u16) -> Result<SocketAddr, TransportError>;

    /// Fire off one packet and return the time it was handed to the network
    async fn write_to(&self, buf: &[u8], addr: &str) -> Result<Instant, TransportError>;

    /// Inbound packets. Can be taken once.
    fn take_packet_rx(&self) -> Option<mpsc::Receiver<Packet>>;

    /// Open a reliable connection to `addr`
    async fn dial_timeout(&self, addr: &str, timeout: Duration) -> Result<Box<dyn PeerStream>, TransportError>;

    /// Inbound connections. Can be taken once.
    fn take_stream_rx(&self) -> Option<mpsc::Receiver<Box<dyn PeerStream>>>;

    /// Release listeners; further sends to this transport fail
    async fn shutdown(&self) -> Result<(), TransportError>;
}

/// Errors that can occur in the transport layer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("No route to peer: {0}")]
    NoRoute(String),

    #[error("Address already in use: {0}")]
    AddrInUse(SocketAddr),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Transport shut down")]
    Shutdown,

    #[error("Wire error: {0}")]
    Wire(#[from] WireError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_display() {
        let packet = Packet {
            buf: vec![1, 2, 3],
            from: "10.0.0.1:7946".parse().unwrap(),
            timestamp: Instant::now(),
        };
        assert_eq!(packet.to_string(), "Packet { from: 10.0.0.1:7946, len: 3 }");
    }

    #[test]
    fn test_wire_error_converts() {
        let err: TransportError = WireError::EmptyPacket.into();
        assert_eq!(err, TransportError::Wire(WireError::EmptyPacket));
        assert_eq!(err.to_string(), "Wire error: Empty packet");
    }

    #[test]
    fn test_duplex_is_peer_stream() {
        fn assert_stream<S: PeerStream>(_: &S) {}
        let (a, _b) = tokio::io::duplex(16);
        assert_stream(&a);
    }
}
