//! In-process transport
//!
//! [`MemoryNetwork`] is a switchboard of bound addresses; each
//! [`MemoryTransport`] bound on it delivers packets over tokio channels and
//! hands out `tokio::io::duplex` pipes as streams. Useful for tests and for
//! running several nodes in one process.

use super::abstraction::{Packet, PeerStream, Transport, TransportError};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Inbound queue depth per bound transport
const CHANNEL_CAPACITY: usize = 1024;

/// Buffer size of each in-memory stream direction
const STREAM_BUFFER: usize = 64 * 1024;

#[derive(Clone)]
struct Endpoint {
    packets: mpsc::Sender<Packet>,
    streams: mpsc::Sender<Box<dyn PeerStream>>,
}

/// Shared registry of bound in-memory transports
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    endpoints: Arc<RwLock<HashMap<String, Endpoint>>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a transport at `addr`
    pub fn bind(&self, addr: SocketAddr) -> Result<MemoryTransport, TransportError> {
        let (packet_tx, packet_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (stream_tx, stream_rx) = mpsc::channel(CHANNEL_CAPACITY);

        {
            let mut endpoints = self.endpoints.write();
            let key = addr.to_string();
            if endpoints.contains_key(&key) {
                return Err(TransportError::AddrInUse(addr));
            }
            endpoints.insert(
                key,
                Endpoint {
                    packets: packet_tx,
                    streams: stream_tx,
                },
            );
        }
        debug!("Memory transport bound at {}", addr);

        Ok(MemoryTransport {
            addr,
            network: self.clone(),
            packet_rx: Mutex::new(Some(packet_rx)),
            stream_rx: Mutex::new(Some(stream_rx)),
        })
    }

    /// Number of currently bound transports
    pub fn len(&self) -> usize {
        self.endpoints.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.read().is_empty()
    }

    fn lookup(&self, addr: &str) -> Result<Endpoint, TransportError> {
        self.endpoints
            .read()
            .get(addr)
            .cloned()
            .ok_or_else(|| TransportError::NoRoute(addr.to_string()))
    }
}

/// A transport bound on a [`MemoryNetwork`]
pub struct MemoryTransport {
    addr: SocketAddr,
    network: MemoryNetwork,
    packet_rx: Mutex<Option<mpsc::Receiver<Packet>>>,
    stream_rx: Mutex<Option<mpsc::Receiver<Box<dyn PeerStream>>>>,
}

impl MemoryTransport {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn final_advertise_addr(&self, ip: Option<IpAddr>, port: u16) -> Result<SocketAddr, TransportError> {
        let ip = ip.unwrap_or_else(|| self.addr.ip());
        let port = if port == 0 { self.addr.port() } else { port };
        Ok(SocketAddr::new(ip, port))
    }

    async fn write_to(&self, buf: &[u8], addr: &str) -> Result<Instant, TransportError> {
        let endpoint = self.network.lookup(addr)?;
        let timestamp = Instant::now();
        let packet = Packet {
            buf: buf.to_vec(),
            from: self.addr,
            timestamp,
        };

        // Packets are best-effort; a full queue drops like a full socket buffer
        if let Err(e) = endpoint.packets.try_send(packet) {
            warn!("Dropping packet to {}: {}", addr, e);
        }
        Ok(timestamp)
    }

    fn take_packet_rx(&self) -> Option<mpsc::Receiver<Packet>> {
        self.packet_rx.lock().take()
    }

    async fn dial_timeout(&self, addr: &str, timeout: Duration) -> Result<Box<dyn PeerStream>, TransportError> {
        let endpoint = self.network.lookup(addr)?;
        let (local, remote) = tokio::io::duplex(STREAM_BUFFER);

        match tokio::time::timeout(timeout, endpoint.streams.send(Box::new(remote))).await {
            Ok(Ok(())) => {
                debug!("Stream opened {} -> {}", self.addr, addr);
                Ok(Box::new(local))
            }
            Ok(Err(_)) => Err(TransportError::ConnectionFailed(addr.to_string())),
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }

    fn take_stream_rx(&self) -> Option<mpsc::Receiver<Box<dyn PeerStream>>> {
        self.stream_rx.lock().take()
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        self.network.endpoints.write().remove(&self.addr.to_string());
        debug!("Memory transport at {} shut down", self.addr);
        Ok(())
    }
}
