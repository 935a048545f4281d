// Transport module — packet/stream contract, in-memory transport, address helpers

pub mod abstraction;
pub mod address;
pub mod memory;

pub use abstraction::{Packet, PeerStream, Transport, TransportError};
pub use address::{ensure_port, has_port, join_host_port};
pub use memory::{MemoryNetwork, MemoryTransport};

#[cfg(test)]
pub use abstraction::MockTransport;

use crate::wire::encode_packet;
use tracing::debug;

/// Batch `messages` into as few packets as possible and send them to `addr`.
///
/// Returns the number of packets written.
pub async fn send_messages(
    transport: &dyn Transport,
    addr: &str,
    messages: &[Vec<u8>],
    compress: bool,
) -> Result<usize, TransportError> {
    let packets = encode_packet(messages, compress)?;
    for packet in &packets {
        transport.write_to(packet, addr).await?;
    }

    debug!(
        "Sent {} messages to {} in {} packets",
        messages.len(),
        addr,
        packets.len()
    );
    Ok(packets.len())
}
