// Gossamer Core — failure detection and bandwidth scaling for SWIM-style gossip
//
// Three pieces carry the protocol: the adaptive suspicion timer, the packet
// framing/compression layer, and the cluster-size-aware heuristics that keep
// gossip traffic sub-linear as the cluster grows. Membership state, probing
// and real sockets sit above and below this crate.

pub mod config;
pub mod gossip;
pub mod message;
pub mod suspicion;
pub mod transport;
pub mod wire;

pub use config::{ConfigError, GossipConfig};
pub use gossip::{
    k_random_nodes, move_dead_nodes, push_pull_scale, retransmit_limit, shuffle_nodes,
    suspicion_timeout, Node, NodeRecord, NodeStatus,
};
pub use message::{Compress, CompressionType, MessageType};
pub use suspicion::{remaining_suspicion_time, Suspicion};
pub use transport::{MemoryNetwork, MemoryTransport, Packet, PeerStream, Transport, TransportError};
pub use wire::{
    compress_payload, decode, decode_compound_message, decode_packet, decompress_payload, encode,
    encode_packet, make_compound_message, InboundMessage, WireError,
};
