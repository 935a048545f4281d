// Message module — type tags and payload schemas for the gossip protocol

pub mod types;

pub use types::{AckResp, Alive, Compress, CompressionType, Dead, MessageType, Ping, Suspect};
