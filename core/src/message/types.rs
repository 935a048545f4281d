// Message types — the tag table and the small payloads the gossip layer speaks

use crate::wire::WireError;
use serde::{Deserialize, Serialize};

/// Leading type byte of every message on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Direct probe (0x00)
    Ping = 0,
    /// Probe relayed through a third node (0x01)
    IndirectPing = 1,
    /// Probe acknowledgement (0x02)
    AckResp = 2,
    /// Suspicion about a node (0x03)
    Suspect = 3,
    /// Liveness refutation / join announcement (0x04)
    Alive = 4,
    /// Death declaration (0x05)
    Dead = 5,
    /// Full state exchange over a stream (0x06)
    PushPull = 6,
    /// Several messages packed into one packet (0x07)
    Compound = 7,
    /// Opaque application payload (0x08)
    User = 8,
    /// Compression envelope (0x09)
    Compress = 9,
    /// Negative acknowledgement for an indirect probe (0x0B)
    NackResp = 11,
    /// Error response on a stream (0x0D)
    Err = 13,
}

impl MessageType {
    /// Convert from u8 to MessageType
    ///
    /// Tags 10 and 12 belong to encryption and checksum framing, which this
    /// crate does not speak, so they are rejected like any unknown tag.
    pub fn from_u8(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(MessageType::Ping),
            1 => Ok(MessageType::IndirectPing),
            2 => Ok(MessageType::AckResp),
            3 => Ok(MessageType::Suspect),
            4 => Ok(MessageType::Alive),
            5 => Ok(MessageType::Dead),
            6 => Ok(MessageType::PushPull),
            7 => Ok(MessageType::Compound),
            8 => Ok(MessageType::User),
            9 => Ok(MessageType::Compress),
            11 => Ok(MessageType::NackResp),
            13 => Ok(MessageType::Err),
            other => Err(WireError::UnknownMessageType(other)),
        }
    }

    /// Convert to u8
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Compression algorithms understood by the compression envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionType {
    /// LZW, LSB bit order, 8-bit literals
    Lzw = 0,
}

impl CompressionType {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Body of a `MessageType::Compress` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compress {
    /// Algorithm identifier, see [`CompressionType`]
    pub algo: u8,
    /// Compressed bytes
    #[serde(with = "serde_bytes")]
    pub buf: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {
    pub seq_no: u32,
    /// Name of the node the probe is meant for
    pub node: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResp {
    pub seq_no: u32,
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
}

/// Raised by `from` against `node`; the scheduler starts or confirms a
/// [`Suspicion`](crate::suspicion::Suspicion) on receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspect {
    pub incarnation: u32,
    pub node: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alive {
    pub incarnation: u32,
    pub node: String,
    pub addr: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dead {
    pub incarnation: u32,
    pub node: String,
    pub from: String,
}
