//! Wire format — envelopes, compound packets and compression
//!
//! This module provides:
//! - Envelope codec: one leading type byte followed by a MessagePack body
//! - Compound framing: many messages in one packet behind a u16 length table
//! - LZW compression: optional payload compression inside a `Compress` envelope
//! - Packet pipeline: outbound batching and inbound unwrapping of the above
//!
//! Format progression (outbound):
//! 1. `encode`: typed message -> `[type][body]`
//! 2. `make_compound_messages`: several encoded messages -> `[7][count][lens..][bodies..]`
//! 3. `compress_payload`: optional -> `[9][{algo, buf}]`
//!
//! Inbound traffic is unwrapped by [`decode_packet`] in the reverse order.

pub mod codec;
pub mod compound;
pub mod compress;
pub mod packet;

pub use codec::{decode, encode};
pub use compound::{
    decode_compound_message, make_compound_message, make_compound_messages, CompoundParts,
    MAX_COMPOUND_MESSAGES, MAX_COMPOUND_PART_SIZE,
};
pub use compress::{compress_payload, decompress_buffer, decompress_payload};
pub use packet::{decode_packet, encode_packet, InboundMessage};

use thiserror::Error;

/// Wire format errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),

    #[error("missing compound length byte")]
    MissingLengthByte,

    #[error("truncated length table: need {need} bytes, got {got}")]
    TruncatedLengthTable { need: usize, got: usize },

    #[error("Too many messages for one compound: {0} (max {MAX})", MAX = MAX_COMPOUND_MESSAGES)]
    TooManyMessages(usize),

    #[error("Message {index} too large for compound framing: {len} bytes (max {MAX})", MAX = MAX_COMPOUND_PART_SIZE)]
    MessageTooLarge { index: usize, len: usize },

    #[error("Compression failed: {0}")]
    Compress(String),

    #[error("Decompression failed: {0}")]
    Decompress(String),

    #[error("Cannot decompress unknown algorithm {0}")]
    UnsupportedAlgorithm(u8),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),

    #[error("Empty packet")]
    EmptyPacket,
}
