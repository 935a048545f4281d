// Packet pipeline — batch outbound messages, unwrap inbound packets

use super::compound::{decode_compound_message, make_compound_messages};
use super::compress::{compress_payload, decompress_payload};
use super::WireError;
use crate::message::MessageType;
use tracing::{debug, warn};

/// One protocol message recovered from an inbound packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub msg_type: MessageType,
    /// Encoded body, without the type byte; feed to [`super::decode`]
    pub body: Vec<u8>,
}

/// Nesting bound for compound-in-compress-in-compound packets
const MAX_NESTING: usize = 4;

/// Turn a batch of encoded messages into packets ready for the transport.
///
/// A single message goes out unchanged. Several messages are packed into
/// compound messages of at most 255 entries each. With `compress` set every
/// resulting packet is wrapped in a compression envelope.
pub fn encode_packet(messages: &[Vec<u8>], compress: bool) -> Result<Vec<Vec<u8>>, WireError> {
    let packets = match messages {
        [] => return Ok(Vec::new()),
        [single] => vec![single.clone()],
        many => make_compound_messages(many)?,
    };

    if !compress {
        return Ok(packets);
    }

    packets
        .iter()
        .map(|p| compress_payload(p))
        .collect()
}

/// Unwrap an inbound packet into the protocol messages it carries.
///
/// Compression envelopes and compound messages are expanded recursively.
/// A compound message cut short in transit keeps its complete prefix and the
/// loss is logged. A malformed message nested inside a compound is logged
/// and skipped so one bad entry does not cost the rest of the packet; a
/// malformed outer packet is returned as an error.
pub fn decode_packet(buf: &[u8]) -> Result<Vec<InboundMessage>, WireError> {
    let mut out = Vec::new();
    decode_into(buf, 0, &mut out)?;
    Ok(out)
}

fn decode_into(buf: &[u8], depth: usize, out: &mut Vec<InboundMessage>) -> Result<(), WireError> {
    let (&tag, body) = buf.split_first().ok_or(WireError::EmptyPacket)?;
    let msg_type = MessageType::from_u8(tag)?;

    match msg_type {
        MessageType::Compress => {
            if depth >= MAX_NESTING {
                return Err(WireError::Decode(format!("packet nested deeper than {}", MAX_NESTING)));
            }
            let inner = decompress_payload(body)?;
            decode_into(&inner, depth + 1, out)
        }
        MessageType::Compound => {
            if depth >= MAX_NESTING {
                return Err(WireError::Decode(format!("packet nested deeper than {}", MAX_NESTING)));
            }
            let compound = decode_compound_message(body)?;
            if compound.truncated > 0 {
                warn!(
                    "Compound request had {} truncated messages",
                    compound.truncated
                );
            }

            for part in compound.parts {
                if let Err(e) = decode_into(part, depth + 1, out) {
                    warn!("Failed to decode compound part: {}", e);
                }
            }
            Ok(())
        }
        _ => {
            debug!("Decoded {:?} message ({} bytes)", msg_type, body.len());
            out.push(InboundMessage {
                msg_type,
                body: body.to_vec(),
            });
            Ok(())
        }
    }
}
