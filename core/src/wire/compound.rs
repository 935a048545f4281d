// Compound framing — many messages in one best-effort packet

use super::WireError;
use crate::message::MessageType;

/// The count field is a single byte
pub const MAX_COMPOUND_MESSAGES: usize = u8::MAX as usize;

/// Each entry of the length table is a big-endian u16
pub const MAX_COMPOUND_PART_SIZE: usize = u16::MAX as usize;

/// Result of splitting a compound message.
///
/// A packet cut short in transit still yields every message that arrived in
/// full; `truncated` counts the trailing messages that were lost. That is a
/// normal outcome on a lossy link, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundParts<'a> {
    /// Number of trailing messages missing from the buffer
    pub truncated: usize,
    /// Complete messages in their original order
    pub parts: Vec<&'a [u8]>,
}

/// Pack already-encoded messages into a single compound message
///
/// Format:
/// [1 byte]      compound tag
/// [1 byte]      count
/// [count × 2]   BE u16 length of each message
/// [N bytes]     message bodies, back to back
pub fn make_compound_message<M: AsRef<[u8]>>(msgs: &[M]) -> Result<Vec<u8>, WireError> {
    if msgs.len() > MAX_COMPOUND_MESSAGES {
        return Err(WireError::TooManyMessages(msgs.len()));
    }

    let mut body_len = 0;
    for (index, m) in msgs.iter().enumerate() {
        let len = m.as_ref().len();
        if len > MAX_COMPOUND_PART_SIZE {
            return Err(WireError::MessageTooLarge { index, len });
        }
        body_len += len;
    }

    let mut buf = Vec::with_capacity(2 + msgs.len() * 2 + body_len);
    buf.push(MessageType::Compound.as_u8());
    buf.push(msgs.len() as u8);

    for m in msgs {
        buf.extend_from_slice(&(m.as_ref().len() as u16).to_be_bytes());
    }

    for m in msgs {
        buf.extend_from_slice(m.as_ref());
    }

    Ok(buf)
}

/// Pack any number of messages, starting a new compound every 255 messages
pub fn make_compound_messages<M: AsRef<[u8]>>(msgs: &[M]) -> Result<Vec<Vec<u8>>, WireError> {
    msgs.chunks(MAX_COMPOUND_MESSAGES)
        .map(make_compound_message)
        .collect()
}

/// Split a compound message body (the bytes after the compound tag)
///
/// Returns error if:
/// - Buffer is empty (no count byte)
/// - Length table is shorter than `count * 2`
///
/// A body cut short after the length table is not an error, see [`CompoundParts`].
pub fn decode_compound_message(buf: &[u8]) -> Result<CompoundParts<'_>, WireError> {
    let (&count, rest) = buf.split_first().ok_or(WireError::MissingLengthByte)?;
    let count = count as usize;

    let table_len = count * 2;
    if rest.len() < table_len {
        return Err(WireError::TruncatedLengthTable {
            need: table_len,
            got: rest.len(),
        });
    }

    let (table, mut body) = rest.split_at(table_len);
    let mut parts = Vec::with_capacity(count);

    for (idx, len) in table.chunks_exact(2).enumerate() {
        let len = u16::from_be_bytes([len[0], len[1]]) as usize;
        if body.len() < len {
            return Ok(CompoundParts {
                truncated: count - idx,
                parts,
            });
        }

        let (part, tail) = body.split_at(len);
        parts.push(part);
        body = tail;
    }

    Ok(CompoundParts {
        truncated: 0,
        parts,
    })
}
