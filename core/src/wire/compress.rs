// LZW compression wrapper for gossip payloads

use super::codec::{decode, encode};
use super::WireError;
use crate::message::{Compress, CompressionType, MessageType};
use weezl::{decode::Decoder, encode::Encoder, BitOrder};

/// Literal width of the LZW code table
const LZW_LIT_WIDTH: u8 = 8;

/// Compress `payload` and wrap it in an encoded `Compress` message
///
/// The returned buffer starts with the `Compress` type tag and can be sent
/// as-is or placed inside a compound message.
pub fn compress_payload(payload: &[u8]) -> Result<Vec<u8>, WireError> {
    let buf = Encoder::new(BitOrder::Lsb, LZW_LIT_WIDTH)
        .encode(payload)
        .map_err(|e| WireError::Compress(e.to_string()))?;

    let c = Compress {
        algo: CompressionType::Lzw.as_u8(),
        buf,
    };
    encode(MessageType::Compress, &c)
}

/// Decode a `Compress` message body (after the type tag) and return the
/// uncompressed payload
pub fn decompress_payload(msg: &[u8]) -> Result<Vec<u8>, WireError> {
    let c: Compress = decode(msg)?;
    decompress_buffer(&c)
}

/// Decompress the buffer of a single `Compress` message
///
/// Returns error if the algorithm is not LZW or the stream is corrupt.
pub fn decompress_buffer(c: &Compress) -> Result<Vec<u8>, WireError> {
    if c.algo != CompressionType::Lzw.as_u8() {
        return Err(WireError::UnsupportedAlgorithm(c.algo));
    }

    Decoder::new(BitOrder::Lsb, LZW_LIT_WIDTH)
        .decode(&c.buf)
        .map_err(|e| WireError::Decompress(e.to_string()))
}
