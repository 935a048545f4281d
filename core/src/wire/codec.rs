// Envelope codec — one type byte, then a self-describing MessagePack body

use super::WireError;
use crate::message::MessageType;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize `value` behind a single leading `msg_type` byte.
///
/// Structs are written with field names so the body can be decoded without
/// knowing the sender's exact schema version.
pub fn encode<T: Serialize + ?Sized>(msg_type: MessageType, value: &T) -> Result<Vec<u8>, WireError> {
    let mut buf = vec![msg_type.as_u8()];
    rmp_serde::encode::write_named(&mut buf, value)
        .map_err(|e| WireError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Deserialize a message body. The caller has already consumed the type byte.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, WireError> {
    rmp_serde::from_slice(body).map_err(|e| WireError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Alive, Ping, Suspect};

    #[test]
    fn test_envelope_roundtrip() {
        let suspect = Suspect {
            incarnation: 7,
            node: "node-b".into(),
            from: "node-a".into(),
        };

        let bytes = encode(MessageType::Suspect, &suspect).unwrap();
        assert_eq!(bytes[0], MessageType::Suspect.as_u8());

        let restored: Suspect = decode(&bytes[1..]).unwrap();
        assert_eq!(suspect, restored);
    }

    #[test]
    fn test_leading_byte_is_type_tag() {
        let ping = Ping { seq_no: 1, node: "x".into() };
        for kind in [MessageType::Ping, MessageType::IndirectPing, MessageType::User] {
            let bytes = encode(kind, &ping).unwrap();
            assert_eq!(bytes[0], kind.as_u8());
        }
    }

    #[test]
    fn test_decode_truncated_body() {
        let alive = Alive {
            incarnation: 1,
            node: "node-a".into(),
            addr: "10.0.0.1".into(),
            port: 7946,
        };
        let bytes = encode(MessageType::Alive, &alive).unwrap();

        let result: Result<Alive, _> = decode(&bytes[1..bytes.len() - 3]);
        assert!(matches!(result, Err(WireError::Decode(_))));
    }

    #[test]
    fn test_decode_schema_mismatch() {
        let ping = Ping { seq_no: 9, node: "n".into() };
        let bytes = encode(MessageType::Ping, &ping).unwrap();

        let result: Result<Alive, _> = decode(&bytes[1..]);
        assert!(matches!(result, Err(WireError::Decode(_))));
    }

    #[test]
    fn test_decode_empty_body() {
        let result: Result<Ping, _> = decode(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_unrepresentable_value() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("unsupported field type"))
            }
        }

        assert!(matches!(
            encode(MessageType::User, &Broken),
            Err(WireError::Encode(_))
        ));
    }
}
