//! CBOR encoding of stored values.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes a value to CBOR bytes.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the value cannot be represented.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Deserializes a value from CBOR bytes.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the bytes are not a valid encoding of `T`.
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    ciborium::de::from_reader(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn json_document_survives_cbor() {
        let doc = json!({
            "begin": "1.0.0.0",
            "end": "1.255.255.255",
            "asn": 3356,
            "coordinates": [52.37, 4.89],
            "timezone": null,
        });

        let bytes = encode_value(&doc).unwrap();
        let decoded: Value = decode_value(&bytes).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result: CodecResult<Value> = decode_value(&[0xff, 0x00, 0x13]);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }
}
