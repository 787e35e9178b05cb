//! Format-specific encoding and decoding of [`Value`] trees (feature-gated).
//!
//! Write an object with [`SerializeContext`](crate::SerializeContext) first;
//! nested [`Value::Object`]s that were not expanded cannot be encoded.

use crate::error::{DeserializeError, SerializeError};
use crate::value::Value;

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// RON, human-readable.
    #[cfg(feature = "serialize-ron")]
    Ron,
    /// Bincode, compact binary.
    #[cfg(feature = "serialize-bincode")]
    Bincode,
}

/// Encode a value tree to bytes.
#[allow(unused_variables)]
pub fn encode(value: &Value, format: Format) -> Result<Vec<u8>, SerializeError> {
    match format {
        #[cfg(feature = "serialize-ron")]
        Format::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .map(String::into_bytes)
            .map_err(|e| SerializeError::FormatError(e.to_string())),
        #[cfg(feature = "serialize-bincode")]
        Format::Bincode => {
            bincode::serialize(value).map_err(|e| SerializeError::FormatError(e.to_string()))
        }
    }
}

/// Decode bytes produced by [`encode`].
#[allow(unused_variables)]
pub fn decode(bytes: &[u8], format: Format) -> Result<Value, DeserializeError> {
    match format {
        #[cfg(feature = "serialize-ron")]
        Format::Ron => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| DeserializeError::FormatError(e.to_string()))?;
            ron::from_str(text).map_err(|e| DeserializeError::FormatError(e.to_string()))
        }
        #[cfg(feature = "serialize-bincode")]
        Format::Bincode => {
            bincode::deserialize(bytes).map_err(|e| DeserializeError::FormatError(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;

    #[cfg(feature = "serialize-ron")]
    #[test]
    fn ron_keeps_member_order() {
        let value = Value::Map(vec![
            ("mass".into(), Value::F32(2.0)),
            ("label".into(), Value::String("crate".into())),
        ]);
        let bytes = encode(&value, Format::Ron).unwrap();
        assert_eq!(decode(&bytes, Format::Ron).unwrap(), value);
    }

    #[cfg(feature = "serialize-bincode")]
    #[test]
    fn bincode_rejects_unexpanded_objects() {
        #[derive(PartialEq)]
        struct Opaque;
        let value = Value::Map(vec![("inner".into(), Value::object(Opaque))]);
        assert!(encode(&value, Format::Bincode).is_err());
    }
}
