// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generated protobuf types plus the typed convenience layer used by
//! [`crate::message`] to move primitive Rust values across the wire.

#![allow(clippy::derive_partial_eq_without_eq)]

include!(concat!(env!("OUT_DIR"), "/clara.msg.proto.rs"));

pub mod mimetype;

use prost::Message as _;

use crate::error::{ClaraMsgError, Result};

impl Meta {
    /// A bare `Meta` carrying only `datatype`, as built by the
    /// mime-type-string `Message` constructor.
    pub fn for_datatype(datatype: impl Into<String>) -> Meta {
        Meta {
            datatype: datatype.into(),
            ..Default::default()
        }
    }
}

/// Deep-copies a `Meta` (protobuf messages are plain owned data, so this is
/// just `clone`; kept as a named function to mirror the original's explicit
/// `copy_meta`).
pub fn copy_meta(meta: &Meta) -> Meta {
    meta.clone()
}

/// One-field wrapper dispatch for the primitive payload types of §6's data
/// envelope. `String`/`Vec<u8>` pass through raw and are not handled here.
pub trait WireValue: Sized {
    const MIME_TYPE: &'static str;

    fn serialize_value(&self) -> Vec<u8>;
    fn parse_value(bytes: &[u8]) -> Result<Self>;
}

impl WireValue for i32 {
    const MIME_TYPE: &'static str = mimetype::SINGLE_SFIXED32;

    fn serialize_value(&self) -> Vec<u8> {
        SFixed32Value { value: *self }.encode_to_vec()
    }

    fn parse_value(bytes: &[u8]) -> Result<Self> {
        Ok(SFixed32Value::decode(bytes)?.value)
    }
}

impl WireValue for i64 {
    const MIME_TYPE: &'static str = mimetype::SINGLE_SFIXED64;

    fn serialize_value(&self) -> Vec<u8> {
        SFixed64Value { value: *self }.encode_to_vec()
    }

    fn parse_value(bytes: &[u8]) -> Result<Self> {
        Ok(SFixed64Value::decode(bytes)?.value)
    }
}

impl WireValue for f32 {
    const MIME_TYPE: &'static str = mimetype::SINGLE_FLOAT;

    fn serialize_value(&self) -> Vec<u8> {
        FloatValue { value: *self }.encode_to_vec()
    }

    fn parse_value(bytes: &[u8]) -> Result<Self> {
        Ok(FloatValue::decode(bytes)?.value)
    }
}

impl WireValue for f64 {
    const MIME_TYPE: &'static str = mimetype::SINGLE_DOUBLE;

    fn serialize_value(&self) -> Vec<u8> {
        DoubleValue { value: *self }.encode_to_vec()
    }

    fn parse_value(bytes: &[u8]) -> Result<Self> {
        Ok(DoubleValue::decode(bytes)?.value)
    }
}

impl WireValue for String {
    const MIME_TYPE: &'static str = mimetype::SINGLE_STRING;

    fn serialize_value(&self) -> Vec<u8> {
        self.clone().into_bytes()
    }

    fn parse_value(bytes: &[u8]) -> Result<Self> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ClaraMsgError::SerializationError(e.to_string()))
    }
}

impl WireValue for Vec<u8> {
    const MIME_TYPE: &'static str = mimetype::BYTES;

    fn serialize_value(&self) -> Vec<u8> {
        self.clone()
    }

    fn parse_value(bytes: &[u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }
}

/// Marker so `Vec<i32>`/`Vec<i64>`/... can each pick their own array
/// wrapper message without clashing with [`WireValue for Vec<u8>`]'s raw
/// passthrough.
macro_rules! impl_wire_value_array {
    ($elem:ty, $wrapper:ident, $mime:expr) => {
        impl WireValue for Vec<$elem> {
            const MIME_TYPE: &'static str = $mime;

            fn serialize_value(&self) -> Vec<u8> {
                $wrapper {
                    value: self.clone(),
                }
                .encode_to_vec()
            }

            fn parse_value(bytes: &[u8]) -> Result<Self> {
                Ok($wrapper::decode(bytes)?.value)
            }
        }
    };
}

impl_wire_value_array!(i32, SFixed32Array, mimetype::ARRAY_SINT32);
impl_wire_value_array!(i64, SFixed64Array, mimetype::ARRAY_SINT64);
impl_wire_value_array!(f32, FloatArray, mimetype::ARRAY_FLOAT);
impl_wire_value_array!(f64, DoubleArray, mimetype::ARRAY_DOUBLE);
impl_wire_value_array!(String, StringArray, mimetype::ARRAY_STRING);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_round_trips() {
        let meta = Meta {
            datatype: mimetype::SINGLE_SFIXED32.to_string(),
            replyto: Some("ret:deadbeef:2000000".to_string()),
            ..Default::default()
        };
        let bytes = meta.encode_to_vec();
        let decoded = Meta::decode(bytes.as_slice()).unwrap();
        assert_eq!(meta, decoded);
    }

    #[test]
    fn int32_value_round_trips() {
        let bytes = 42i32.serialize_value();
        assert_eq!(i32::parse_value(&bytes).unwrap(), 42);
    }

    #[test]
    fn array_values_round_trip() {
        let ints = vec![1i32, 2, 3];
        let bytes = ints.serialize_value();
        assert_eq!(Vec::<i32>::parse_value(&bytes).unwrap(), ints);

        let strings = vec!["a".to_string(), "b".to_string()];
        let bytes = strings.serialize_value();
        assert_eq!(Vec::<String>::parse_value(&bytes).unwrap(), strings);
    }
}
