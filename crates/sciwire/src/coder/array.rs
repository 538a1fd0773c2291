// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Array and masked-array coders.

use crate::array::{ArrayData, DType, MaskedArray, NdArray};
use crate::coder::{
    claim_mismatch, decode_err, envelope_with_tag, take_bytes, take_field, take_string, Envelope,
    TypeCoder,
};
use crate::engine::CoderContext;
use crate::error::CoderError;
use crate::value::Value;

/// Shared payload fields for both array coders: dtype name, shape, and
/// either raw bytes or (object dtype) a recursively encoded element list.
fn array_payload(
    arr: &NdArray,
    tag: &'static str,
    cx: &CoderContext<'_>,
) -> Result<Envelope, CoderError> {
    let mut env = envelope_with_tag(cx, tag);
    env.insert("dtype".to_string(), Value::from(arr.dtype().name()));
    env.insert(
        "shape".to_string(),
        Value::List(arr.shape().iter().map(|&s| Value::Int(s as i64)).collect()),
    );
    let data = match arr.data() {
        ArrayData::Raw(bytes) => Value::Bytes(bytes.clone()),
        ArrayData::Values(values) => {
            let mut items = Vec::with_capacity(values.len());
            for value in values {
                items.push(cx.encode_tree(value)?);
            }
            Value::List(items)
        }
    };
    env.insert("bytes".to_string(), data);
    Ok(env)
}

/// Inverse of [`array_payload`]: consume dtype/shape/bytes from a stripped
/// envelope and rebuild the array, enforcing the byte-length and
/// element-count invariants.
fn array_from_payload(
    payload: &mut Envelope,
    tag: &'static str,
    cx: &CoderContext<'_>,
) -> Result<NdArray, CoderError> {
    let dtype_name = take_string(payload, tag, "dtype")?;
    let dtype = DType::parse(&dtype_name)
        .ok_or_else(|| decode_err(tag, format!("unknown dtype '{}'", dtype_name)))?;
    let shape = take_shape(payload, tag)?;

    if dtype == DType::Object {
        let items = match take_field(payload, tag, "bytes")? {
            Value::List(items) => items,
            other => {
                return Err(decode_err(
                    tag,
                    format!(
                        "field 'bytes' must be a list for object dtype, got {}",
                        other.type_name()
                    ),
                ))
            }
        };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(cx.decode_tree(item)?);
        }
        NdArray::from_values(shape, values).map_err(|e| decode_err(tag, e.to_string()))
    } else {
        let bytes = take_bytes(payload, tag, "bytes")?;
        NdArray::from_bytes(dtype, shape, bytes).map_err(|e| decode_err(tag, e.to_string()))
    }
}

fn take_shape(payload: &mut Envelope, tag: &'static str) -> Result<Vec<usize>, CoderError> {
    let items = match take_field(payload, tag, "shape")? {
        Value::List(items) => items,
        other => {
            return Err(decode_err(
                tag,
                format!("field 'shape' must be a list, got {}", other.type_name()),
            ))
        }
    };
    let mut shape = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Int(dim) if dim >= 0 => shape.push(dim as usize),
            other => {
                return Err(decode_err(
                    tag,
                    format!(
                        "field 'shape' must hold non-negative integers, got {}",
                        other.preview(32)
                    ),
                ))
            }
        }
    }
    Ok(shape)
}

/// Encodes N-dimensional arrays as dtype + shape + raw row-major bytes.
///
/// Object-dtype arrays carry a recursively encoded element list in place of
/// the byte payload. Decode rebuilds the array under the declared shape and
/// rejects payloads whose byte length disagrees with it.
pub struct NdArrayCoder;

impl TypeCoder for NdArrayCoder {
    fn tag(&self) -> &'static str {
        "ndarray"
    }

    fn claims(&self, value: &Value) -> bool {
        matches!(value, Value::Array(_))
    }

    fn encode(&self, value: &Value, cx: &CoderContext<'_>) -> Result<Envelope, CoderError> {
        let Value::Array(arr) = value else {
            return Err(claim_mismatch(value));
        };
        array_payload(arr, self.tag(), cx)
    }

    fn decode(&self, mut payload: Envelope, cx: &CoderContext<'_>) -> Result<Value, CoderError> {
        let arr = array_from_payload(&mut payload, self.tag(), cx)?;
        Ok(Value::Array(arr))
    }
}

/// Array coder plus a parallel boolean mask, one byte per element.
///
/// Registered before [`NdArrayCoder`]: specialized before general.
pub struct MaskedArrayCoder;

impl TypeCoder for MaskedArrayCoder {
    fn tag(&self) -> &'static str {
        "maskedarray"
    }

    fn claims(&self, value: &Value) -> bool {
        matches!(value, Value::Masked(_))
    }

    fn encode(&self, value: &Value, cx: &CoderContext<'_>) -> Result<Envelope, CoderError> {
        let Value::Masked(masked) = value else {
            return Err(claim_mismatch(value));
        };
        let mut env = array_payload(masked.data(), self.tag(), cx)?;
        env.insert(
            "mask".to_string(),
            Value::Bytes(masked.mask().iter().map(|&m| m as u8).collect()),
        );
        Ok(env)
    }

    fn decode(&self, mut payload: Envelope, cx: &CoderContext<'_>) -> Result<Value, CoderError> {
        let mask_bytes = take_bytes(&mut payload, self.tag(), "mask")?;
        // Array first, mask overlaid after.
        let arr = array_from_payload(&mut payload, self.tag(), cx)?;
        let mask: Vec<bool> = mask_bytes.iter().map(|&b| b != 0).collect();
        let masked = MaskedArray::new(arr, mask).map_err(|e| decode_err(self.tag(), e.to_string()))?;
        Ok(Value::Masked(masked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::{decode_tree, encode_tree};
    use crate::value::Map;

    fn envelope(entries: &[(&str, Value)]) -> Value {
        let mut env = Map::new();
        for (key, value) in entries {
            env.insert(key.to_string(), value.clone());
        }
        Value::Map(env)
    }

    #[test]
    fn test_ndarray_roundtrip_preserves_bytes_and_shape() {
        let config = Config::default();
        let elems = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let arr = NdArray::from_elems(vec![2, 3], &elems).expect("valid array");
        let value = Value::Array(arr.clone());

        let wire = encode_tree(&value, &config).expect("encode");
        let env = wire.as_map().expect("envelope mapping");
        assert_eq!(env.get("dtype"), Some(&Value::from("float64")));
        assert_eq!(
            env.get("shape"),
            Some(&Value::List(vec![Value::Int(2), Value::Int(3)]))
        );
        assert_eq!(
            env.get("bytes").and_then(Value::as_bytes).map(<[u8]>::len),
            Some(48)
        );

        let back = decode_tree(wire, &config).expect("decode");
        let Value::Array(decoded) = back else {
            panic!("expected an array back");
        };
        assert_eq!(decoded, arr);
        assert_eq!(decoded.to_elems::<f64>().expect("typed readback"), elems);
    }

    #[test]
    fn test_ndarray_byte_length_invariant() {
        let config = Config::default();
        let wire = envelope(&[
            ("~#type", Value::from("ndarray")),
            ("dtype", Value::from("float64")),
            ("shape", Value::List(vec![Value::Int(2), Value::Int(3)])),
            ("bytes", Value::Bytes(vec![0u8; 47])),
        ]);
        let err = decode_tree(wire, &config).unwrap_err();
        match err {
            CoderError::Decode { tag, reason } => {
                assert_eq!(tag, "ndarray");
                assert!(reason.contains("byte length 47"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_ndarray_unknown_dtype_and_bad_shape() {
        let config = Config::default();
        let wire = envelope(&[
            ("~#type", Value::from("ndarray")),
            ("dtype", Value::from("complex128")),
            ("shape", Value::List(vec![Value::Int(1)])),
            ("bytes", Value::Bytes(vec![])),
        ]);
        assert!(matches!(
            decode_tree(wire, &config),
            Err(CoderError::Decode { .. })
        ));

        let wire = envelope(&[
            ("~#type", Value::from("ndarray")),
            ("dtype", Value::from("int32")),
            ("shape", Value::List(vec![Value::Int(-2)])),
            ("bytes", Value::Bytes(vec![])),
        ]);
        assert!(matches!(
            decode_tree(wire, &config),
            Err(CoderError::Decode { .. })
        ));
    }

    #[test]
    fn test_object_dtype_recurses_through_engine() {
        let config = Config::default();
        let values = vec![
            Value::from("mixed"),
            Value::TimeDelta(crate::value::TimeDelta::new(0, 1, 0)),
        ];
        let arr = NdArray::from_values(vec![2], values).expect("valid array");
        let value = Value::Array(arr);

        let wire = encode_tree(&value, &config).expect("encode");
        let env = wire.as_map().expect("envelope mapping");
        let items = env
            .get("bytes")
            .and_then(Value::as_list)
            .expect("object payload is a list");
        assert!(items[1]
            .as_map()
            .is_some_and(|m| m.get("~#type") == Some(&Value::from("timedelta"))));

        let back = decode_tree(wire, &config).expect("decode");
        assert_eq!(back, value);
    }

    #[test]
    fn test_masked_array_roundtrip() {
        let config = Config::default();
        let arr = NdArray::from_elems(vec![4], &[1i32, 2, 3, 4]).expect("valid array");
        let masked =
            MaskedArray::new(arr, vec![false, true, false, true]).expect("valid mask");
        let value = Value::Masked(masked);

        let wire = encode_tree(&value, &config).expect("encode");
        let env = wire.as_map().expect("envelope mapping");
        assert_eq!(env.get("~#type"), Some(&Value::from("maskedarray")));
        assert_eq!(
            env.get("mask"),
            Some(&Value::Bytes(vec![0, 1, 0, 1]))
        );

        let back = decode_tree(wire, &config).expect("decode");
        assert_eq!(back, value);
    }

    #[test]
    fn test_masked_array_mask_length_checked() {
        let config = Config::default();
        let wire = envelope(&[
            ("~#type", Value::from("maskedarray")),
            ("dtype", Value::from("int32")),
            ("shape", Value::List(vec![Value::Int(2)])),
            ("bytes", Value::Bytes(vec![0u8; 8])),
            ("mask", Value::Bytes(vec![1u8; 3])),
        ]);
        let err = decode_tree(wire, &config).unwrap_err();
        match err {
            CoderError::Decode { tag, reason } => {
                assert_eq!(tag, "maskedarray");
                assert!(reason.contains("mask length 3"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
