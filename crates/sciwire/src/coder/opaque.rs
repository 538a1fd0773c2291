// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque fallback for values no registered coder claims.
//!
//! The blob is the bincode serialization of the crate's internal value
//! representation. It only decodes within a compatible build of this crate
//! and is never a wire-format stability guarantee. The fallback is not a
//! registry member; the walker invokes it directly when the caller enabled
//! it and no coder claimed the value.

use crate::coder::{take_bytes, Envelope};
use crate::error::CoderError;
use crate::value::Value;

/// Tag of the opaque fallback envelope.
pub const OPAQUE_TAG: &str = "opaque-fallback";

/// Wrap an unclaimed value into an opaque envelope.
pub(crate) fn encode_opaque(value: &Value, type_key: &str) -> Result<Envelope, CoderError> {
    let blob = bincode::serialize(value).map_err(|e| CoderError::Opaque {
        reason: e.to_string(),
    })?;
    let mut env = Envelope::new();
    env.insert(type_key.to_string(), Value::String(OPAQUE_TAG.to_string()));
    env.insert("b".to_string(), Value::Bytes(blob));
    Ok(env)
}

/// Rebuild the value from an opaque envelope (type key already stripped).
pub(crate) fn decode_opaque(mut payload: Envelope) -> Result<Value, CoderError> {
    let blob = take_bytes(&mut payload, OPAQUE_TAG, "b")?;
    bincode::deserialize(&blob).map_err(|e| CoderError::Opaque {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueSet;

    #[test]
    fn test_opaque_roundtrip_in_process() {
        let set: ValueSet = [Value::from("a"), Value::from(1i64)].into_iter().collect();
        let value = Value::Set(set);
        let env = encode_opaque(&value, "~#type").expect("opaque encode");
        assert_eq!(env.get("~#type"), Some(&Value::from(OPAQUE_TAG)));

        let mut payload = env;
        payload.remove("~#type");
        let back = decode_opaque(payload).expect("opaque decode");
        assert_eq!(back, value);
    }

    #[test]
    fn test_opaque_corrupt_blob() {
        let mut payload = Envelope::new();
        payload.insert("b".to_string(), Value::Bytes(vec![0xFF; 3]));
        let err = decode_opaque(payload).unwrap_err();
        assert!(matches!(err, CoderError::Opaque { .. }));
    }

    #[test]
    fn test_opaque_missing_blob_field() {
        let err = decode_opaque(Envelope::new()).unwrap_err();
        match err {
            CoderError::Decode { tag, reason } => {
                assert_eq!(tag, OPAQUE_TAG);
                assert_eq!(reason, "missing required field 'b'");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
