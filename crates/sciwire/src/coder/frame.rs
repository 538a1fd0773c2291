// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tabular frame coder.

use crate::coder::{claim_mismatch, decode_err, envelope_with_tag, take_string, Envelope, TypeCoder};
use crate::engine::CoderContext;
use crate::error::CoderError;
use crate::frame::Frame;
use crate::value::Value;

/// Ships the frame's own JSON text transform as the payload.
///
/// Round-trip precision is bounded by that transform, not by the outer wire
/// format.
pub struct FrameCoder;

impl TypeCoder for FrameCoder {
    fn tag(&self) -> &'static str {
        "dataframe"
    }

    fn claims(&self, value: &Value) -> bool {
        matches!(value, Value::Frame(_))
    }

    fn encode(&self, value: &Value, cx: &CoderContext<'_>) -> Result<Envelope, CoderError> {
        let Value::Frame(frame) = value else {
            return Err(claim_mismatch(value));
        };
        let text = frame
            .to_json_text()
            .map_err(|_| claim_mismatch(value))?;
        let mut env = envelope_with_tag(cx, self.tag());
        env.insert("table".to_string(), Value::String(text));
        Ok(env)
    }

    fn decode(&self, mut payload: Envelope, _cx: &CoderContext<'_>) -> Result<Value, CoderError> {
        let text = take_string(&mut payload, self.tag(), "table")?;
        let frame =
            Frame::from_json_text(&text).map_err(|e| decode_err(self.tag(), e.to_string()))?;
        Ok(Value::Frame(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::{decode_tree, encode_tree};
    use crate::value::Map;

    fn sample_frame() -> Frame {
        let mut frame = Frame::new();
        frame
            .push_column("station", vec![Value::from("north"), Value::from("south")])
            .expect("string column");
        frame
            .push_column("mean", vec![Value::from(12.25f64), Value::from(-3.5f64)])
            .expect("float column");
        frame
    }

    #[test]
    fn test_frame_roundtrip() {
        let config = Config::default();
        let value = Value::Frame(sample_frame());
        let wire = encode_tree(&value, &config).expect("encode");

        let env = wire.as_map().expect("envelope mapping");
        assert_eq!(env.get("~#type"), Some(&Value::from("dataframe")));
        assert!(env.get("table").and_then(Value::as_str).is_some());

        let back = decode_tree(wire, &config).expect("decode");
        assert_eq!(back, value);
    }

    #[test]
    fn test_frame_malformed_table_text() {
        let config = Config::default();
        let mut env = Map::new();
        env.insert("~#type".to_string(), Value::from("dataframe"));
        env.insert("table".to_string(), Value::from("not json"));
        let err = decode_tree(Value::Map(env), &config).unwrap_err();
        match err {
            CoderError::Decode { tag, .. } => assert_eq!(tag, "dataframe"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
