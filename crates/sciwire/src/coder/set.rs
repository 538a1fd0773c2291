// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Set coder.

use crate::coder::{claim_mismatch, envelope_with_tag, take_list, Envelope, TypeCoder};
use crate::engine::CoderContext;
use crate::error::CoderError;
use crate::value::{Value, ValueSet};

/// Encodes a set as the ordered sequence of its members.
///
/// Member order on the wire is insertion order and not significant; members
/// are recursively encoded through the context, so a set of datetimes works.
pub struct SetCoder;

impl TypeCoder for SetCoder {
    fn tag(&self) -> &'static str {
        "unique_set"
    }

    fn claims(&self, value: &Value) -> bool {
        matches!(value, Value::Set(_))
    }

    fn encode(&self, value: &Value, cx: &CoderContext<'_>) -> Result<Envelope, CoderError> {
        let Value::Set(set) = value else {
            return Err(claim_mismatch(value));
        };
        let mut items = Vec::with_capacity(set.len());
        for member in set.iter() {
            items.push(cx.encode_tree(member)?);
        }
        let mut env = envelope_with_tag(cx, self.tag());
        env.insert("items".to_string(), Value::List(items));
        Ok(env)
    }

    fn decode(&self, mut payload: Envelope, cx: &CoderContext<'_>) -> Result<Value, CoderError> {
        let items = take_list(&mut payload, self.tag(), "items")?;
        let mut set = ValueSet::new();
        for item in items {
            set.insert(cx.decode_tree(item)?);
        }
        Ok(Value::Set(set))
    }
}
