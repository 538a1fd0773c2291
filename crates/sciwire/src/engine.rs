// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive encoder/decoder over the value tree.
//!
//! `encode_tree` replaces every foreign value with its tagged envelope,
//! recursing through containers; `decode_tree` reverses that by recognizing
//! envelopes via the reserved type key and dispatching on the tag. Both are
//! pure transforms: no I/O, no shared mutable state, recursion depth equal
//! to the nesting depth of the input.

use crate::coder::{decode_opaque, encode_opaque, OPAQUE_TAG};
use crate::config::Config;
use crate::error::CoderError;
use crate::value::{Map, Value};

/// Recursion handle passed to coders.
///
/// Coders whose payload embeds nested trees (sets, object-dtype arrays) call
/// back into the walker through this context, so the registry and options in
/// effect for the outer call also govern the nested payload.
pub struct CoderContext<'a> {
    config: &'a Config,
}

impl<'a> CoderContext<'a> {
    pub(crate) fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// The reserved envelope key in effect.
    pub fn type_key(&self) -> &str {
        self.config.type_key()
    }

    /// Encode a nested payload tree.
    pub fn encode_tree(&self, value: &Value) -> Result<Value, CoderError> {
        encode_node(value, self)
    }

    /// Decode a nested payload tree.
    pub fn decode_tree(&self, tree: Value) -> Result<Value, CoderError> {
        decode_node(tree, self)
    }
}

/// Encode a value tree into wire form.
///
/// Containers are rebuilt with recursively encoded children; wire-subset
/// primitives and raw bytes pass through; foreign values become tagged
/// envelopes via the first claiming coder. Unclaimed values either become an
/// opaque envelope (fallback enabled) or fail with
/// [`CoderError::UnsupportedType`].
pub fn encode_tree(value: &Value, config: &Config) -> Result<Value, CoderError> {
    let cx = CoderContext::new(config);
    encode_node(value, &cx)
}

/// Decode a wire tree back into values.
///
/// Mappings carrying the reserved type key dispatch to the owning coder; an
/// unrecognized tag decodes to an inert mapping with the tag reattached, so
/// data written by a newer coder set survives an older decoder losslessly.
pub fn decode_tree(tree: Value, config: &Config) -> Result<Value, CoderError> {
    let cx = CoderContext::new(config);
    decode_node(tree, &cx)
}

fn encode_node(value: &Value, cx: &CoderContext<'_>) -> Result<Value, CoderError> {
    let config = cx.config;
    match value {
        Value::Map(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                out.insert(key.clone(), encode_node(child, cx)?);
            }
            Ok(Value::Map(out))
        }
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(encode_node(item, cx)?);
            }
            Ok(Value::List(out))
        }
        Value::Null
        | Value::Bool(_)
        | Value::Int(_)
        | Value::UInt(_)
        | Value::Float(_)
        | Value::String(_)
        | Value::Bytes(_) => Ok(value.clone()),
        foreign => {
            if let Some(coder) = config.registry().coder_for(foreign) {
                let env = coder.encode(foreign, cx)?;
                debug_assert!(env.contains_key(config.type_key()));
                Ok(Value::Map(env))
            } else if config.allow_opaque_fallback() {
                log::debug!(
                    "[ENGINE] No coder claims {} value, using opaque fallback",
                    foreign.type_name()
                );
                Ok(Value::Map(encode_opaque(foreign, config.type_key())?))
            } else {
                Err(CoderError::UnsupportedType {
                    type_name: foreign.type_name().to_string(),
                    preview: foreign.preview(64),
                })
            }
        }
    }
}

fn decode_node(tree: Value, cx: &CoderContext<'_>) -> Result<Value, CoderError> {
    let config = cx.config;
    match tree {
        Value::Map(mut map) => match map.remove(config.type_key()) {
            Some(Value::String(tag)) => {
                if let Some(coder) = config.registry().coder_by_tag(&tag) {
                    let decoded = coder.decode(map, cx)?;
                    // One more pass resolves envelopes nested in the result.
                    decode_node(decoded, cx)
                } else if tag == OPAQUE_TAG && config.allow_opaque_fallback() {
                    // Returned as-is, not re-scanned.
                    decode_opaque(map)
                } else {
                    log::debug!("[ENGINE] Unknown tag '{}', passing envelope through", tag);
                    let mut out = Map::new();
                    for (key, child) in map {
                        out.insert(key, decode_node(child, cx)?);
                    }
                    out.insert(config.type_key().to_string(), Value::String(tag));
                    Ok(Value::Map(out))
                }
            }
            Some(other) => {
                // Reserved key with a non-string value is ordinary user data.
                let mut out = Map::new();
                for (key, child) in map {
                    out.insert(key, decode_node(child, cx)?);
                }
                out.insert(config.type_key().to_string(), decode_node(other, cx)?);
                Ok(Value::Map(out))
            }
            None => {
                let mut out = Map::new();
                for (key, child) in map {
                    out.insert(key, decode_node(child, cx)?);
                }
                Ok(Value::Map(out))
            }
        },
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(decode_node(item, cx)?);
            }
            Ok(Value::List(out))
        }
        other => Ok(other),
    }
}
